// This file is part of swiss-tournament.
//
// swiss-tournament is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// swiss-tournament is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::{BTreeMap, btree_map::Entry};

use log::debug;

use crate::{
    config::TournamentConfig,
    error::TournamentError,
    pairing::{Opponent, Round, Score, Side},
    player::{Player, PlayerId, Registry},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl MatchOutcome {
    /// The outcome for the player who won `won` games against `lost`.
    #[must_use]
    pub fn from_games(won: u32, lost: u32) -> Self {
        match won.cmp(&lost) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Less => Self::Loss,
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }
}

/// Stores a result given from the point of view of `id`.
///
/// # Errors
///
/// If `id` is not paired in `round` or has a bye.
pub fn record_result(
    round: &mut Round,
    id: PlayerId,
    wins: u32,
    losses: u32,
    draws: u32,
) -> Result<(), TournamentError> {
    let (index, side) = round
        .position(id)
        .ok_or_else(|| TournamentError::NotFound(id.to_string()))?;

    let Some(pairing) = round.pairings.get_mut(index) else {
        return Err(TournamentError::NotFound(id.to_string()));
    };

    if pairing.is_bye() {
        return Err(TournamentError::ByeResult(id));
    }

    let score = Score {
        wins_a: wins,
        wins_b: losses,
        draws,
    };

    pairing.result = Some(match side {
        Side::A => score,
        Side::B => score.swapped(),
    });
    debug!("result {pairing}");

    Ok(())
}

/// Adds the results of `round` to every player's totals.
///
/// Either every pairing is applied or, on error, none is.
///
/// # Errors
///
/// If a pairing has no result, names a player that doesn't exist, or a total
/// would overflow.
pub fn fold_round(
    number: u32,
    round: &Round,
    players: &mut Registry,
    config: &TournamentConfig,
) -> Result<(), TournamentError> {
    if let Some(pairing) = round.first_incomplete() {
        return Err(TournamentError::IncompleteRound {
            round: number,
            player: pairing.player_a,
        });
    }

    let mut updated = BTreeMap::new();

    for pairing in &round.pairings {
        let Some(score) = pairing.result else {
            continue;
        };
        let a = pairing.player_a;

        match pairing.player_b {
            Opponent::Bye => {
                debug!("round {number}: {a} bye {score}");
                apply(players, &mut updated, a, MatchOutcome::Win, score, config)?;
            }
            Opponent::Player(b) => {
                debug!("round {number}: {a} {b} {score}");
                let outcome = MatchOutcome::from_games(score.wins_a, score.wins_b);
                apply(players, &mut updated, a, outcome, score, config)?;
                apply(
                    players,
                    &mut updated,
                    b,
                    outcome_for_b(outcome),
                    score.swapped(),
                    config,
                )?;
            }
        }
    }

    for (id, player) in updated {
        *players.get_mut_or_not_found(id)? = player;
    }

    Ok(())
}

fn outcome_for_b(outcome: MatchOutcome) -> MatchOutcome {
    match outcome {
        MatchOutcome::Win => MatchOutcome::Loss,
        MatchOutcome::Loss => MatchOutcome::Win,
        MatchOutcome::Draw => MatchOutcome::Draw,
    }
}

/// Adds one match to the staged copy of `id`, leaving the registry alone.
fn apply(
    players: &Registry,
    updated: &mut BTreeMap<PlayerId, Player>,
    id: PlayerId,
    outcome: MatchOutcome,
    score: Score,
    config: &TournamentConfig,
) -> Result<(), TournamentError> {
    let player = match updated.entry(id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(players.get_or_not_found(id)?.clone()),
    };

    let overflow =
        || TournamentError::InvalidInput(format!("the totals of player {id} overflow"));

    let (matches, points) = match outcome {
        MatchOutcome::Win => (&mut player.wins, config.points_for_win),
        MatchOutcome::Loss => (&mut player.losses, config.points_for_loss),
        MatchOutcome::Draw => (&mut player.draws, config.points_for_draw),
    };
    *matches = matches.checked_add(1).ok_or_else(overflow)?;
    player.points = player.points.checked_add(points).ok_or_else(overflow)?;

    player.game_wins = player.game_wins.checked_add(score.wins_a).ok_or_else(overflow)?;
    player.game_losses = player
        .game_losses
        .checked_add(score.wins_b)
        .ok_or_else(overflow)?;
    player.game_draws = player.game_draws.checked_add(score.draws).ok_or_else(overflow)?;

    player.checked_matches_played().ok_or_else(overflow)?;
    player.checked_games_played().ok_or_else(overflow)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ByeResult, pairing::Pairing};

    fn setup() -> anyhow::Result<(Registry, Round)> {
        let mut players = Registry::default();
        let a = players.add("A", None)?;
        let b = players.add("B", None)?;
        let c = players.add("C", None)?;
        let round = Round {
            pairings: vec![Pairing::new(a, b), Pairing::bye(c, ByeResult::default())],
            finalized: false,
        };
        Ok((players, round))
    }

    #[test]
    fn outcome_from_games() {
        assert_eq!(MatchOutcome::from_games(2, 1), MatchOutcome::Win);
        assert_eq!(MatchOutcome::from_games(0, 2), MatchOutcome::Loss);
        assert_eq!(MatchOutcome::from_games(1, 1), MatchOutcome::Draw);
        assert_eq!(MatchOutcome::from_games(0, 0), MatchOutcome::Draw);
    }

    #[test]
    fn results_are_stored_from_player_a() -> anyhow::Result<()> {
        let (_, mut round) = setup()?;
        record_result(&mut round, PlayerId(2), 2, 0, 1)?;
        assert_eq!(
            round.pairings[0].result,
            Some(Score {
                wins_a: 0,
                wins_b: 2,
                draws: 1
            })
        );

        record_result(&mut round, PlayerId(1), 2, 1, 0)?;
        assert_eq!(
            round.pairings[0].result,
            Some(Score {
                wins_a: 2,
                wins_b: 1,
                draws: 0
            })
        );

        Ok(())
    }

    #[test]
    fn results_for_unknown_players_and_byes_are_rejected() -> anyhow::Result<()> {
        let (_, mut round) = setup()?;
        let before = round.clone();

        assert_eq!(
            record_result(&mut round, PlayerId(9), 2, 0, 0),
            Err(TournamentError::NotFound("9".to_string()))
        );
        assert_eq!(
            record_result(&mut round, PlayerId(3), 0, 2, 0),
            Err(TournamentError::ByeResult(PlayerId(3)))
        );
        assert_eq!(round, before);

        Ok(())
    }

    #[test]
    fn folding_is_all_or_nothing() -> anyhow::Result<()> {
        let (mut players, round) = setup()?;
        let before = players.clone();

        assert_eq!(
            fold_round(1, &round, &mut players, &TournamentConfig::default()),
            Err(TournamentError::IncompleteRound {
                round: 1,
                player: PlayerId(1)
            })
        );
        assert_eq!(players, before);

        Ok(())
    }

    #[test]
    fn overflowing_totals_are_rejected() -> anyhow::Result<()> {
        let (mut players, mut round) = setup()?;
        record_result(&mut round, PlayerId(1), u32::MAX, 1, 0)?;
        let before = players.clone();

        assert!(matches!(
            fold_round(1, &round, &mut players, &TournamentConfig::default()),
            Err(TournamentError::InvalidInput(_))
        ));
        assert_eq!(players, before);

        // A later round that would push a total past the limit is refused too.
        record_result(&mut round, PlayerId(1), 2, 1, 0)?;
        if let Some(c) = players.get_mut(PlayerId(3)) {
            c.points = u32::MAX - 1;
        }
        let before = players.clone();
        assert_eq!(
            fold_round(1, &round, &mut players, &TournamentConfig::default()),
            Err(TournamentError::InvalidInput(
                "the totals of player 3 overflow".to_string()
            ))
        );
        assert_eq!(players, before);

        Ok(())
    }

    #[test]
    fn folding_a_win_and_a_bye() -> anyhow::Result<()> {
        let (mut players, mut round) = setup()?;
        record_result(&mut round, PlayerId(1), 2, 1, 0)?;
        fold_round(1, &round, &mut players, &TournamentConfig::default())?;

        let a = players.get_or_not_found(PlayerId(1))?;
        assert_eq!((a.wins, a.losses, a.draws, a.points), (1, 0, 0, 3));
        assert_eq!((a.game_wins, a.game_losses, a.game_draws), (2, 1, 0));

        let b = players.get_or_not_found(PlayerId(2))?;
        assert_eq!((b.wins, b.losses, b.draws, b.points), (0, 1, 0, 0));
        assert_eq!((b.game_wins, b.game_losses, b.game_draws), (1, 2, 0));

        let c = players.get_or_not_found(PlayerId(3))?;
        assert_eq!((c.wins, c.losses, c.draws, c.points), (1, 0, 0, 3));
        assert_eq!((c.game_wins, c.game_losses, c.game_draws), (2, 0, 0));

        Ok(())
    }

    #[test]
    fn folding_a_draw_with_custom_points() -> anyhow::Result<()> {
        let (mut players, mut round) = setup()?;
        let config = TournamentConfig {
            points_for_win: 2,
            points_for_draw: 1,
            points_for_loss: 0,
            bye: ByeResult {
                wins: 1,
                losses: 0,
                draws: 0,
            },
        };
        round.pairings[1] = Pairing::bye(PlayerId(3), config.bye);
        record_result(&mut round, PlayerId(2), 1, 1, 1)?;
        fold_round(1, &round, &mut players, &config)?;

        for id in [PlayerId(1), PlayerId(2)] {
            let player = players.get_or_not_found(id)?;
            assert_eq!((player.draws, player.points), (1, 1));
            assert_eq!((player.game_wins, player.game_losses, player.game_draws), (1, 1, 1));
        }

        let c = players.get_or_not_found(PlayerId(3))?;
        assert_eq!((c.points, c.game_wins), (2, 1));

        Ok(())
    }
}
