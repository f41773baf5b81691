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

//! Pairing of the active players for one round.
//!
//! Round one is paired at random. Later rounds walk the players from the most
//! points to the fewest, shuffled within each score group, and give each
//! unpaired player the first unpaired opponent found by, in order:
//!
//! 1. the same points and no previous match between them,
//! 2. no previous match between them,
//! 3. anyone left.
//!
//! A player with nobody left gets a bye.

use log::{debug, trace};
use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashSet;

use crate::{
    config::ByeResult,
    error::TournamentError,
    pairing::{Pairing, Round},
    player::{PlayerId, Registry},
};

pub struct PairingEngine<'a, R: Rng> {
    players: &'a Registry,
    previous_rounds: &'a [Round],
    bye: ByeResult,
    rng: &'a mut R,
}

impl<'a, R: Rng> PairingEngine<'a, R> {
    /// `previous_rounds` are the rounds already played, index 0 included.
    pub fn new(
        players: &'a Registry,
        previous_rounds: &'a [Round],
        bye: ByeResult,
        rng: &'a mut R,
    ) -> Self {
        Self {
            players,
            previous_rounds,
            bye,
            rng,
        }
    }

    /// Pairs every active player exactly once.
    ///
    /// # Errors
    ///
    /// If there are no active players or `round` is 0.
    pub fn pair(mut self, round: u32) -> Result<Vec<Pairing>, TournamentError> {
        let ids = self.players.active_ids();

        if ids.is_empty() {
            return Err(TournamentError::NoPlayers);
        }

        if round < 1 {
            return Err(TournamentError::invalid_state(
                "the current round must be at least 1",
            ));
        }

        let pairings = if round == 1 {
            self.random_pairings(ids)
        } else {
            self.swiss_pairings(ids)
        };

        trace!("round {round} pairings: {pairings:?}");
        Ok(pairings)
    }

    fn random_pairings(&mut self, mut ids: Vec<PlayerId>) -> Vec<Pairing> {
        ids.shuffle(&mut *self.rng);

        let mut pairings = Vec::with_capacity(ids.len().div_ceil(2));
        for chunk in ids.chunks(2) {
            match *chunk {
                [a, b] => {
                    debug!("pair {a} {b} random");
                    pairings.push(Pairing::new(a, b));
                }
                [a] => {
                    debug!("pair {a} bye");
                    pairings.push(Pairing::bye(a, self.bye));
                }
                _ => {}
            }
        }

        pairings
    }

    fn swiss_pairings(&mut self, ids: Vec<PlayerId>) -> Vec<Pairing> {
        let players = self.sorted_players(ids);
        let mut paired = FxHashSet::default();
        let mut pairings = Vec::with_capacity(players.len().div_ceil(2));

        for &(id, points) in &players {
            if paired.contains(&id) {
                continue;
            }
            paired.insert(id);

            if let Some(opponent) = self.find_best_opponent(id, points, &players, &paired) {
                debug!("pair {id} {opponent}");
                paired.insert(opponent);
                pairings.push(Pairing::new(id, opponent));
            } else {
                debug!("pair {id} bye");
                pairings.push(Pairing::bye(id, self.bye));
            }
        }

        pairings
    }

    /// Active players with their points, most points first, shuffled within
    /// each group of equal points.
    fn sorted_players(&mut self, ids: Vec<PlayerId>) -> Vec<(PlayerId, u32)> {
        let mut players: Vec<_> = ids
            .into_iter()
            .map(|id| (id, self.players.get(id).map_or(0, |player| player.points)))
            .collect();

        players.sort_by(|a, b| b.1.cmp(&a.1));

        for group in players.chunk_by_mut(|a, b| a.1 == b.1) {
            group.shuffle(&mut *self.rng);
        }

        players
    }

    fn find_best_opponent(
        &self,
        id: PlayerId,
        points: u32,
        players: &[(PlayerId, u32)],
        paired: &FxHashSet<PlayerId>,
    ) -> Option<PlayerId> {
        let mut available = players
            .iter()
            .filter(|(other, _)| *other != id && !paired.contains(other));

        available
            .clone()
            .find(|(other, other_points)| {
                *other_points == points && !self.have_played_before(id, *other)
            })
            .or_else(|| {
                available
                    .clone()
                    .find(|(other, _)| !self.have_played_before(id, *other))
            })
            .or_else(|| available.next())
            .map(|(other, _)| *other)
    }

    /// Whether `a` and `b` met in any earlier round.
    #[must_use]
    pub fn have_played_before(&self, a: PlayerId, b: PlayerId) -> bool {
        self.previous_rounds
            .iter()
            .skip(1)
            .any(|round| round.has_played(a, b))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::pairing::Opponent;

    fn registry(count: u32) -> anyhow::Result<Registry> {
        let mut registry = Registry::default();
        for i in 0..count {
            registry.add(&format!("player{i}"), None)?;
        }
        Ok(registry)
    }

    fn assert_everyone_once(registry: &Registry, pairings: &[Pairing]) {
        let mut seen: Vec<_> = pairings.iter().flat_map(Pairing::players).collect();
        seen.sort_unstable();
        assert_eq!(seen, registry.active_ids());
    }

    #[test]
    fn no_players() {
        let registry = Registry::default();
        let mut rng = StdRng::seed_from_u64(0);
        let engine = PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng);
        assert!(matches!(engine.pair(1), Err(TournamentError::NoPlayers)));
    }

    #[test]
    fn round_zero_is_invalid() -> anyhow::Result<()> {
        let registry = registry(2)?;
        let mut rng = StdRng::seed_from_u64(0);
        let engine = PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng);
        assert!(matches!(engine.pair(0), Err(TournamentError::InvalidState(_))));

        Ok(())
    }

    #[test]
    fn random_round_pairs_everyone_once() -> anyhow::Result<()> {
        for count in 1..=9 {
            let registry = registry(count)?;
            for seed in 0..8 {
                let mut rng = StdRng::seed_from_u64(seed);
                let pairings =
                    PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng).pair(1)?;

                assert_everyone_once(&registry, &pairings);
                let byes = pairings.iter().filter(|pairing| pairing.is_bye()).count();
                assert_eq!(byes, usize::from(count % 2 == 1));
            }
        }

        Ok(())
    }

    #[test]
    fn same_seed_same_pairings() -> anyhow::Result<()> {
        let registry = registry(8)?;
        let mut rng_1 = StdRng::seed_from_u64(42);
        let mut rng_2 = StdRng::seed_from_u64(42);
        let pairings_1 =
            PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng_1).pair(1)?;
        let pairings_2 =
            PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng_2).pair(1)?;
        assert_eq!(pairings_1, pairings_2);

        Ok(())
    }

    #[test]
    fn swiss_avoids_rematches() -> anyhow::Result<()> {
        let registry = registry(4)?;
        let previous = vec![
            Round::default(),
            Round {
                pairings: vec![
                    Pairing::new(PlayerId(1), PlayerId(2)),
                    Pairing::new(PlayerId(3), PlayerId(4)),
                ],
                finalized: true,
            },
        ];

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairings =
                PairingEngine::new(&registry, &previous, ByeResult::default(), &mut rng)
                    .pair(2)?;

            assert_everyone_once(&registry, &pairings);
            for pairing in &pairings {
                if let Opponent::Player(b) = pairing.player_b {
                    assert!(!previous[1].has_played(pairing.player_a, b));
                }
            }
        }

        Ok(())
    }

    #[test]
    fn swiss_prefers_the_same_score_group() -> anyhow::Result<()> {
        let mut registry = registry(4)?;
        for id in [PlayerId(1), PlayerId(3)] {
            if let Some(player) = registry.get_mut(id) {
                player.points = 3;
            }
        }

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairings =
                PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng).pair(2)?;

            assert_eq!(pairings.len(), 2);
            let leaders = pairings
                .iter()
                .find(|pairing| pairing.contains(PlayerId(1)))
                .and_then(|pairing| pairing.opponent_of(PlayerId(1)));
            assert_eq!(leaders, Some(PlayerId(3)));
        }

        Ok(())
    }

    #[test]
    fn swiss_allows_a_rematch_as_a_last_resort() -> anyhow::Result<()> {
        let registry = registry(2)?;
        let previous = vec![
            Round::default(),
            Round {
                pairings: vec![Pairing::new(PlayerId(1), PlayerId(2))],
                finalized: true,
            },
        ];

        let mut rng = StdRng::seed_from_u64(3);
        let engine = PairingEngine::new(&registry, &previous, ByeResult::default(), &mut rng);
        assert!(engine.have_played_before(PlayerId(2), PlayerId(1)));

        let pairings = engine.pair(2)?;
        assert_eq!(pairings.len(), 1);
        assert!(pairings[0].between(PlayerId(1), PlayerId(2)));

        Ok(())
    }

    #[test]
    fn swiss_gives_the_odd_player_out_a_bye() -> anyhow::Result<()> {
        let registry = registry(5)?;
        let mut rng = StdRng::seed_from_u64(9);
        let pairings =
            PairingEngine::new(&registry, &[], ByeResult::default(), &mut rng).pair(3)?;

        assert_everyone_once(&registry, &pairings);
        let byes: Vec<_> = pairings.iter().filter(|pairing| pairing.is_bye()).collect();
        assert_eq!(byes.len(), 1);
        assert_eq!(byes[0].result, Some(ByeResult::default().into()));

        Ok(())
    }
}
