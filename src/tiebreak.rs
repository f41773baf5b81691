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

//! Tiebreakers and the ranked standings.
//!
//! Players are ordered by points, then opponent match-win percentage, then
//! game-win percentage, then opponent game-win percentage. Opponent
//! percentages average over the distinct opponents met in finalized rounds,
//! byes excluded, after raising each opponent's value to at least one third.

use std::{cmp::Ordering, collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    pairing::Round,
    player::{Player, PlayerId, Registry},
};

/// The lowest value an opponent's percentage counts as.
pub const PERCENTAGE_FLOOR: f64 = 1.0 / 3.0;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TiebreakerData {
    pub game_win_percentage: f64,
    pub opponent_match_win_percentage: f64,
    pub opponent_game_win_percentage: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerStanding {
    pub rank: u32,
    pub id: PlayerId,
    pub name: String,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub tiebreakers: TiebreakerData,
}

impl PlayerStanding {
    fn ranks_with(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl fmt::Display for PlayerStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}-{}-{} {:.4} {:.4} {:.4}",
            self.rank,
            self.id,
            self.name,
            self.points,
            self.wins,
            self.losses,
            self.draws,
            self.tiebreakers.opponent_match_win_percentage,
            self.tiebreakers.game_win_percentage,
            self.tiebreakers.opponent_game_win_percentage,
        )
    }
}

/// Distinct real opponents of `id` over the finalized rounds.
#[must_use]
pub fn opponents(rounds: &[Round], id: PlayerId) -> BTreeSet<PlayerId> {
    rounds
        .iter()
        .filter(|round| round.finalized)
        .flat_map(|round| &round.pairings)
        .filter_map(|pairing| pairing.opponent_of(id))
        .collect()
}

#[must_use]
pub fn tiebreakers(players: &Registry, rounds: &[Round], id: PlayerId) -> TiebreakerData {
    let opponents: Vec<&Player> = opponents(rounds, id)
        .into_iter()
        .filter_map(|opponent| players.get(opponent))
        .collect();

    TiebreakerData {
        game_win_percentage: players.get(id).map_or(0.0, Player::game_win_percentage),
        opponent_match_win_percentage: floored_average(
            opponents.iter().map(|player| player.match_win_percentage()),
        ),
        opponent_game_win_percentage: floored_average(
            opponents.iter().map(|player| player.game_win_percentage()),
        ),
    }
}

/// Summed in ascending order, so the same values give the same average
/// whatever order the opponents come in.
fn floored_average(percentages: impl Iterator<Item = f64>) -> f64 {
    let mut floored = Vec::new();
    let mut count = 0_u32;

    for percentage in percentages {
        floored.push(percentage.max(PERCENTAGE_FLOOR));
        count += 1;
    }

    if count == 0 {
        return PERCENTAGE_FLOOR;
    }

    floored.sort_by(f64::total_cmp);
    let sum: f64 = floored.iter().sum();

    sum / f64::from(count)
}

fn compare(a: &PlayerStanding, b: &PlayerStanding) -> Ordering {
    b.points
        .cmp(&a.points)
        .then(
            b.tiebreakers
                .opponent_match_win_percentage
                .total_cmp(&a.tiebreakers.opponent_match_win_percentage),
        )
        .then(
            b.tiebreakers
                .game_win_percentage
                .total_cmp(&a.tiebreakers.game_win_percentage),
        )
        .then(
            b.tiebreakers
                .opponent_game_win_percentage
                .total_cmp(&a.tiebreakers.opponent_game_win_percentage),
        )
}

/// The active players, best first. Players level on points and every
/// tiebreaker share a rank, and the next player gets the next rank.
#[must_use]
pub fn standings(players: &Registry, rounds: &[Round]) -> Vec<PlayerStanding> {
    let mut standings: Vec<_> = players
        .iter()
        .filter(|(_, player)| player.is_active())
        .map(|(id, player)| PlayerStanding {
            rank: 0,
            id,
            name: player.name.clone(),
            points: player.points,
            wins: player.wins,
            losses: player.losses,
            draws: player.draws,
            tiebreakers: tiebreakers(players, rounds, id),
        })
        .collect();

    standings.sort_by(|a, b| compare(a, b).then(a.id.cmp(&b.id)));

    let mut rank = 0;
    let mut ranks = Vec::with_capacity(standings.len());
    for (i, standing) in standings.iter().enumerate() {
        if i == 0 || !standing.ranks_with(&standings[i - 1]) {
            rank += 1;
        }
        ranks.push(rank);
    }

    for (standing, rank) in standings.iter_mut().zip(ranks) {
        standing.rank = rank;
    }

    standings
}
