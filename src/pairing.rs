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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{config::ByeResult, player::PlayerId};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Opponent {
    Player(PlayerId),
    Bye,
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Bye => write!(f, "bye"),
        }
    }
}

/// Games won by each side of a pairing and games drawn.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Score {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl Score {
    /// The same score seen from player B.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            wins_a: self.wins_b,
            wins_b: self.wins_a,
            draws: self.draws,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins_a, self.wins_b, self.draws)
    }
}

/// Which side of a pairing a player sits on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    A,
    B,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pairing {
    pub player_a: PlayerId,
    pub player_b: Opponent,
    /// `None` until a result is recorded. Byes are created with their result.
    pub result: Option<Score>,
}

impl Pairing {
    #[must_use]
    pub fn new(player_a: PlayerId, player_b: PlayerId) -> Self {
        Self {
            player_a,
            player_b: Opponent::Player(player_b),
            result: None,
        }
    }

    #[must_use]
    pub fn bye(player: PlayerId, bye: ByeResult) -> Self {
        Self {
            player_a: player,
            player_b: Opponent::Bye,
            result: Some(bye.into()),
        }
    }

    #[must_use]
    pub fn is_bye(&self) -> bool {
        self.player_b == Opponent::Bye
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn side_of(&self, id: PlayerId) -> Option<Side> {
        if self.player_a == id {
            Some(Side::A)
        } else if self.player_b == Opponent::Player(id) {
            Some(Side::B)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.side_of(id).is_some()
    }

    /// Whether this pairing is a match between `a` and `b`, in either order.
    #[must_use]
    pub fn between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.player_a == a && self.player_b == Opponent::Player(b))
            || (self.player_a == b && self.player_b == Opponent::Player(a))
    }

    /// The real opponent of `id`, if `id` is in this pairing and it isn't a bye.
    #[must_use]
    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        match (self.side_of(id)?, self.player_b) {
            (Side::A, Opponent::Player(b)) => Some(b),
            (Side::B, _) => Some(self.player_a),
            (Side::A, Opponent::Bye) => None,
        }
    }

    #[must_use]
    pub fn players(&self) -> Vec<PlayerId> {
        match self.player_b {
            Opponent::Player(b) => vec![self.player_a, b],
            Opponent::Bye => vec![self.player_a],
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.player_a, self.player_b)?;

        match self.result {
            Some(score) => write!(f, " {score}"),
            None => write!(f, " _"),
        }
    }
}

/// The pairings of one round.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Round {
    pub pairings: Vec<Pairing>,
    /// Set once the results have been folded into the standings.
    #[serde(default)]
    pub finalized: bool,
}

impl Round {
    #[must_use]
    pub fn is_paired(&self) -> bool {
        !self.pairings.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: PlayerId) -> Option<(usize, Side)> {
        self.pairings
            .iter()
            .enumerate()
            .find_map(|(index, pairing)| pairing.side_of(id).map(|side| (index, side)))
    }

    #[must_use]
    pub fn has_played(&self, a: PlayerId, b: PlayerId) -> bool {
        self.pairings.iter().any(|pairing| pairing.between(a, b))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// The first pairing still waiting for a result.
    #[must_use]
    pub fn first_incomplete(&self) -> Option<&Pairing> {
        self.pairings.iter().find(|pairing| !pairing.is_complete())
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairings: Vec<_> = self.pairings.iter().map(ToString::to_string).collect();
        write!(f, "{}", pairings.join(", "))
    }
}
