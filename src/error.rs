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

use thiserror::Error;

use crate::player::PlayerId;

/// Every way a tournament operation can be rejected.
///
/// A rejected operation never changes the tournament.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TournamentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("player not found: {0}")]
    NotFound(String),
    #[error("player {0} has already been removed")]
    AlreadyRemoved(PlayerId),
    #[error("cannot pair a tournament with no players")]
    NoPlayers,
    #[error("invalid tournament state: {0}")]
    InvalidState(String),
    #[error("round {0} already has pairings, re-pair to replace them")]
    AlreadyPaired(u32),
    #[error("round {0} is not initialized, advance the round first")]
    RoundNotInitialized(u32),
    #[error("round {0} has no pairings, pair the round first")]
    NoPairings(u32),
    #[error("round {round} is incomplete: the match of player {player} has no result")]
    IncompleteRound { round: u32, player: PlayerId },
    #[error("round {0} is already finalized")]
    RoundFinalized(u32),
    #[error("player {0} has a bye, byes have fixed results")]
    ByeResult(PlayerId),
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl TournamentError {
    pub(crate) fn invalid_state(reason: &str) -> Self {
        Self::InvalidState(reason.to_string())
    }
}
