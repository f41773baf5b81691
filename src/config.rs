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

use crate::pairing::Score;

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;
pub const POINTS_FOR_LOSS: u32 = 0;

/// The games recorded for a player who receives a bye.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ByeResult {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Default for ByeResult {
    fn default() -> Self {
        Self {
            wins: 2,
            losses: 0,
            draws: 0,
        }
    }
}

impl From<ByeResult> for Score {
    fn from(bye: ByeResult) -> Self {
        Score {
            wins_a: bye.wins,
            wins_b: bye.losses,
            draws: bye.draws,
        }
    }
}

/// Scoring rules, fixed when the tournament is created.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TournamentConfig {
    #[serde(default = "default_win")]
    pub points_for_win: u32,
    #[serde(default = "default_draw")]
    pub points_for_draw: u32,
    #[serde(default)]
    pub points_for_loss: u32,
    #[serde(default)]
    pub bye: ByeResult,
}

fn default_win() -> u32 {
    POINTS_FOR_WIN
}

fn default_draw() -> u32 {
    POINTS_FOR_DRAW
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            points_for_win: POINTS_FOR_WIN,
            points_for_draw: POINTS_FOR_DRAW,
            points_for_loss: POINTS_FOR_LOSS,
            bye: ByeResult::default(),
        }
    }
}

impl fmt::Display for TournamentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "win={} draw={} loss={} bye={}-{}-{}",
            self.points_for_win,
            self.points_for_draw,
            self.points_for_loss,
            self.bye.wins,
            self.bye.losses,
            self.bye.draws
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scoring() {
        let config = TournamentConfig::default();
        assert_eq!(config.points_for_win, 3);
        assert_eq!(config.points_for_draw, 1);
        assert_eq!(config.points_for_loss, 0);
        assert_eq!(config.bye, ByeResult { wins: 2, losses: 0, draws: 0 });
        assert_eq!(config.to_string(), "win=3 draw=1 loss=0 bye=2-0-0");
    }

    #[test]
    fn missing_fields_use_defaults() -> anyhow::Result<()> {
        let config: TournamentConfig = ron::from_str("(points_for_win: 2)")?;
        assert_eq!(config.points_for_win, 2);
        assert_eq!(config.points_for_draw, 1);
        assert_eq!(config.bye, ByeResult::default());

        Ok(())
    }
}
