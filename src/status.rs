// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Status {
    #[default]
    Setup,
    InProgress,
    Finished,
}

impl Status {
    #[must_use]
    pub fn started(self) -> bool {
        self != Self::Setup
    }

    #[must_use]
    pub fn finished(self) -> bool {
        self == Self::Finished
    }

    /// The status stored as a pair of `started` and `finished` flags.
    #[must_use]
    pub fn from_flags(started: bool, finished: bool) -> Self {
        if finished {
            Self::Finished
        } else if started {
            Self::InProgress
        } else {
            Self::Setup
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "setup" => Ok(Self::Setup),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            _ => Err(anyhow::Error::msg(format!("invalid status: {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert_eq!(Status::from_flags(false, false), Status::Setup);
        assert_eq!(Status::from_flags(true, false), Status::InProgress);
        assert_eq!(Status::from_flags(true, true), Status::Finished);

        for status in [Status::Setup, Status::InProgress, Status::Finished] {
            assert_eq!(Status::from_flags(status.started(), status.finished()), status);
        }
    }

    #[test]
    fn display_from_str() -> anyhow::Result<()> {
        for status in [Status::Setup, Status::InProgress, Status::Finished] {
            assert_eq!(Status::from_str(&status.to_string())?, status);
        }
        assert!(Status::from_str("ongoing").is_err());

        Ok(())
    }
}
