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

//! The complete state of a tournament, for saving and resuming.
//!
//! Only the random number generator is left out: a restored tournament is
//! reseeded.

use log::debug;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    config::TournamentConfig,
    error::TournamentError,
    pairing::{Opponent, Round},
    player::{Player, PlayerId, Registry},
    status::Status,
    tournament::Tournament,
};

pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub player: Player,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: String,
    #[serde(default)]
    pub config: TournamentConfig,
    pub last_id: u32,
    pub current_round: u32,
    pub started: bool,
    pub finished: bool,
    /// Every player, removed ones included, in ascending id order.
    pub players: Vec<PlayerRecord>,
    /// Every round in order, index 0 included.
    pub rounds: Vec<Round>,
}

impl From<&Tournament> for Snapshot {
    fn from(tournament: &Tournament) -> Self {
        let status = tournament.status();

        Self {
            version: SNAPSHOT_VERSION.to_string(),
            config: *tournament.config(),
            last_id: tournament.players().last_id(),
            current_round: tournament.current_round(),
            started: status.started(),
            finished: status.finished(),
            players: tournament
                .players()
                .iter()
                .map(|(id, player)| PlayerRecord {
                    id,
                    player: player.clone(),
                })
                .collect(),
            rounds: tournament.rounds().to_vec(),
        }
    }
}

impl Snapshot {
    /// # Errors
    ///
    /// If serialization fails.
    pub fn to_ron(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// # Errors
    ///
    /// If the string isn't a snapshot.
    pub fn from_ron(string: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(string)?)
    }

    fn check_version(&self) -> Result<(), TournamentError> {
        let major = SNAPSHOT_VERSION.split('.').next();

        if self.version.split('.').next() == major {
            Ok(())
        } else {
            Err(TournamentError::UnsupportedVersion(self.version.clone()))
        }
    }

    fn check_rounds(&self) -> Result<(), TournamentError> {
        if self.current_round < 1 {
            return Err(TournamentError::InvalidSnapshot(
                "the current round must be at least 1".to_string(),
            ));
        }

        if self.rounds.len() <= self.current_round as usize {
            return Err(TournamentError::InvalidSnapshot(format!(
                "round {} is missing",
                self.current_round
            )));
        }

        if self.rounds.first().is_some_and(Round::is_paired) {
            return Err(TournamentError::InvalidSnapshot(
                "round 0 has pairings".to_string(),
            ));
        }

        let known = |id: PlayerId| self.players.iter().any(|record| record.id == id);

        for (number, round) in self.rounds.iter().enumerate() {
            for pairing in &round.pairings {
                let unknown = if known(pairing.player_a) {
                    match pairing.player_b {
                        Opponent::Player(b) if !known(b) => Some(b),
                        _ => None,
                    }
                } else {
                    Some(pairing.player_a)
                };

                if let Some(id) = unknown {
                    return Err(TournamentError::InvalidSnapshot(format!(
                        "round {number} pairs the unknown player {id}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Restores the tournament, reseeding its random number generator.
    ///
    /// # Errors
    ///
    /// If the version is unsupported or the state is inconsistent.
    pub fn restore(self, seed: Option<u64>) -> Result<Tournament, TournamentError> {
        self.check_version()?;
        self.check_rounds()?;

        let players = Registry::from_players(
            self.last_id,
            self.players
                .into_iter()
                .map(|record| (record.id, record.player)),
        )?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        debug!(
            "restored {} players and {} rounds",
            players.len(),
            self.rounds.len() - 1
        );

        Ok(Tournament::from_parts(
            self.config,
            players,
            self.rounds,
            self.current_round,
            Status::from_flags(self.started, self.finished),
            rng,
        ))
    }
}

impl Tournament {
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }

    /// # Errors
    ///
    /// If the version is unsupported or the state is inconsistent.
    pub fn from_snapshot(snapshot: Snapshot, seed: Option<u64>) -> Result<Self, TournamentError> {
        snapshot.restore(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Decklist;

    fn played() -> anyhow::Result<Tournament> {
        let mut tournament = Tournament::with_seed(TournamentConfig::default(), 11);
        for name in ["Alice", "Bob", "Carol", "Dave", "Erin"] {
            tournament.add_player(name)?;
        }
        tournament.set_external_id(PlayerId(2), Some(77))?;
        let mut decklist = Decklist::default();
        decklist.main.insert("Mountain".to_string(), 24);
        decklist.sideboard.insert("Pyroblast".to_string(), 2);
        tournament.set_decklist(PlayerId(3), Some(decklist))?;

        tournament.start()?;
        for pairing in tournament.current_pairings().to_vec() {
            if !pairing.is_bye() {
                tournament.add_result(pairing.player_a, 2, 1, 0)?;
            }
        }
        tournament.advance_round()?;
        tournament.remove_player(PlayerId(5))?;
        tournament.pair(false)?;

        Ok(tournament)
    }

    #[test]
    fn ron_round_trip() -> anyhow::Result<()> {
        let tournament = played()?;
        let snapshot = tournament.snapshot();
        let string = snapshot.to_ron()?;
        let restored = Snapshot::from_ron(&string)?;
        assert_eq!(restored, snapshot);

        let restored = Tournament::from_snapshot(restored, Some(1))?;
        assert_eq!(restored.standings(), tournament.standings());
        assert_eq!(restored.current_pairings(), tournament.current_pairings());
        assert_eq!(restored.status(), Status::InProgress);
        assert_eq!(restored.players(), tournament.players());

        Ok(())
    }

    #[test]
    fn players_are_sorted_by_id() -> anyhow::Result<()> {
        let snapshot = played()?.snapshot();
        let ids: Vec<_> = snapshot.players.iter().map(|record| record.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(snapshot.last_id, 5);
        assert!(snapshot.players[4].player.removed);

        Ok(())
    }

    #[test]
    fn newer_major_versions_are_rejected() -> anyhow::Result<()> {
        let mut snapshot = played()?.snapshot();
        snapshot.version = "2.0.0".to_string();
        assert_eq!(
            Tournament::from_snapshot(snapshot, None).map(|_| ()),
            Err(TournamentError::UnsupportedVersion("2.0.0".to_string()))
        );

        Ok(())
    }

    #[test]
    fn unknown_players_are_rejected() -> anyhow::Result<()> {
        let mut snapshot = played()?.snapshot();
        snapshot.players.pop();
        assert!(matches!(
            Tournament::from_snapshot(snapshot, None),
            Err(TournamentError::InvalidSnapshot(_))
        ));

        Ok(())
    }

    #[test]
    fn missing_current_round_is_rejected() -> anyhow::Result<()> {
        let mut snapshot = played()?.snapshot();
        snapshot.rounds.truncate(2);
        assert!(matches!(
            Tournament::from_snapshot(snapshot, None),
            Err(TournamentError::InvalidSnapshot(_))
        ));

        Ok(())
    }
}
