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

use std::{collections::BTreeMap, fmt, str::FromStr};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

/// A player identifier. Assigned from a counter that never goes backwards, so
/// an id is never reused, not even after the player is removed.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        let id = string
            .parse()
            .map_err(|error| anyhow::Error::msg(format!("invalid player id '{string}': {error}")))?;

        Ok(Self(id))
    }
}

/// Card name to quantity.
pub type CardCounts = BTreeMap<String, u32>;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Decklist {
    #[serde(default)]
    pub main: CardCounts,
    #[serde(default)]
    pub sideboard: CardCounts,
}

impl Decklist {
    #[must_use]
    pub fn card_count(&self) -> u32 {
        self.main.values().chain(self.sideboard.values()).sum()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub game_wins: u32,
    #[serde(default)]
    pub game_losses: u32,
    #[serde(default)]
    pub game_draws: u32,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub removed_in_round: Option<u32>,
    #[serde(default)]
    pub external_id: Option<i64>,
    #[serde(default)]
    pub decklist: Option<Decklist>,
}

impl Player {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Saturates at `u32::MAX`; see [`Self::checked_matches_played`].
    #[must_use]
    pub fn matches_played(&self) -> u32 {
        self.wins.saturating_add(self.losses).saturating_add(self.draws)
    }

    /// Saturates at `u32::MAX`; see [`Self::checked_games_played`].
    #[must_use]
    pub fn games_played(&self) -> u32 {
        self.game_wins
            .saturating_add(self.game_losses)
            .saturating_add(self.game_draws)
    }

    #[must_use]
    pub fn checked_matches_played(&self) -> Option<u32> {
        self.wins.checked_add(self.losses)?.checked_add(self.draws)
    }

    #[must_use]
    pub fn checked_games_played(&self) -> Option<u32> {
        self.game_wins
            .checked_add(self.game_losses)?
            .checked_add(self.game_draws)
    }

    /// Match wins over matches played, 0 before the first match.
    #[must_use]
    pub fn match_win_percentage(&self) -> f64 {
        ratio(self.wins, self.matches_played())
    }

    /// Game wins over games played, 0 before the first game.
    #[must_use]
    pub fn game_win_percentage(&self) -> f64 {
        ratio(self.game_wins, self.games_played())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.removed
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{}-{}",
            self.name, self.points, self.wins, self.losses, self.draws
        )?;

        if self.removed {
            write!(f, " removed")?;
        }

        Ok(())
    }
}

/// Every player that ever entered the tournament, keyed by id.
///
/// Removed players stay in the registry with their history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registry {
    last_id: u32,
    players: BTreeMap<PlayerId, Player>,
}

impl Registry {
    /// Rebuilds a registry from stored players.
    ///
    /// # Errors
    ///
    /// If an id repeats or is above `last_id`.
    pub fn from_players(
        last_id: u32,
        players: impl IntoIterator<Item = (PlayerId, Player)>,
    ) -> Result<Self, TournamentError> {
        let mut map = BTreeMap::new();

        for (id, player) in players {
            if id.0 == 0 || id.0 > last_id {
                return Err(TournamentError::InvalidSnapshot(format!(
                    "player id {id} is outside 1..={last_id}"
                )));
            }

            if map.insert(id, player).is_some() {
                return Err(TournamentError::InvalidSnapshot(format!(
                    "player id {id} is repeated"
                )));
            }
        }

        Ok(Self {
            last_id,
            players: map,
        })
    }

    /// Adds a player under the next id. `late_entry` is the round the player
    /// joined in if the tournament has already started.
    ///
    /// # Errors
    ///
    /// If the name is blank or an active player already has it.
    pub fn add(
        &mut self,
        name: &str,
        late_entry: Option<u32>,
    ) -> Result<PlayerId, TournamentError> {
        if name.trim().is_empty() {
            return Err(TournamentError::InvalidInput("empty name".to_string()));
        }

        if self.active_id_by_name(name).is_some() {
            return Err(TournamentError::InvalidInput(format!(
                "{name} is already an active player"
            )));
        }

        self.last_id += 1;
        let id = PlayerId(self.last_id);
        let mut player = Player::new(name);

        if let Some(round) = late_entry {
            player.notes.push(format!("late entry in round {round}"));
            info!("{id} {name} late entry in round {round}");
        } else {
            info!("{id} {name} added");
        }

        self.players.insert(id, player);
        Ok(id)
    }

    /// Marks a player removed in `round`. The record is kept.
    ///
    /// # Errors
    ///
    /// If there is no such player or they were already removed.
    pub fn remove(&mut self, id: PlayerId, round: u32) -> Result<(), TournamentError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))?;

        if player.removed {
            return Err(TournamentError::AlreadyRemoved(id));
        }

        player.removed = true;
        player.removed_in_round = Some(round);
        player.notes.push(format!("removed in round {round}"));
        info!("{id} {} removed in round {round}", player.name);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn get_or_not_found(&self, id: PlayerId) -> Result<&Player, TournamentError> {
        self.get(id)
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn get_mut_or_not_found(&mut self, id: PlayerId) -> Result<&mut Player, TournamentError> {
        self.get_mut(id)
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))
    }

    /// Exact, case sensitive lookup. An active player wins over removed
    /// players with the same name, then the most recently added removed one.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<(PlayerId, &Player)> {
        self.active_id_by_name(name)
            .or_else(|| {
                self.players
                    .iter()
                    .rev()
                    .find(|(_, player)| player.name == name)
                    .map(|(id, _)| *id)
            })
            .and_then(|id| self.get(id).map(|player| (id, player)))
    }

    #[must_use]
    pub fn active_id_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|(_, player)| player.is_active() && player.name == name)
            .map(|(id, _)| *id)
    }

    /// Active player ids in ascending order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, player)| player.is_active())
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.players.values().filter(|player| player.is_active()).count()
    }

    /// All players, removed ones included, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &Player)> {
        self.players.iter().map(|(id, player)| (*id, player))
    }

    #[must_use]
    pub fn last_id(&self) -> u32 {
        self.last_id
    }

    /// The number of players ever added, removed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
