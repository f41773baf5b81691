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

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::TournamentConfig,
    error::TournamentError,
    pairing::{Pairing, Round},
    player::{Decklist, Player, PlayerId, Registry},
    standings::{fold_round, record_result},
    status::Status,
    swiss::PairingEngine,
    tiebreak::{self, PlayerStanding},
};

/// A Swiss tournament: its players, its rounds, and where it is in them.
///
/// Rounds are numbered from 1; `rounds()[0]` is always empty.
#[derive(Clone, Debug)]
pub struct Tournament {
    config: TournamentConfig,
    players: Registry,
    rounds: Vec<Round>,
    current_round: u32,
    status: Status,
    rng: StdRng,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new(TournamentConfig::default())
    }
}

impl Tournament {
    /// A tournament whose shuffles are seeded from the operating system.
    #[must_use]
    pub fn new(config: TournamentConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    #[must_use]
    pub fn with_seed(config: TournamentConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(config: TournamentConfig, rng: StdRng) -> Self {
        Self {
            config,
            players: Registry::default(),
            rounds: vec![Round::default(), Round::default()],
            current_round: 1,
            status: Status::Setup,
            rng,
        }
    }

    pub(crate) fn from_parts(
        config: TournamentConfig,
        players: Registry,
        rounds: Vec<Round>,
        current_round: u32,
        status: Status,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            players,
            rounds,
            current_round,
            status,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub fn players(&self) -> &Registry {
        &self.players
    }

    /// Every round so far, index 0 included.
    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.get(number as usize)
    }

    /// The current round's pairings, empty before the round is paired.
    #[must_use]
    pub fn current_pairings(&self) -> &[Pairing] {
        self.round(self.current_round)
            .map(|round| round.pairings.as_slice())
            .unwrap_or(&[])
    }

    // Players

    /// Adds a player. Players added after the start are noted as late
    /// entries and are paired from the next pairing on: a current round that
    /// is already paired leaves them out until it is re-paired with
    /// `pair(true)`.
    ///
    /// # Errors
    ///
    /// If the name is blank or already taken by an active player.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        let late_entry = self.status.started().then_some(self.current_round);
        self.players.add(name, late_entry)
    }

    /// Removes a player from future pairings, keeping their history.
    ///
    /// In an open current round a bye held by the player is deleted and a
    /// real opponent is given the bye instead.
    ///
    /// # Errors
    ///
    /// If there is no such player or they were already removed.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        self.players.remove(id, self.current_round)?;
        self.release_from_current_round(id);
        Ok(())
    }

    /// # Errors
    ///
    /// If no active player has exactly this name.
    pub fn remove_player_by_name(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        let id = self
            .players
            .active_id_by_name(name)
            .ok_or_else(|| TournamentError::NotFound(name.to_string()))?;

        self.remove_player(id)?;
        Ok(id)
    }

    fn release_from_current_round(&mut self, id: PlayerId) {
        let bye = self.config.bye;
        let Some(round) = self.rounds.get_mut(self.current_round as usize) else {
            return;
        };

        if round.finalized {
            return;
        }

        let Some((index, _)) = round.position(id) else {
            return;
        };

        match round.pairings[index].opponent_of(id) {
            Some(opponent) => {
                debug!("round {}: {opponent} gets a bye", self.current_round);
                round.pairings[index] = Pairing::bye(opponent, bye);
            }
            None => {
                debug!("round {}: deleting the bye of {id}", self.current_round);
                round.pairings.remove(index);
            }
        }
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    #[must_use]
    pub fn player_by_name(&self, name: &str) -> Option<(PlayerId, &Player)> {
        self.players.find_by_name(name)
    }

    /// Every player ever added, removed ones included.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn external_id(&self, id: PlayerId) -> Result<Option<i64>, TournamentError> {
        Ok(self.players.get_or_not_found(id)?.external_id)
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn set_external_id(
        &mut self,
        id: PlayerId,
        external_id: Option<i64>,
    ) -> Result<(), TournamentError> {
        self.players.get_mut_or_not_found(id)?.external_id = external_id;
        Ok(())
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn decklist(&self, id: PlayerId) -> Result<Option<&Decklist>, TournamentError> {
        Ok(self.players.get_or_not_found(id)?.decklist.as_ref())
    }

    /// # Errors
    ///
    /// If there is no such player.
    pub fn set_decklist(
        &mut self,
        id: PlayerId,
        decklist: Option<Decklist>,
    ) -> Result<(), TournamentError> {
        self.players.get_mut_or_not_found(id)?.decklist = decklist;
        Ok(())
    }

    // Lifecycle

    /// Pairs round one, unless it was already paired, and moves to
    /// `InProgress`.
    ///
    /// # Errors
    ///
    /// If the tournament already started or has no active players.
    pub fn start(&mut self) -> Result<(), TournamentError> {
        if self.status != Status::Setup {
            return Err(TournamentError::invalid_state(
                "the tournament has already started",
            ));
        }

        if self.players.active_len() == 0 {
            return Err(TournamentError::NoPlayers);
        }

        if !self.round(self.current_round).is_some_and(Round::is_paired) {
            self.pair(false)?;
        }

        self.status = Status::InProgress;
        info!(
            "tournament started with {} players",
            self.players.active_len()
        );

        Ok(())
    }

    /// # Errors
    ///
    /// If the tournament isn't in progress.
    pub fn finish(&mut self) -> Result<(), TournamentError> {
        if self.status != Status::InProgress {
            return Err(TournamentError::invalid_state(
                "only a tournament in progress can finish",
            ));
        }

        self.status = Status::Finished;
        info!("tournament finished in round {}", self.current_round);

        Ok(())
    }

    // Rounds

    /// Pairs the current round. An existing pairing is only replaced when
    /// `allow_repair` is set.
    ///
    /// # Errors
    ///
    /// If there are no active players, the round can't be paired, or it is
    /// already paired and `allow_repair` is not set.
    pub fn pair(&mut self, allow_repair: bool) -> Result<(), TournamentError> {
        let number = self.current_round;

        if self.players.active_len() == 0 {
            return Err(TournamentError::NoPlayers);
        }

        if number < 1 {
            return Err(TournamentError::invalid_state(
                "the current round must be at least 1",
            ));
        }

        self.check_not_finished()?;

        let index = number as usize;
        let round = self
            .rounds
            .get(index)
            .ok_or(TournamentError::RoundNotInitialized(number))?;

        if round.finalized {
            return Err(TournamentError::RoundFinalized(number));
        }

        if round.is_paired() && !allow_repair {
            return Err(TournamentError::AlreadyPaired(number));
        }

        let (previous, current) = self.rounds.split_at_mut(index);
        let pairings =
            PairingEngine::new(&self.players, previous, self.config.bye, &mut self.rng)
                .pair(number)?;

        if let Some(round) = current.first_mut() {
            debug!("round {number}: {} pairings", pairings.len());
            round.pairings = pairings;
        }

        Ok(())
    }

    /// Records a result given from the point of view of `id`.
    ///
    /// # Errors
    ///
    /// If the round isn't paired or is finalized, or `id` isn't in a real
    /// match this round.
    pub fn add_result(
        &mut self,
        id: PlayerId,
        wins: u32,
        losses: u32,
        draws: u32,
    ) -> Result<(), TournamentError> {
        self.check_not_finished()?;
        let number = self.current_round;
        let round = self.open_round_mut()?;
        record_result(round, id, wins, losses, draws)?;
        debug!("round {number}: {id} reported {wins}-{losses}-{draws}");

        Ok(())
    }

    /// Folds the current round's results into the players' totals and
    /// finalizes the round. Nothing changes unless every match has a result.
    ///
    /// # Errors
    ///
    /// If the round isn't paired, is already finalized, or is incomplete.
    pub fn update_standings(&mut self) -> Result<(), TournamentError> {
        self.check_not_finished()?;
        let number = self.current_round;
        self.open_round_mut()?;

        let round = self
            .rounds
            .get(number as usize)
            .ok_or(TournamentError::RoundNotInitialized(number))?;
        fold_round(number, round, &mut self.players, &self.config)?;

        if let Some(round) = self.rounds.get_mut(number as usize) {
            round.finalized = true;
        }
        info!("round {number} standings updated");

        Ok(())
    }

    /// Finalizes the current round if needed and moves to the next one.
    ///
    /// # Errors
    ///
    /// If the current round can't be finalized. The round doesn't advance.
    pub fn advance_round(&mut self) -> Result<(), TournamentError> {
        self.check_not_finished()?;
        let number = self.current_round;
        let finalized = self
            .round(number)
            .ok_or(TournamentError::RoundNotInitialized(number))?
            .finalized;

        if !finalized {
            self.update_standings()?;
        }

        self.current_round += 1;
        while self.rounds.len() <= self.current_round as usize {
            self.rounds.push(Round::default());
        }
        info!("advanced to round {}", self.current_round);

        Ok(())
    }

    /// The ranked standings of the active players.
    #[must_use]
    pub fn standings(&self) -> Vec<PlayerStanding> {
        tiebreak::standings(&self.players, &self.rounds)
    }

    fn check_not_finished(&self) -> Result<(), TournamentError> {
        if self.status.finished() {
            Err(TournamentError::invalid_state("the tournament is finished"))
        } else {
            Ok(())
        }
    }

    /// The current round, if it is paired and not yet finalized.
    fn open_round_mut(&mut self) -> Result<&mut Round, TournamentError> {
        let number = self.current_round;
        let round = self
            .rounds
            .get_mut(number as usize)
            .ok_or(TournamentError::RoundNotInitialized(number))?;

        if !round.is_paired() {
            return Err(TournamentError::NoPairings(number));
        }

        if round.finalized {
            return Err(TournamentError::RoundFinalized(number));
        }

        Ok(round)
    }
}
