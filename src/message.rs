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

use std::{borrow::Cow, fmt::Write as _, str::FromStr};

use crate::{error::TournamentError, player::PlayerId, tournament::Tournament};

pub const COMMANDS: [&str; 23] = [
    "add_player",
    "advance_round",
    "clear_external_id",
    "count",
    "external_id",
    "finish",
    "known_command",
    "list_commands",
    "name",
    "pair",
    "pairings",
    "player",
    "player_name",
    "remove_player",
    "remove_player_name",
    "repair",
    "result",
    "round",
    "set_external_id",
    "standings",
    "start",
    "status",
    "update_standings",
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    AddPlayer(String),
    AdvanceRound,
    ClearExternalId(PlayerId),
    Count,
    Empty,
    ExternalId(PlayerId),
    Finish,
    KnownCommand(String),
    ListCommands,
    Name,
    Pair,
    Pairings,
    Player(PlayerId),
    PlayerName(String),
    RemovePlayer(PlayerId),
    RemovePlayerName(String),
    Repair,
    Result {
        id: PlayerId,
        wins: u32,
        losses: u32,
        draws: u32,
    },
    Round,
    SetExternalId(PlayerId, i64),
    Standings,
    Start,
    Status,
    UpdateStandings,
}

fn argument<'a>(args: &[&'a str], index: usize, usage: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| anyhow::Error::msg(format!("expected: {usage}")))
}

fn number<T: FromStr>(args: &[&str], index: usize, usage: &str) -> anyhow::Result<T> {
    argument(args, index, usage)?
        .parse()
        .map_err(|_| anyhow::Error::msg(format!("expected: {usage}")))
}

fn rest(args: &[&str], usage: &str) -> anyhow::Result<String> {
    if args.len() < 2 {
        return Err(anyhow::Error::msg(format!("expected: {usage}")));
    }

    Ok(args[1..].join(" "))
}

impl FromStr for Message {
    type Err = anyhow::Error;

    fn from_str(message: &str) -> anyhow::Result<Self> {
        let args: Vec<&str> = message.split_ascii_whitespace().collect();

        let Some(command) = args.first() else {
            return Ok(Self::Empty);
        };

        match *command {
            "add_player" => Ok(Self::AddPlayer(rest(&args, "add_player NAME")?)),
            "advance_round" => Ok(Self::AdvanceRound),
            "clear_external_id" => Ok(Self::ClearExternalId(number(
                &args,
                1,
                "clear_external_id ID",
            )?)),
            "count" => Ok(Self::Count),
            "external_id" => Ok(Self::ExternalId(number(&args, 1, "external_id ID")?)),
            "finish" => Ok(Self::Finish),
            "known_command" => Ok(Self::KnownCommand(
                argument(&args, 1, "known_command COMMAND")?.to_string(),
            )),
            "list_commands" => Ok(Self::ListCommands),
            "name" => Ok(Self::Name),
            "pair" => Ok(Self::Pair),
            "pairings" => Ok(Self::Pairings),
            "player" => Ok(Self::Player(number(&args, 1, "player ID")?)),
            "player_name" => Ok(Self::PlayerName(rest(&args, "player_name NAME")?)),
            "remove_player" => Ok(Self::RemovePlayer(number(&args, 1, "remove_player ID")?)),
            "remove_player_name" => Ok(Self::RemovePlayerName(rest(
                &args,
                "remove_player_name NAME",
            )?)),
            "repair" => Ok(Self::Repair),
            "result" => {
                let usage = "result ID WINS LOSSES DRAWS";
                Ok(Self::Result {
                    id: number(&args, 1, usage)?,
                    wins: number(&args, 2, usage)?,
                    losses: number(&args, 3, usage)?,
                    draws: number(&args, 4, usage)?,
                })
            }
            "round" => Ok(Self::Round),
            "set_external_id" => {
                let usage = "set_external_id ID EXTERNAL_ID";
                Ok(Self::SetExternalId(
                    number(&args, 1, usage)?,
                    number(&args, 2, usage)?,
                ))
            }
            "standings" => Ok(Self::Standings),
            "start" => Ok(Self::Start),
            "status" => Ok(Self::Status),
            "update_standings" => Ok(Self::UpdateStandings),
            text => Err(anyhow::Error::msg(format!("unrecognized command: {text}"))),
        }
    }
}

impl Tournament {
    /// Reads one protocol line. `#` starts a comment.
    ///
    /// # Errors
    ///
    /// If the line isn't a command or the command is rejected.
    pub fn read_line(&mut self, buffer: &str) -> anyhow::Result<Option<String>> {
        let mut buffer = Cow::from(buffer);
        if let Some(comment_offset) = buffer.find('#') {
            buffer.to_mut().replace_range(comment_offset.., "");
        }

        self.update(Message::from_str(buffer.as_ref())?)
    }

    /// # Errors
    ///
    /// If the command is rejected.
    pub fn update(&mut self, message: Message) -> anyhow::Result<Option<String>> {
        match message {
            Message::AddPlayer(name) => Ok(Some(self.add_player(&name)?.to_string())),
            Message::AdvanceRound => {
                self.advance_round()?;
                Ok(Some(self.current_round().to_string()))
            }
            Message::ClearExternalId(id) => {
                self.set_external_id(id, None)?;
                Ok(Some(String::new()))
            }
            Message::Count => Ok(Some(self.player_count().to_string())),
            Message::Empty => Ok(None),
            Message::ExternalId(id) => Ok(Some(
                self.external_id(id)?
                    .map_or_else(|| "none".to_string(), |external_id| external_id.to_string()),
            )),
            Message::Finish => {
                self.finish()?;
                Ok(Some(String::new()))
            }
            Message::KnownCommand(command) => {
                Ok(Some(COMMANDS.contains(&command.as_str()).to_string()))
            }
            Message::ListCommands => {
                let mut commands = "\n".to_string();
                commands.push_str(&COMMANDS.join("\n"));
                Ok(Some(commands))
            }
            Message::Name => Ok(Some(env!("CARGO_PKG_NAME").to_string())),
            Message::Pair => {
                self.pair(false)?;
                Ok(Some(self.pairings_text()))
            }
            Message::Pairings => Ok(Some(self.pairings_text())),
            Message::Player(id) => {
                let player = self.players().get_or_not_found(id)?;
                Ok(Some(format!("{id} {player}")))
            }
            Message::PlayerName(name) => {
                let (id, player) = self
                    .player_by_name(&name)
                    .ok_or_else(|| TournamentError::NotFound(name.clone()))?;
                Ok(Some(format!("{id} {player}")))
            }
            Message::RemovePlayer(id) => {
                self.remove_player(id)?;
                Ok(Some(String::new()))
            }
            Message::RemovePlayerName(name) => {
                Ok(Some(self.remove_player_by_name(&name)?.to_string()))
            }
            Message::Repair => {
                self.pair(true)?;
                Ok(Some(self.pairings_text()))
            }
            Message::Result {
                id,
                wins,
                losses,
                draws,
            } => {
                self.add_result(id, wins, losses, draws)?;
                Ok(Some(String::new()))
            }
            Message::Round => Ok(Some(self.current_round().to_string())),
            Message::SetExternalId(id, external_id) => {
                self.set_external_id(id, Some(external_id))?;
                Ok(Some(String::new()))
            }
            Message::Standings => {
                let mut standings = String::new();
                for standing in self.standings() {
                    write!(standings, "\n{standing}")?;
                }
                Ok(Some(standings))
            }
            Message::Start => {
                self.start()?;
                Ok(Some(self.pairings_text()))
            }
            Message::Status => Ok(Some(self.status().to_string())),
            Message::UpdateStandings => {
                self.update_standings()?;
                Ok(Some(String::new()))
            }
        }
    }

    fn pairings_text(&self) -> String {
        let mut pairings = String::new();
        for pairing in self.current_pairings() {
            pairings.push('\n');
            pairings.push_str(&pairing.to_string());
        }
        pairings
    }
}
