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

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser};
use log::{debug, info};
use swiss_tournament::{
    COPYRIGHT, LONG_VERSION,
    config::{ByeResult, POINTS_FOR_DRAW, POINTS_FOR_LOSS, POINTS_FOR_WIN, TournamentConfig},
    snapshot::Snapshot,
    tournament::Tournament,
    utils,
};

/// Swiss Tournament
///
/// This runs a tournament using the Swiss Text Protocol, one command per line
/// on stdin. Enter 'list_commands' for a list of commands.
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Swiss Tournament")]
struct Args {
    /// Seed the pairing shuffles for a repeatable tournament
    #[arg(long)]
    seed: Option<u64>,

    /// Resume the tournament saved in this file
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Save the tournament to this file after every command
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Points for a match win
    #[arg(default_value_t = POINTS_FOR_WIN, long)]
    win: u32,

    /// Points for a match draw
    #[arg(default_value_t = POINTS_FOR_DRAW, long)]
    draw: u32,

    /// Points for a match loss
    #[arg(default_value_t = POINTS_FOR_LOSS, long)]
    loss: u32,

    /// Log on the debug level
    #[arg(long)]
    debug: bool,

    /// Whether the application is being run by systemd
    #[arg(long)]
    systemd: bool,

    /// Build the manpage
    #[arg(long)]
    man: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.man {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Args::command()
            .name("swiss-text-protocol")
            .long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-10-15");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        fs::write("swiss-text-protocol.1", buffer)?;
        return Ok(());
    }

    utils::init_logger(args.systemd, args.debug);

    let mut tournament = if let Some(path) = &args.load {
        load(path, args.seed)?
    } else {
        let config = TournamentConfig {
            points_for_win: args.win,
            points_for_draw: args.draw,
            points_for_loss: args.loss,
            bye: ByeResult::default(),
        };
        info!("new tournament: {config}");

        match args.seed {
            Some(seed) => Tournament::with_seed(config, seed),
            None => Tournament::new(config),
        }
    };

    play(&mut tournament, args.save.as_deref())
}

fn load(path: &Path, seed: Option<u64>) -> anyhow::Result<Tournament> {
    let string = fs::read_to_string(path)?;
    let tournament = Tournament::from_snapshot(Snapshot::from_ron(&string)?, seed)?;
    info!(
        "loaded {}: round {}, {}",
        path.display(),
        tournament.current_round(),
        tournament.status()
    );

    Ok(tournament)
}

fn save(tournament: &Tournament, path: &Path) -> anyhow::Result<()> {
    fs::write(path, tournament.snapshot().to_ron()?)?;
    debug!("saved {}", path.display());

    Ok(())
}

fn play(tournament: &mut Tournament, save_path: Option<&Path>) -> anyhow::Result<()> {
    let mut buffer = String::new();
    let stdin = io::stdin();

    loop {
        match stdin.read_line(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(_) => {}
            Err(error) => {
                println!("? {error}\n");
                return Ok(());
            }
        }

        match tournament.read_line(&buffer) {
            Err(error) => println!("? {error}\n"),
            Ok(message) => {
                if let Some(message) = message {
                    println!("= {message}");

                    if let Some(path) = save_path {
                        save(tournament, path)?;
                    }
                }
            }
        }

        buffer.clear();
    }
}
