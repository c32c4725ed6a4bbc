// This file is part of event-desk.
//
// event-desk is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// event-desk is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

#![deny(clippy::expect_used)]
#![deny(clippy::indexing_slicing)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

mod command_line;

use std::{
    fs,
    io::{self, BufRead, Read, Write},
    path::Path,
    process::exit,
};

use clap::{CommandFactory, Parser};
use event_desk::{
    DataDir, EventDesk,
    settings::SettingsUpdate,
    utils::{self, data_folder},
};
use log::{debug, error, warn};

use crate::command_line::{Args, Command};

fn main() {
    let args = Args::parse();
    utils::init_logger(args.debug);

    if let Err(error) = run(args) {
        error!("{error}");
        eprintln!("{error}");
        exit(1);
    }
}

/// Asks a yes/no question on standard input, defaulting to no.
fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            println!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run(args: Args) -> anyhow::Result<()> {
    if args.man {
        return Args::generate_man_page();
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let data_dir = args.data_dir.unwrap_or_else(data_folder);
    debug!("data folder: {}", data_dir.display());
    let mut desk = EventDesk::open(DataDir::new(data_dir));

    match command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => read_line("password")?,
            };
            let session = desk.signup(&name, &email, &password)?;
            println!("welcome {session}");
        }
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_line("password")?,
            };
            let session = desk.login(&email, &password)?;
            println!("logged in as {session}");
        }
        Command::Logout { yes } => {
            if desk.current_user().is_none() {
                println!("nobody is logged in");
            } else if yes || confirm("Log out?")? {
                desk.logout();
                println!("logged out");
            }
        }
        Command::Whoami => match desk.current_user() {
            Some(session) => println!("{session}"),
            None => println!("nobody is logged in"),
        },
        Command::Settings {
            event_name,
            event_date,
            min_team_size,
            max_team_size,
        } => {
            let update = SettingsUpdate {
                event_name,
                event_date,
                min_team_size,
                max_team_size,
            };

            if update == SettingsUpdate::default() {
                println!("{}", desk.settings());
            } else {
                println!("{}", desk.update_settings(update)?);

                let teams = desk.dashboard()?.teams_out_of_bounds;
                if teams > 0 {
                    warn!("{teams} registered teams no longer fit the team size");
                    println!("warning: {teams} registered teams no longer fit the team size");
                }
            }
        }
        Command::Theme { theme, toggle } => {
            let theme = match (theme, toggle) {
                (Some(theme), _) => desk.set_theme(theme),
                (None, true) => desk.toggle_theme(),
                (None, false) => desk.theme(),
            };
            println!("{theme}");
        }
        Command::Register(entry) => {
            let participant = desk.register(entry.into_entry(None))?;
            println!("registered {participant}");
        }
        Command::Edit { id, entry } => {
            let form = desk.begin_edit(&id)?;
            let participant = desk.submit(entry.into_entry(Some(form)))?;
            println!("updated {participant}");
        }
        Command::List { query, kind } => {
            let mut participants = desk.filter(query.as_deref().unwrap_or_default())?;
            if let Some(kind) = kind {
                participants.retain(|participant| participant.entry.kind() == kind);
            }
            if participants.is_empty() {
                println!("no participants");
            }
            for participant in participants {
                println!("{participant}");
            }
        }
        Command::Toggle { id } => {
            let participant = desk.toggle_attendance(&id)?;
            println!("{participant}");
        }
        Command::Delete { id, yes } => {
            let name = desk.participant(&id)?.entry.display_name().to_string();
            if yes || confirm(&format!("Delete {name}?"))? {
                desk.delete(&id)?;
                println!("deleted {name}");
            }
        }
        Command::Qr { id } => println!("{}", desk.qr_payload(&id)?),
        Command::CheckIn { payload } => {
            let payload = match payload {
                Some(payload) => payload,
                None => {
                    let mut payload = String::new();
                    io::stdin().read_to_string(&mut payload)?;
                    payload
                }
            };
            let participant = desk.check_in(&payload)?;
            println!("checked in {participant}");
        }
        Command::Certificates {
            mut ids,
            present,
            output,
        } => {
            if present {
                ids.extend(desk.present_ids()?);
            }
            let html = desk.certificates(&ids)?;
            write_output(Some(&output), &html)?;
        }
        Command::ExportCsv { output } => write_output(output.as_deref(), &desk.export_csv()?)?,
        Command::ExportJson { output } => {
            let mut json = desk.export_json()?;
            json.push('\n');
            write_output(output.as_deref(), &json)?;
        }
        Command::Import { file, yes } => {
            let text = fs::read_to_string(&file)?;
            if yes || confirm("Replace the settings and all participants?")? {
                let count = desk.import_json(&text)?;
                println!("imported {count} participants");
            }
        }
        Command::Dashboard => println!("{}", desk.dashboard()?),
    }

    Ok(())
}
