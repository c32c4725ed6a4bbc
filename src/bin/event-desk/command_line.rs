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

use std::{io::Write as _, path::PathBuf};

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use event_desk::{
    COPYRIGHT, LONG_VERSION,
    participant::{Entry, Kind, Member},
    settings::Theme,
};

/// Event Desk
///
/// Registers participants for an event, checks them in with QR codes,
/// prints certificates and exports the roster. Everything is kept in a
/// local data folder.
#[derive(Parser, Debug)]
#[command(version, long_version = LONG_VERSION, about = "Event registration and check-in")]
pub(crate) struct Args {
    /// Keep the state in this folder instead of the user's data folder
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Whether to log on the debug level
    #[arg(long, global = true)]
    pub debug: bool,

    /// Build the manpage
    #[arg(long)]
    pub man: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Create an account and log in. The first account is the admin.
    Signup {
        name: String,
        email: String,

        /// Read from standard input when left out
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in to an existing account
    Login {
        email: String,

        /// Read from standard input when left out
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out
    Logout {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show who is logged in
    Whoami,

    /// Show the event settings, or change them (admin only)
    Settings {
        #[arg(long)]
        event_name: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        event_date: Option<NaiveDate>,

        #[arg(long)]
        min_team_size: Option<u32>,

        #[arg(long)]
        max_team_size: Option<u32>,
    },

    /// Show the theme, set it, or toggle it
    Theme {
        /// light or dark
        theme: Option<Theme>,

        #[arg(long, conflicts_with = "theme")]
        toggle: bool,
    },

    /// Register a solo participant or a team
    #[command(subcommand)]
    Register(EntryArgs),

    /// Edit a registration, keeping its id and attendance
    Edit {
        id: String,

        #[command(subcommand)]
        entry: EntryArgs,
    },

    /// List participants, optionally only those matching QUERY
    List {
        query: Option<String>,

        /// solo or team
        #[arg(long)]
        kind: Option<Kind>,
    },

    /// Flip a participant between present and absent
    Toggle { id: String },

    /// Delete a participant
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the check-in QR payload of a participant
    Qr { id: String },

    /// Check in with a scanned or pasted QR payload
    CheckIn {
        /// Read from standard input when left out
        payload: Option<String>,
    },

    /// Write printable certificates as HTML
    Certificates {
        ids: Vec<String>,

        /// Select everyone who is present
        #[arg(long)]
        present: bool,

        #[arg(short, long, default_value = "certificates.html")]
        output: PathBuf,
    },

    /// Export participants as CSV
    ExportCsv {
        /// Print to standard output when left out
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the settings and participants as JSON
    ExportJson {
        /// Print to standard output when left out
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the settings and participants with a JSON export (admin only)
    Import {
        file: PathBuf,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show attendance statistics (admin only)
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub(crate) enum EntryArgs {
    /// A single person
    Solo {
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// A team
    Team {
        team_name: Option<String>,

        /// NAME[:EMAIL[:PHONE]], repeat for each member
        #[arg(short, long = "member")]
        members: Vec<Member>,
    },
}

impl EntryArgs {
    /// Fills in whatever was left out from `form`, the record being edited.
    pub(crate) fn into_entry(self, form: Option<Entry>) -> Entry {
        match (self, form) {
            (
                Self::Solo { name, email, phone },
                Some(Entry::Solo {
                    name: old_name,
                    email: old_email,
                    phone: old_phone,
                }),
            ) => Entry::Solo {
                name: name.unwrap_or(old_name),
                email: email.unwrap_or(old_email),
                phone: phone.unwrap_or(old_phone),
            },
            (Self::Solo { name, email, phone }, _) => Entry::Solo {
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
            },
            (
                Self::Team { team_name, members },
                Some(Entry::Team {
                    team_name: old_team_name,
                    members: old_members,
                }),
            ) => Entry::Team {
                team_name: team_name.unwrap_or(old_team_name),
                members: if members.is_empty() {
                    old_members
                } else {
                    members
                },
            },
            (Self::Team { team_name, members }, _) => Entry::Team {
                team_name: team_name.unwrap_or_default(),
                members,
            },
        }
    }
}

impl Args {
    pub(crate) fn generate_man_page() -> anyhow::Result<()> {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Self::command().name("event-desk").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-10-18");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        std::fs::write("event-desk.1", buffer)?;
        Ok(())
    }
}
