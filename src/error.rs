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

use thiserror::Error;

/// Everything an operation can refuse to do. The messages are shown to the
/// user as they are.
#[derive(Error, Debug)]
pub enum Error {
    #[error("access denied: only an admin can do that")]
    AccessDenied,
    #[error("an account with the email {0} already exists")]
    DuplicateEmail(String),
    #[error("the id {0} is used more than once")]
    DuplicateId(String),
    #[error("select at least one participant")]
    EmptySelection,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid import file: {0}")]
    InvalidImport(String),
    #[error("invalid QR code data")]
    InvalidQr,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("you have to log in first")]
    NotLoggedIn,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("a team needs between {min} and {max} members, it has {count}")]
    TeamSize { count: usize, min: u32, max: u32 },
    #[error("no participant with the id {0}")]
    UnknownParticipant(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
