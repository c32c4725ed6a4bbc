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

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use old_rand::rngs::OsRng;
use password_hash::SaltString;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{error::Error, role::Role, storage::Record};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// An Argon2 PHC string.
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn email_matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.trim().to_lowercase()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.role)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Users(pub Vec<User>);

impl Users {
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.0.iter().find(|user| user.email_matches(email))
    }
}

impl Record for Users {
    fn validate(&self) -> Result<(), Error> {
        let mut ids = FxHashSet::default();
        let mut emails = FxHashSet::default();

        for user in &self.0 {
            if !ids.insert(user.id.as_str()) {
                return Err(Error::DuplicateId(user.id.clone()));
            }
            if !emails.insert(user.email.to_lowercase()) {
                return Err(Error::DuplicateEmail(user.email.clone()));
            }
        }

        Ok(())
    }
}

/// The logged in user. This is a copy of the account, nothing checks it
/// against anything.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

impl Record for Session {}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.role)
    }
}

/// # Errors
///
/// If Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let ctx = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(ctx
        .hash_password(password.as_bytes(), &salt)
        .map_err(|error| Error::PasswordHash(error.to_string()))?
        .to_string())
}

#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}
