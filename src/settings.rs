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

use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{error::Error, storage::Record};

pub const DEFAULT_MIN_TEAM_SIZE: u32 = 2;
pub const DEFAULT_MAX_TEAM_SIZE: u32 = 5;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub event_name: String,
    pub event_date: NaiveDate,
    pub min_team_size: u32,
    pub max_team_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            event_name: "My Event".to_string(),
            event_date: Local::now().date_naive(),
            min_team_size: DEFAULT_MIN_TEAM_SIZE,
            max_team_size: DEFAULT_MAX_TEAM_SIZE,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "event:     {}", self.event_name)?;
        writeln!(f, "date:      {}", self.event_date)?;
        write!(
            f,
            "team size: {}..={}",
            self.min_team_size, self.max_team_size
        )
    }
}

impl Record for Settings {
    fn validate(&self) -> Result<(), Error> {
        if self.event_name.trim().is_empty() {
            return Err(Error::MissingField("event name"));
        }
        if self.min_team_size < 1 {
            return Err(Error::InvalidSettings(
                "the minimum team size has to be at least 1".to_string(),
            ));
        }
        if self.min_team_size > self.max_team_size {
            return Err(Error::InvalidSettings(format!(
                "the minimum team size {} is greater than the maximum {}",
                self.min_team_size, self.max_team_size
            )));
        }

        Ok(())
    }
}

/// A partial update from the settings form. Fields left as `None` keep their
/// current value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SettingsUpdate {
    pub event_name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub min_team_size: Option<u32>,
    pub max_team_size: Option<u32>,
}

impl Settings {
    /// # Errors
    ///
    /// If the updated settings are invalid, in which case `self` is unchanged.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), Error> {
        let mut settings = self.clone();

        if let Some(event_name) = update.event_name {
            settings.event_name = event_name.trim().to_string();
        }
        if let Some(event_date) = update.event_date {
            settings.event_date = event_date;
        }
        if let Some(min) = update.min_team_size {
            settings.min_team_size = min;
        }
        if let Some(max) = update.max_team_size {
            settings.max_team_size = max;
        }

        settings.validate()?;
        *self = settings;
        Ok(())
    }

    #[must_use]
    pub fn team_size_fits(&self, count: usize) -> bool {
        let min = usize::try_from(self.min_team_size).unwrap_or(usize::MAX);
        let max = usize::try_from(self.max_team_size).unwrap_or(usize::MAX);
        (min..=max).contains(&count)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Record for Theme {}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Theme!"
            ))),
        }
    }
}
