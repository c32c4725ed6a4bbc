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

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    participant::{Kind, Participants},
    settings::Settings,
    storage::Record,
};

pub const EXPORT_VERSION: &str = "1.0";

pub const CSV_HEADER: [&str; 7] = [
    "Type",
    "Name/Team",
    "Email",
    "Phone",
    "Members",
    "Present",
    "Registered At",
];

/// Every field is quoted and quotes inside a field are doubled.
///
/// # Errors
///
/// If the csv writer fails.
pub fn to_csv(participants: &Participants) -> Result<String, Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for participant in &participants.0 {
        let entry = &participant.entry;
        let kind = match entry.kind() {
            Kind::Solo => "Solo",
            Kind::Team => "Team",
        };
        let members: Vec<_> = entry.members().iter().map(|m| m.name.as_str()).collect();
        let present = if participant.present { "Yes" } else { "No" };
        let registered_at = participant
            .registered_at
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        writer.write_record([
            kind,
            entry.display_name(),
            entry.email(),
            entry.phone(),
            members.join("; ").as_str(),
            present,
            registered_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Csv(error.into_error().into()))?;

    String::from_utf8(bytes)
        .map_err(|error| Error::Csv(csv::Error::from(std::io::Error::other(error))))
}

/// The JSON export file.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub settings: Settings,
    pub participants: Participants,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl Snapshot {
    #[must_use]
    pub fn new(settings: &Settings, participants: &Participants) -> Self {
        Self {
            settings: settings.clone(),
            participants: participants.clone(),
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// # Errors
    ///
    /// If serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What an import replaces. Settings are optional, participants are not.
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub settings: Option<Settings>,
    pub participants: Participants,
}

/// # Errors
///
/// If the text isn't JSON, lacks a `participants` array, or holds records
/// that aren't participants or settings.
pub fn parse_import(text: &str) -> Result<Import, Error> {
    let mut value: serde_json::Value =
        serde_json::from_str(text).map_err(|error| Error::InvalidImport(error.to_string()))?;

    let Some(object) = value.as_object_mut() else {
        return Err(Error::InvalidImport("expected an object".to_string()));
    };

    let participants = match object.remove("participants") {
        Some(participants @ serde_json::Value::Array(_)) => participants,
        _ => {
            return Err(Error::InvalidImport(
                "there is no participants list".to_string(),
            ));
        }
    };

    let participants: Participants = serde_json::from_value(participants)
        .map_err(|error| Error::InvalidImport(format!("participants: {error}")))?;
    participants
        .validate()
        .map_err(|error| Error::InvalidImport(error.to_string()))?;

    let settings = match object.remove("settings") {
        Some(serde_json::Value::Null) | None => None,
        Some(settings) => {
            let settings: Settings = serde_json::from_value(settings)
                .map_err(|error| Error::InvalidImport(format!("settings: {error}")))?;
            settings
                .validate()
                .map_err(|error| Error::InvalidImport(error.to_string()))?;
            Some(settings)
        }
    };

    Ok(Import {
        settings,
        participants,
    })
}
