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

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{error::Error, settings::Settings, storage::Record};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Solo,
    Team,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solo => write!(f, "solo"),
            Self::Team => write!(f, "team"),
        }
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(string: &str) -> anyhow::Result<Self> {
        match string.to_lowercase().as_str() {
            "solo" => Ok(Self::Solo),
            "team" => Ok(Self::Team),
            _ => Err(anyhow::Error::msg(format!(
                "Error trying to convert '{string}' to a Kind!"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Member {
    #[must_use]
    pub fn new(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        }
    }
}

impl FromStr for Member {
    type Err = anyhow::Error;

    /// `NAME[:EMAIL[:PHONE]]`
    fn from_str(string: &str) -> anyhow::Result<Self> {
        let mut fields = string.splitn(3, ':');
        let name = fields.next().unwrap_or_default();
        let email = fields.next().unwrap_or_default();
        let phone = fields.next().unwrap_or_default();

        Ok(Self::new(name, email, phone))
    }
}

/// What was registered. This doubles as the registration form: the same
/// value comes in from the form, goes through [`Entry::validate`] and is
/// stored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Entry {
    Solo {
        name: String,
        #[serde(default)]
        email: String,
        #[serde(default)]
        phone: String,
    },
    Team {
        team_name: String,
        members: Vec<Member>,
    },
}

impl Entry {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Solo { .. } => Kind::Solo,
            Self::Team { .. } => Kind::Team,
        }
    }

    /// The solo name or the team name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Solo { name, .. } => name,
            Self::Team { team_name, .. } => team_name,
        }
    }

    /// The email of a solo participant or of the first team member.
    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Solo { email, .. } => email,
            Self::Team { members, .. } => members.first().map_or("", |member| &member.email),
        }
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        match self {
            Self::Solo { phone, .. } => phone,
            Self::Team { members, .. } => members.first().map_or("", |member| &member.phone),
        }
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        match self {
            Self::Solo { .. } => &[],
            Self::Team { members, .. } => members,
        }
    }

    /// Trims the form, drops team members without a name and checks the
    /// team size against the current settings.
    ///
    /// # Errors
    ///
    /// If a name is missing or the team is too small or too large.
    pub fn validate(self, settings: &Settings) -> Result<Self, Error> {
        match self {
            Self::Solo { name, email, phone } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(Error::MissingField("name"));
                }

                Ok(Self::Solo {
                    name,
                    email: email.trim().to_string(),
                    phone: phone.trim().to_string(),
                })
            }
            Self::Team { team_name, members } => {
                let team_name = team_name.trim().to_string();
                if team_name.is_empty() {
                    return Err(Error::MissingField("team name"));
                }

                let members: Vec<_> = members
                    .into_iter()
                    .map(|member| Member::new(&member.name, &member.email, &member.phone))
                    .filter(|member| !member.name.is_empty())
                    .collect();

                if !settings.team_size_fits(members.len()) {
                    return Err(Error::TeamSize {
                        count: members.len(),
                        min: settings.min_team_size,
                        max: settings.max_team_size,
                    });
                }

                Ok(Self::Team { team_name, members })
            }
        }
    }

    /// Case insensitive substring search over the name, the team name and
    /// the member names.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        match self {
            Self::Solo { name, .. } => name.to_lowercase().contains(&query),
            Self::Team { team_name, members } => {
                team_name.to_lowercase().contains(&query)
                    || members
                        .iter()
                        .any(|member| member.name.to_lowercase().contains(&query))
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    #[serde(flatten)]
    pub entry: Entry,
    #[serde(default)]
    pub present: bool,
    pub registered_at: DateTime<Utc>,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = if self.present { "present" } else { "absent" };

        write!(
            f,
            "{} {} {} [{}]",
            self.id,
            self.entry.kind(),
            self.entry.display_name(),
            present
        )?;

        let members = self.entry.members();
        if !members.is_empty() {
            let names: Vec<_> = members.iter().map(|member| member.name.as_str()).collect();
            write!(f, " ({})", names.join(", "))?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Participants(pub Vec<Participant>);

impl Participants {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.0.iter().find(|participant| participant.id == id)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.0.iter_mut().find(|participant| participant.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Removes and returns the participant.
    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        let index = self.0.iter().position(|participant| participant.id == id)?;
        Some(self.0.remove(index))
    }

    /// Everyone matching `query`, in registration order.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<&Participant> {
        self.0
            .iter()
            .filter(|participant| participant.entry.matches(query))
            .collect()
    }
}

impl Record for Participants {
    fn validate(&self) -> Result<(), Error> {
        let mut ids = FxHashSet::default();

        for participant in &self.0 {
            if !ids.insert(participant.id.as_str()) {
                return Err(Error::DuplicateId(participant.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(min: u32, max: u32) -> Settings {
        Settings {
            min_team_size: min,
            max_team_size: max,
            ..Settings::default()
        }
    }

    fn team(names: &[&str]) -> Entry {
        Entry::Team {
            team_name: "Rustaceans".to_string(),
            members: names.iter().map(|name| Member::new(name, "", "")).collect(),
        }
    }

    #[test]
    fn solo_needs_a_name() {
        let entry = Entry::Solo {
            name: "   ".to_string(),
            email: "a@b.c".to_string(),
            phone: String::new(),
        };

        assert!(matches!(
            entry.validate(&settings(2, 3)),
            Err(Error::MissingField("name"))
        ));
    }

    #[test]
    fn team_size_is_checked() {
        let settings = settings(2, 3);

        assert!(matches!(
            team(&["a"]).validate(&settings),
            Err(Error::TeamSize { count: 1, min: 2, max: 3 })
        ));
        assert!(team(&["a", "b"]).validate(&settings).is_ok());
        assert!(team(&["a", "b", "c"]).validate(&settings).is_ok());
        assert!(matches!(
            team(&["a", "b", "c", "d"]).validate(&settings),
            Err(Error::TeamSize { count: 4, .. })
        ));
    }

    #[test]
    fn unnamed_members_are_dropped() -> anyhow::Result<()> {
        let entry = team(&["a", "", "  ", "b"]).validate(&settings(2, 3))?;

        let names: Vec<_> = entry.members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        Ok(())
    }

    #[test]
    fn team_needs_a_name() {
        let entry = Entry::Team {
            team_name: String::new(),
            members: vec![Member::new("a", "", ""), Member::new("b", "", "")],
        };

        assert!(matches!(
            entry.validate(&settings(2, 3)),
            Err(Error::MissingField("team name"))
        ));
    }

    #[test]
    fn matching_ignores_case() {
        let entry = Entry::Team {
            team_name: "Night Owls".to_string(),
            members: vec![Member::new("Grace Hopper", "", "")],
        };

        assert!(entry.matches("owl"));
        assert!(entry.matches("HOPPER"));
        assert!(entry.matches(""));
        assert!(!entry.matches("lovelace"));
    }

    #[test]
    fn members_parse_from_the_command_line() -> anyhow::Result<()> {
        let member = Member::from_str("Ada:ada@example.org:555-0100")?;
        assert_eq!(member, Member::new("Ada", "ada@example.org", "555-0100"));

        let member = Member::from_str("Bob")?;
        assert_eq!(member.email, "");
        Ok(())
    }

    #[test]
    fn participants_serialize_flat() -> anyhow::Result<()> {
        let participant = Participant {
            id: "p1".to_string(),
            entry: team(&["a", "b"]),
            present: true,
            registered_at: Utc::now(),
        };

        let value = serde_json::to_value(&participant)?;
        assert_eq!(value["type"], "team");
        assert_eq!(value["teamName"], "Rustaceans");
        assert_eq!(value["members"][1]["name"], "b");

        let back: Participant = serde_json::from_value(value)?;
        assert_eq!(back, participant);
        Ok(())
    }
}
