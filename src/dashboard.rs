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

use crate::{
    participant::{Kind, Participant, Participants},
    settings::Settings,
};

const RECENT: usize = 5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dashboard {
    pub registrations: usize,
    pub solo: usize,
    pub teams: usize,
    /// Solo participants plus every team member.
    pub people: usize,
    pub present: usize,
    pub absent: usize,
    pub accounts: usize,
    /// Stored teams whose size no longer fits the current settings.
    pub teams_out_of_bounds: usize,
    pub recent: Vec<Participant>,
}

impl Dashboard {
    #[must_use]
    pub fn new(settings: &Settings, participants: &Participants, accounts: usize) -> Self {
        let mut dashboard = Self {
            registrations: participants.0.len(),
            accounts,
            ..Self::default()
        };

        for participant in &participants.0 {
            match participant.entry.kind() {
                Kind::Solo => {
                    dashboard.solo += 1;
                    dashboard.people += 1;
                }
                Kind::Team => {
                    let members = participant.entry.members().len();
                    dashboard.teams += 1;
                    dashboard.people += members;
                    if !settings.team_size_fits(members) {
                        dashboard.teams_out_of_bounds += 1;
                    }
                }
            }

            if participant.present {
                dashboard.present += 1;
            } else {
                dashboard.absent += 1;
            }
        }

        let mut recent: Vec<_> = participants.0.iter().collect();
        recent.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        dashboard.recent = recent.into_iter().take(RECENT).cloned().collect();

        dashboard
    }

    /// Percent of registrations checked in, rounded to one decimal.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn attendance_rate(&self) -> f64 {
        if self.registrations == 0 {
            return 0.0;
        }

        let rate = self.present as f64 / self.registrations as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "registrations: {}", self.registrations)?;
        writeln!(f, "solo:          {}", self.solo)?;
        writeln!(f, "teams:         {}", self.teams)?;
        writeln!(f, "people:        {}", self.people)?;
        writeln!(f, "present:       {}", self.present)?;
        writeln!(f, "absent:        {}", self.absent)?;
        writeln!(f, "attendance:    {:.1}%", self.attendance_rate())?;
        writeln!(f, "accounts:      {}", self.accounts)?;
        if self.teams_out_of_bounds > 0 {
            writeln!(
                f,
                "warning: {} team(s) no longer fit the team size settings",
                self.teams_out_of_bounds
            )?;
        }

        write!(f, "recent:")?;
        for participant in &self.recent {
            write!(f, "\n  {participant}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::participant::{Entry, Member};

    use super::*;

    fn solo(id: usize, present: bool, minutes: i64) -> Participant {
        Participant {
            id: id.to_string(),
            entry: Entry::Solo {
                name: format!("Solo {id}"),
                email: String::new(),
                phone: String::new(),
            },
            present,
            registered_at: Utc::now() - Duration::minutes(minutes),
        }
    }

    #[test]
    fn empty() {
        let dashboard = Dashboard::new(&Settings::default(), &Participants::default(), 0);

        assert_eq!(dashboard.registrations, 0);
        assert!(dashboard.attendance_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn counts() {
        let settings = Settings {
            min_team_size: 2,
            max_team_size: 2,
            ..Settings::default()
        };
        let mut participants: Vec<_> = (0..6)
            .map(|i| solo(i, i % 2 == 0, 60 - i64::try_from(i).unwrap_or(0)))
            .collect();
        participants.push(Participant {
            id: "team".to_string(),
            entry: Entry::Team {
                team_name: "Owls".to_string(),
                members: vec![
                    Member::new("a", "", ""),
                    Member::new("b", "", ""),
                    Member::new("c", "", ""),
                ],
            },
            present: false,
            registered_at: Utc::now(),
        });

        let dashboard = Dashboard::new(&settings, &Participants(participants), 3);

        assert_eq!(dashboard.registrations, 7);
        assert_eq!(dashboard.solo, 6);
        assert_eq!(dashboard.teams, 1);
        assert_eq!(dashboard.people, 9);
        assert_eq!(dashboard.present, 3);
        assert_eq!(dashboard.absent, 4);
        assert_eq!(dashboard.accounts, 3);
        assert_eq!(dashboard.teams_out_of_bounds, 1);
        assert!((dashboard.attendance_rate() - 42.9).abs() < 1e-9);

        let recent: Vec<_> = dashboard.recent.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(recent, ["team", "5", "4", "3", "2"]);
    }
}
