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

use rustc_hash::FxHashSet;

use crate::{
    error::Error,
    participant::{Entry, Participants},
    settings::Settings,
};

const STYLE: &str = "body{font-family:Georgia,serif}\
.certificate{page-break-after:always;border:8px double #333;margin:2em;padding:3em;text-align:center}\
.certificate h1{font-size:2.5em;margin-bottom:.2em}\
.certificate .name{font-size:2em;font-weight:bold;margin:.5em 0}\
.certificate .members{font-style:italic}";

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            ch => escaped.push(ch),
        }
    }
    escaped
}

/// Printable HTML with one certificate per selected participant, in
/// registration order. Unknown ids are skipped.
///
/// # Errors
///
/// If nothing is selected.
pub fn render(
    settings: &Settings,
    participants: &Participants,
    ids: &[String],
) -> Result<String, Error> {
    if ids.is_empty() {
        return Err(Error::EmptySelection);
    }

    let ids: FxHashSet<&str> = ids.iter().map(String::as_str).collect();
    let event = escape(&settings.event_name);
    let date = settings.event_date.format("%B %-d, %Y");

    let mut html = String::new();
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Certificates - {event}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
    ));

    for participant in participants.0.iter().filter(|p| ids.contains(p.id.as_str())) {
        let name = escape(participant.entry.display_name());

        html.push_str(&format!(
            "<section class=\"certificate\">\n<h1>Certificate of Participation</h1>\n<p>This certifies that</p>\n<p class=\"name\">{name}</p>\n"
        ));

        if let Entry::Team { members, .. } = &participant.entry {
            let names: Vec<_> = members.iter().map(|member| escape(&member.name)).collect();
            html.push_str(&format!("<p class=\"members\">{}</p>\n", names.join(", ")));
        }

        html.push_str(&format!(
            "<p>participated in <strong>{event}</strong> on {date}.</p>\n</section>\n"
        ));
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::participant::{Member, Participant};

    use super::*;

    fn participants() -> Participants {
        Participants(vec![
            Participant {
                id: "1".to_string(),
                entry: Entry::Solo {
                    name: "<script>Eve</script>".to_string(),
                    email: String::new(),
                    phone: String::new(),
                },
                present: true,
                registered_at: Utc::now(),
            },
            Participant {
                id: "2".to_string(),
                entry: Entry::Team {
                    team_name: "Owls".to_string(),
                    members: vec![Member::new("Grace", "", ""), Member::new("Alan", "", "")],
                },
                present: true,
                registered_at: Utc::now(),
            },
        ])
    }

    #[test]
    fn nothing_selected() {
        assert!(matches!(
            render(&Settings::default(), &participants(), &[]),
            Err(Error::EmptySelection)
        ));
    }

    #[test]
    fn one_certificate_per_selection() -> anyhow::Result<()> {
        let settings = Settings {
            event_name: "Hack & Tell".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 5, 9).unwrap_or_default(),
            ..Settings::default()
        };
        let ids = ["2".to_string(), "1".to_string(), "missing".to_string()];

        let html = render(&settings, &participants(), &ids)?;

        assert_eq!(html.matches("<section class=\"certificate\">").count(), 2);
        assert!(html.contains("&lt;script&gt;Eve&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Grace, Alan"));
        assert!(html.contains("Hack &amp; Tell"));
        assert!(html.contains("May 9, 2026"));
        assert!(html.find("Eve").unwrap_or(usize::MAX) < html.find("Owls").unwrap_or(0));
        Ok(())
    }
}
