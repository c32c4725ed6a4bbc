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

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    participant::{Kind, Participant},
};

/// What goes into a check-in QR code. It is not signed: anyone who can
/// write a well formed payload with a known id can check that id in.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct QrPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub name: String,
    pub event: String,
}

impl QrPayload {
    #[must_use]
    pub fn new(participant: &Participant, event: &str) -> Self {
        Self {
            id: participant.id.clone(),
            kind: participant.entry.kind(),
            name: participant.entry.display_name().to_string(),
            event: event.to_string(),
        }
    }

    /// # Errors
    ///
    /// If serialization fails.
    pub fn encode(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a payload from scanned or pasted text.
    ///
    /// # Errors
    ///
    /// If the text isn't a payload or its id is empty.
    pub fn decode(text: &str) -> Result<Self, Error> {
        let payload: Self = serde_json::from_str(text.trim()).map_err(|_| Error::InvalidQr)?;

        if payload.id.trim().is_empty() {
            return Err(Error::InvalidQr);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::participant::Entry;

    use super::*;

    #[test]
    fn payload_fields() -> anyhow::Result<()> {
        let participant = Participant {
            id: "abc".to_string(),
            entry: Entry::Solo {
                name: "Ada".to_string(),
                email: String::new(),
                phone: String::new(),
            },
            present: false,
            registered_at: Utc::now(),
        };

        let text = QrPayload::new(&participant, "RustConf").encode()?;
        assert_eq!(
            text,
            r#"{"id":"abc","type":"solo","name":"Ada","event":"RustConf"}"#
        );
        Ok(())
    }

    #[test]
    fn pasted_text_decodes() -> anyhow::Result<()> {
        let text = "  {\"id\":\"x1\",\"type\":\"team\",\"name\":\"Owls\",\"event\":\"E\"}\n";
        let payload = QrPayload::decode(text)?;

        assert_eq!(payload.id, "x1");
        assert_eq!(payload.kind, Kind::Team);
        Ok(())
    }

    #[test]
    fn malformed_text_is_rejected() {
        for text in [
            "",
            "x1",
            "{\"id\":\"x1\"}",
            "{\"id\":\"\",\"type\":\"solo\",\"name\":\"A\",\"event\":\"E\"}",
            "{\"id\":\"x1\",\"type\":\"duo\",\"name\":\"A\",\"event\":\"E\"}",
        ] {
            assert!(matches!(QrPayload::decode(text), Err(Error::InvalidQr)), "{text}");
        }
    }
}
