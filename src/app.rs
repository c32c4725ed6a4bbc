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

use chrono::Utc;
use log::{debug, info, warn};
use rand::random;

use crate::{
    accounts::{Session, User, Users, hash_password, verify_password},
    certificate,
    dashboard::Dashboard,
    error::Error,
    export::{Snapshot, parse_import, to_csv},
    participant::{Entry, Participant, Participants},
    qr::QrPayload,
    role::Role,
    settings::{Settings, SettingsUpdate, Theme},
    storage::{
        self, PARTICIPANTS_KEY, SESSION_KEY, SETTINGS_KEY, Storage, THEME_KEY, USERS_KEY,
    },
};

/// Everything that is persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub settings: Settings,
    pub participants: Participants,
    pub users: Users,
    pub session: Option<Session>,
    pub theme: Theme,
}

impl AppState {
    /// Reads every key, using the default for anything missing or broken.
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        Self {
            settings: storage::load(storage, SETTINGS_KEY, Settings::default()),
            participants: storage::load(storage, PARTICIPANTS_KEY, Participants::default()),
            users: storage::load(storage, USERS_KEY, Users::default()),
            session: storage::load(storage, SESSION_KEY, None),
            theme: storage::load(storage, THEME_KEY, Theme::default()),
        }
    }

    /// Rewrites every key. Returns whether all of the writes worked.
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> bool {
        let settings = storage::save(storage, SETTINGS_KEY, &self.settings);
        let participants = storage::save(storage, PARTICIPANTS_KEY, &self.participants);
        let users = storage::save(storage, USERS_KEY, &self.users);
        let session = storage::save(storage, SESSION_KEY, &self.session);
        let theme = storage::save(storage, THEME_KEY, &self.theme);

        settings && participants && users && session && theme
    }
}

fn new_id<F: Fn(&str) -> bool>(taken: F) -> String {
    loop {
        let id = format!("{:016x}", random::<u64>());
        if !taken(&id) {
            return id;
        }
    }
}

/// Owns the application state and the storage it came from. Every method
/// that changes the state saves the whole snapshot before returning.
#[derive(Debug)]
pub struct EventDesk<S: Storage> {
    storage: S,
    state: AppState,
    editing: Option<String>,
}

impl<S: Storage> EventDesk<S> {
    #[must_use]
    pub fn open(storage: S) -> Self {
        let state = AppState::load(&storage);

        Self {
            storage,
            state,
            editing: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Writes the whole state. A failed write is logged and otherwise
    /// ignored, the in memory state stays as it is.
    pub fn persist(&mut self) -> bool {
        let saved = self.state.save(&mut self.storage);
        if !saved {
            warn!("the state was not saved completely");
        }
        saved
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    fn require_session(&self) -> Result<&Session, Error> {
        self.state.session.as_ref().ok_or(Error::NotLoggedIn)
    }

    fn require_admin(&self) -> Result<&Session, Error> {
        let session = self.require_session()?;
        if session.role.is_admin() {
            Ok(session)
        } else {
            Err(Error::AccessDenied)
        }
    }

    /// Creates an account and logs it in. The first account is the admin.
    ///
    /// # Errors
    ///
    /// If a field is empty or the email is already used.
    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<Session, Error> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(Error::MissingField("name"));
        }
        if email.is_empty() {
            return Err(Error::MissingField("email"));
        }
        if password.is_empty() {
            return Err(Error::MissingField("password"));
        }
        if self.state.users.find_by_email(email).is_some() {
            info!("signup: {email} is already in the database");
            return Err(Error::DuplicateEmail(email.to_string()));
        }

        let role = if self.state.users.0.is_empty() {
            Role::Admin
        } else {
            Role::Participant
        };

        let user = User {
            id: new_id(|id| self.state.users.0.iter().any(|user| user.id == id)),
            name: name.to_string(),
            email: email.to_string(),
            password: hash_password(password)?,
            role,
            created_at: Utc::now(),
        };
        info!("{} {email} created a {role} account", user.id);

        let session = Session::from(&user);
        self.state.users.0.push(user);
        self.state.session = Some(session.clone());
        self.persist();

        Ok(session)
    }

    /// # Errors
    ///
    /// If there is no such account or the password is wrong. Both give the
    /// same error.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Session, Error> {
        let Some(user) = self.state.users.find_by_email(email) else {
            info!("login: {} is not in the database", email.trim());
            return Err(Error::InvalidCredentials);
        };

        if !verify_password(password, &user.password) {
            info!("login: {} provided the wrong password", user.email);
            return Err(Error::InvalidCredentials);
        }

        info!("{} {} logged in", user.id, user.email);
        let session = Session::from(user);
        self.state.session = Some(session.clone());
        self.persist();

        Ok(session)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.state.session.take() {
            info!("{} {} logged out", session.user_id, session.email);
        }
        self.editing = None;
        self.persist();
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Stored teams are not checked against the new team sizes.
    ///
    /// # Errors
    ///
    /// If the caller isn't an admin or the new settings are invalid.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<Settings, Error> {
        self.require_admin()?;
        self.state.settings.apply(update)?;
        info!("settings updated: {:?}", self.state.settings);
        self.persist();

        Ok(self.state.settings.clone())
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        self.state.theme = theme;
        self.persist();
        theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.state.theme.toggle())
    }

    /// # Errors
    ///
    /// If nobody is logged in.
    pub fn participants(&self) -> Result<&Participants, Error> {
        self.require_session()?;
        Ok(&self.state.participants)
    }

    /// # Errors
    ///
    /// If nobody is logged in.
    pub fn filter(&self, query: &str) -> Result<Vec<&Participant>, Error> {
        Ok(self.participants()?.filter(query))
    }

    /// # Errors
    ///
    /// If nobody is logged in or the participant doesn't exist.
    pub fn participant(&self, id: &str) -> Result<&Participant, Error> {
        self.participants()?
            .get(id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_string()))
    }

    /// Registers a new participant, absent.
    ///
    /// # Errors
    ///
    /// If nobody is logged in or the form is invalid. Nothing is stored then.
    pub fn register(&mut self, entry: Entry) -> Result<Participant, Error> {
        self.require_session()?;
        let entry = entry.validate(&self.state.settings)?;

        let participant = Participant {
            id: new_id(|id| self.state.participants.contains(id)),
            entry,
            present: false,
            registered_at: Utc::now(),
        };
        info!(
            "{} registered {} {}",
            participant.id,
            participant.entry.kind(),
            participant.entry.display_name()
        );

        self.state.participants.0.push(participant.clone());
        self.persist();

        Ok(participant)
    }

    /// Replaces what was registered, keeping the id, the attendance and the
    /// registration time.
    ///
    /// # Errors
    ///
    /// If nobody is logged in, the participant doesn't exist or the form is
    /// invalid. Nothing is changed then.
    pub fn update(&mut self, id: &str, entry: Entry) -> Result<Participant, Error> {
        self.require_session()?;
        let entry = entry.validate(&self.state.settings)?;

        let participant = self
            .state
            .participants
            .get_mut(id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_string()))?;
        participant.entry = entry;
        let participant = participant.clone();
        info!("{} updated", participant.id);

        self.persist();
        Ok(participant)
    }

    /// Enters edit mode and returns the form filled in from the record.
    ///
    /// # Errors
    ///
    /// If nobody is logged in or the participant doesn't exist.
    pub fn begin_edit(&mut self, id: &str) -> Result<Entry, Error> {
        let entry = self.participant(id)?.entry.clone();
        self.editing = Some(id.to_string());
        Ok(entry)
    }

    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Submits the registration form: an update in edit mode, otherwise a
    /// new registration. Edit mode ends only when the update works.
    ///
    /// # Errors
    ///
    /// See [`Self::register`] and [`Self::update`].
    pub fn submit(&mut self, entry: Entry) -> Result<Participant, Error> {
        match self.editing.clone() {
            Some(id) => {
                let participant = self.update(&id, entry)?;
                self.editing = None;
                Ok(participant)
            }
            None => self.register(entry),
        }
    }

    /// # Errors
    ///
    /// If nobody is logged in or the participant doesn't exist.
    pub fn toggle_attendance(&mut self, id: &str) -> Result<Participant, Error> {
        self.require_session()?;

        let participant = self
            .state
            .participants
            .get_mut(id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_string()))?;
        participant.present = !participant.present;
        let participant = participant.clone();
        debug!("{} present={}", participant.id, participant.present);

        self.persist();
        Ok(participant)
    }

    /// # Errors
    ///
    /// If nobody is logged in or the participant doesn't exist.
    pub fn delete(&mut self, id: &str) -> Result<Participant, Error> {
        self.require_session()?;

        let participant = self
            .state
            .participants
            .remove(id)
            .ok_or_else(|| Error::UnknownParticipant(id.to_string()))?;
        info!("{} deleted", participant.id);

        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }

        self.persist();
        Ok(participant)
    }

    /// The text to put into the participant's check-in QR code.
    ///
    /// # Errors
    ///
    /// If nobody is logged in or the participant doesn't exist.
    pub fn qr_payload(&self, id: &str) -> Result<String, Error> {
        let participant = self.participant(id)?;
        QrPayload::new(participant, &self.state.settings.event_name).encode()
    }

    /// Marks the participant named by a scanned or pasted payload as
    /// present. Checking in twice is fine.
    ///
    /// # Errors
    ///
    /// If nobody is logged in, the payload is malformed or names nobody.
    pub fn check_in(&mut self, text: &str) -> Result<Participant, Error> {
        self.require_session()?;
        let payload = QrPayload::decode(text)?;

        let participant = self
            .state
            .participants
            .get_mut(&payload.id)
            .ok_or_else(|| Error::UnknownParticipant(payload.id.clone()))?;
        participant.present = true;
        let participant = participant.clone();
        info!(
            "{} checked in {}",
            participant.id,
            participant.entry.display_name()
        );

        self.persist();
        Ok(participant)
    }

    /// # Errors
    ///
    /// If nobody is logged in.
    pub fn present_ids(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .participants()?
            .0
            .iter()
            .filter(|participant| participant.present)
            .map(|participant| participant.id.clone())
            .collect())
    }

    /// # Errors
    ///
    /// If nobody is logged in or nothing is selected.
    pub fn certificates(&self, ids: &[String]) -> Result<String, Error> {
        certificate::render(&self.state.settings, self.participants()?, ids)
    }

    /// # Errors
    ///
    /// If nobody is logged in or the csv writer fails.
    pub fn export_csv(&self) -> Result<String, Error> {
        to_csv(self.participants()?)
    }

    /// # Errors
    ///
    /// If nobody is logged in or serialization fails.
    pub fn export_json(&self) -> Result<String, Error> {
        Snapshot::new(&self.state.settings, self.participants()?).to_json()
    }

    /// Replaces the settings (when the file has them) and all participants.
    /// Returns how many participants were imported.
    ///
    /// # Errors
    ///
    /// If the caller isn't an admin or the file isn't an export.
    pub fn import_json(&mut self, text: &str) -> Result<usize, Error> {
        self.require_admin()?;
        let import = parse_import(text)?;

        if let Some(settings) = import.settings {
            self.state.settings = settings;
        }
        self.state.participants = import.participants;
        self.editing = None;

        let count = self.state.participants.0.len();
        info!("imported {count} participants");

        self.persist();
        Ok(count)
    }

    /// # Errors
    ///
    /// If the caller isn't an admin.
    pub fn dashboard(&self) -> Result<Dashboard, Error> {
        self.require_admin()?;

        Ok(Dashboard::new(
            &self.state.settings,
            &self.state.participants,
            self.state.users.0.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{participant::Member, storage::MemoryStorage};

    use super::*;

    fn solo(name: &str) -> Entry {
        Entry::Solo {
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
        }
    }

    fn desk() -> anyhow::Result<EventDesk<MemoryStorage>> {
        let mut desk = EventDesk::open(MemoryStorage::default());
        desk.signup("Admin", "admin@example.org", "hunter2")?;
        Ok(desk)
    }

    #[test]
    fn first_account_is_admin() -> anyhow::Result<()> {
        let mut desk = desk()?;
        assert_eq!(desk.current_user().map(|s| s.role), Some(Role::Admin));

        let session = desk.signup("Bob", "bob@example.org", "pw")?;
        assert_eq!(session.role, Role::Participant);
        assert!(matches!(desk.dashboard(), Err(Error::AccessDenied)));
        Ok(())
    }

    #[test]
    fn logged_out_users_see_nothing() -> anyhow::Result<()> {
        let mut desk = desk()?;
        desk.logout();

        assert!(desk.current_user().is_none());
        assert!(matches!(desk.register(solo("Ada")), Err(Error::NotLoggedIn)));
        assert!(matches!(desk.filter(""), Err(Error::NotLoggedIn)));
        assert!(matches!(desk.dashboard(), Err(Error::NotLoggedIn)));
        Ok(())
    }

    #[test]
    fn edit_mode() -> anyhow::Result<()> {
        let mut desk = desk()?;
        let ada = desk.register(solo("Ada"))?;
        desk.toggle_attendance(&ada.id)?;

        let form = desk.begin_edit(&ada.id)?;
        assert_eq!(form, solo("Ada"));
        assert_eq!(desk.editing(), Some(ada.id.as_str()));

        // A bad submission keeps edit mode.
        assert!(desk.submit(solo(" ")).is_err());
        assert_eq!(desk.editing(), Some(ada.id.as_str()));

        let edited = desk.submit(Entry::Team {
            team_name: "Analytical".to_string(),
            members: vec![Member::new("Ada", "", ""), Member::new("Charles", "", "")],
        })?;

        assert_eq!(desk.editing(), None);
        assert_eq!(edited.id, ada.id);
        assert!(edited.present);
        assert_eq!(edited.registered_at, ada.registered_at);
        assert_eq!(desk.participants()?.0.len(), 1);

        let bob = desk.submit(solo("Bob"))?;
        assert_ne!(bob.id, ada.id);
        assert_eq!(desk.participants()?.0.len(), 2);
        Ok(())
    }

    #[test]
    fn deleting_the_edited_record_ends_edit_mode() -> anyhow::Result<()> {
        let mut desk = desk()?;
        let ada = desk.register(solo("Ada"))?;
        desk.begin_edit(&ada.id)?;

        desk.delete(&ada.id)?;
        assert_eq!(desk.editing(), None);
        assert!(matches!(
            desk.delete(&ada.id),
            Err(Error::UnknownParticipant(_))
        ));
        Ok(())
    }

    #[test]
    fn every_change_is_saved() -> anyhow::Result<()> {
        let mut desk = desk()?;
        let ada = desk.register(solo("Ada"))?;
        desk.toggle_attendance(&ada.id)?;
        desk.toggle_theme();

        let storage = desk.into_storage();
        let state = AppState::load(&storage);

        assert_eq!(state.participants.0.len(), 1);
        assert!(state.participants.0[0].present);
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.users.0.len(), 1);
        assert!(state.session.is_some());
        Ok(())
    }

    #[test]
    fn check_in_is_idempotent() -> anyhow::Result<()> {
        let mut desk = desk()?;
        let ada = desk.register(solo("Ada"))?;
        let payload = desk.qr_payload(&ada.id)?;

        assert!(desk.check_in(&payload)?.present);
        assert!(desk.check_in(&payload)?.present);
        assert!(matches!(desk.check_in("{}"), Err(Error::InvalidQr)));
        Ok(())
    }
}
