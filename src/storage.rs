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

use std::{
    collections::HashMap,
    fs,
    io::{self, ErrorKind},
    path::PathBuf,
};

use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Error;

pub const SCHEMA_VERSION: u32 = 1;

pub const SETTINGS_KEY: &str = "event_desk_settings";
pub const PARTICIPANTS_KEY: &str = "event_desk_participants";
pub const USERS_KEY: &str = "event_desk_users";
pub const SESSION_KEY: &str = "event_desk_session";
pub const THEME_KEY: &str = "event_desk_theme";

/// A string key/value store shaped like the browser's local storage.
pub trait Storage {
    /// # Errors
    ///
    /// If the backing store can't be read.
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    /// # Errors
    ///
    /// If the backing store can't be written.
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// # Errors
    ///
    /// If the backing store can't be written.
    fn remove_item(&mut self, key: &str) -> io::Result<()>;
}

/// Keeps every key in `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct DataDir {
    dir: PathBuf,
}

impl DataDir {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for DataDir {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(string) => Ok(Some(string)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove_item(&mut self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(pub HashMap<String, String>);

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.0.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> io::Result<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// A value that can be kept under a storage key.
pub trait Record: Serialize + DeserializeOwned {
    /// # Errors
    ///
    /// If the value breaks an invariant of its type.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Record> Record for Option<T> {
    fn validate(&self) -> Result<(), Error> {
        match self {
            Some(value) => value.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    data: serde_json::Value,
}

fn parse<T: Record>(key: &str, string: &str) -> Option<T> {
    let value: serde_json::Value = match serde_json::from_str(string) {
        Ok(value) => value,
        Err(error) => {
            warn!("storage: {key}: {error}");
            return None;
        }
    };

    let record = match serde_json::from_value::<Envelope>(value.clone()) {
        Ok(Envelope { version, data }) if version == SCHEMA_VERSION => {
            serde_json::from_value::<T>(data)
        }
        Ok(Envelope { version, .. }) => {
            warn!("storage: {key}: unknown schema version {version}");
            return None;
        }
        Err(_) => {
            debug!("storage: {key}: migrating an unversioned record");
            serde_json::from_value::<T>(value)
        }
    };

    match record {
        Ok(record) => match record.validate() {
            Ok(()) => Some(record),
            Err(error) => {
                warn!("storage: {key}: {error}");
                None
            }
        },
        Err(error) => {
            warn!("storage: {key}: {error}");
            None
        }
    }
}

/// Reads `key`, falling back on a missing key and on anything that fails to
/// parse or validate.
pub fn load<S: Storage + ?Sized, T: Record>(storage: &S, key: &str, fallback: T) -> T {
    match storage.get_item(key) {
        Ok(Some(string)) => parse(key, &string).unwrap_or(fallback),
        Ok(None) => fallback,
        Err(error) => {
            warn!("storage: {key}: {error}");
            fallback
        }
    }
}

/// Writes `value` under `key`. Failures are logged and reported as `false`.
pub fn save<S: Storage + ?Sized, T: Record>(storage: &mut S, key: &str, value: &T) -> bool {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        data: value,
    };

    let string = match serde_json::to_string(&envelope) {
        Ok(string) => string,
        Err(error) => {
            warn!("storage: {key}: {error}");
            return false;
        }
    };

    match storage.set_item(key, &string) {
        Ok(()) => true,
        Err(error) => {
            warn!("storage: {key}: {error}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Counter {
        count: u32,
    }

    impl Record for Counter {
        fn validate(&self) -> Result<(), Error> {
            if self.count > 10 {
                return Err(Error::InvalidSettings("count".to_string()));
            }
            Ok(())
        }
    }

    struct Broken;

    impl Storage for Broken {
        fn get_item(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("unreadable"))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::other("read only"))
        }

        fn remove_item(&mut self, _key: &str) -> io::Result<()> {
            Err(io::Error::other("read only"))
        }
    }

    #[test]
    fn storage_errors_are_not_fatal() {
        let mut storage = Broken;
        assert_eq!(load(&storage, "k", Counter { count: 3 }), Counter { count: 3 });
        assert!(!save(&mut storage, "k", &Counter { count: 4 }));
    }

    #[test]
    fn missing_key_falls_back() {
        let storage = MemoryStorage::default();
        assert_eq!(load(&storage, "k", Counter { count: 3 }), Counter { count: 3 });
    }

    #[test]
    fn saved_value_is_wrapped_in_an_envelope() {
        let mut storage = MemoryStorage::default();
        assert!(save(&mut storage, "k", &Counter { count: 7 }));

        let string = storage.get_item("k").unwrap().unwrap();
        assert_eq!(string, r#"{"version":1,"data":{"count":7}}"#);
        assert_eq!(load(&storage, "k", Counter { count: 0 }), Counter { count: 7 });
    }

    #[test]
    fn garbage_falls_back() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", "{not json").unwrap();
        assert_eq!(load(&storage, "k", Counter { count: 1 }), Counter { count: 1 });

        storage.set_item("k", r#"{"count":"seven"}"#).unwrap();
        assert_eq!(load(&storage, "k", Counter { count: 1 }), Counter { count: 1 });
    }

    #[test]
    fn unversioned_records_are_migrated() {
        let mut storage = MemoryStorage::default();
        storage.set_item("k", r#"{"count":4}"#).unwrap();
        assert_eq!(load(&storage, "k", Counter { count: 0 }), Counter { count: 4 });
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let mut storage = MemoryStorage::default();
        storage
            .set_item("k", r#"{"version":2,"data":{"count":4}}"#)
            .unwrap();
        assert_eq!(load(&storage, "k", Counter { count: 0 }), Counter { count: 0 });
    }

    #[test]
    fn invalid_records_are_rejected() {
        let mut storage = MemoryStorage::default();
        storage
            .set_item("k", r#"{"version":1,"data":{"count":40}}"#)
            .unwrap();
        assert_eq!(load(&storage, "k", Counter { count: 2 }), Counter { count: 2 });
    }

    #[test]
    fn data_dir_round_trips() {
        let dir = std::env::temp_dir().join(format!("event-desk-{:x}", rand::random::<u64>()));
        let mut storage = DataDir::new(&dir);

        assert_eq!(storage.get_item("k").unwrap(), None);
        assert!(save(&mut storage, "k", &Counter { count: 9 }));
        assert!(dir.join("k.json").exists());
        assert_eq!(load(&storage, "k", Counter { count: 0 }), Counter { count: 9 });

        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);

        fs::remove_dir_all(dir).unwrap();
    }
}
