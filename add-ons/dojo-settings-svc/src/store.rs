//! Sled-backed user settings table.
//!
//! Records are keyed `{partition}/{row}`: the partition is the first letter of
//! the lower-cased display name (`_` when absent), the row is the user id.
//! Lookups are by id, so a fetch scans for a matching row key. An update keeps
//! the record under its original partition even after a rename.

use chrono::{DateTime, Utc};
use dojo_common::UserSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),
    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A settings record as it sits in the table, with its table coordinates and
/// last-write timestamp alongside the wire fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSettings {
    pub partition_key: String,
    pub row_key: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub settings: UserSettings,
}

/// First letter of the lower-cased name, `_` when there is none.
fn partition_for(name: Option<&str>) -> String {
    name.and_then(|n| n.trim().chars().next())
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_else(|| "_".to_string())
}

pub struct SettingsTable {
    db: sled::Db,
}

impl SettingsTable {
    pub fn open(path: &str) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn write(&self, stored: &StoredSettings) -> StoreResult<()> {
        let key = format!("{}/{}", stored.partition_key, stored.row_key);
        let value = serde_json::to_vec(stored)?;
        self.db.insert(key.as_bytes(), value)?;
        self.db.flush()?;
        Ok(())
    }

    /// Finds a record by user id, whatever partition it lives under.
    pub fn find(&self, id: Uuid) -> StoreResult<Option<StoredSettings>> {
        let row = id.to_string();
        for entry in self.db.iter() {
            let (key, value) = entry?;
            let key = String::from_utf8_lossy(&key);
            if key.split('/').nth(1) == Some(row.as_str()) {
                return Ok(Some(serde_json::from_slice(&value)?));
            }
        }
        Ok(None)
    }

    /// Fetches the record for `id`, creating a default one on first fetch.
    pub fn get_or_create(&self, id: Uuid) -> StoreResult<StoredSettings> {
        if let Some(existing) = self.find(id)? {
            return Ok(existing);
        }
        let stored = StoredSettings {
            partition_key: partition_for(None),
            row_key: id.to_string(),
            timestamp: Utc::now(),
            settings: UserSettings {
                id,
                name: None,
                shirt: None,
                level: -1,
            },
        };
        debug!(target: "dojo::settings_svc", user_id = %id, "creating settings record");
        self.write(&stored)?;
        Ok(stored)
    }

    /// Inserts or replaces the record for `settings.id`. Existing records stay
    /// under the partition they were first written to.
    pub fn upsert(&self, settings: UserSettings) -> StoreResult<StoredSettings> {
        let stored = match self.find(settings.id)? {
            Some(mut existing) => {
                existing.settings = settings;
                existing.timestamp = Utc::now();
                existing
            }
            None => StoredSettings {
                partition_key: partition_for(settings.name.as_deref()),
                row_key: settings.id.to_string(),
                timestamp: Utc::now(),
                settings,
            },
        };
        self.write(&stored)?;
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (SettingsTable, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let table = SettingsTable::open(dir.path().to_str().unwrap()).unwrap();
        (table, dir)
    }

    #[test]
    fn partitions_by_first_letter_of_lowercased_name() {
        assert_eq!(partition_for(Some("Sensei")), "s");
        assert_eq!(partition_for(Some("  kai")), "k");
        assert_eq!(partition_for(Some("")), "_");
        assert_eq!(partition_for(None), "_");
    }

    #[test]
    fn first_fetch_creates_a_default_record() {
        let (table, _dir) = table();
        let id = Uuid::new_v4();

        let stored = table.get_or_create(id).unwrap();
        assert_eq!(stored.settings.level, -1);
        assert_eq!(stored.settings.shirt, None);
        assert_eq!(stored.partition_key, "_");
        assert_eq!(table.len(), 1);

        // Second fetch returns the same record, not a new one.
        let again = table.get_or_create(id).unwrap();
        assert_eq!(again.row_key, stored.row_key);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn upsert_then_find_round_trips_the_wire_fields() {
        let (table, _dir) = table();
        let settings = UserSettings {
            id: Uuid::new_v4(),
            name: Some("Sensei".into()),
            shirt: Some("red".into()),
            level: 3,
        };

        table.upsert(settings.clone()).unwrap();
        let found = table.find(settings.id).unwrap().unwrap();
        assert_eq!(found.settings, settings);
        assert_eq!(found.partition_key, "s");
    }

    #[test]
    fn rename_keeps_the_original_partition() {
        let (table, _dir) = table();
        let mut settings = UserSettings {
            id: Uuid::new_v4(),
            name: Some("Sensei".into()),
            shirt: None,
            level: 0,
        };
        table.upsert(settings.clone()).unwrap();

        settings.name = Some("Apprentice".into());
        let updated = table.upsert(settings.clone()).unwrap();

        assert_eq!(updated.partition_key, "s");
        assert_eq!(updated.settings.name.as_deref(), Some("Apprentice"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn saving_a_freshly_fetched_record_changes_only_the_timestamp() {
        let (table, _dir) = table();
        let id = Uuid::new_v4();
        let loaded = table.get_or_create(id).unwrap();

        let saved = table.upsert(loaded.settings.clone()).unwrap();

        assert_eq!(saved.settings, loaded.settings);
        assert_eq!(saved.partition_key, loaded.partition_key);
        assert_eq!(saved.row_key, loaded.row_key);
        assert!(saved.timestamp >= loaded.timestamp);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn upsert_refreshes_the_timestamp() {
        let (table, _dir) = table();
        let settings = UserSettings {
            id: Uuid::new_v4(),
            name: Some("Kai".into()),
            shirt: None,
            level: 1,
        };
        let first = table.upsert(settings.clone()).unwrap();
        let second = table.upsert(settings).unwrap();
        assert!(second.timestamp >= first.timestamp);
    }
}
