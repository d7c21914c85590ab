//! Wire shapes shared by the apps and the settings service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_level() -> i32 {
    -1
}

/// Per-user persistent settings record, as exchanged with the settings service.
///
/// `level` is an index into the ordered belt table; -1 means no belt. A record
/// is created on first fetch, updated on explicit save, and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shirt: Option<String>,
    #[serde(default = "default_level")]
    pub level: i32,
}

impl UserSettings {
    /// Default record for a user with nothing persisted yet.
    pub fn for_user(id: Uuid, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            shirt: None,
            level: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_unassigned() {
        let id = Uuid::new_v4();
        let settings: UserSettings =
            serde_json::from_str(&format!(r#"{{"id":"{id}"}}"#)).unwrap();
        assert_eq!(settings.id, id);
        assert_eq!(settings.name, None);
        assert_eq!(settings.shirt, None);
        assert_eq!(settings.level, -1);
    }

    #[test]
    fn round_trips_through_json() {
        let settings = UserSettings {
            id: Uuid::new_v4(),
            name: Some("Sensei".into()),
            shirt: Some("red".into()),
            level: 2,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: UserSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
