//! Per-connection runtime state.
//!
//! Each connected user has one [`RuntimeUserSettings`] record, created on join
//! and removed on leave. The registry is an explicit object handed to handlers
//! by reference; the host delivers events sequentially, so a record is only
//! ever touched by handlers for its own user.

use crate::host::{Attachment, HostUser};
use crate::types::UserSettings;
use dashmap::DashMap;
use uuid::Uuid;

/// Ephemeral per-user record. `loaded` keeps the settings exactly as fetched
/// at join so selective saves can leave excluded fields untouched. At most one
/// belt and one shirt attachment are live at any time.
#[derive(Debug)]
pub struct RuntimeUserSettings {
    pub initialized: bool,
    pub settings: UserSettings,
    pub loaded: UserSettings,
    pub shirt: Option<Attachment>,
    pub belt: Option<Attachment>,
}

/// Registry of runtime records keyed by user id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, RuntimeUserSettings>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the runtime record for a joining user.
    pub fn insert(&self, user: &HostUser, settings: UserSettings) {
        self.sessions.insert(
            user.id,
            RuntimeUserSettings {
                initialized: false,
                loaded: settings.clone(),
                settings,
                shirt: None,
                belt: None,
            },
        );
    }

    /// Removes the record, handing ownership of any live attachments to the
    /// caller for teardown.
    pub fn remove(&self, user: Uuid) -> Option<RuntimeUserSettings> {
        self.sessions.remove(&user).map(|(_, runtime)| runtime)
    }

    pub fn contains(&self, user: Uuid) -> bool {
        self.sessions.contains_key(&user)
    }

    /// Current settings for a connected user.
    pub fn settings(&self, user: Uuid) -> Option<UserSettings> {
        self.sessions.get(&user).map(|r| r.settings.clone())
    }

    /// Current and join-time settings together, for selective saves.
    pub fn save_snapshot(&self, user: Uuid) -> Option<(UserSettings, UserSettings)> {
        self.sessions
            .get(&user)
            .map(|r| (r.settings.clone(), r.loaded.clone()))
    }

    /// Runs a closure over the user's record. Returns false when the user has
    /// no session.
    pub fn update<F>(&self, user: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut RuntimeUserSettings),
    {
        match self.sessions.get_mut(&user) {
            Some(mut runtime) => {
                f(&mut runtime);
                true
            }
            None => false,
        }
    }

    pub fn set_initialized(&self, user: Uuid) {
        self.update(user, |r| r.initialized = true);
    }

    /// Takes the live belt attachment, if any. The caller becomes responsible
    /// for destroying it.
    pub fn take_belt(&self, user: Uuid) -> Option<Attachment> {
        self.sessions.get_mut(&user).and_then(|mut r| r.belt.take())
    }

    pub fn set_belt(&self, user: Uuid, attachment: Attachment) {
        self.update(user, |r| r.belt = Some(attachment));
    }

    /// Takes the live shirt attachment, if any.
    pub fn take_shirt(&self, user: Uuid) -> Option<Attachment> {
        self.sessions
            .get_mut(&user)
            .and_then(|mut r| r.shirt.take())
    }

    pub fn set_shirt(&self, user: Uuid, attachment: Attachment) {
        self.update(user, |r| r.shirt = Some(attachment));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> HostUser {
        HostUser::new("student")
    }

    #[test]
    fn join_then_leave_round_trip() {
        let registry = SessionRegistry::new();
        let user = user();
        registry.insert(&user, UserSettings::for_user(user.id, &user.name));
        assert!(registry.contains(user.id));
        assert_eq!(registry.settings(user.id).unwrap().level, -1);

        let runtime = registry.remove(user.id).unwrap();
        assert!(!runtime.initialized);
        assert!(registry.is_empty());
    }

    #[test]
    fn take_belt_leaves_record_in_place() {
        let registry = SessionRegistry::new();
        let user = user();
        registry.insert(&user, UserSettings::for_user(user.id, &user.name));
        registry.set_belt(user.id, Attachment { id: Uuid::new_v4() });

        assert!(registry.take_belt(user.id).is_some());
        assert!(registry.take_belt(user.id).is_none());
        assert!(registry.contains(user.id));
    }

    #[test]
    fn update_mutates_settings_only_for_known_users() {
        let registry = SessionRegistry::new();
        let user = user();
        registry.insert(&user, UserSettings::for_user(user.id, &user.name));

        assert!(registry.update(user.id, |r| r.settings.level = 2));
        assert_eq!(registry.settings(user.id).unwrap().level, 2);
        assert!(!registry.update(Uuid::new_v4(), |r| r.settings.level = 5));
    }
}
