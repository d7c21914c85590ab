//! Outfit app contract and the shared event driver.
//!
//! Each app variant implements [`OutfitApp`]; the [`AppDriver`] owns the
//! shared lifecycle — preload, menu, per-user join/leave — and feeds host
//! events to the variant one at a time, in arrival order. That sequential
//! delivery is what guarantees a user's join (including the settings fetch and
//! initial outfit) completes before any of their button clicks are handled.

use crate::assets::AssetLoader;
use crate::host::{log_user, AvatarHost, HostEvent, HostUser, Menu};
use crate::session::SessionRegistry;
use crate::settings::SettingsStore;
use crate::types::UserSettings;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Capabilities shared by every handler: the host, the prefab table, the
/// session registry, and the settings backend.
pub struct AppContext {
    pub host: Arc<dyn AvatarHost>,
    pub assets: AssetLoader,
    pub sessions: SessionRegistry,
    pub settings: Arc<dyn SettingsStore>,
}

impl AppContext {
    /// Persists the user's current settings. Excluded pieces are taken from
    /// the join-time snapshot, so a belt-only save never alters the persisted
    /// shirt and vice versa. Returns the server's copy, or `None` when the
    /// save failed or the user has no session.
    pub async fn save_user_settings(
        &self,
        user: &HostUser,
        include_shirt: bool,
        include_belt: bool,
    ) -> Option<UserSettings> {
        let (current, loaded) = self.sessions.save_snapshot(user.id)?;
        let payload = merge_for_save(&current, &loaded, include_shirt, include_belt);
        self.settings.save(&payload).await
    }
}

/// Builds the record to persist from the in-session settings and the
/// join-time snapshot.
pub fn merge_for_save(
    current: &UserSettings,
    loaded: &UserSettings,
    include_shirt: bool,
    include_belt: bool,
) -> UserSettings {
    UserSettings {
        id: current.id,
        name: current.name.clone(),
        shirt: if include_shirt {
            current.shirt.clone()
        } else {
            loaded.shirt.clone()
        },
        level: if include_belt {
            current.level
        } else {
            loaded.level
        },
    }
}

/// Per-variant behavior: which assets to preload, which buttons to show, and
/// what to do on session open/close and button clicks.
#[async_trait]
pub trait OutfitApp: Send + Sync {
    fn name(&self) -> &str;

    /// Preloads this variant's model bundles into the loader.
    async fn preload(&self, assets: &AssetLoader);

    /// The button menu shown once at app start.
    fn build_menu(&self) -> Menu;

    /// Re-applies the user's persisted outfit after their settings are loaded.
    async fn init_session(&self, cx: &AppContext, user: &HostUser);

    /// Persists and tears down before the user's record is removed.
    async fn close_session(&self, cx: &AppContext, user: &HostUser);

    /// Handles one menu button click.
    async fn on_button(&self, cx: &AppContext, user: &HostUser, button: &str);
}

/// Drives an [`OutfitApp`] from a host event stream.
pub struct AppDriver<A: OutfitApp> {
    app: A,
    cx: AppContext,
    started: bool,
}

impl<A: OutfitApp> AppDriver<A> {
    pub fn new(app: A, host: Arc<dyn AvatarHost>, settings: Arc<dyn SettingsStore>) -> Self {
        let assets = AssetLoader::new(host.clone());
        Self {
            app,
            cx: AppContext {
                host,
                assets,
                sessions: SessionRegistry::new(),
                settings,
            },
            started: false,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.cx
    }

    /// Consumes host events until the channel closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!(target: "dojo::app", app = self.app.name(), "host event stream closed");
    }

    /// Handles a single host event to completion.
    pub async fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Started => self.ensure_started().await,
            HostEvent::UserJoined(user) => self.user_joined(user).await,
            HostEvent::UserLeft(user) => self.user_left(user).await,
            HostEvent::ButtonClicked { user, button } => {
                self.app.on_button(&self.cx, &user, &button).await;
            }
        }
    }

    async fn ensure_started(&mut self) {
        if self.started {
            debug!(target: "dojo::app", app = self.app.name(), "already initialized");
            return;
        }
        self.app.preload(&self.cx.assets).await;
        self.cx.host.show_menu(&self.app.build_menu());
        self.started = true;
        info!(target: "dojo::app", app = self.app.name(), "initialized");
    }

    async fn user_joined(&mut self, user: HostUser) {
        log_user(&user, "joined");

        let settings = self
            .cx
            .settings
            .load(&user)
            .await
            .unwrap_or_else(|| UserSettings::for_user(user.id, &user.name));
        self.cx.sessions.insert(&user, settings);

        // A user can join before the host delivers Started.
        self.ensure_started().await;

        self.app.init_session(&self.cx, &user).await;
        self.cx.sessions.set_initialized(user.id);
        log_user(&user, "initialized");
    }

    async fn user_left(&mut self, user: HostUser) {
        self.app.close_session(&self.cx, &user).await;

        // Destroy anything still bound to the avatar; a leftover attachment
        // would be orphaned in the world.
        if let Some(runtime) = self.cx.sessions.remove(user.id) {
            for attachment in runtime.shirt.into_iter().chain(runtime.belt) {
                self.cx.host.detach(&attachment);
            }
        }
        log_user(&user, "session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(shirt: Option<&str>, level: i32) -> UserSettings {
        UserSettings {
            id: Uuid::nil(),
            name: Some("student".into()),
            shirt: shirt.map(String::from),
            level,
        }
    }

    #[test]
    fn belt_only_save_keeps_loaded_shirt() {
        let loaded = record(Some("red"), 0);
        let current = record(Some("blue"), 2);
        let merged = merge_for_save(&current, &loaded, false, true);
        assert_eq!(merged.shirt.as_deref(), Some("red"));
        assert_eq!(merged.level, 2);
    }

    #[test]
    fn shirt_only_save_keeps_loaded_level() {
        let loaded = record(None, 3);
        let current = record(Some("black"), -1);
        let merged = merge_for_save(&current, &loaded, true, false);
        assert_eq!(merged.shirt.as_deref(), Some("black"));
        assert_eq!(merged.level, 3);
    }

    #[test]
    fn full_save_takes_current_values() {
        let loaded = record(Some("red"), 0);
        let current = record(None, 4);
        let merged = merge_for_save(&current, &loaded, true, true);
        assert_eq!(merged.shirt, None);
        assert_eq!(merged.level, 4);
    }
}
