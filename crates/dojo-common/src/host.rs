//! Host-runtime boundary.
//!
//! The mixed-reality host owns rendering, transport, and session delivery; the
//! apps only see it through [`AvatarHost`] plus a sequential stream of
//! [`HostEvent`]s. The host delivers one event at a time per app instance, so a
//! user's join handler always completes before that user's button clicks.

use crate::error::DojoResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// A connected user, as reported by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUser {
    pub id: Uuid,
    pub name: String,
}

impl HostUser {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}

/// Lifecycle and interaction events emitted by the host runtime.
#[derive(Debug, Clone)]
pub enum HostEvent {
    Started,
    UserJoined(HostUser),
    UserLeft(HostUser),
    ButtonClicked { user: HostUser, button: String },
}

/// Handle to a loaded model bundle, used to instantiate attachments cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    pub id: Uuid,
    pub resource: String,
}

/// Handle to a 3D object instantiated on a user's avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Uuid,
}

/// A point or scale in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One clickable menu entry. Clicks come back as [`HostEvent::ButtonClicked`]
/// carrying `name`.
#[derive(Debug, Clone)]
pub struct MenuButton {
    pub name: String,
    pub label: String,
    pub position: Vec3,
}

/// Declarative button menu shown once at app start.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    pub title: Option<String>,
    pub buttons: Vec<MenuButton>,
}

impl Menu {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            buttons: Vec::new(),
        }
    }

    pub fn button(mut self, name: &str, label: &str, position: Vec3) -> Self {
        self.buttons.push(MenuButton {
            name: name.to_string(),
            label: label.to_string(),
            position,
        });
        self
    }
}

/// Capabilities the host runtime exposes to an app: model loading, avatar
/// attachment, menus, prompts, and sound playback.
#[async_trait]
pub trait AvatarHost: Send + Sync {
    /// Load a model bundle and return a prefab handle for later instantiation.
    async fn load_model(&self, resource: &str) -> DojoResult<Prefab>;

    /// Instantiate a prefab and bind it to the user's avatar at the named
    /// transform.
    fn attach(
        &self,
        user: Uuid,
        prefab: &Prefab,
        transform: &crate::data::TransformDescriptor,
    ) -> DojoResult<Attachment>;

    /// Destroy a live attachment.
    fn detach(&self, attachment: &Attachment);

    /// Show the app's button menu.
    fn show_menu(&self, menu: &Menu);

    /// Show a modal prompt to the user. With `expect_response` the returned
    /// value is the submitted text; `None` means dismissed or no input.
    async fn prompt(&self, user: &HostUser, message: &str, expect_response: bool)
        -> Option<String>;

    /// Create and start a sound from the given URI.
    async fn play_sound(&self, uri: &str) -> DojoResult<()>;
}

/// Logs a user activity line with structured identity fields.
pub fn log_user(user: &HostUser, msg: &str) {
    info!(target: "dojo::user", user_id = %user.id, user_name = %user.name, "{}", msg);
}
