//! Shared plumbing for the dojo avatar apps.
//!
//! The host runtime is reached only through the [`host::AvatarHost`] trait;
//! everything else — asset preloading, the per-user session registry, the
//! settings client, and the app lifecycle driver — lives here and is composed
//! per app variant via [`app::OutfitApp`].

pub mod app;
pub mod assets;
pub mod config;
pub mod data;
pub mod error;
pub mod host;
pub mod session;
pub mod settings;
pub mod sim;
pub mod types;

pub use app::{merge_for_save, AppContext, AppDriver, OutfitApp};
pub use assets::AssetLoader;
pub use config::AppConfig;
pub use data::{BeltsDb, ShirtDescriptor, TransformDescriptor, BELTS, SHIRTS, TRANSFORMS};
pub use error::{DojoError, DojoResult};
pub use host::{
    log_user, Attachment, AvatarHost, HostEvent, HostUser, Menu, MenuButton, Prefab, Vec3,
};
pub use session::{RuntimeUserSettings, SessionRegistry};
pub use settings::{HttpSettingsClient, MemorySettings, SettingsStore, FUNCTIONS_KEY_HEADER};
pub use sim::SimHost;
pub use types::UserSettings;
