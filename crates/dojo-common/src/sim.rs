//! In-memory host implementation.
//!
//! Stands in for the real mixed-reality host in the demo binaries and in
//! tests: records loaded models, tracks live attachments per user, and
//! captures prompts and played sounds so tests can assert on them.

use crate::data::TransformDescriptor;
use crate::error::{DojoError, DojoResult};
use crate::host::{Attachment, AvatarHost, HostUser, Menu, Prefab};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// A live attachment as tracked by the sim host.
#[derive(Debug, Clone)]
pub struct SimAttachment {
    pub user: Uuid,
    pub resource: String,
}

/// In-memory [`AvatarHost`]. Construct with [`SimHost::new`], then configure
/// failures or prompt replies with the builder methods.
#[derive(Default)]
pub struct SimHost {
    failing_resources: HashSet<String>,
    prompt_reply: Option<String>,
    loaded: Mutex<Vec<String>>,
    attachments: DashMap<Uuid, SimAttachment>,
    attach_calls: AtomicUsize,
    prompts: Mutex<Vec<(Uuid, String)>>,
    sounds: Mutex<Vec<String>>,
    menus: Mutex<Vec<Menu>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any `load_model` call for this resource will fail.
    pub fn with_failing_resource(mut self, resource: &str) -> Self {
        self.failing_resources.insert(resource.to_string());
        self
    }

    /// Input prompts resolve to this text instead of `None`.
    pub fn with_prompt_reply(mut self, reply: &str) -> Self {
        self.prompt_reply = Some(reply.to_string());
        self
    }

    /// Resources of the attachments currently live on the user's avatar.
    pub fn live_attachments(&self, user: Uuid) -> Vec<String> {
        self.attachments
            .iter()
            .filter(|entry| entry.value().user == user)
            .map(|entry| entry.value().resource.clone())
            .collect()
    }

    /// Total number of `attach` calls made so far.
    pub fn attach_count(&self) -> usize {
        self.attach_calls.load(Ordering::Relaxed)
    }

    /// All prompt messages shown, in order.
    pub fn prompts_shown(&self) -> Vec<(Uuid, String)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// All sound URIs played, in order.
    pub fn sounds_played(&self) -> Vec<String> {
        self.sounds.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Resources successfully loaded, in completion order.
    pub fn loaded_resources(&self) -> Vec<String> {
        self.loaded.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of menus shown (the driver shows exactly one).
    pub fn menus_shown(&self) -> usize {
        self.menus.lock().map(|m| m.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AvatarHost for SimHost {
    async fn load_model(&self, resource: &str) -> DojoResult<Prefab> {
        if self.failing_resources.contains(resource) {
            return Err(DojoError::AssetLoad(format!(
                "simulated load failure for {resource}"
            )));
        }
        if let Ok(mut loaded) = self.loaded.lock() {
            loaded.push(resource.to_string());
        }
        Ok(Prefab {
            id: Uuid::new_v4(),
            resource: resource.to_string(),
        })
    }

    fn attach(
        &self,
        user: Uuid,
        prefab: &Prefab,
        _transform: &TransformDescriptor,
    ) -> DojoResult<Attachment> {
        let attachment = Attachment { id: Uuid::new_v4() };
        self.attachments.insert(
            attachment.id,
            SimAttachment {
                user,
                resource: prefab.resource.clone(),
            },
        );
        self.attach_calls.fetch_add(1, Ordering::Relaxed);
        Ok(attachment)
    }

    fn detach(&self, attachment: &Attachment) {
        self.attachments.remove(&attachment.id);
    }

    fn show_menu(&self, menu: &Menu) {
        debug!(target: "dojo::sim", buttons = menu.buttons.len(), "menu shown");
        if let Ok(mut menus) = self.menus.lock() {
            menus.push(menu.clone());
        }
    }

    async fn prompt(
        &self,
        user: &HostUser,
        message: &str,
        expect_response: bool,
    ) -> Option<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((user.id, message.to_string()));
        }
        if expect_response {
            self.prompt_reply.clone()
        } else {
            None
        }
    }

    async fn play_sound(&self, uri: &str) -> DojoResult<()> {
        if let Ok(mut sounds) = self.sounds.lock() {
            sounds.push(uri.to_string());
        }
        Ok(())
    }
}
