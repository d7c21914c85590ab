//! Asset preloading: maps logical asset ids to prefab handles.
//!
//! Bulk preloading fans out all loads concurrently and joins on the whole
//! batch; a single failure is logged and leaves that one handle unset without
//! aborting sibling loads. No timeout or cancellation is applied.

use crate::host::{AvatarHost, Prefab};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Registry of preloaded prefab handles, keyed by logical asset id.
pub struct AssetLoader {
    host: Arc<dyn AvatarHost>,
    prefabs: DashMap<String, Prefab>,
}

impl AssetLoader {
    pub fn new(host: Arc<dyn AvatarHost>) -> Self {
        Self {
            host,
            prefabs: DashMap::new(),
        }
    }

    /// Loads one model bundle and registers its prefab under `id`. Failures
    /// are logged; the handle stays unset and the feature degrades silently.
    pub async fn load(&self, id: &str, resource: &str) {
        info!(target: "dojo::assets", id, resource, "pre-loading asset");
        match self.host.load_model(resource).await {
            Ok(prefab) => {
                info!(target: "dojo::assets", id, "loaded");
                self.prefabs.insert(id.to_string(), prefab);
            }
            Err(e) => {
                warn!(target: "dojo::assets", id, resource, error = %e, "asset load failed");
            }
        }
    }

    /// Preloads a batch of assets concurrently, waiting for every load to
    /// finish before returning.
    pub async fn preload<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        join_all(
            entries
                .into_iter()
                .map(|(id, resource)| async move { self.load(&id, &resource).await }),
        )
        .await;
    }

    /// Handle for a previously loaded asset, if its load succeeded.
    pub fn prefab(&self, id: &str) -> Option<Prefab> {
        self.prefabs.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all registered handles.
    pub fn handles(&self) -> HashMap<String, Prefab> {
        self.prefabs
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
