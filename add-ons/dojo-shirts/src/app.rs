//! Shirt controller: one menu button per catalog entry.
//!
//! Selecting a shirt destroys the current one first, so at most one shirt is
//! ever bound to an avatar. The "none" entry has an empty resource and only
//! clears.

use async_trait::async_trait;
use dojo_common::{
    log_user, AppContext, AssetLoader, HostUser, Menu, OutfitApp, Vec3, SHIRTS, TRANSFORMS,
};
use tracing::warn;

pub struct ShirtApp;

#[async_trait]
impl OutfitApp for ShirtApp {
    fn name(&self) -> &str {
        "dojo-shirts"
    }

    async fn preload(&self, assets: &AssetLoader) {
        assets
            .preload(SHIRTS.iter().filter_map(|(id, shirt)| {
                if shirt.resource_name.is_empty() {
                    None
                } else {
                    Some((id.clone(), shirt.resource_name.clone()))
                }
            }))
            .await;
    }

    fn build_menu(&self) -> Menu {
        let mut menu = Menu::new("Wear a Shirt");
        let mut y = 0.3;
        let mut ids: Vec<&String> = SHIRTS.keys().collect();
        ids.sort();
        for id in ids {
            menu = menu.button(id, &SHIRTS[id].display_name, Vec3::new(0.0, y, 0.0));
            y += 0.5;
        }
        menu.button("saveShirtSettings", "Save Shirt Settings", Vec3::new(0.0, y, 0.0))
    }

    async fn init_session(&self, cx: &AppContext, user: &HostUser) {
        let persisted = cx.sessions.settings(user.id).and_then(|s| s.shirt);
        if let Some(shirt) = persisted {
            log_user(user, &format!("initializing shirt: {shirt}"));
            wear_shirt(cx, user, &shirt);
        }
    }

    async fn close_session(&self, cx: &AppContext, user: &HostUser) {
        cx.save_user_settings(user, true, false).await;
        remove_shirt(cx, user);
    }

    async fn on_button(&self, cx: &AppContext, user: &HostUser, button: &str) {
        if button == "saveShirtSettings" {
            let saved = cx.save_user_settings(user, true, false).await;
            let message = if saved.is_some() {
                "Settings Saved"
            } else {
                "Save failed"
            };
            cx.host.prompt(user, message, false).await;
            return;
        }

        if SHIRTS.contains_key(button) {
            wear_shirt(cx, user, button);
        } else {
            warn!(target: "dojo::shirts", button, "unknown button");
        }
    }
}

/// Destroys the current shirt and, unless the entry is "none", instantiates
/// the selected one and records it in the runtime settings.
fn wear_shirt(cx: &AppContext, user: &HostUser, id: &str) {
    let Some(record) = SHIRTS.get(id) else {
        warn!(target: "dojo::shirts", shirt = id, "unknown shirt id");
        return;
    };

    if record.resource_name.is_empty() {
        remove_shirt(cx, user);
        cx.sessions.update(user.id, |r| r.settings.shirt = None);
        return;
    }

    // Resolve everything before destroying the current shirt, so a failed
    // lookup leaves the user wearing what they already had.
    let Some(transform) = TRANSFORMS.get(&record.transform) else {
        warn!(target: "dojo::shirts", transform = %record.transform, "shirt transform missing");
        return;
    };
    let Some(prefab) = cx.assets.prefab(id) else {
        warn!(target: "dojo::shirts", shirt = id, "no prefab loaded for shirt");
        return;
    };

    remove_shirt(cx, user);
    log_user(user, &format!("assigning shirt id: {id}"));
    match cx.host.attach(user.id, &prefab, transform) {
        Ok(attachment) => {
            cx.sessions.set_shirt(user.id, attachment);
            cx.sessions
                .update(user.id, |r| r.settings.shirt = Some(id.to_string()));
        }
        Err(e) => {
            warn!(target: "dojo::shirts", shirt = id, error = %e, "shirt attach failed");
        }
    }
}

fn remove_shirt(cx: &AppContext, user: &HostUser) {
    if let Some(attachment) = cx.sessions.take_shirt(user.id) {
        cx.host.detach(&attachment);
    }
}
