//! Belt controller: rank navigation over the ordered belt table.
//!
//! Levels index the belt table in `order`-field order; -1 means no belt.
//! Navigation past either end is clamped and logged, never an error. The
//! upper clamp uses `level >= belts.len()`: an increment at the top holds the
//! level at the last valid index without re-wearing the same belt.

use async_trait::async_trait;
use dojo_common::{
    log_user, AppContext, AssetLoader, HostUser, Menu, OutfitApp, Vec3, BELTS, TRANSFORMS,
};
use tracing::warn;

const MENU_ANCHOR_X: f32 = 4.0;
const MENU_ANCHOR_Y: f32 = 2.5;

pub struct BeltApp;

#[async_trait]
impl OutfitApp for BeltApp {
    fn name(&self) -> &str {
        "dojo-belts"
    }

    async fn preload(&self, assets: &AssetLoader) {
        assets
            .preload(
                BELTS
                    .belts
                    .iter()
                    .map(|(id, belt)| (id.clone(), belt.resource_name.clone())),
            )
            .await;
    }

    fn build_menu(&self) -> Menu {
        Menu::new("Belt Rewards")
            .button(
                "levelUp",
                "Level Up",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y, 0.0),
            )
            .button(
                "levelDown",
                "Level Down",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y - 0.5, 0.0),
            )
            .button(
                "cleanLevel",
                "Clear",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y - 1.0, 0.0),
            )
            .button(
                "saveBeltSettings",
                "Save Belt Settings",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y - 2.0, 0.0),
            )
    }

    async fn init_session(&self, cx: &AppContext, user: &HostUser) {
        let level = cx
            .sessions
            .settings(user.id)
            .map(|s| s.level)
            .unwrap_or(-1);
        if let Some(key) = BELTS.key_for_level(level) {
            log_user(user, &format!("initializing belt: {key}"));
            wear_belt(cx, user, key, level);
        }
    }

    async fn close_session(&self, cx: &AppContext, user: &HostUser) {
        cx.save_user_settings(user, false, true).await;
        remove_belt(cx, user);
    }

    async fn on_button(&self, cx: &AppContext, user: &HostUser, button: &str) {
        match button {
            "levelUp" => increment_level(cx, user, 1),
            "levelDown" => increment_level(cx, user, -1),
            "cleanLevel" => {
                remove_belt(cx, user);
                cx.sessions.update(user.id, |r| r.settings.level = -1);
            }
            "saveBeltSettings" => {
                let saved = cx.save_user_settings(user, false, true).await;
                let message = if saved.is_some() {
                    "Settings Saved"
                } else {
                    "Save failed"
                };
                cx.host.prompt(user, message, false).await;
            }
            other => {
                warn!(target: "dojo::belts", button = other, "unknown button");
            }
        }
    }
}

/// Moves the user's level by `delta`, clamped to `[-1, belts.len() - 1]`.
fn increment_level(cx: &AppContext, user: &HostUser, delta: i32) {
    let current = cx
        .sessions
        .settings(user.id)
        .map(|s| s.level)
        .unwrap_or(-1);
    let max = BELTS.len() as i32 - 1;
    let mut level = current + delta;

    if level < 0 {
        log_user(user, &format!("min level reached: {level}"));
        remove_belt(cx, user);
        level = -1;
    } else if level > max {
        log_user(user, &format!("max level reached: {level}"));
        level = max;
        // Already wearing the top belt: hold the level, skip the swap.
        if level != current {
            if let Some(key) = BELTS.key_for_level(level) {
                wear_belt(cx, user, key, level);
            }
        }
    } else {
        log_user(user, &format!("setting user level: {level}"));
        if let Some(key) = BELTS.key_for_level(level) {
            wear_belt(cx, user, key, level);
        }
    }

    cx.sessions.update(user.id, |r| r.settings.level = level);
}

/// Destroys any worn belt, instantiates the new one from the prefab table,
/// and records the level.
fn wear_belt(cx: &AppContext, user: &HostUser, key: &str, level: i32) {
    let Some(transform) = TRANSFORMS.get(&BELTS.transform) else {
        warn!(target: "dojo::belts", transform = %BELTS.transform, "belt transform missing");
        return;
    };
    let Some(prefab) = cx.assets.prefab(key) else {
        // Preload failed for this belt; degrade to no visible change.
        warn!(target: "dojo::belts", belt = key, "no prefab loaded for belt");
        return;
    };

    log_user(user, &format!("assigning belt id: {key}"));
    remove_belt(cx, user);

    match cx.host.attach(user.id, &prefab, transform) {
        Ok(attachment) => {
            cx.sessions.set_belt(user.id, attachment);
            cx.sessions.update(user.id, |r| r.settings.level = level);
        }
        Err(e) => {
            warn!(target: "dojo::belts", belt = key, error = %e, "belt attach failed");
        }
    }
}

fn remove_belt(cx: &AppContext, user: &HostUser) {
    log_user(user, "removing belt");
    if let Some(attachment) = cx.sessions.take_belt(user.id) {
        cx.host.detach(&attachment);
    }
}
