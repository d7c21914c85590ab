//! Lifecycle tests for the shared app driver: join/leave flow, settings
//! fallback, idempotent startup, and orphaned-attachment cleanup.

use async_trait::async_trait;
use dojo_common::{
    AppContext, AppDriver, AssetLoader, HostEvent, HostUser, Menu, MemorySettings, OutfitApp,
    SettingsStore, SimHost, UserSettings, Vec3, SHIRTS, TRANSFORMS,
};
use std::sync::Arc;

/// Minimal variant: wears the red shirt on demand and never cleans up after
/// itself, so the driver's teardown path gets exercised.
struct TestApp;

#[async_trait]
impl OutfitApp for TestApp {
    fn name(&self) -> &str {
        "test-app"
    }

    async fn preload(&self, assets: &AssetLoader) {
        let resource = SHIRTS["red"].resource_name.clone();
        assets.preload([("red".to_string(), resource)]).await;
    }

    fn build_menu(&self) -> Menu {
        Menu::new("Test").button("wear", "Wear", Vec3::default())
    }

    async fn init_session(&self, cx: &AppContext, user: &HostUser) {
        let persisted = cx.sessions.settings(user.id).and_then(|s| s.shirt);
        if persisted.as_deref() == Some("red") {
            self.wear(cx, user);
        }
    }

    async fn close_session(&self, _cx: &AppContext, _user: &HostUser) {}

    async fn on_button(&self, cx: &AppContext, user: &HostUser, button: &str) {
        if button == "wear" {
            self.wear(cx, user);
            cx.sessions
                .update(user.id, |r| r.settings.shirt = Some("red".into()));
        }
    }
}

impl TestApp {
    fn wear(&self, cx: &AppContext, user: &HostUser) {
        let prefab = cx.assets.prefab("red").expect("red shirt preloaded");
        let transform = &TRANSFORMS["shirt"];
        if let Some(prior) = cx.sessions.take_shirt(user.id) {
            cx.host.detach(&prior);
        }
        let attachment = cx.host.attach(user.id, &prefab, transform).unwrap();
        cx.sessions.set_shirt(user.id, attachment);
    }
}

fn driver_with(settings: Arc<dyn SettingsStore>) -> (AppDriver<TestApp>, Arc<SimHost>) {
    let host = Arc::new(SimHost::new());
    (AppDriver::new(TestApp, host.clone(), settings), host)
}

#[tokio::test]
async fn join_creates_session_and_applies_persisted_shirt() {
    let user = HostUser::new("Student");
    let persisted = UserSettings {
        id: user.id,
        name: None,
        shirt: Some("red".into()),
        level: 1,
    };
    let settings = Arc::new(MemorySettings::new().with_record(persisted));
    let (mut driver, host) = driver_with(settings);

    driver.handle(HostEvent::UserJoined(user.clone())).await;

    let cx = driver.context();
    let session = cx.sessions.settings(user.id).unwrap();
    assert_eq!(session.shirt.as_deref(), Some("red"));
    assert_eq!(session.level, 1);
    // Display name was absent in the persisted record, so it comes from the session.
    assert_eq!(session.name.as_deref(), Some("Student"));
    assert_eq!(
        host.live_attachments(user.id),
        vec![SHIRTS["red"].resource_name.clone()]
    );
    // Joining before Started still brings the app up exactly once.
    assert_eq!(host.menus_shown(), 1);
}

#[tokio::test]
async fn unreachable_settings_fall_back_to_defaults() {
    let user = HostUser::new("Student");
    let (mut driver, host) = driver_with(Arc::new(MemorySettings::unreachable()));

    driver.handle(HostEvent::UserJoined(user.clone())).await;

    let session = driver.context().sessions.settings(user.id).unwrap();
    assert_eq!(session.level, -1);
    assert_eq!(session.shirt, None);
    assert_eq!(session.name.as_deref(), Some("Student"));
    assert!(host.live_attachments(user.id).is_empty());
}

#[tokio::test]
async fn leave_detaches_anything_still_live() {
    let user = HostUser::new("Student");
    let (mut driver, host) = driver_with(Arc::new(MemorySettings::new()));

    driver.handle(HostEvent::UserJoined(user.clone())).await;
    driver
        .handle(HostEvent::ButtonClicked {
            user: user.clone(),
            button: "wear".into(),
        })
        .await;
    assert_eq!(host.live_attachments(user.id).len(), 1);

    driver.handle(HostEvent::UserLeft(user.clone())).await;

    assert!(host.live_attachments(user.id).is_empty());
    assert!(driver.context().sessions.is_empty());
}

#[tokio::test]
async fn started_is_idempotent() {
    let (mut driver, host) = driver_with(Arc::new(MemorySettings::new()));

    driver.handle(HostEvent::Started).await;
    driver.handle(HostEvent::Started).await;

    assert_eq!(host.menus_shown(), 1);
    assert_eq!(host.loaded_resources().len(), 1);
}

#[tokio::test]
async fn run_processes_events_in_arrival_order() {
    let user = HostUser::new("Student");
    let host = Arc::new(SimHost::new());
    let settings = Arc::new(MemorySettings::new());
    let driver = AppDriver::new(TestApp, host.clone(), settings);

    let (tx, rx) = tokio::sync::mpsc::channel(8);
    tx.send(HostEvent::UserJoined(user.clone())).await.unwrap();
    tx.send(HostEvent::ButtonClicked {
        user: user.clone(),
        button: "wear".into(),
    })
    .await
    .unwrap();
    tx.send(HostEvent::UserLeft(user.clone())).await.unwrap();
    drop(tx);

    driver.run(rx).await;

    // Nothing persisted, so only the click attached, and the leave that
    // followed it cleaned everything up.
    assert_eq!(host.attach_count(), 1);
    assert!(host.live_attachments(user.id).is_empty());
}
