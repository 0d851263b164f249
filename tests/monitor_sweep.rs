//! Monitor sweep tests with a scripted prober and in-memory links.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use common::InMemoryLinkRepository;
use shortlink::application::services::LinkService;
use shortlink::monitor::{UrlMonitor, UrlProber};

/// Prober whose answers are scripted per URL; unknown URLs read as down.
#[derive(Default)]
struct ScriptedProber {
    up: Mutex<HashMap<String, bool>>,
}

impl ScriptedProber {
    fn set(&self, url: &str, accessible: bool) {
        self.up.lock().unwrap().insert(url.to_string(), accessible);
    }
}

#[async_trait]
impl UrlProber for ScriptedProber {
    async fn is_accessible(&self, url: &str) -> bool {
        self.up.lock().unwrap().get(url).copied().unwrap_or(false)
    }
}

async fn setup(
    urls: &[&str],
) -> (Arc<InMemoryLinkRepository>, Arc<ScriptedProber>) {
    let store = common::InMemoryStore::new();
    let link_repo = Arc::new(InMemoryLinkRepository::new(store));
    let service = LinkService::new(link_repo.clone());

    for url in urls {
        service.create_link(url.to_string()).await.unwrap();
    }

    (link_repo, Arc::new(ScriptedProber::default()))
}

#[tokio::test]
async fn test_first_sweep_records_initial_states_only() {
    let (link_repo, prober) = setup(&["https://one.example.com", "https://two.example.com"]).await;
    prober.set("https://one.example.com", true);

    let monitor = UrlMonitor::new(link_repo, prober, Duration::from_secs(60));

    let stats = monitor.sweep().await;

    assert_eq!(stats.checked, 2);
    assert_eq!(stats.initial, 2);
    assert_eq!(stats.transitions, 0);
}

#[tokio::test]
async fn test_accessibility_change_raises_single_transition() {
    let (link_repo, prober) = setup(&["https://example.com"]).await;
    prober.set("https://example.com", true);

    let monitor = UrlMonitor::new(link_repo, prober.clone(), Duration::from_secs(60));

    assert_eq!(monitor.sweep().await.transitions, 0);

    prober.set("https://example.com", false);
    let stats = monitor.sweep().await;
    assert_eq!(stats.transitions, 1);
    assert_eq!(stats.initial, 0);

    // Stable inaccessible state stays quiet.
    assert_eq!(monitor.sweep().await.transitions, 0);
}

#[tokio::test]
async fn test_recovery_is_also_a_transition() {
    let (link_repo, prober) = setup(&["https://example.com"]).await;

    let monitor = UrlMonitor::new(link_repo, prober.clone(), Duration::from_secs(60));

    // Down on the first sweep (initial), up on the second (transition).
    monitor.sweep().await;
    prober.set("https://example.com", true);

    assert_eq!(monitor.sweep().await.transitions, 1);
}

#[tokio::test]
async fn test_links_created_between_sweeps_are_initial() {
    let (link_repo, prober) = setup(&["https://example.com"]).await;
    let service = LinkService::new(link_repo.clone());

    let monitor = UrlMonitor::new(link_repo, prober, Duration::from_secs(60));

    assert_eq!(monitor.sweep().await.initial, 1);

    service
        .create_link("https://new.example.com".to_string())
        .await
        .unwrap();

    let stats = monitor.sweep().await;
    assert_eq!(stats.checked, 2);
    assert_eq!(stats.initial, 1);
    assert_eq!(stats.transitions, 0);
}
