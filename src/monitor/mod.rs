//! Periodic URL availability monitoring.
//!
//! The monitor sweeps every known link on a fixed interval, probes each
//! long URL, and compares the observation against its in-memory state
//! table. A link's first observation is recorded as initial; a changed
//! observation raises a transition notification. The table is owned
//! exclusively by the monitor and starts empty on every process start, so
//! the first sweep after a restart never reports transitions.

pub mod http_prober;

pub use http_prober::HttpProber;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::domain::repositories::LinkRepository;

/// Existence probe for a long URL.
///
/// Implementations answer a single question: does the URL currently respond
/// successfully? Transport failures and timeouts are indistinguishable from
/// a down server and map to `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlProber: Send + Sync {
    async fn is_accessible(&self, url: &str) -> bool;
}

/// Outcome counts for one monitor sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Links probed this sweep.
    pub checked: usize,
    /// Links observed for the first time.
    pub initial: usize,
    /// Links whose accessibility changed since the previous sweep.
    pub transitions: usize,
}

/// Periodic monitor over every known link's long URL.
pub struct UrlMonitor<L: LinkRepository, P: UrlProber> {
    link_repository: Arc<L>,
    prober: Arc<P>,
    interval: Duration,
    known_states: Mutex<HashMap<i64, bool>>,
}

impl<L: LinkRepository, P: UrlProber> UrlMonitor<L, P> {
    /// Creates a monitor with an empty state table.
    pub fn new(link_repository: Arc<L>, prober: Arc<P>, interval: Duration) -> Self {
        Self {
            link_repository,
            prober,
            interval,
            known_states: Mutex::new(HashMap::new()),
        }
    }

    /// Runs the monitor loop forever.
    ///
    /// The first sweep starts immediately; subsequent sweeps run once per
    /// interval. A sweep always runs to completion before the next tick is
    /// honored, and ticks missed during a long sweep are skipped, so sweeps
    /// never overlap.
    pub async fn start(&self) {
        info!(interval = ?self.interval, "starting url availability monitor");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// Performs one full sweep over all known links.
    ///
    /// A failing probe marks the link inaccessible and never aborts the
    /// sweep for the remaining links; a failing link fetch skips the whole
    /// sweep.
    pub async fn sweep(&self) -> SweepStats {
        let links = match self.link_repository.find_all().await {
            Ok(links) => links,
            Err(e) => {
                error!(error = %e, "failed to fetch links for availability sweep");
                return SweepStats::default();
            }
        };

        let mut stats = SweepStats::default();

        for link in links {
            let accessible = self.prober.is_accessible(&link.long_url).await;
            stats.checked += 1;

            // Single atomic read-modify-write per entry; the lock is never
            // held across a probe.
            let previous = {
                let mut states = self.known_states.lock().expect("monitor state lock poisoned");
                states.insert(link.id, accessible)
            };

            match previous {
                None => {
                    stats.initial += 1;
                    info!(
                        code = %link.code,
                        url = %link.long_url,
                        state = state_label(accessible),
                        "initial availability observation"
                    );
                }
                Some(previous) if previous != accessible => {
                    stats.transitions += 1;
                    metrics::counter!("url_availability_transitions_total").increment(1);
                    warn!(
                        code = %link.code,
                        url = %link.long_url,
                        from = state_label(previous),
                        to = state_label(accessible),
                        "link availability changed"
                    );
                }
                Some(_) => {}
            }
        }

        info!(
            checked = stats.checked,
            initial = stats.initial,
            transitions = stats.transitions,
            "availability sweep finished"
        );

        stats
    }
}

fn state_label(accessible: bool) -> &'static str {
    if accessible { "accessible" } else { "inaccessible" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use chrono::Utc;

    fn test_link(id: i64, code: &str, url: &str) -> Link {
        Link::new(id, code.to_string(), url.to_string(), Utc::now())
    }

    fn repo_with_links(links: Vec<Link>) -> MockLinkRepository {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_all()
            .returning(move || Ok(links.clone()));
        repo
    }

    #[tokio::test]
    async fn test_first_observation_is_initial_not_transition() {
        let repo = repo_with_links(vec![test_link(1, "abc123", "https://example.com")]);

        let mut prober = MockUrlProber::new();
        prober.expect_is_accessible().returning(|_| true);

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        let stats = monitor.sweep().await;

        assert_eq!(stats.checked, 1);
        assert_eq!(stats.initial, 1);
        assert_eq!(stats.transitions, 0);
    }

    #[tokio::test]
    async fn test_state_change_emits_one_transition() {
        let repo = repo_with_links(vec![test_link(1, "abc123", "https://example.com")]);

        let mut prober = MockUrlProber::new();
        prober.expect_is_accessible().times(1).returning(|_| true);
        prober.expect_is_accessible().times(1).returning(|_| false);

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        let first = monitor.sweep().await;
        assert_eq!(first.transitions, 0);

        let second = monitor.sweep().await;
        assert_eq!(second.initial, 0);
        assert_eq!(second.transitions, 1);
    }

    #[tokio::test]
    async fn test_unchanged_state_emits_nothing() {
        let repo = repo_with_links(vec![test_link(1, "abc123", "https://example.com")]);

        let mut prober = MockUrlProber::new();
        prober.expect_is_accessible().returning(|_| true);

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        monitor.sweep().await;
        let second = monitor.sweep().await;

        assert_eq!(second.initial, 0);
        assert_eq!(second.transitions, 0);
    }

    #[tokio::test]
    async fn test_failing_probe_marks_inaccessible_but_sweep_continues() {
        let repo = repo_with_links(vec![
            test_link(1, "abc123", "https://down.example.com"),
            test_link(2, "xyz789", "https://up.example.com"),
        ]);

        let mut prober = MockUrlProber::new();
        prober
            .expect_is_accessible()
            .withf(|url| url.contains("down"))
            .returning(|_| false);
        prober
            .expect_is_accessible()
            .withf(|url| url.contains("up"))
            .returning(|_| true);

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        let stats = monitor.sweep().await;

        assert_eq!(stats.checked, 2);
        assert_eq!(stats.initial, 2);
    }

    #[tokio::test]
    async fn test_repository_error_skips_sweep() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_all()
            .times(1)
            .returning(|| Err(AppError::internal("Database error", serde_json::json!({}))));

        let prober = MockUrlProber::new();

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        let stats = monitor.sweep().await;

        assert_eq!(stats, SweepStats::default());
    }

    #[tokio::test]
    async fn test_accessible_to_accessible_after_flap() {
        let repo = repo_with_links(vec![test_link(1, "abc123", "https://example.com")]);

        let mut prober = MockUrlProber::new();
        prober.expect_is_accessible().times(1).returning(|_| false);
        prober.expect_is_accessible().times(1).returning(|_| true);
        prober.expect_is_accessible().times(1).returning(|_| false);

        let monitor = UrlMonitor::new(
            Arc::new(repo),
            Arc::new(prober),
            Duration::from_secs(60),
        );

        monitor.sweep().await;
        assert_eq!(monitor.sweep().await.transitions, 1);
        assert_eq!(monitor.sweep().await.transitions, 1);
    }
}
