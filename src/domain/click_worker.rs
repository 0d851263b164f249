//! Asynchronous click persistence pipeline.
//!
//! A bounded mpsc channel decouples the latency-sensitive redirect path
//! from click persistence. The producer side never blocks: when the queue
//! is full the event is dropped and counted. A fixed pool of workers drains
//! the queue; every per-event failure is logged and swallowed so one bad
//! event never stops a worker. Delivery is at most once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};

/// Producer handle for the click queue.
///
/// Cheap to clone; all clones share one queue and one drop counter. The
/// queue closes once every handle has been dropped, which is the workers'
/// sole termination signal.
#[derive(Clone)]
pub struct ClickPipeline {
    tx: mpsc::Sender<ClickEvent>,
    dropped: Arc<AtomicU64>,
}

/// Creates the bounded click queue.
///
/// Returns the producer handle and the receiver to hand to
/// [`spawn_click_workers`].
pub fn click_channel(capacity: usize) -> (ClickPipeline, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(capacity);

    (
        ClickPipeline {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}

impl ClickPipeline {
    /// Submits a click event without blocking.
    ///
    /// Returns `true` if the event was queued, `false` if it was dropped
    /// because the queue is full or closed. Analytics are best-effort;
    /// under sustained overload they undercount rather than slow down
    /// redirects.
    pub fn submit(&self, event: ClickEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("click_events_dropped_total").increment(1);
                warn!(
                    short_code = %event.short_code,
                    "click queue full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(
                    short_code = %event.short_code,
                    "click queue closed, dropping event"
                );
                false
            }
        }
    }

    /// Number of events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True once the consumer side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Remaining free slots in the queue, for health reporting.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

/// Starts `worker_count` workers draining the shared click queue.
///
/// All workers pull from the single receiver, so arrival order is preserved
/// as delivery order to *some* worker; no ordering is guaranteed across
/// workers' downstream writes. Each worker runs until the queue is closed
/// and drained. The returned handles complete when the workers exit.
pub fn spawn_click_workers<L, C>(
    worker_count: usize,
    rx: mpsc::Receiver<ClickEvent>,
    link_repository: Arc<L>,
    click_repository: Arc<C>,
) -> Vec<JoinHandle<()>>
where
    L: LinkRepository + 'static,
    C: ClickRepository + 'static,
{
    info!(worker_count, "starting click workers");

    let rx = Arc::new(Mutex::new(rx));

    (0..worker_count)
        .map(|worker| {
            tokio::spawn(click_worker(
                worker,
                rx.clone(),
                link_repository.clone(),
                click_repository.clone(),
            ))
        })
        .collect()
}

async fn click_worker<L, C>(
    worker: usize,
    rx: Arc<Mutex<mpsc::Receiver<ClickEvent>>>,
    link_repository: Arc<L>,
    click_repository: Arc<C>,
) where
    L: LinkRepository,
    C: ClickRepository,
{
    loop {
        // The lock is released before the event is handled, so other
        // workers keep draining while this one writes to the database.
        let event = { rx.lock().await.recv().await };

        let Some(event) = event else {
            break;
        };

        handle_event(event, link_repository.as_ref(), click_repository.as_ref()).await;
    }

    info!(worker, "click queue closed and drained, worker exiting");
}

/// Persists one click event.
///
/// Failures are terminal for the event: an unresolvable short code or a
/// failed write is logged and the event is discarded without retry.
async fn handle_event<L, C>(event: ClickEvent, link_repository: &L, click_repository: &C)
where
    L: LinkRepository,
    C: ClickRepository,
{
    let link = match link_repository.find_by_code(&event.short_code).await {
        Ok(Some(link)) => link,
        Ok(None) => {
            warn!(
                short_code = %event.short_code,
                "discarding click for unknown short code"
            );
            return;
        }
        Err(e) => {
            warn!(
                short_code = %event.short_code,
                error = %e,
                "failed to resolve short code, discarding click"
            );
            return;
        }
    };

    let new_click = NewClick {
        link_id: link.id,
        clicked_at: event.timestamp,
        user_agent: event.user_agent,
        referer: event.referrer,
        ip: event.ip,
    };

    match click_repository.create(new_click).await {
        Ok(click) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            debug!(link_id = click.link_id, "click recorded");
        }
        Err(e) => {
            warn!(
                link_id = link.id,
                error = %e,
                "failed to persist click, discarding"
            );
        }
    }
}
