#![allow(dead_code)]

//! In-memory repository implementations for integration tests.
//!
//! These enforce the same contracts as the PostgreSQL repositories,
//! including short-code uniqueness on insert, so the full creation and
//! pipeline flows can be exercised without a database.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::json;

use shortlink::domain::entities::{Click, Link, NewClick, NewLink};
use shortlink::domain::repositories::{ClickRepository, LinkRepository};
use shortlink::error::AppError;

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    links: Mutex<Vec<Link>>,
    clicks: Mutex<Vec<Click>>,
    next_link_id: AtomicI64,
    next_click_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn click_count(&self) -> usize {
        self.clicks.lock().unwrap().len()
    }

    pub fn clicks(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }
}

pub struct InMemoryLinkRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryLinkRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.store.links.lock().unwrap();

        // Mirror the store-level unique constraint on codes.
        if links.iter().any(|l| l.code == new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "code": new_link.code }),
            ));
        }

        let id = self.store.next_link_id.fetch_add(1, Ordering::Relaxed) + 1;
        let link = Link::new(id, new_link.code, new_link.long_url, new_link.created_at);
        links.push(link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let links = self.store.links.lock().unwrap();
        Ok(links.iter().find(|l| l.code == code).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Link>, AppError> {
        Ok(self.store.links.lock().unwrap().clone())
    }

    async fn count_clicks_by_link_id(&self, link_id: i64) -> Result<i64, AppError> {
        let clicks = self.store.clicks.lock().unwrap();
        Ok(clicks.iter().filter(|c| c.link_id == link_id).count() as i64)
    }
}

pub struct InMemoryClickRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryClickRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickRepository {
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError> {
        let id = self.store.next_click_id.fetch_add(1, Ordering::Relaxed) + 1;
        let click = Click::new(
            id,
            new_click.link_id,
            new_click.clicked_at,
            new_click.user_agent,
            new_click.referer,
            new_click.ip,
        );

        self.store.clicks.lock().unwrap().push(click.clone());

        Ok(click)
    }
}
