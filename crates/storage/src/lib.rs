//! In-memory banner storage.
//!
//! Nothing here survives the process: the collection starts either empty or
//! with the demo banners and is dropped on shutdown.

use std::sync::Arc;

use shared::domain::{Banner, BannerId, BannerUpdate, NewBanner};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("banner {0} not found")]
    NotFound(BannerId),
}

/// Ordered banner collection, newest first.
#[derive(Debug, Default, Clone)]
pub struct BannerStore {
    banners: Vec<Banner>,
}

impl BannerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demo_banners() -> Self {
        Self {
            banners: demo_banners(),
        }
    }

    /// Assigns a fresh id and puts the banner at the head of the list.
    pub fn create(&mut self, banner: NewBanner) -> Banner {
        let mut id = BannerId::generate();
        while self.get(&id).is_some() {
            id = BannerId::generate();
        }
        let banner = banner.with_id(id);
        self.banners.insert(0, banner.clone());
        debug!(banner_id = %banner.id, total = self.banners.len(), "banner created");
        banner
    }

    /// Replaces title and price of the matching banner. Image and position
    /// are left alone.
    pub fn update(&mut self, update: BannerUpdate) -> Result<Banner, StoreError> {
        let banner = self
            .banners
            .iter_mut()
            .find(|banner| banner.id == update.id)
            .ok_or_else(|| StoreError::NotFound(update.id.clone()))?;
        banner.title = update.title;
        banner.price = update.price;
        Ok(banner.clone())
    }

    /// Returns whether a banner was removed.
    pub fn delete(&mut self, id: &BannerId) -> bool {
        let before = self.banners.len();
        self.banners.retain(|banner| &banner.id != id);
        before != self.banners.len()
    }

    pub fn get(&self, id: &BannerId) -> Option<&Banner> {
        self.banners.iter().find(|banner| &banner.id == id)
    }

    pub fn list(&self) -> &[Banner] {
        &self.banners
    }

    pub fn len(&self) -> usize {
        self.banners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }
}

/// Shared handle used by request handlers. Each call takes the lock once, so
/// every operation is atomic with respect to concurrent requests.
#[derive(Clone, Default)]
pub struct Storage {
    inner: Arc<RwLock<BannerStore>>,
}

impl Storage {
    pub fn new(store: BannerStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn create_banner(&self, banner: NewBanner) -> Banner {
        self.inner.write().await.create(banner)
    }

    pub async fn update_banner(&self, update: BannerUpdate) -> Result<Banner, StoreError> {
        self.inner.write().await.update(update)
    }

    pub async fn delete_banner(&self, id: &BannerId) -> bool {
        self.inner.write().await.delete(id)
    }

    pub async fn load_banner(&self, id: &BannerId) -> Option<Banner> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn list_banners(&self) -> Vec<Banner> {
        self.inner.read().await.list().to_vec()
    }
}

fn demo_banners() -> Vec<Banner> {
    [
        ("1", "Gourmet Burger Special", 35.90, "burger"),
        ("2", "Artisanal Pizza", 45.50, "pizza"),
        ("3", "Fresh Sushi Platter", 60.00, "sushi"),
    ]
    .into_iter()
    .map(|(id, title, price, seed)| Banner {
        id: BannerId::from(id),
        title: title.to_string(),
        price,
        image_data: format!("https://picsum.photos/seed/{seed}/600/600"),
    })
    .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
