//! Source of candidate items for a cycle.

use async_trait::async_trait;

use crate::errors::ListingError;
use crate::items::Item;

/// Produces the current candidate list, in listing order.
#[async_trait]
pub trait Lister: Send + Sync {
    async fn fetch_listing(&self) -> Result<Vec<Item>, ListingError>;
}

/// Lister returning a fixed list. Useful for tests and replaying captures.
#[derive(Debug, Clone, Default)]
pub struct StaticLister {
    items: Vec<Item>,
}

impl StaticLister {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Lister for StaticLister {
    async fn fetch_listing(&self) -> Result<Vec<Item>, ListingError> {
        Ok(self.items.clone())
    }
}
