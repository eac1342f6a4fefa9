//! Listing items, their composite identity, and detail fetch results.

mod model;

pub use model::{fill_percentage, DetailResult, Identity, Item};
