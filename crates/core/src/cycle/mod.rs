//! One watch cycle: load, enrich, diff, save, notify.

mod service;


pub use service::*;
