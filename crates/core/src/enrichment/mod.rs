//! Detail page enrichment: who gets fetched, how fetches are paced, and how
//! results are folded back into items.

mod eligibility;
mod fetcher;
mod merge;
mod scheduler;

pub use eligibility::{eligibility_for, evaluate, Eligibility};
pub use fetcher::{BlockingDetailFetcher, DetailFetcher, MockDetailFetcher, MockResponse};
pub use merge::{merge_detail, MergeOutcome};
pub use scheduler::{EnrichmentReport, EnrichmentScheduler};
