//! Persisted item list carried from one cycle to the next.

mod store;

pub use store::{MemorySnapshotStore, SnapshotStore};

use std::collections::HashMap;

use crate::items::{Identity, Item};

/// Returns every identity that appears more than once in `items`, in
/// first-appearance order.
///
/// The composite key is not unique on the listing source, so duplicates are
/// reported rather than merged.
pub fn find_duplicate_identities(items: &[Item]) -> Vec<Identity> {
    let mut counts: HashMap<Identity, usize> = HashMap::new();
    let mut order = Vec::new();
    for item in items {
        let identity = item.identity();
        let count = counts.entry(identity.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(identity);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_duplicate_identities() {
        let items = vec![
            Item::new("Club Classic", "03/20/2026", "Hilltop"),
            Item::new("Spring Open", "04/12/2026", "Riverside"),
            Item::new("Club Classic", "03/20/2026", "Hilltop"),
            Item::new("Club Classic", "03/20/2026", "Hilltop"),
            Item::new("Club Classic", "03/27/2026", "Hilltop"),
        ];
        let duplicates = find_duplicate_identities(&items);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].to_string(),
            "Club Classic (03/20/2026, Hilltop)"
        );
    }

    #[test]
    fn test_no_duplicates() {
        let items = vec![
            Item::new("Club Classic", "03/20/2026", "Hilltop"),
            Item::new("Club Classic", "03/20/2026", "Lakeside"),
        ];
        assert!(find_duplicate_identities(&items).is_empty());
    }
}
