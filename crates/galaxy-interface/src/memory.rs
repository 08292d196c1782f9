//! In-memory Galaxy.
//!
//! `MemoryGalaxy` holds a fixed set of histories and datasets and answers the
//! `GalaxyApi` calls from them, counting every call it serves. Listing calls
//! return summaries (`id` and `name` only) while `show_*` calls return the
//! full document, mirroring the different field completeness of the real
//! listing and detail endpoints.

use crate::{string_field, Document, GalaxyApi, GalaxyError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

const SUMMARY_FIELDS: [&str; 2] = ["id", "name"];

/// Default number of datasets returned per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Snapshot of how many times each upstream operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_histories: usize,
    pub show_history: usize,
    pub list_matching_datasets: usize,
    pub list_datasets_page: usize,
    pub show_dataset: usize,
}

impl CallCounts {
    /// Total number of upstream calls.
    pub fn total(&self) -> usize {
        self.list_histories
            + self.show_history
            + self.list_matching_datasets
            + self.list_datasets_page
            + self.show_dataset
    }
}

#[derive(Debug, Default)]
struct Counters {
    list_histories: AtomicUsize,
    show_history: AtomicUsize,
    list_matching_datasets: AtomicUsize,
    list_datasets_page: AtomicUsize,
    show_dataset: AtomicUsize,
}

#[derive(Debug)]
pub struct MemoryGalaxy {
    histories: Vec<Document>,
    datasets: Vec<Document>,
    page_size: usize,
    counters: Counters,
}

impl Default for MemoryGalaxy {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGalaxy {
    pub fn new() -> Self {
        Self {
            histories: Vec::new(),
            datasets: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            counters: Counters::default(),
        }
    }

    /// Number of datasets served per `list_datasets_page` call.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_history(mut self, history: Document) -> Self {
        self.histories.push(history);
        self
    }

    /// Add a dataset. Its `history_id` attribute decides which history lists it.
    pub fn with_dataset(mut self, dataset: Document) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            list_histories: c.list_histories.load(Ordering::Relaxed),
            show_history: c.show_history.load(Ordering::Relaxed),
            list_matching_datasets: c.list_matching_datasets.load(Ordering::Relaxed),
            list_datasets_page: c.list_datasets_page.load(Ordering::Relaxed),
            show_dataset: c.show_dataset.load(Ordering::Relaxed),
        }
    }

    fn find<'a>(docs: &'a [Document], id: &str) -> Option<&'a Document> {
        docs.iter().find(|d| string_field(d, "id") == Some(id))
    }
}

fn summary(doc: &Document) -> Document {
    doc.iter()
        .filter(|(key, _)| SUMMARY_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

#[async_trait]
impl GalaxyApi for MemoryGalaxy {
    async fn list_histories(&self) -> Result<Vec<Document>> {
        bump(&self.counters.list_histories);
        Ok(self.histories.iter().map(summary).collect())
    }

    async fn show_history(&self, id: &str) -> Result<Document> {
        bump(&self.counters.show_history);
        Self::find(&self.histories, id)
            .cloned()
            .ok_or_else(|| GalaxyError::NotFound(format!("history {}", id)))
    }

    async fn list_matching_datasets(&self, history_id: &str) -> Result<Vec<Document>> {
        bump(&self.counters.list_matching_datasets);
        Ok(self
            .datasets
            .iter()
            .filter(|d| string_field(d, "history_id") == Some(history_id))
            .map(summary)
            .collect())
    }

    async fn list_datasets_page(&self, offset: usize) -> Result<Vec<Document>> {
        bump(&self.counters.list_datasets_page);
        Ok(self
            .datasets
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(summary)
            .collect())
    }

    async fn show_dataset(&self, id: &str) -> Result<Option<Document>> {
        bump(&self.counters.show_dataset);
        Ok(Self::find(&self.datasets, id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use serde_json::json;

    fn galaxy() -> MemoryGalaxy {
        MemoryGalaxy::new()
            .with_page_size(2)
            .with_history(document(json!({"id": "h1", "name": "one", "size": 10})).unwrap())
            .with_history(document(json!({"id": "h2", "name": "two", "size": 20})).unwrap())
            .with_dataset(
                document(json!({"id": "d1", "name": "reads", "history_id": "h1"})).unwrap(),
            )
            .with_dataset(
                document(json!({"id": "d2", "name": "bam", "history_id": "h1"})).unwrap(),
            )
            .with_dataset(
                document(json!({"id": "d3", "name": "vcf", "history_id": "h2"})).unwrap(),
            )
    }

    #[test]
    fn test_listing_returns_summaries() {
        let g = galaxy();
        let histories = tokio_test::block_on(g.list_histories()).unwrap();
        assert_eq!(histories.len(), 2);
        assert!(histories[0].get("size").is_none());

        let full = tokio_test::block_on(g.show_history("h1")).unwrap();
        assert_eq!(full.get("size"), Some(&json!(10)));
    }

    #[test]
    fn test_dataset_pages() {
        let g = galaxy();
        assert_eq!(tokio_test::block_on(g.list_datasets_page(0)).unwrap().len(), 2);
        assert_eq!(tokio_test::block_on(g.list_datasets_page(2)).unwrap().len(), 1);
        assert!(tokio_test::block_on(g.list_datasets_page(3)).unwrap().is_empty());
        assert_eq!(g.calls().list_datasets_page, 3);
    }

    #[test]
    fn test_matching_datasets_and_lookup() {
        let g = galaxy();
        let in_h1 = tokio_test::block_on(g.list_matching_datasets("h1")).unwrap();
        let ids: Vec<_> = in_h1.iter().filter_map(|d| string_field(d, "id")).collect();
        assert_eq!(ids, vec!["d1", "d2"]);

        assert!(tokio_test::block_on(g.show_dataset("d3")).unwrap().is_some());
        assert!(tokio_test::block_on(g.show_dataset("nope")).unwrap().is_none());
        assert!(matches!(
            tokio_test::block_on(g.show_history("nope")),
            Err(GalaxyError::NotFound(_))
        ));

        let calls = g.calls();
        assert_eq!(calls.show_dataset, 2);
        assert_eq!(calls.total(), 4);
    }
}
