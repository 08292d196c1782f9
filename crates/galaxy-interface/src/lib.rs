//! Galaxy Interface: Upstream Abstraction
//!
//! This crate defines the `GalaxyApi` trait, the narrow slice of the Galaxy
//! REST API that the gripper adapter consumes. Keeping it behind a trait lets
//! the adapter run against the real HTTP client (`galaxy-connect`) or the
//! in-memory [`MemoryGalaxy`] without any change to resolution logic.
//!
//! # Example
//!
//! ```rust,no_run
//! use galaxy_interface::{GalaxyApi, MemoryGalaxy};
//! use serde_json::json;
//!
//! async fn count_datasets<G: GalaxyApi>(galaxy: &G, history_id: &str) -> galaxy_interface::Result<usize> {
//!     Ok(galaxy.list_matching_datasets(history_id).await?.len())
//! }
//!
//! # async fn example() -> galaxy_interface::Result<()> {
//! let galaxy = MemoryGalaxy::new()
//!     .with_history(galaxy_interface::document(json!({"id": "h1", "name": "RNA-seq"}))?)
//!     .with_dataset(galaxy_interface::document(json!({"id": "d1", "history_id": "h1"}))?);
//! assert_eq!(count_datasets(&galaxy, "h1").await?, 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;

pub use memory::{CallCounts, MemoryGalaxy};

/// A loosely-typed record returned by Galaxy.
///
/// Field order is preserved exactly as Galaxy sent it.
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum GalaxyError {
    #[error("Galaxy unreachable: {0}")]
    Transport(String),

    #[error("Galaxy returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Undecodable Galaxy response: {0}")]
    Decode(String),

    #[error("Not found in Galaxy: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, GalaxyError>;

/// Convert a JSON value into a [`Document`], rejecting anything that is not an object.
pub fn document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GalaxyError::Decode(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Read a top-level string attribute of a document.
pub fn string_field<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The operations the adapter needs from Galaxy.
///
/// Listing calls return summary documents; the `show_*` calls return the
/// full record. Every document carries at least an `id` attribute, and
/// datasets fetched by id also carry `history_id`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync + 'static`; one instance is shared by
/// every in-flight call.
#[async_trait]
pub trait GalaxyApi: Send + Sync + 'static {
    /// All histories visible to the configured user (not paginated).
    async fn list_histories(&self) -> Result<Vec<Document>>;

    /// Full record of a single history.
    async fn show_history(&self, id: &str) -> Result<Document>;

    /// Every dataset contained in a history.
    async fn list_matching_datasets(&self, history_id: &str) -> Result<Vec<Document>>;

    /// One page of the global dataset listing starting at `offset`.
    ///
    /// An empty page means the listing is exhausted.
    async fn list_datasets_page(&self, offset: usize) -> Result<Vec<Document>>;

    /// Full record of a single dataset, or `None` when Galaxy has no such dataset.
    async fn show_dataset(&self, id: &str) -> Result<Option<Document>>;
}
