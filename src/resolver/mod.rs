//! Row resolution.
//!
//! A [`CollectionStrategy`] answers the four query shapes (all ids, all rows,
//! one row by primary key, rows by a secondary field) for one collection.
//! [`RowResolver`] routes a call to the right strategy through the
//! [`Catalog`] and hands it the shared Galaxy connection.
//!
//! Streams are lazy: nothing is fetched until they are polled, upstream calls
//! within one stream are strictly sequential, and dropping a stream stops its
//! traversal.

mod datasets;
mod hda;
mod histories;

pub use datasets::Datasets;
pub use hda::Hda;
pub use histories::Histories;

use crate::catalog::Catalog;
use crate::error::{GripperError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use galaxy_interface::{string_field, Document, GalaxyApi, GalaxyError};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

pub type IdStream = BoxStream<'static, Result<String>>;
pub type RowStream = BoxStream<'static, Result<Row>>;

/// A resolved row: its id within the collection and its document.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub data: Document,
}

impl Row {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Per-collection resolution logic.
#[async_trait]
pub trait CollectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fields accepted by [`CollectionStrategy::rows_by_field`].
    fn search_fields(&self) -> &'static [&'static str];

    fn list_ids(&self, galaxy: Arc<dyn GalaxyApi>) -> IdStream;

    fn list_rows(&self, galaxy: Arc<dyn GalaxyApi>) -> RowStream;

    async fn get_row(&self, galaxy: &dyn GalaxyApi, id: &str) -> Result<Row>;

    /// Rows whose `field` equals `value`. Collections without secondary
    /// lookups produce nothing.
    fn rows_by_field(
        &self,
        _galaxy: Arc<dyn GalaxyApi>,
        _field: &str,
        _value: &str,
    ) -> RowStream {
        stream::empty().boxed()
    }
}

/// Dispatches queries to the catalog's strategies.
#[derive(Clone)]
pub struct RowResolver {
    catalog: Arc<Catalog>,
    galaxy: Arc<dyn GalaxyApi>,
}

impl RowResolver {
    pub fn new(catalog: Arc<Catalog>, galaxy: Arc<dyn GalaxyApi>) -> Self {
        Self { catalog, galaxy }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list_ids(&self, collection: &str) -> Result<IdStream> {
        Ok(self.catalog.get(collection)?.list_ids(self.galaxy.clone()))
    }

    pub fn list_rows(&self, collection: &str) -> Result<RowStream> {
        Ok(self.catalog.get(collection)?.list_rows(self.galaxy.clone()))
    }

    pub async fn get_row(&self, collection: &str, id: &str) -> Result<Row> {
        self.catalog
            .get(collection)?
            .get_row(self.galaxy.as_ref(), id)
            .await
    }

    /// Rows matching a secondary field. Unknown collections and undeclared
    /// fields yield an empty stream rather than an error.
    pub fn rows_by_field(&self, collection: &str, field: &str, value: &str) -> RowStream {
        match self.catalog.get(collection) {
            Ok(strategy) if strategy.search_fields().contains(&field) => {
                strategy.rows_by_field(self.galaxy.clone(), field, value)
            }
            _ => {
                debug!("No field lookup for {}/{}", collection, field);
                stream::empty().boxed()
            }
        }
    }
}

/// Stream the documents returned by a single listing call.
fn listing<F>(call: F) -> BoxStream<'static, Result<Document>>
where
    F: Future<Output = galaxy_interface::Result<Vec<Document>>> + Send + 'static,
{
    stream::once(call)
        .map_ok(|docs| stream::iter(docs.into_iter().map(Ok::<_, GalaxyError>)))
        .try_flatten()
        .map_err(GripperError::from)
        .boxed()
}

/// Read a string attribute the resolver cannot do without.
fn required_field(doc: &Document, field: &'static str) -> Result<String> {
    string_field(doc, field)
        .map(str::to_string)
        .ok_or(GripperError::MissingField(field))
}

fn document_id(doc: &Document) -> Result<String> {
    required_field(doc, "id")
}
