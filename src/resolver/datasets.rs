//! `datasets`: one row per Galaxy dataset, listed page by page.

use super::{document_id, CollectionStrategy, IdStream, Row, RowStream};
use crate::catalog::ID_FIELD;
use crate::error::{GripperError, Result};
use crate::pagination::paginate;
use async_trait::async_trait;
use futures::future;
use futures::stream::{Stream, StreamExt, TryStreamExt};
use galaxy_interface::{Document, GalaxyApi};
use std::sync::Arc;
use tracing::warn;

pub const NAME: &str = "datasets";

const SEARCH_FIELDS: &[&str] = &[ID_FIELD];

pub struct Datasets;

async fn page(
    galaxy: Arc<dyn GalaxyApi>,
    offset: usize,
) -> galaxy_interface::Result<Vec<Document>> {
    galaxy.list_datasets_page(offset).await
}

/// Every dataset summary, in listing order.
fn summaries(galaxy: Arc<dyn GalaxyApi>) -> impl Stream<Item = Result<Document>> + Send {
    paginate(move |offset| page(galaxy.clone(), offset)).map_err(GripperError::from)
}

/// Re-fetch a listed dataset to get its full document.
async fn show(galaxy: Arc<dyn GalaxyApi>, summary: Document) -> Result<Option<Row>> {
    let id = document_id(&summary)?;
    match galaxy.show_dataset(&id).await? {
        Some(data) => Ok(Some(Row::new(id, data))),
        None => {
            warn!("Dataset {} disappeared between listing and fetch, skipping", id);
            Ok(None)
        }
    }
}

#[async_trait]
impl CollectionStrategy for Datasets {
    fn name(&self) -> &'static str {
        NAME
    }

    fn search_fields(&self) -> &'static [&'static str] {
        SEARCH_FIELDS
    }

    fn list_ids(&self, galaxy: Arc<dyn GalaxyApi>) -> IdStream {
        summaries(galaxy)
            .and_then(|dataset| future::ready(document_id(&dataset)))
            .boxed()
    }

    fn list_rows(&self, galaxy: Arc<dyn GalaxyApi>) -> RowStream {
        summaries(galaxy.clone())
            .try_filter_map(move |summary| show(galaxy.clone(), summary))
            .boxed()
    }

    async fn get_row(&self, galaxy: &dyn GalaxyApi, id: &str) -> Result<Row> {
        galaxy
            .show_dataset(id)
            .await?
            .map(|data| Row::new(id, data))
            .ok_or_else(|| GripperError::RowNotFound {
                collection: NAME,
                id: id.to_string(),
            })
    }
}
