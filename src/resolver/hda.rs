//! `hda`: history/dataset associations.
//!
//! Galaxy has no entity for "dataset D inside history H", so these rows are
//! synthesized. The id is the composite key of the two parents and the
//! document is `{history_id, dataset_id}`. Nothing is fetched to build a
//! row once both ids are known.

use super::{document_id, listing, required_field, CollectionStrategy, IdStream, Row, RowStream};
use crate::catalog::{DATASET_ID_FIELD, HISTORY_ID_FIELD};
use crate::error::Result;
use crate::key;
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use galaxy_interface::{Document, GalaxyApi};
use serde_json::Value;
use std::sync::Arc;

pub const NAME: &str = "hda";

const SEARCH_FIELDS: &[&str] = &[HISTORY_ID_FIELD, DATASET_ID_FIELD];

pub struct Hda;

/// Build the row for one history/dataset pair.
pub fn hda_row(history_id: String, dataset_id: String) -> Row {
    let id = key::encode(&history_id, &dataset_id);
    let mut data = Document::new();
    data.insert("history_id".to_string(), Value::String(history_id));
    data.insert("dataset_id".to_string(), Value::String(dataset_id));
    Row { id, data }
}

/// `(history_id, dataset_id)` for every dataset of every history.
///
/// One listing call for the histories, then one call per history.
fn all_pairs(galaxy: Arc<dyn GalaxyApi>) -> BoxStream<'static, Result<(String, String)>> {
    let lister = galaxy.clone();
    listing(async move { lister.list_histories().await })
        .and_then(|history| future::ready(document_id(&history)))
        .map_ok(move |history_id| history_pairs(galaxy.clone(), history_id))
        .try_flatten()
        .boxed()
}

/// `(history_id, dataset_id)` for every dataset of one history.
fn history_pairs(
    galaxy: Arc<dyn GalaxyApi>,
    history_id: String,
) -> BoxStream<'static, Result<(String, String)>> {
    let lookup = history_id.clone();
    listing(async move { galaxy.list_matching_datasets(&lookup).await })
        .and_then(move |dataset| {
            future::ready(document_id(&dataset).map(|dataset_id| (history_id.clone(), dataset_id)))
        })
        .boxed()
}

/// The single association of a dataset, read from its `history_id`.
async fn dataset_row(galaxy: Arc<dyn GalaxyApi>, dataset_id: String) -> Result<Option<Row>> {
    let Some(dataset) = galaxy.show_dataset(&dataset_id).await? else {
        return Ok(None);
    };
    let history_id = required_field(&dataset, "history_id")?;
    Ok(Some(hda_row(history_id, dataset_id)))
}

#[async_trait]
impl CollectionStrategy for Hda {
    fn name(&self) -> &'static str {
        NAME
    }

    fn search_fields(&self) -> &'static [&'static str] {
        SEARCH_FIELDS
    }

    fn list_ids(&self, galaxy: Arc<dyn GalaxyApi>) -> IdStream {
        all_pairs(galaxy)
            .map_ok(|(history_id, dataset_id)| key::encode(&history_id, &dataset_id))
            .boxed()
    }

    fn list_rows(&self, galaxy: Arc<dyn GalaxyApi>) -> RowStream {
        all_pairs(galaxy)
            .map_ok(|(history_id, dataset_id)| hda_row(history_id, dataset_id))
            .boxed()
    }

    async fn get_row(&self, _galaxy: &dyn GalaxyApi, id: &str) -> Result<Row> {
        let (history_id, dataset_id) = key::decode(id)?;
        Ok(hda_row(history_id.to_string(), dataset_id.to_string()))
    }

    fn rows_by_field(&self, galaxy: Arc<dyn GalaxyApi>, field: &str, value: &str) -> RowStream {
        match field {
            HISTORY_ID_FIELD => history_pairs(galaxy, value.to_string())
                .map_ok(|(history_id, dataset_id)| hda_row(history_id, dataset_id))
                .boxed(),
            DATASET_ID_FIELD => stream::once(dataset_row(galaxy, value.to_string()))
                .filter_map(|row| future::ready(row.transpose()))
                .boxed(),
            _ => stream::empty().boxed(),
        }
    }
}
