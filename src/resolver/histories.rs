//! `histories`: one row per Galaxy history.

use super::{document_id, listing, CollectionStrategy, IdStream, Row, RowStream};
use crate::catalog::ID_FIELD;
use crate::error::Result;
use async_trait::async_trait;
use futures::future;
use futures::stream::{StreamExt, TryStreamExt};
use galaxy_interface::{Document, GalaxyApi};
use std::sync::Arc;

pub const NAME: &str = "histories";

const SEARCH_FIELDS: &[&str] = &[ID_FIELD];

pub struct Histories;

/// Re-fetch a listed history to get its full document.
async fn show(galaxy: Arc<dyn GalaxyApi>, summary: Document) -> Result<Row> {
    let id = document_id(&summary)?;
    let data = galaxy.show_history(&id).await?;
    Ok(Row::new(id, data))
}

#[async_trait]
impl CollectionStrategy for Histories {
    fn name(&self) -> &'static str {
        NAME
    }

    fn search_fields(&self) -> &'static [&'static str] {
        SEARCH_FIELDS
    }

    fn list_ids(&self, galaxy: Arc<dyn GalaxyApi>) -> IdStream {
        listing(async move { galaxy.list_histories().await })
            .and_then(|history| future::ready(document_id(&history)))
            .boxed()
    }

    fn list_rows(&self, galaxy: Arc<dyn GalaxyApi>) -> RowStream {
        let lister = galaxy.clone();
        listing(async move { lister.list_histories().await })
            .and_then(move |summary| show(galaxy.clone(), summary))
            .boxed()
    }

    async fn get_row(&self, galaxy: &dyn GalaxyApi, id: &str) -> Result<Row> {
        let data = galaxy.show_history(id).await?;
        Ok(Row::new(id, data))
    }
}
