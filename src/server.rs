//! gRPC server implementation of the GRIPSource service.
//!
//! This module binds the six GRIPSource procedures to the catalog and the
//! row resolver. Streaming procedures run their resolver stream on a spawned
//! task that forwards items through a bounded channel, so rows reach the
//! caller as soon as they are resolved.
//!
//! Every call holds a worker permit for its whole lifetime (until its
//! response stream ends or the caller goes away), which bounds the number of
//! calls resolving against Galaxy at the same time.

use crate::error::GripperError;
use crate::resolver::{Row, RowResolver};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use gripper_proto::grip_source_server::GripSource;
use gripper_proto::{
    struct_from_json, Collection, CollectionInfo, Empty, FieldRequest, Row as WireRow, RowId,
    RowRequest,
};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info, warn};

/// Items buffered per response stream before the producer waits for the caller.
const CHANNEL_CAPACITY: usize = 100;

pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// Implementation of the GRIPSource gRPC interface over Galaxy.
pub struct GripperService {
    resolver: RowResolver,
    /// Bounds concurrently executing calls
    workers: Arc<Semaphore>,
}

impl GripperService {
    /// Creates a new service.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Resolves rows against the upstream
    /// * `max_workers` - Maximum number of calls executing at once
    pub fn new(resolver: RowResolver, max_workers: usize) -> Self {
        Self {
            resolver,
            workers: Arc::new(Semaphore::new(max_workers)),
        }
    }

    /// Number of calls that could start right now without waiting.
    pub fn idle_workers(&self) -> usize {
        self.workers.available_permits()
    }

    /// Waits for a free worker.
    async fn acquire(&self) -> Result<OwnedSemaphorePermit, Status> {
        self.workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Status::unavailable("Worker pool is shut down"))
    }
}

fn wire_row(row: Row, request_id: String) -> WireRow {
    WireRow {
        id: row.id,
        data: Some(struct_from_json(row.data)),
        request_id,
    }
}

/// Drive `items` on its own task, forwarding each one to the caller.
///
/// The first error is sent to the caller and ends the call. A failed send
/// means the caller is gone; the stream is dropped there, which stops any
/// further upstream traversal and releases the worker.
fn spawn_stream<T>(
    rpc: &'static str,
    permit: OwnedSemaphorePermit,
    mut items: BoxStream<'static, Result<T, GripperError>>,
) -> ResponseStream<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<T, Status>>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let _permit = permit;
        let mut count = 0usize;

        loop {
            let item = tokio::select! {
                biased;
                _ = tx.closed() => {
                    debug!("{}: client disconnected after {} items", rpc, count);
                    return;
                }
                item = items.next() => match item {
                    Some(item) => item,
                    None => break,
                },
            };

            match item {
                Ok(item) => {
                    if tx.send(Ok(item)).await.is_err() {
                        debug!("{}: client disconnected after {} items", rpc, count);
                        return;
                    }
                    count += 1;
                }
                Err(e) => {
                    if e.is_upstream() {
                        error!("{} failed after {} items: {}", rpc, count, e);
                    } else {
                        warn!("{} aborted after {} items: {}", rpc, count, e);
                    }
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            }
        }

        info!("{} complete: {} items", rpc, count);
    });

    Box::pin(ReceiverStream::new(rx))
}

#[tonic::async_trait]
impl GripSource for GripperService {
    type GetCollectionsStream = ResponseStream<Collection>;

    /// Streams the name of every collection in the catalog.
    async fn get_collections(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<Self::GetCollectionsStream>, Status> {
        let permit = self.acquire().await?;
        debug!("GetCollections");

        let collections: Vec<Result<Collection, GripperError>> = self
            .resolver
            .catalog()
            .names()
            .map(|name| {
                Ok(Collection {
                    name: name.to_string(),
                })
            })
            .collect();

        Ok(Response::new(spawn_stream(
            "GetCollections",
            permit,
            stream::iter(collections).boxed(),
        )))
    }

    /// Returns the searchable fields of one collection.
    async fn get_collection_info(
        &self,
        request: Request<Collection>,
    ) -> Result<Response<CollectionInfo>, Status> {
        let _permit = self.acquire().await?;
        let name = request.into_inner().name;
        debug!("GetCollectionInfo: {}", name);

        let fields = self.resolver.catalog().describe(&name).map_err(|e| {
            warn!("GetCollectionInfo: {}", e);
            Status::from(e)
        })?;
        info!("GetCollectionInfo complete: {} ({} fields)", name, fields.len());

        Ok(Response::new(CollectionInfo {
            search_fields: fields.iter().map(|f| f.to_string()).collect(),
        }))
    }

    type GetIDsStream = ResponseStream<RowId>;

    /// Streams the id of every row in a collection.
    async fn get_i_ds(
        &self,
        request: Request<Collection>,
    ) -> Result<Response<Self::GetIDsStream>, Status> {
        let permit = self.acquire().await?;
        let name = request.into_inner().name;
        debug!("GetIDs: {}", name);

        let ids = self.resolver.list_ids(&name).map_err(|e| {
            warn!("GetIDs: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(spawn_stream(
            "GetIDs",
            permit,
            ids.map_ok(|id| RowId { id }).boxed(),
        )))
    }

    type GetRowsStream = ResponseStream<WireRow>;

    /// Streams every row of a collection.
    async fn get_rows(
        &self,
        request: Request<Collection>,
    ) -> Result<Response<Self::GetRowsStream>, Status> {
        let permit = self.acquire().await?;
        let name = request.into_inner().name;
        debug!("GetRows: {}", name);

        let rows = self.resolver.list_rows(&name).map_err(|e| {
            warn!("GetRows: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(spawn_stream(
            "GetRows",
            permit,
            rows.map_ok(|row| wire_row(row, String::new())).boxed(),
        )))
    }

    type GetRowsByIDStream = ResponseStream<WireRow>;

    /// Resolves a stream of primary-key lookups.
    ///
    /// Requests are answered one at a time in arrival order. Each response
    /// carries the `requestID` of the request it answers so callers can match
    /// them up. A request that cannot be resolved ends the call.
    async fn get_rows_by_id(
        &self,
        request: Request<Streaming<RowRequest>>,
    ) -> Result<Response<Self::GetRowsByIDStream>, Status> {
        let permit = self.acquire().await?;
        debug!("GetRowsByID");

        let mut requests = request.into_inner();
        let resolver = self.resolver.clone();
        let (tx, rx) = mpsc::channel::<Result<WireRow, Status>>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let _permit = permit;
            let mut count = 0usize;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = tx.closed() => {
                        debug!("GetRowsByID: client disconnected after {} rows", count);
                        return;
                    }
                    next = requests.message() => next,
                };
                let req = match next {
                    Ok(Some(req)) => req,
                    Ok(None) => break,
                    Err(status) => {
                        debug!("GetRowsByID: request stream ended with {}", status);
                        break;
                    }
                };

                let resolved = tokio::select! {
                    biased;
                    _ = tx.closed() => {
                        debug!("GetRowsByID: client disconnected after {} rows", count);
                        return;
                    }
                    resolved = resolver.get_row(&req.collection, &req.id) => resolved,
                };
                let row = match resolved {
                    Ok(row) => wire_row(row, req.request_id),
                    Err(e) => {
                        error!(
                            "GetRowsByID failed on request {:?} ({}/{}): {}",
                            req.request_id, req.collection, req.id, e
                        );
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                };

                if tx.send(Ok(row)).await.is_err() {
                    debug!("GetRowsByID: client disconnected after {} rows", count);
                    return;
                }
                count += 1;
            }

            info!("GetRowsByID complete: {} rows", count);
        });

        Ok(Response::new(
            Box::pin(ReceiverStream::new(rx)) as Self::GetRowsByIDStream
        ))
    }

    type GetRowsByFieldStream = ResponseStream<WireRow>;

    /// Streams the rows whose field matches a value.
    async fn get_rows_by_field(
        &self,
        request: Request<FieldRequest>,
    ) -> Result<Response<Self::GetRowsByFieldStream>, Status> {
        let permit = self.acquire().await?;
        let req = request.into_inner();
        debug!(
            "GetRowsByField: {} {} = {:?}",
            req.collection, req.field, req.value
        );

        let rows = self
            .resolver
            .rows_by_field(&req.collection, &req.field, &req.value);

        Ok(Response::new(spawn_stream(
            "GetRowsByField",
            permit,
            rows.map_ok(|row| wire_row(row, String::new())).boxed(),
        )))
    }
}
