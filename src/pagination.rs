//! Offset pagination over upstream listings.
//!
//! [`paginate`] turns a "fetch the page starting at offset N" call into one
//! forward-only stream of records. Iteration starts at offset 0, advances by
//! the length of each page and ends at the first empty page. The page size is
//! whatever the upstream returns.
//!
//! An error from `fetch_page` is yielded once and ends the stream; records
//! already yielded stay yielded. Dropping the stream stops further fetches.

use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

pub fn paginate<F, Fut, T, E>(fetch_page: F) -> impl Stream<Item = Result<T, E>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    stream::try_unfold((fetch_page, 0usize), |(mut fetch_page, offset)| async move {
        let page = fetch_page(offset).await?;
        if page.is_empty() {
            return Ok::<_, E>(None);
        }
        let next = offset + page.len();
        let records = stream::iter(page.into_iter().map(Ok::<T, E>));
        Ok::<_, E>(Some((records, (fetch_page, next))))
    })
    .try_flatten()
}
