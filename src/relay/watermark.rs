use chrono::{DateTime, Utc};

use crate::db::{FeedItemStore, StoreError};

/// The cutoff for incremental syncs: `published_at` of the newest stored record, or
/// the earliest representable time when there is none.
///
/// # Errors
///
/// Will return Err if the store query fails; an empty store is not an error
pub fn current<S: FeedItemStore>(store: &S) -> Result<DateTime<Utc>, StoreError> {
    let latest = store.latest_by_published_at_desc()?;
    Ok(latest
        .and_then(|record| record.published_at)
        .map_or(DateTime::<Utc>::MIN_UTC, |published_at| published_at.and_utc()))
}
