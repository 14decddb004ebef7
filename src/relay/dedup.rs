use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::db::{FeedItemStore, StoreError};
use crate::feeds::FeedItem;

/// Items chosen for publishing, in publishing order, and how many were passed over.
#[derive(Debug, Default, PartialEq)]
pub struct Selection {
    pub pending: Vec<FeedItem>,
    pub skipped: usize,
}

/// Feeds list their newest item first; this turns source order into publishing order.
#[must_use]
pub fn oldest_first(mut items: Vec<FeedItem>) -> Vec<FeedItem> {
    items.reverse();
    items
}

/// Keeps items that carry a link, the only thing we can deduplicate on.
#[must_use]
pub fn with_links(items: Vec<FeedItem>) -> Selection {
    let mut selection = Selection::default();
    for item in items {
        if item.link.is_empty() {
            log::warn!("Skipping item without a link: {:?}", &item.title);
            selection.skipped += 1;
        } else {
            selection.pending.push(item);
        }
    }
    selection
}

/// Keeps items published strictly after `watermark`, in the order given.
/// Undated items are never considered new.
#[must_use]
pub fn newer_than(items: Vec<FeedItem>, watermark: DateTime<Utc>) -> Selection {
    let mut selection = Selection::default();
    for item in items {
        match item.published {
            Some(published) if published > watermark && !item.link.is_empty() => {
                selection.pending.push(item);
            }
            Some(_) => selection.skipped += 1,
            None => {
                log::debug!("Skipping item without a published date: {}", &item.link);
                selection.skipped += 1;
            }
        }
    }
    selection
}

/// Drops items whose link is already stored, or that repeat an earlier link of the
/// same batch.
///
/// # Errors
///
/// Will return Err if the store cannot be queried
pub fn retain_unrecorded<S: FeedItemStore>(
    store: &S,
    selection: Selection,
) -> Result<Selection, StoreError> {
    let mut seen = HashSet::new();
    let mut retained = Selection {
        pending: Vec::with_capacity(selection.pending.len()),
        skipped: selection.skipped,
    };
    for item in selection.pending {
        if !seen.insert(item.link.clone()) || store.count_by_url(&item.link)? > 0 {
            log::trace!("Already posted {}", &item.link);
            retained.skipped += 1;
        } else {
            retained.pending.push(item);
        }
    }
    Ok(retained)
}

/// The first category of an item, or an empty label when it has none.
#[must_use]
pub fn category_label(item: &FeedItem) -> &str {
    match item.categories.first() {
        Some(category) => category,
        None => {
            log::warn!("Item {} has no category", &item.link);
            ""
        }
    }
}
