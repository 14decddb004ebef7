//! Deciding which feed items are new, posting them and remembering that we did.
//!
//! Publishing happens before recording. If the publish call fails the sync stops and
//! nothing is recorded for that item or any item after it. If the publish succeeds
//! but the record cannot be written, the item will look new again on the next sync
//! and may be posted a second time.

use std::error::Error;
use std::fmt;
use tinytemplate::error::Error as TemplateError;

use crate::db::{self, FeedItemStore, StoreError};
use crate::feeds::result::FeedFetchError;
use crate::feeds::{FeedItem, FeedSource};
use crate::models::NewFeedItemRecord;
use crate::publish::{Message, MessageTemplate, PublishError, Publisher};

pub mod dedup;
pub mod scheduler;
pub mod watermark;

#[cfg(test)]
pub(crate) mod testing;

use dedup::Selection;

/// Everything a sync needs, built once at startup and shared by reference.
pub struct RelayContext<S, P, F> {
    pub store: S,
    pub publisher: P,
    pub source: F,
    pub template: MessageTemplate,
}

impl<S, P, F> RelayContext<S, P, F>
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
{
    pub fn new(store: S, publisher: P, source: F, template: MessageTemplate) -> Self {
        Self {
            store,
            publisher,
            source,
            template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Bootstrap,
    Incremental,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug)]
pub enum SyncError {
    Fetch(FeedFetchError),
    Storage(StoreError),
    Render { link: String, error: TemplateError },
    Publish { link: String, error: PublishError },
    Record { link: String, error: StoreError },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(error) => write!(f, "{}", error),
            Self::Storage(error) => write!(f, "{}", error),
            Self::Render { link, error } => {
                write!(f, "could not render message for {}: {}", link, error)
            }
            Self::Publish { link, error } => write!(f, "could not publish {}: {}", link, error),
            Self::Record { link, error } => {
                write!(f, "published {} but could not record it: {}", link, error)
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(error) => Some(error),
            Self::Storage(error) | Self::Record { error, .. } => Some(error),
            Self::Render { error, .. } => Some(error),
            Self::Publish { error, .. } => Some(error),
        }
    }
}

/// Outcome of one sync run. `error` holds the failure that stopped the run, if any;
/// `published` counts the items posted and recorded before that.
#[derive(Debug)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub published: usize,
    pub skipped: usize,
    pub error: Option<SyncError>,
}

impl SyncReport {
    fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            published: 0,
            skipped: 0,
            error: None,
        }
    }

    fn fail(mut self, error: SyncError) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn log(&self) {
        match &self.error {
            None => log::info!(
                "Finished {} sync: published {}, skipped {}",
                self.mode,
                self.published,
                self.skipped
            ),
            Some(SyncError::Fetch(error)) => {
                log::warn!("Skipped {} sync, feed unavailable - {}", self.mode, error)
            }
            Some(error) => log::error!(
                "Aborted {} sync after publishing {} - {}",
                self.mode,
                self.published,
                error
            ),
        }
    }
}

/// Publishes every fetched item that is not in storage yet, oldest first.
pub async fn bootstrap_sync<S, P, F>(ctx: &RelayContext<S, P, F>) -> SyncReport
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
{
    let report = SyncReport::new(SyncMode::Bootstrap);
    let items = match ctx.source.fetch().await {
        Ok(items) => items,
        Err(error) => return report.fail(SyncError::Fetch(error)),
    };

    let candidates = dedup::with_links(dedup::oldest_first(items));
    match dedup::retain_unrecorded(&ctx.store, candidates) {
        Ok(selection) => publish_all(ctx, selection, report).await,
        Err(error) => report.fail(SyncError::Storage(error)),
    }
}

/// Publishes fetched items published after the watermark, in feed order.
pub async fn incremental_sync<S, P, F>(ctx: &RelayContext<S, P, F>) -> SyncReport
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
{
    let report = SyncReport::new(SyncMode::Incremental);
    let items = match ctx.source.fetch().await {
        Ok(items) => items,
        Err(error) => return report.fail(SyncError::Fetch(error)),
    };

    let watermark = match watermark::current(&ctx.store) {
        Ok(watermark) => watermark,
        Err(error) => return report.fail(SyncError::Storage(error)),
    };
    log::debug!("Incremental sync watermark {}", watermark);

    let candidates = dedup::newer_than(items, watermark);
    match dedup::retain_unrecorded(&ctx.store, candidates) {
        Ok(selection) => publish_all(ctx, selection, report).await,
        Err(error) => report.fail(SyncError::Storage(error)),
    }
}

async fn publish_all<S, P, F>(
    ctx: &RelayContext<S, P, F>,
    selection: Selection,
    mut report: SyncReport,
) -> SyncReport
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
{
    report.skipped = selection.skipped;
    for item in &selection.pending {
        if let Err(error) = publish_and_record(ctx, item).await {
            return report.fail(error);
        }
        report.published += 1;
    }
    report
}

/// Posts one item and, only once the post is accepted, records it.
///
/// # Errors
///
/// Will return Err if the message cannot be rendered, the post is refused or the
/// record cannot be written
pub async fn publish_and_record<S, P, F>(
    ctx: &RelayContext<S, P, F>,
    item: &FeedItem,
) -> Result<(), SyncError>
where
    S: FeedItemStore,
    P: Publisher,
    F: FeedSource,
{
    let category = dedup::category_label(item);
    let text = ctx
        .template
        .render(&Message {
            category,
            title: &item.title,
            link: &item.link,
        })
        .map_err(|error| SyncError::Render {
            link: item.link.clone(),
            error,
        })?;

    ctx.publisher
        .publish(&text)
        .await
        .map_err(|error| SyncError::Publish {
            link: item.link.clone(),
            error,
        })?;
    log::info!("Published {}", &item.link);

    let now = db::current_time();
    // the feed only fills in "updated" reliably, so that is what becomes published_at
    let record = NewFeedItemRecord {
        created_at: now,
        updated_at: now,
        url: &item.link,
        published_at: item.updated.map(|updated| updated.naive_utc()),
        title: &item.title,
        content: &item.content,
        category,
    };
    ctx.store
        .insert(&record)
        .map_err(|error| SyncError::Record {
            link: item.link.clone(),
            error,
        })
}
