//! In-memory stand-ins for the store, the publisher and the feed source.

use chrono::{DateTime, TimeZone, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::RelayContext;
use crate::db::{self, FeedItemStore, StoreError};
use crate::feeds::result::FeedFetchError;
use crate::feeds::{FeedItem, FeedSource};
use crate::models::{FeedItemRecord, NewFeedItemRecord};
use crate::publish::{MessageTemplate, PublishError, Publisher};
use crate::settings::DEFAULT_MESSAGE_TEMPLATE;

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

pub fn item(
    link: &str,
    category: Option<&str>,
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
) -> FeedItem {
    FeedItem {
        link: String::from(link),
        title: format!("{}-title", link),
        content: String::new(),
        categories: category.map(String::from).into_iter().collect(),
        published,
        updated,
    }
}

pub fn context(items: Vec<FeedItem>) -> RelayContext<MemoryStore, FakePublisher, FakeSource> {
    RelayContext::new(
        MemoryStore::default(),
        FakePublisher::default(),
        FakeSource::new(vec![Some(items)]),
        MessageTemplate::new(DEFAULT_MESSAGE_TEMPLATE).unwrap(),
    )
}

#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<Vec<FeedItemRecord>>,
    fail_inserts: Cell<bool>,
    fail_queries: Cell<bool>,
}

impl MemoryStore {
    pub fn seed(&self, url: &str, published_at: Option<DateTime<Utc>>) {
        self.insert(&NewFeedItemRecord {
            created_at: db::current_time(),
            updated_at: db::current_time(),
            url,
            published_at: published_at.map(|p| p.naive_utc()),
            title: "seeded",
            content: "",
            category: "",
        })
        .unwrap();
    }

    pub fn urls(&self) -> Vec<String> {
        self.records.borrow().iter().map(|r| r.url.clone()).collect()
    }

    pub fn fail_inserts(&self) {
        self.fail_inserts.set(true);
    }

    pub fn fail_queries(&self) {
        self.fail_queries.set(true);
    }

    fn check_queries(&self) -> Result<(), StoreError> {
        if self.fail_queries.get() {
            return Err(StoreError::Query(DieselError::BrokenTransactionManager));
        }
        Ok(())
    }
}

impl FeedItemStore for MemoryStore {
    fn count_by_url(&self, url: &str) -> Result<i64, StoreError> {
        self.check_queries()?;
        let count = self.records.borrow().iter().filter(|r| r.url == url).count();
        Ok(count as i64)
    }

    fn insert(&self, record: &NewFeedItemRecord) -> Result<(), StoreError> {
        if self.fail_inserts.get() || self.count_by_url(record.url)? > 0 {
            return Err(StoreError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new(format!("UNIQUE constraint failed: feed_items.url {}", record.url)),
            )));
        }
        let mut records = self.records.borrow_mut();
        let id = records.len() as i32 + 1;
        records.push(FeedItemRecord {
            id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: None,
            url: String::from(record.url),
            published_at: record.published_at,
            title: String::from(record.title),
            content: String::from(record.content),
            category: String::from(record.category),
        });
        Ok(())
    }

    fn latest_by_published_at_desc(&self) -> Result<Option<FeedItemRecord>, StoreError> {
        self.check_queries()?;
        Ok(self
            .records
            .borrow()
            .iter()
            .max_by_key(|r| (r.published_at, r.id))
            .cloned())
    }
}

#[derive(Default)]
pub struct FakePublisher {
    posts: RefCell<Vec<String>>,
    fail_on: RefCell<Option<String>>,
}

impl FakePublisher {
    /// Refuses the first post whose last line is `link`, then accepts everything.
    pub fn failing_once_on(link: &str) -> Self {
        Self {
            posts: RefCell::new(Vec::new()),
            fail_on: RefCell::new(Some(String::from(link))),
        }
    }

    pub fn posts(&self) -> Vec<String> {
        self.posts.borrow().clone()
    }
}

impl Publisher for FakePublisher {
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let refused = match self.fail_on.borrow().as_deref() {
            Some(link) => text.lines().last() == Some(link),
            None => false,
        };
        if refused {
            self.fail_on.replace(None);
            return Err(PublishError::Rejected {
                status: 503,
                body: String::from("Service Unavailable"),
            });
        }
        self.posts.borrow_mut().push(String::from(text));
        Ok(())
    }
}

/// Serves scripted snapshots in order, repeating the last one. `None` is a failed fetch.
pub struct FakeSource {
    snapshots: RefCell<VecDeque<Option<Vec<FeedItem>>>>,
    fetches: Cell<usize>,
}

impl FakeSource {
    pub fn new(snapshots: Vec<Option<Vec<FeedItem>>>) -> Self {
        Self {
            snapshots: RefCell::new(snapshots.into_iter().collect()),
            fetches: Cell::new(0),
        }
    }

    pub fn fail_next_fetch(&self) {
        self.snapshots.borrow_mut().push_front(None);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl FeedSource for FakeSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedFetchError> {
        self.fetches.set(self.fetches.get() + 1);
        let mut snapshots = self.snapshots.borrow_mut();
        let snapshot = if snapshots.len() > 1 {
            snapshots.pop_front().flatten()
        } else {
            snapshots.front().cloned().flatten()
        };
        snapshot.ok_or_else(|| FeedFetchError::FetchFailed {
            url: String::from("memory://feed"),
            status: 503,
            body: String::new(),
        })
    }
}
