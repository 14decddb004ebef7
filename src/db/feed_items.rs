use diesel::prelude::*;

use super::{SqlitePool, StoreError};
use crate::models::{FeedItemRecord, NewFeedItemRecord};

/// Persistent history of published items, keyed by item url.
pub trait FeedItemStore {
    /// # Errors
    ///
    /// Will return Err if the store cannot be queried
    fn count_by_url(&self, url: &str) -> Result<i64, StoreError>;

    /// # Errors
    ///
    /// Will return Err if the record cannot be written, including when its url is taken
    fn insert(&self, record: &NewFeedItemRecord) -> Result<(), StoreError>;

    /// The record with the greatest `published_at`, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Will return Err for any query failure other than an empty table
    fn latest_by_published_at_desc(&self) -> Result<Option<FeedItemRecord>, StoreError>;
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl FeedItemStore for SqliteStore {
    fn count_by_url(&self, url: &str) -> Result<i64, StoreError> {
        use crate::schema::feed_items;

        let mut conn = self.pool.get()?;
        let count = feed_items::table
            .filter(feed_items::url.eq(url))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(count)
    }

    fn insert(&self, record: &NewFeedItemRecord) -> Result<(), StoreError> {
        use crate::schema::feed_items;

        let mut conn = self.pool.get()?;
        diesel::insert_into(feed_items::table)
            .values(record)
            .execute(&mut conn)?;
        log::trace!("Recorded {}", record.url);
        Ok(())
    }

    fn latest_by_published_at_desc(&self) -> Result<Option<FeedItemRecord>, StoreError> {
        use crate::schema::feed_items;

        let mut conn = self.pool.get()?;
        // SQLite sorts NULLs last on DESC, so a dated record always wins
        let latest = feed_items::table
            .order((feed_items::published_at.desc(), feed_items::id.desc()))
            .select(FeedItemRecord::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::NaiveDate;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_record(url: &str, published_at: Option<NaiveDateTime>) -> NewFeedItemRecord<'_> {
        NewFeedItemRecord {
            created_at: db::current_time(),
            updated_at: db::current_time(),
            url,
            published_at,
            title: "Title",
            content: "<p>Content</p>",
            category: "PRESS RELEASE",
        }
    }

    #[test]
    fn it_counts_records_by_url() {
        let (_dir, pool) = db::establish_test_pool();
        let store = SqliteStore::new(pool);

        assert_eq!(store.count_by_url("https://example.com/a").unwrap(), 0);

        store
            .insert(&new_record("https://example.com/a", Some(at(1, 9))))
            .unwrap();

        assert_eq!(store.count_by_url("https://example.com/a").unwrap(), 1);
        assert_eq!(store.count_by_url("https://example.com/b").unwrap(), 0);
    }

    #[test]
    fn it_refuses_a_second_record_for_the_same_url() {
        let (_dir, pool) = db::establish_test_pool();
        let store = SqliteStore::new(pool);

        store
            .insert(&new_record("https://example.com/a", Some(at(1, 9))))
            .unwrap();
        let result = store.insert(&new_record("https://example.com/a", Some(at(2, 9))));

        assert!(matches!(result, Err(StoreError::Query(_))));
        assert_eq!(store.count_by_url("https://example.com/a").unwrap(), 1);
    }

    #[test]
    fn it_returns_none_when_the_store_is_empty() {
        let (_dir, pool) = db::establish_test_pool();
        let store = SqliteStore::new(pool);

        assert_eq!(store.latest_by_published_at_desc().unwrap(), None);
    }

    #[test]
    fn it_finds_the_most_recently_published_record() {
        let (_dir, pool) = db::establish_test_pool();
        let store = SqliteStore::new(pool);

        store
            .insert(&new_record("https://example.com/b", Some(at(2, 9))))
            .unwrap();
        store
            .insert(&new_record("https://example.com/undated", None))
            .unwrap();
        store
            .insert(&new_record("https://example.com/c", Some(at(3, 9))))
            .unwrap();
        store
            .insert(&new_record("https://example.com/a", Some(at(1, 9))))
            .unwrap();

        let latest = store.latest_by_published_at_desc().unwrap().unwrap();

        assert_eq!(latest.url, "https://example.com/c");
        assert_eq!(latest.published_at, Some(at(3, 9)));
        assert_eq!(latest.deleted_at, None);
    }

    #[test]
    fn it_returns_an_undated_record_when_nothing_else_is_stored() {
        let (_dir, pool) = db::establish_test_pool();
        let store = SqliteStore::new(pool);

        store
            .insert(&new_record("https://example.com/undated", None))
            .unwrap();

        let latest = store.latest_by_published_at_desc().unwrap().unwrap();
        assert_eq!(latest.published_at, None);
    }
}
