use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use super::schema::feed_items;

/// One item that has been published, as stored in `feed_items`.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Serialize)]
#[diesel(table_name = feed_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeedItemRecord {
    pub id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
    pub url: String,
    pub published_at: Option<NaiveDateTime>,
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = feed_items)]
pub struct NewFeedItemRecord<'a> {
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub url: &'a str,
    pub published_at: Option<NaiveDateTime>,
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}
