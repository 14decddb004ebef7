use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use serde::Serialize;
use std::time::Duration;

pub mod result;

use result::FeedFetchError;

/// One entry of a fetched feed, reduced to what the relay needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub link: String,
    pub title: String,
    pub content: String,
    pub categories: Vec<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<&Entry> for FeedItem {
    fn from(entry: &Entry) -> Self {
        let mut link = String::new();
        if !entry.links.is_empty() {
            link = entry.links[0].href.clone();
        }

        let mut title = String::new();
        if let Some(t) = &entry.title {
            title = t.content.clone();
        }

        let mut content = String::new();
        if let Some(e_content) = &entry.content {
            if let Some(e_body) = &e_content.body {
                content = e_body.clone();
            }
        }

        FeedItem {
            link,
            title,
            content,
            categories: entry.categories.iter().map(|c| c.term.clone()).collect(),
            // Atom entries may carry only <updated>
            published: entry.published.or(entry.updated),
            updated: entry.updated,
        }
    }
}

/// Where the relay reads feed items from. Items come back in source order,
/// which for the feeds this relays is newest-first.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    /// # Errors
    ///
    /// Will return Err when the feed cannot be retrieved or parsed
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedFetchError>;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    /// # Errors
    ///
    /// Will return Err if the HTTP client cannot be built
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: String::from(url),
        })
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<FeedItem>, FeedFetchError> {
        log::debug!("Fetching feed {}", &self.url);
        fetch_feed(&self.client, &self.url).await
    }
}

/// # Errors
///
/// Will return Err for any failure while fetching or parsing a feed
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<FeedItem>, FeedFetchError> {
    let response = client.get(url).send().await.map_err(FeedFetchError::from)?;
    let status = response.status();
    let body = response.bytes().await.map_err(FeedFetchError::from)?;

    if status != reqwest::StatusCode::OK {
        return Err(FeedFetchError::FetchFailed {
            url: String::from(url),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    parse_items(&body)
}

/// # Errors
///
/// Will return Err if the document is neither RSS, Atom nor JSON Feed
pub fn parse_items(body: &[u8]) -> Result<Vec<FeedItem>, FeedFetchError> {
    let feed = parser::parse(body).map_err(FeedFetchError::ParseError)?;
    Ok(feed.entries.iter().map(FeedItem::from).collect())
}
