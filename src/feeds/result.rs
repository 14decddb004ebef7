#![allow(clippy::module_name_repetitions)]

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum FeedFetchError {
    Timedout(reqwest::Error),
    FetchError(reqwest::Error),
    FetchFailed {
        url: String,
        status: u16,
        body: String,
    },
    ParseError(feed_rs::parser::ParseFeedError),
}

impl From<reqwest::Error> for FeedFetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timedout(error)
        } else {
            Self::FetchError(error)
        }
    }
}

impl fmt::Display for FeedFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timedout(error) => write!(f, "feed request timed out: {}", error),
            Self::FetchError(error) => write!(f, "feed request failed: {}", error),
            Self::FetchFailed { url, status, .. } => {
                write!(f, "feed {} answered with status {}", url, status)
            }
            Self::ParseError(error) => write!(f, "feed could not be parsed: {}", error),
        }
    }
}

impl Error for FeedFetchError {}
