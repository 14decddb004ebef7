use std::error::Error;
use std::fmt;

use crate::settings::Secret;

pub mod message;
pub mod oauth;
pub mod twitter;

pub use message::{Message, MessageTemplate};
pub use twitter::TwitterClient;

/// Something that accepts a text post. A call is a single best-effort attempt.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// # Errors
    ///
    /// Will return Err if the post was not accepted
    async fn publish(&self, text: &str) -> Result<(), PublishError>;
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub consumer_key: Secret,
    pub consumer_secret: Secret,
    pub access_token: Secret,
    pub access_token_secret: Secret,
}

#[derive(Debug)]
pub enum PublishError {
    Timedout(reqwest::Error),
    RequestError(reqwest::Error),
    Rejected { status: u16, body: String },
    Signing(hmac::digest::InvalidLength),
}

impl From<reqwest::Error> for PublishError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timedout(error)
        } else {
            Self::RequestError(error)
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timedout(error) => write!(f, "publish request timed out: {}", error),
            Self::RequestError(error) => write!(f, "publish request failed: {}", error),
            Self::Rejected { status, body } => {
                write!(f, "post rejected with status {}: {}", status, body)
            }
            Self::Signing(error) => write!(f, "could not sign request: {}", error),
        }
    }
}

impl Error for PublishError {}
