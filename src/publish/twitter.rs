use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::oauth;
use super::{Credentials, PublishError, Publisher};

#[derive(Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct CreatedPost {
    data: CreatedPostData,
}

#[derive(Deserialize, Debug)]
struct CreatedPostData {
    id: String,
}

/// Posts text through the v2 create-post endpoint with user-context OAuth 1.0a.
pub struct TwitterClient {
    client: reqwest::Client,
    api_url: Url,
    credentials: Credentials,
}

impl TwitterClient {
    /// # Errors
    ///
    /// Will return Err if the HTTP client cannot be built
    pub fn new(
        api_url: Url,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url,
            credentials,
        })
    }
}

impl Publisher for TwitterClient {
    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let timestamp = Utc::now().timestamp();
        let authorization = oauth::authorization_header(
            "POST",
            &self.api_url,
            &[],
            &self.credentials,
            &oauth::nonce(timestamp),
            timestamp,
        )?;

        let response = self
            .client
            .post(self.api_url.clone())
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&CreatePost { text })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<CreatedPost>(&body) {
            Ok(created) => log::debug!("Created post {}", created.data.id),
            Err(_) => log::debug!("Post accepted with status {}: {}", status, body),
        }
        Ok(())
    }
}
