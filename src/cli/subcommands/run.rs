use clap::{ArgMatches, Command};
use std::error::Error;
use url::Url;

use feedrelay::db::{self, SqliteStore};
use feedrelay::feeds::HttpFeedSource;
use feedrelay::publish::{MessageTemplate, TwitterClient};
use feedrelay::relay::{scheduler, RelayContext};
use feedrelay::settings::Settings;

pub const NAME: &str = "run";

pub fn app() -> Command {
    Command::new(NAME).about("Publish unseen items, then keep checking the feed (default)")
}

pub async fn execute(_matches: &ArgMatches, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let pool = db::setup(settings)?;

    let ctx = RelayContext::new(
        SqliteStore::new(pool),
        TwitterClient::new(
            Url::parse(&settings.publish_api_url)?,
            settings.credentials()?,
            settings.request_timeout(),
        )?,
        HttpFeedSource::new(&settings.feed_url, settings.request_timeout())?,
        MessageTemplate::new(settings.message_template.as_str())?,
    );

    log::info!("Relaying {}", &settings.feed_url);
    scheduler::run(&ctx, settings.sync_interval(), shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for shutdown signal - {}", error);
        std::future::pending::<()>().await;
    }
}
