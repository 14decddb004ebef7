use clap::{Arg, ArgMatches, Command};
use std::error::Error;

use feedrelay::db::{self, SqliteStore};
use feedrelay::feeds::{FeedSource, HttpFeedSource};
use feedrelay::publish::{Message, MessageTemplate};
use feedrelay::relay::dedup::{self, Selection};
use feedrelay::relay::watermark;
use feedrelay::settings::Settings;

pub const NAME: &str = "check";

pub fn app() -> Command {
    Command::new(NAME)
        .about("Show what would be published, without posting anything")
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Feed URL, instead of the configured one"),
        )
}

pub async fn execute(matches: &ArgMatches, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let url = matches
        .get_one::<String>("url")
        .unwrap_or(&settings.feed_url);
    log::info!("Fetching {}", url);

    let store = SqliteStore::new(db::setup(settings)?);
    let template = MessageTemplate::new(settings.message_template.as_str())?;
    let items = HttpFeedSource::new(url, settings.request_timeout())?
        .fetch()
        .await?;
    log::info!("Feed has {} item(s)", items.len());

    let bootstrap = dedup::retain_unrecorded(
        &store,
        dedup::with_links(dedup::oldest_first(items.clone())),
    )?;
    print_selection("bootstrap", &bootstrap, &template)?;

    let watermark = watermark::current(&store)?;
    let incremental = dedup::retain_unrecorded(&store, dedup::newer_than(items, watermark))?;
    print_selection(
        &format!("incremental (after {})", watermark),
        &incremental,
        &template,
    )?;
    Ok(())
}

fn print_selection(
    label: &str,
    selection: &Selection,
    template: &MessageTemplate,
) -> Result<(), Box<dyn Error>> {
    println!(
        "== {}: {} to publish, {} skipped",
        label,
        selection.pending.len(),
        selection.skipped
    );
    for item in &selection.pending {
        let text = template.render(&Message {
            category: dedup::category_label(item),
            title: &item.title,
            link: &item.link,
        })?;
        println!("{}\n", text);
        log::debug!("Item: {}", serde_json::to_string(item)?);
    }
    Ok(())
}
