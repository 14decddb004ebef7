use clap::ArgMatches;
use config::{Config, Environment, File};
use std::error::Error;

use feedrelay::settings::{self, Settings};

pub const ENV_PREFIX: &str = "FEEDRELAY";

pub fn setup(app_m: &ArgMatches) -> Result<Settings, Box<dyn Error>> {
    dotenv::dotenv().ok();

    let file = match app_m.get_one::<String>("config") {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("config").required(false),
    };

    let mut builder = settings::with_defaults(Config::builder())?
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    if app_m.get_flag("debug") {
        builder = builder
            .set_override("debug", true)?
            .set_override("log_level", "debug")?;
    }

    Ok(Settings::from_config(builder.build()?)?)
}
