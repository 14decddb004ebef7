use clap::{ArgMatches, Command};
use std::error::Error;

use feedrelay::settings::Settings;

pub mod check;
pub mod run;

pub fn setup(app: Command) -> Command {
    app.subcommand(run::app()).subcommand(check::app())
}

pub async fn execute(settings: &Settings, app_m: &ArgMatches) -> Result<(), Box<dyn Error>> {
    match app_m.subcommand() {
        Some((check::NAME, sub_m)) => check::execute(sub_m, settings).await,
        Some((run::NAME, sub_m)) => run::execute(sub_m, settings).await,
        _ => run::execute(app_m, settings).await,
    }
}
