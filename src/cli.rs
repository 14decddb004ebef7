use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};
use std::error::Error;

pub mod config;
pub mod logging;
pub mod subcommands;

pub async fn execute() -> Result<(), Box<dyn Error>> {
    let app = subcommands::setup(app());
    let app_m = app.get_matches();
    let settings = config::setup(&app_m)?;
    logging::setup(&settings)?;
    log::debug!("Settings: {:?}", &settings);
    subcommands::execute(&settings, &app_m).await?;
    Ok(())
}

fn app() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Turn debugging information on"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Read settings from this file instead of ./config.*"),
        )
}
