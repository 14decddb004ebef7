mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = cli::execute().await {
        log::error!("{}", error);
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
