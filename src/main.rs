use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = homeown::api::Cli::parse();
    if let Err(e) = homeown::api::run(cli).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
