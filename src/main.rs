use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = tailspin_forwarder::cli::Cli::parse();
    if let Err(e) = tailspin_forwarder::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
