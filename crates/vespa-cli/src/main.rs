//! Binary entrypoint for the `vespa` command-line client.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(vespa_cli::run().await);
}
