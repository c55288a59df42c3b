use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    repomap::cli::run().await
}
