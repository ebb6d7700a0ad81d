#[tokio::main]
async fn main() -> anyhow::Result<()> {
    specforge_cli::cli::run().await
}
