#[tokio::main]
async fn main() -> anyhow::Result<()> {
    aqua_cli::run().await?;
    Ok(())
}
