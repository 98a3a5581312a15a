use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    openai_cli::run().await
}
