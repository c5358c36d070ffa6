#[tokio::main]
async fn main() -> anyhow::Result<()> {
    openwords_backend::run().await
}
