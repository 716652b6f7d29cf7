#[tokio::main]
async fn main() -> anyhow::Result<()> {
    yomi_srs_backend::run().await
}
