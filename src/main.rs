#[tokio::main]
async fn main() -> std::io::Result<()> {
    spectator::run_with_config().await
}
