#[tokio::main]
async fn main() -> std::io::Result<()> {
    combat_interdiction::run_with_config().await
}
