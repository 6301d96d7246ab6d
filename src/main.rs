#[tokio::main]
async fn main() -> std::io::Result<()> {
    dojo_kiosk::run_with_config().await
}
