#[tokio::main]
async fn main() {
    if let Err(e) = healthbot::run().await {
        tracing::error!("HealthBot failed: {e}");
        eprintln!("healthbot: {e}");
        std::process::exit(1);
    }
}
