use account_service::{telemetry, Config, Server};
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init("account-service", "info", std::io::stdout)
        .expect("Failed to initialize telemetry");
    let config = Config::init().expect("Failed to initialize config");
    Server::build(config).await?.run().await?;
    Ok(())
}
