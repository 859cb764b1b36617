use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use protocol::NetworkConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("hex_server=debug".parse()?))
        .init();

    info!("六角同化棋服务端启动中...");

    let addr = std::env::var("HEX_SERVER_ADDR")
        .unwrap_or_else(|_| NetworkConfig::default().addr());

    hex_server::run(&addr).await
}
