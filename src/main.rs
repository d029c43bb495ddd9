use anyhow::Result;
use log::info;
use posave_common::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = ServerConfig::from_deployment_dir()?;
    info!(
        "Starting POS Platform save server (data: {:?}, page: {:?})",
        config.data_file, config.html_file
    );

    posave_api::serve(config).await
}
