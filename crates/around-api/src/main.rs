use around_api::setup;
use around_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = setup::initialize_app(&config).await?;

    setup::server::start_server(&config, app).await
}
