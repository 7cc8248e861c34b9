use walkie_talkie_lib::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    walkie_talkie_lib::init_tracing();
    let config = ServerConfig::from_env()?;
    walkie_talkie_lib::run(config).await
}
