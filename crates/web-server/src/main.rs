use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to load settings and hand over to the crate's library.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    configuration::init_tracing();
    let config = configuration::load_config(Path::new("config.toml"))?;
    let state = web_server::AppState::from_config(&config)?;
    let addr = config.server.addr.parse()?;
    web_server::run_server(addr, state).await
}
