use std::net::SocketAddr;

use color_eyre::Result;
use engine::{comic::Studio, llm::OpenAIChat};
use log::info;
use panel_press::{Config, app};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    color_eyre::install()?;

    let cfg = Config::from_env()?;
    let studio = Studio::new(
        Box::new(OpenAIChat::new(
            cfg.chat_api_key.clone(),
            cfg.chat_endpoint.clone(),
            cfg.chat_model.clone(),
        )),
        cfg.image_model.make(cfg.replicate_api_token.clone()),
    );

    let addr = SocketAddr::new(cfg.host.parse()?, cfg.port);
    info!("serving on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(studio)).await?;

    Ok(())
}
