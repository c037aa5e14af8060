use songswiper::{
    config::{self, Config},
    error, info, server,
};

#[tokio::main]
async fn main() {
    for path in config::load_env() {
        info!("Loaded environment from {}", path.display());
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    };

    let state = match server::AppState::new(config) {
        Ok(state) => state,
        Err(e) => error!("Cannot initialise application. Err: {}", e),
    };

    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
