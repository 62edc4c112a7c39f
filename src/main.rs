use waste_tracker::app;
use waste_tracker::config::Config;

/// Main entry point for the waste tracking web application.
///
/// Reads configuration from the environment, initializes logging and runs
/// the web server until it is shut down.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env();
    app::run(config).await
}
