use lambda_starter::config::AppConfig;
use lambda_starter::handlers::event::EventHandler;
use lambda_starter::local::serve;
use lambda_starter::logging::{init_tracing, LogFormat};
use lambda_starter_core::config::Env;
use lambda_starter_core::error::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // A missing .env file is fine; the process environment still applies.
    dotenv::dotenv().ok();
    init_tracing(LogFormat::Pretty);

    let config = AppConfig::from_env(&Env::process())?;
    serve(config, EventHandler::default()).await?;
    Ok(())
}
