use kahanikaar::{logger, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init_with_config(logger::LoggerConfig::from_env()) {
        eprintln!("{}", e);
    }

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    kahanikaar::server::run(config).await
}
