//! Runtime configuration from environment variables.

use anyhow::Context;

/// Runtime configuration for the feed monitor.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bus_url: String,
    pub backoffice_url: String,
    pub partner_id: i64,
    pub server_port: u16,
    pub clear_on_start: bool,
    pub weather: Option<(f64, f64)>,
}

/// Load configuration from the environment, preferring a local `.env`.
pub fn load() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();

    let partner_id = std::env::var("PAYFEED_PARTNER_ID")
        .context("PAYFEED_PARTNER_ID must be set (numeric partner id)")?
        .parse::<i64>()
        .context("PAYFEED_PARTNER_ID must be an integer")?;

    let config = AppConfig {
        bus_url: env_or("PAYFEED_BUS_URL", "ws://127.0.0.1:8069/websocket"),
        backoffice_url: env_or("PAYFEED_BACKOFFICE_URL", "http://127.0.0.1:8069"),
        partner_id,
        server_port: parse_u16(&env_or("PAYFEED_SERVER_PORT", ""), 8080),
        clear_on_start: env_or("PAYFEED_CLEAR_ON_START", "false") == "true",
        weather: weather_coords(),
    };

    tracing::info!(
        partner_id = config.partner_id,
        bus_url = %config.bus_url,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

fn parse_u16(value: &str, default: u16) -> u16 {
    value.parse().unwrap_or(default)
}

fn weather_coords() -> Option<(f64, f64)> {
    let lat = std::env::var("PAYFEED_WEATHER_LAT").ok()?;
    let lon = std::env::var("PAYFEED_WEATHER_LON").ok()?;
    match (lat.parse::<f64>(), lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) => Some((lat, lon)),
        _ => {
            tracing::warn!("Invalid weather coordinates, ignoring");
            None
        }
    }
}
