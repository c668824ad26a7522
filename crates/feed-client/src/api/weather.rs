//! Weather collaborator: met.no locationforecast fetch.

use serde::Deserialize;

use crate::FeedError;

const LOCATIONFORECAST_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";
// met.no rejects requests without an identifying User-Agent.
const USER_AGENT: &str = "payfeed/0.1";

#[derive(Debug, Deserialize)]
struct Forecast {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: (f64, f64, f64),
}

/// Coordinates the forecast service reports for a queried point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
    pub altitude: f64,
}

/// Fetch the compact forecast for a point and return the coordinates the
/// service resolved it to. The rest of the document is ignored.
pub async fn current_coordinates(lat: f64, lon: f64) -> Result<Coordinates, FeedError> {
    let url = format!("{LOCATIONFORECAST_URL}?lat={lat}&lon={lon}");
    let resp = reqwest::Client::new()
        .get(&url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await?;
        return Err(FeedError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    let forecast: Forecast = resp.json().await?;
    let (lon, lat, altitude) = forecast.geometry.coordinates;
    Ok(Coordinates { lon, lat, altitude })
}
