use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("place is required")]
    MissingPlace,
    #[error("Place not found: {0}")]
    PlaceNotFound(String),
    #[error("Place {place} does not match postal code {postal}")]
    PostalCodeMismatch { place: String, postal: String },
    #[error("No road found within {radius_m} m")]
    NoRoads { radius_m: f64 },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
