use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::osm_fetcher::USER_AGENT;
use crate::types::Location;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub postcode: Option<String>,
}

/// One Nominatim search result. Coordinates come back as strings.
#[derive(Clone, Debug, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Picks the first candidate, restricted to `postal` when one is given.
pub fn select_place(place: &str, postal: Option<&str>, candidates: Vec<Place>) -> Result<Location> {
    if candidates.is_empty() {
        return Err(Error::PlaceNotFound(place.to_string()));
    }

    let chosen = match postal.filter(|p| !p.is_empty()) {
        Some(postal) => candidates
            .into_iter()
            .find(|c| c.address.as_ref().and_then(|a| a.postcode.as_deref()) == Some(postal))
            .ok_or_else(|| Error::PostalCodeMismatch {
                place: place.to_string(),
                postal: postal.to_string(),
            })?,
        None => candidates.into_iter().next().ok_or_else(|| Error::PlaceNotFound(place.to_string()))?,
    };

    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| Error::InvalidData(format!("bad coordinate {:?}: {}", v, e)))
    };
    Ok(Location {
        latitude: parse(&chosen.lat)?,
        longitude: parse(&chosen.lon)?,
    })
}

/// Resolves a French place name, optionally narrowed by postal code.
pub async fn geocode(place: &str, postal: Option<&str>) -> Result<Location> {
    let query = format!("{} France", place);
    log::info!("Geocoding {:?} (postal {:?})", query, postal);

    let client = Client::new();
    let candidates = client
        .get(NOMINATIM_URL)
        .query(&[
            ("q", query.as_str()),
            ("format", "jsonv2"),
            ("addressdetails", "1"),
            ("limit", "10"),
        ])
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Place>>()
        .await?;

    log::info!("Geocoding candidates: {}", candidates.len());
    select_place(place, postal, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Place> {
        serde_json::from_str(
            r#"[
                {"lat": "44.0982", "lon": "3.0776", "address": {"postcode": "12100"}},
                {"lat": "45.5", "lon": "1.25", "address": {"postcode": "87000"}},
                {"lat": "46.0", "lon": "2.0"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn first_candidate_without_postal() {
        let loc = select_place("Millau", None, candidates()).unwrap();
        assert_eq!(loc, Location { latitude: 44.0982, longitude: 3.0776 });
        let loc = select_place("Millau", Some(""), candidates()).unwrap();
        assert_eq!(loc.latitude, 44.0982);
    }

    #[test]
    fn postal_code_narrows_candidates() {
        let loc = select_place("Millau", Some("87000"), candidates()).unwrap();
        assert_eq!(loc, Location { latitude: 45.5, longitude: 1.25 });
    }

    #[test]
    fn errors() {
        assert!(matches!(select_place("Nowhere", None, Vec::new()), Err(Error::PlaceNotFound(_))));
        assert!(matches!(
            select_place("Millau", Some("75001"), candidates()),
            Err(Error::PostalCodeMismatch { .. })
        ));

        let bad: Vec<Place> = serde_json::from_str(r#"[{"lat": "north", "lon": "1"}]"#).unwrap();
        assert!(matches!(select_place("Millau", None, bad), Err(Error::InvalidData(_))));
    }
}
