//! Position lookup and reverse geocoding.
//!
//! Coordinates come from an explicit override or an IP positioning
//! service; address details come from a Nominatim-style `/reverse`
//! endpoint. The two steps are separate so a draft can carry a
//! position even when the address lookup fails.

use serde::Deserialize;

use crate::error::{LocationError, TransportError};
use crate::models::GeoAddress;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Address components of a reverse geocoding reply. Nominatim omits
/// keys it has no data for, and some instances send empty strings;
/// both count as absent here.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRecord {
    pub county: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub locality: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub quarter: Option<String>,
    pub residential: Option<String>,
    pub state_district: Option<String>,
    pub town: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl AddressRecord {
    /// Builds the locality line: county, neighbourhood and suburb
    /// joined with commas, falling back through progressively smaller
    /// place names, and finally to a fixed placeholder.
    pub fn resolve_locality(&self) -> String {
        let parts: Vec<&str> = [&self.county, &self.neighbourhood, &self.suburb]
            .into_iter()
            .filter_map(non_empty)
            .collect();
        if !parts.is_empty() {
            return parts.join(", ");
        }

        [
            &self.locality,
            &self.neighbourhood,
            &self.suburb,
            &self.village,
            &self.hamlet,
            &self.quarter,
            &self.residential,
        ]
        .into_iter()
        .find_map(non_empty)
        .unwrap_or("Unknown area")
        .to_string()
    }

    pub fn resolve_city(&self) -> String {
        [&self.state_district, &self.town, &self.county, &self.village]
            .into_iter()
            .find_map(non_empty)
            .unwrap_or("")
            .to_string()
    }

    pub fn resolve_state(&self) -> String {
        [&self.state, &self.region]
            .into_iter()
            .find_map(non_empty)
            .unwrap_or("")
            .to_string()
    }

    pub fn to_geo_address(&self) -> GeoAddress {
        GeoAddress {
            locality: self.resolve_locality(),
            city: self.resolve_city(),
            state: self.resolve_state(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseReply {
    address: Option<AddressRecord>,
}

#[derive(Debug, Deserialize)]
struct IpLocateReply {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

pub struct LocationResolver {
    client: reqwest::Client,
    reverse_url: String,
    locate_url: Option<String>,
    fixed: Option<Coordinates>,
}

impl LocationResolver {
    pub fn new(
        client: reqwest::Client,
        reverse_url: impl Into<String>,
        locate_url: Option<String>,
    ) -> Self {
        Self {
            client,
            reverse_url: reverse_url.into(),
            locate_url,
            fixed: None,
        }
    }

    /// Pins the position, skipping the positioning service.
    pub fn with_fixed(mut self, coords: Coordinates) -> Self {
        self.fixed = Some(coords);
        self
    }

    pub async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if let Some(coords) = self.fixed {
            return Ok(coords);
        }
        let url = self.locate_url.as_ref().ok_or(LocationError::Unsupported)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| LocationError::PermissionDenied {
                reason: err.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(LocationError::PermissionDenied {
                reason: format!("position service returned {}", resp.status()),
            });
        }
        let reply: IpLocateReply =
            resp.json()
                .await
                .map_err(|err| LocationError::PermissionDenied {
                    reason: err.to_string(),
                })?;

        if reply.status.as_deref() != Some("success") {
            return Err(LocationError::PermissionDenied {
                reason: reply
                    .message
                    .unwrap_or_else(|| "position service refused the lookup".to_string()),
            });
        }
        match (reply.lat, reply.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(LocationError::PermissionDenied {
                reason: "position service reply had no coordinates".to_string(),
            }),
        }
    }

    pub async fn reverse_geocode(&self, coords: Coordinates) -> Result<AddressRecord, LocationError> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let resp = self
            .client
            .get(&self.reverse_url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status).into());
        }

        let reply: ReverseReply = resp.json().await.map_err(TransportError::from)?;
        reply
            .address
            .ok_or_else(|| TransportError::Malformed("reply has no address".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    fn record(body: serde_json::Value) -> AddressRecord {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_locality_joins_known_parts() {
        let address = record(json!({
            "county": "Bangalore Urban",
            "neighbourhood": "Defence Colony",
            "suburb": "Indiranagar"
        }));
        assert_eq!(
            address.resolve_locality(),
            "Bangalore Urban, Defence Colony, Indiranagar"
        );
    }

    #[test]
    fn test_locality_skips_empty_strings() {
        let address = record(json!({
            "county": "",
            "suburb": "Indiranagar"
        }));
        assert_eq!(address.resolve_locality(), "Indiranagar");
    }

    #[test]
    fn test_locality_falls_back_to_village() {
        let address = record(json!({
            "village": "Hesaraghatta",
            "state": "Karnataka"
        }));
        assert_eq!(address.resolve_locality(), "Hesaraghatta");
    }

    #[test]
    fn test_locality_placeholder_when_nothing_matches() {
        let address = record(json!({ "country": "India" }));
        assert_eq!(address.resolve_locality(), "Unknown area");
    }

    #[test]
    fn test_city_prefers_state_district() {
        let address = record(json!({
            "state_district": "Bangalore Division",
            "town": "Yelahanka",
            "county": "Bangalore Urban"
        }));
        assert_eq!(address.resolve_city(), "Bangalore Division");
    }

    #[test]
    fn test_city_and_state_default_to_empty() {
        let address = record(json!({}));
        assert_eq!(address.resolve_city(), "");
        assert_eq!(address.resolve_state(), "");
    }

    #[test]
    fn test_state_falls_back_to_region() {
        let address = record(json!({ "region": "South India" }));
        assert_eq!(address.resolve_state(), "South India");
    }

    #[test]
    fn test_to_geo_address() {
        let address = record(json!({
            "county": "Bangalore Urban",
            "town": "Yelahanka",
            "state": "Karnataka"
        }));
        assert_eq!(
            address.to_geo_address(),
            GeoAddress {
                locality: "Bangalore Urban".to_string(),
                city: "Yelahanka".to_string(),
                state: "Karnataka".to_string(),
            }
        );
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_reverse_geocode_sends_expected_query() {
        use axum::extract::Query;
        use std::collections::HashMap;

        let router = Router::new().route(
            "/reverse",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                // Reply with an address only when the query is shaped right,
                // so a bad query surfaces as a lookup failure below.
                let ok = params.get("format").map(String::as_str) == Some("json")
                    && params.get("lat").map(String::as_str) == Some("12.9716")
                    && params.get("lon").map(String::as_str) == Some("77.5946");
                if ok {
                    Json(json!({ "address": { "village": "Hesaraghatta" } }))
                } else {
                    Json(json!({}))
                }
            }),
        );
        let base = serve(router).await;

        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            format!("{}/reverse", base),
            None,
        );
        let record = resolver
            .reverse_geocode(Coordinates {
                latitude: 12.9716,
                longitude: 77.5946,
            })
            .await
            .unwrap();
        assert_eq!(record.resolve_locality(), "Hesaraghatta");
    }

    #[tokio::test]
    async fn test_reverse_geocode_error_body_is_lookup_failure() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { Json(json!({ "error": "Unable to geocode" })) }),
        );
        let base = serve(router).await;

        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            format!("{}/reverse", base),
            None,
        );
        let err = resolver
            .reverse_geocode(Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocationError::LookupFailed(TransportError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_reverse_geocode_http_error_is_lookup_failure() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = serve(router).await;

        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            format!("{}/reverse", base),
            None,
        );
        let err = resolver
            .reverse_geocode(Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LocationError::LookupFailed(TransportError::Status(_))
        ));
    }

    #[tokio::test]
    async fn test_current_position_from_service() {
        let router = Router::new().route(
            "/json",
            get(|| async { Json(json!({ "status": "success", "lat": 12.9716, "lon": 77.5946 })) }),
        );
        let base = serve(router).await;

        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/reverse",
            Some(format!("{}/json", base)),
        );
        let coords = resolver.current_position().await.unwrap();
        assert_eq!(coords.latitude, 12.9716);
        assert_eq!(coords.longitude, 77.5946);
    }

    #[tokio::test]
    async fn test_position_refusal_carries_service_message() {
        let router = Router::new().route(
            "/json",
            get(|| async { Json(json!({ "status": "fail", "message": "private range" })) }),
        );
        let base = serve(router).await;

        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/reverse",
            Some(format!("{}/json", base)),
        );
        let err = resolver.current_position().await.unwrap_err();
        match err {
            LocationError::PermissionDenied { reason } => assert_eq!(reason, "private range"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_position_source_is_unsupported() {
        let resolver =
            LocationResolver::new(reqwest::Client::new(), "http://127.0.0.1:1/reverse", None);
        assert!(matches!(
            resolver.current_position().await,
            Err(LocationError::Unsupported)
        ));
    }

    #[tokio::test]
    async fn test_fixed_coordinates_skip_the_service() {
        // The locate URL is unroutable; a fixed position must never touch it.
        let resolver = LocationResolver::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/reverse",
            Some("http://127.0.0.1:1/json".to_string()),
        )
        .with_fixed(Coordinates {
            latitude: 1.5,
            longitude: 2.5,
        });
        let coords = resolver.current_position().await.unwrap();
        assert_eq!(coords.latitude, 1.5);
        assert_eq!(coords.longitude, 2.5);
    }
}
