use axum::{extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::{Result, StorefrontError};

#[derive(Debug, Deserialize)]
pub struct PickupPointParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PickupPoint {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PickupPointParams {
    fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
        let mut query = Vec::new();
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                    return Err(StorefrontError::bad_request("lat/lng out of range"));
                }
                query.push(("lat", lat.to_string()));
                query.push(("lng", lng.to_string()));
            }
            (None, None) => {}
            _ => return Err(StorefrontError::bad_request("lat and lng must be given together")),
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        if query.is_empty() {
            return Err(StorefrontError::bad_request("Provide lat and lng, or search"));
        }
        if let Some(kind) = self.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("type", kind.to_string()));
        }
        Ok(query)
    }
}

pub async fn pickup_points(State(state): State<AppState>, Query(params): Query<PickupPointParams>) -> Result<Json<Vec<PickupPoint>>> {
    let query = params.to_query()?;
    let carrier = state.shiplogic()?;
    let raw = carrier.pickup_points(&query).await?;
    let points = reshape_pickup_points(&raw);
    tracing::debug!(count = points.len(), "pickup points loaded");
    Ok(Json(points))
}

fn str_field(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match v.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn num_field(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match v.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Carrier responses come either as a bare list or wrapped in `pickup_points`.
pub fn reshape_pickup_points(raw: &Value) -> Vec<PickupPoint> {
    let list = match raw {
        Value::Array(items) => items.as_slice(),
        other => other.get("pickup_points").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]),
    };
    list.iter()
        .filter_map(|p| {
            let id = str_field(p, &["pickup_point_id", "id", "code"])?;
            let address = p.get("address");
            Some(PickupPoint {
                name: str_field(p, &["name"]).unwrap_or_else(|| id.clone()),
                id,
                kind: str_field(p, &["type", "provider"]),
                address: address.and_then(|a| match a {
                    Value::String(s) => Some(s.clone()),
                    obj => str_field(obj, &["formatted_address", "street_address"]),
                }),
                lat: num_field(p, &["lat", "latitude"]).or_else(|| address.and_then(|a| num_field(a, &["lat"]))),
                lng: num_field(p, &["lng", "longitude"]).or_else(|| address.and_then(|a| num_field(a, &["lng"]))),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct TrackParams {
    #[serde(alias = "tracking_reference", alias = "waybill")]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TrackingEvent {
    pub date: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TrackingSummary {
    pub reference: String,
    pub status: Option<String>,
    pub events: Vec<TrackingEvent>,
}

pub async fn track_shipment(State(state): State<AppState>, Query(params): Query<TrackParams>) -> Result<Json<TrackingSummary>> {
    let reference = params
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| StorefrontError::bad_request("reference is required"))?
        .to_string();
    let carrier = state.shiplogic()?;
    let raw = carrier.track_shipment(&reference).await?;
    reshape_tracking(&reference, &raw)
        .map(Json)
        .ok_or_else(|| StorefrontError::not_found(format!("No shipment found for {reference}")))
}

pub fn reshape_tracking(reference: &str, raw: &Value) -> Option<TrackingSummary> {
    let shipment = raw.get("shipments").and_then(Value::as_array).and_then(|s| s.first())?;
    let events = shipment
        .get("tracking_events")
        .and_then(Value::as_array)
        .map(|events| {
            events
                .iter()
                .map(|e| TrackingEvent {
                    date: str_field(e, &["date", "created_at"]),
                    status: str_field(e, &["status"]),
                    message: str_field(e, &["message", "description"]),
                    location: str_field(e, &["location"]),
                })
                .collect()
        })
        .unwrap_or_default();
    Some(TrackingSummary {
        reference: str_field(shipment, &["short_tracking_reference", "tracking_reference"]).unwrap_or_else(|| reference.to_string()),
        status: str_field(shipment, &["status"]),
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(lat: Option<f64>, lng: Option<f64>, search: Option<&str>) -> PickupPointParams {
        PickupPointParams { lat, lng, search: search.map(String::from), kind: None }
    }

    #[test]
    fn test_pickup_query() {
        assert!(params(None, None, None).to_query().is_err());
        assert!(params(Some(1.0), None, None).to_query().is_err());
        assert!(params(Some(100.0), Some(18.4), None).to_query().is_err());
        assert!(params(None, None, Some("  ")).to_query().is_err());
        let q = params(Some(-33.92), Some(18.42), None).to_query().unwrap();
        assert_eq!(q, vec![("lat", "-33.92".to_string()), ("lng", "18.42".to_string())]);
        assert_eq!(params(None, None, Some("Sea Point")).to_query().unwrap(), vec![("search", "Sea Point".to_string())]);
    }

    #[test]
    fn test_reshape_pickup_points() {
        let raw = json!({"pickup_points": [
            {"pickup_point_id": "PUDO-1", "name": "Locker A", "type": "locker",
             "address": {"formatted_address": "1 Main Rd", "lat": -33.9, "lng": 18.4}},
            {"id": 7, "address": "2 Beach Rd", "latitude": "-34.0", "longitude": "18.5"},
            {"name": "no id"}
        ]});
        let points = reshape_pickup_points(&raw);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], PickupPoint { id: "PUDO-1".into(), name: "Locker A".into(), kind: Some("locker".into()), address: Some("1 Main Rd".into()), lat: Some(-33.9), lng: Some(18.4) });
        assert_eq!(points[1].id, "7");
        assert_eq!(points[1].name, "7");
        assert_eq!(points[1].lat, Some(-34.0));
        assert!(reshape_pickup_points(&json!({"unexpected": true})).is_empty());
    }

    #[test]
    fn test_reshape_tracking() {
        let raw = json!({"shipments": [{
            "short_tracking_reference": "ABC123", "status": "in-transit",
            "tracking_events": [{"date": "2026-10-01T10:00:00Z", "status": "collected", "message": "Parcel collected", "location": "Cape Town"}]
        }]});
        let summary = reshape_tracking("abc123", &raw).unwrap();
        assert_eq!(summary.reference, "ABC123");
        assert_eq!(summary.status.as_deref(), Some("in-transit"));
        assert_eq!(summary.events.len(), 1);
        assert_eq!(summary.events[0].location.as_deref(), Some("Cape Town"));
        assert!(reshape_tracking("x", &json!({"shipments": []})).is_none());
    }
}
