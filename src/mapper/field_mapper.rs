use serde_json::{json, Map, Value};
use crate::core::error::{Error, Result};
use crate::core::types::{Centroid, Extent, Names, PlaceDoc};

/// Index payload: the JSON source of one document
pub type Payload = Map<String, Value>;

/// Converts a place into the payload written to the index.
pub trait FieldMapper {
    fn to_payload(&self, doc: &PlaceDoc) -> Result<Payload>;
}

/// Field layout used by the photon place index
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceFieldMapper;

impl PlaceFieldMapper {
    pub fn new() -> Self {
        PlaceFieldMapper
    }

    fn coordinate(centroid: &Centroid) -> Result<Value> {
        if !centroid.lon.is_finite() || !centroid.lat.is_finite() {
            return Err(Error::conversion(format!(
                "centroid is not finite: lon={} lat={}",
                centroid.lon, centroid.lat
            )));
        }
        if !(-180.0..=180.0).contains(&centroid.lon) || !(-90.0..=90.0).contains(&centroid.lat) {
            return Err(Error::conversion(format!(
                "centroid out of range: lon={} lat={}",
                centroid.lon, centroid.lat
            )));
        }
        Ok(json!({ "lat": centroid.lat, "lon": centroid.lon }))
    }

    // GeoJSON envelope: upper-left then lower-right corner
    fn envelope(extent: &Extent) -> Result<Value> {
        let corners = [extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat];
        if !corners.iter().all(|c| c.is_finite()) {
            return Err(Error::conversion(format!(
                "extent is not finite: [{}, {}, {}, {}]",
                extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat
            )));
        }
        if extent.min_lon > extent.max_lon || extent.min_lat > extent.max_lat {
            return Err(Error::conversion(format!(
                "extent min exceeds max: [{}, {}, {}, {}]",
                extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat
            )));
        }
        Ok(json!({
            "type": "envelope",
            "coordinates": [[extent.min_lon, extent.max_lat], [extent.max_lon, extent.min_lat]],
        }))
    }

    fn importance(importance: f64) -> Result<Value> {
        if !importance.is_finite() {
            return Err(Error::conversion(format!("importance is not finite: {}", importance)));
        }
        Ok(json!(importance))
    }

    fn country_code(code: &str) -> Result<Value> {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::conversion(format!("invalid country code '{}'", code)));
        }
        Ok(Value::String(code.to_ascii_uppercase()))
    }

    fn put_names(payload: &mut Payload, field: &str, names: &Names) {
        if names.is_empty() {
            return;
        }
        let object: Map<String, Value> = names
            .iter()
            .map(|(lang, value)| (lang.clone(), Value::String(value.clone())))
            .collect();
        payload.insert(field.to_string(), Value::Object(object));
    }
}

impl FieldMapper for PlaceFieldMapper {
    fn to_payload(&self, doc: &PlaceDoc) -> Result<Payload> {
        let mut payload = Payload::new();

        payload.insert("osm_id".to_string(), json!(doc.osm_id));
        payload.insert("osm_type".to_string(), json!(doc.osm_type));
        payload.insert("osm_key".to_string(), json!(doc.osm_key));
        payload.insert("osm_value".to_string(), json!(doc.osm_value));
        payload.insert("importance".to_string(), Self::importance(doc.importance)?);
        payload.insert("coordinate".to_string(), Self::coordinate(&doc.centroid)?);

        if let Some(extent) = &doc.extent {
            payload.insert("extent".to_string(), Self::envelope(extent)?);
        }

        Self::put_names(&mut payload, "name", &doc.name);
        Self::put_names(&mut payload, "street", &doc.street);
        Self::put_names(&mut payload, "city", &doc.city);
        Self::put_names(&mut payload, "state", &doc.state);
        Self::put_names(&mut payload, "country", &doc.country);

        if let Some(housenumber) = &doc.housenumber {
            payload.insert("housenumber".to_string(), json!(housenumber));
        }
        if let Some(postcode) = &doc.postcode {
            payload.insert("postcode".to_string(), json!(postcode));
        }
        if let Some(code) = &doc.country_code {
            payload.insert("countrycode".to_string(), Self::country_code(code)?);
        }

        Ok(payload)
    }
}
