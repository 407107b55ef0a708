use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

/// Nominatim place id, also used as the document id in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaceId(pub u64);

impl PlaceId {
    pub fn new(id: u64) -> Self {
        PlaceId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PlaceId {
    fn from(id: u64) -> Self {
        PlaceId(id)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Localized strings keyed by language code. The plain value lives under `"default"`.
pub type Names = BTreeMap<String, String>;

pub const DEFAULT_LANGUAGE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lon: f64,
    pub lat: f64,
}

impl Centroid {
    pub fn new(lon: f64, lat: f64) -> Self {
        Centroid { lon, lat }
    }
}

/// Bounding box of a place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDoc {
    pub place_id: PlaceId,
    pub osm_type: String,
    pub osm_id: u64,
    pub osm_key: String,
    pub osm_value: String,
    pub name: Names,
    pub housenumber: Option<String>,
    pub postcode: Option<String>,
    pub street: Names,
    pub city: Names,
    pub state: Names,
    pub country: Names,
    pub country_code: Option<String>,
    pub centroid: Centroid,
    pub extent: Option<Extent>,
    pub importance: f64,
}

impl PlaceDoc {
    pub fn new(place_id: PlaceId, osm_key: &str, osm_value: &str, centroid: Centroid) -> Self {
        PlaceDoc {
            place_id,
            osm_type: "N".to_string(),
            osm_id: 0,
            osm_key: osm_key.to_string(),
            osm_value: osm_value.to_string(),
            name: Names::new(),
            housenumber: None,
            postcode: None,
            street: Names::new(),
            city: Names::new(),
            state: Names::new(),
            country: Names::new(),
            country_code: None,
            centroid,
            extent: None,
            importance: 0.0,
        }
    }

    pub fn with_name(mut self, language: &str, name: &str) -> Self {
        self.name.insert(language.to_string(), name.to_string());
        self
    }

    pub fn with_osm(mut self, osm_type: &str, osm_id: u64) -> Self {
        self.osm_type = osm_type.to_string();
        self.osm_id = osm_id;
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_country_code(mut self, code: &str) -> Self {
        self.country_code = Some(code.to_string());
        self
    }

    pub fn default_name(&self) -> Option<&str> {
        self.name.get(DEFAULT_LANGUAGE).map(String::as_str)
    }
}

impl fmt::Display for PlaceDoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "place {} ({}{} {}={})",
            self.place_id, self.osm_type, self.osm_id, self.osm_key, self.osm_value
        )?;
        if let Some(name) = self.default_name() {
            write!(f, " \"{}\"", name)?;
        }
        Ok(())
    }
}
