use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::{
    validate_latitude, validate_longitude, validate_non_empty_string, Validate,
};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }
}

impl Validate for Coordinate {
    fn validate(&self) -> Result<()> {
        validate_latitude("latitude", self.latitude)?;
        validate_longitude("longitude", self.longitude)
    }
}

/// Daily opening hours on a shared wall clock. Windows are not
/// midnight-aware: `22:00`-`02:00` is never open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    #[serde(with = "wall_clock")]
    pub opens_at: NaiveTime,
    #[serde(with = "wall_clock")]
    pub closes_at: NaiveTime,
}

impl OperatingWindow {
    pub fn new(opens_at: NaiveTime, closes_at: NaiveTime) -> Self {
        Self {
            opens_at,
            closes_at,
        }
    }

    pub fn parse(opens_at: &str, closes_at: &str) -> Result<Self> {
        Ok(Self {
            opens_at: parse_wall_clock("opens_at", opens_at)?,
            closes_at: parse_wall_clock("closes_at", closes_at)?,
        })
    }
}

/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.fff`.
pub fn parse_wall_clock(field_name: &str, value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| DiscoveryError::validation(field_name, value, e.to_string()))
}

pub fn format_wall_clock(time: &NaiveTime) -> String {
    if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S%.f").to_string()
    }
}

mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wall_clock(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wall_clock("time", &raw).map_err(serde::de::Error::custom)
    }
}

/// The restaurant projection returned to callers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default)]
    pub restaurant_id: String,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(flatten)]
    pub hours: OperatingWindow,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Validate for Restaurant {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        self.location.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub menu_id: String,
    pub restaurant_id: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Menu {
    pub fn contains_any_item(&self, item_ids: &[String]) -> bool {
        self.items
            .iter()
            .any(|item| item_ids.iter().any(|id| *id == item.item_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    Name,
    Attributes,
    ItemName,
    ItemAttributes,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Name,
        SearchMode::Attributes,
        SearchMode::ItemName,
        SearchMode::ItemAttributes,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    /// `None` runs every mode and merges the results.
    pub mode: Option<SearchMode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub location: Coordinate,
    pub current_time: NaiveTime,
    pub serving_radius_km: f64,
    pub search: Option<SearchQuery>,
}

impl DiscoveryQuery {
    pub fn nearby(location: Coordinate, current_time: NaiveTime, serving_radius_km: f64) -> Self {
        Self {
            location,
            current_time,
            serving_radius_km,
            search: None,
        }
    }

    pub fn with_search(mut self, text: impl Into<String>, mode: Option<SearchMode>) -> Self {
        self.search = Some(SearchQuery {
            text: text.into(),
            mode,
        });
        self
    }
}

impl Validate for DiscoveryQuery {
    fn validate(&self) -> Result<()> {
        self.location.validate()?;
        crate::utils::validation::validate_positive_distance(
            "serving_radius_km",
            self.serving_radius_km,
        )
    }
}
