use crate::domain::model::{format_wall_clock, Restaurant};
use crate::utils::error::{DiscoveryError, Result};

pub fn restaurants_to_json(restaurants: &[Restaurant]) -> Result<String> {
    Ok(serde_json::to_string_pretty(restaurants)?)
}

/// One row per restaurant; attributes are joined with `;`.
pub fn restaurants_to_csv(restaurants: &[Restaurant]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "restaurant_id",
        "name",
        "city",
        "latitude",
        "longitude",
        "opens_at",
        "closes_at",
        "attributes",
    ])?;

    for r in restaurants {
        writer.write_record([
            r.restaurant_id.clone(),
            r.name.clone(),
            r.city.clone(),
            r.location.latitude.to_string(),
            r.location.longitude.to_string(),
            format_wall_clock(&r.hours.opens_at),
            format_wall_clock(&r.hours.closes_at),
            r.attributes.join(";"),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DiscoveryError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        DiscoveryError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
