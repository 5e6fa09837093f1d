use crate::domain::model::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine, spherical Earth).
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Strictly inside the radius; a restaurant exactly on the edge is out.
pub fn is_within_radius(anchor: &Coordinate, target: &Coordinate, radius_km: f64) -> bool {
    distance_km(anchor, target) < radius_km
}
