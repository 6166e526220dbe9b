//! Great-circle distance helpers.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the distance between two coordinates in kilometers (haversine).
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Format a radius the way the search index expects distances (e.g. `"200km"`).
pub fn format_radius_km(radius_km: f64) -> String {
    format!("{}km", radius_km)
}
