//! Spherical geometry for radius queries.
//!
//! Points are `[longitude, latitude]` pairs in decimal degrees, matching the
//! GeoJSON coordinate order used by [`crate::Location`].

/// Earth's mean radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Convert a distance in miles into an angular radius in radians.
///
/// # Examples
///
/// ```
/// use bootcamp::geo::miles_to_radians;
///
/// assert_eq!(miles_to_radians(3963.0), 1.0);
/// assert_eq!(miles_to_radians(0.0), 0.0);
/// ```
pub fn miles_to_radians(miles: f64) -> f64 {
    miles / EARTH_RADIUS_MILES
}

/// Great-circle central angle between two points, in radians.
///
/// Uses the haversine formula, which stays accurate for small distances.
///
/// # Examples
///
/// ```
/// use bootcamp::geo::angular_distance;
///
/// let boston = [-71.0589, 42.3601];
/// assert_eq!(angular_distance(boston, boston), 0.0);
/// ```
pub fn angular_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lon1, lat1) = (a[0].to_radians(), a[1].to_radians());
    let (lon2, lat2) = (b[0].to_radians(), b[1].to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Check whether `point` lies within a spherical cap of `radius` radians
/// centred on `center`.
pub fn within_sphere(point: [f64; 2], center: [f64; 2], radius: f64) -> bool {
    angular_distance(point, center) <= radius
}
