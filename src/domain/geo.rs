use serde::{Deserialize, Serialize};

use crate::models::Branch;

/// Mean Earth radius in meters (spherical approximation).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinate { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// Great-circle distance between two positions, in meters (haversine).
pub fn distance_meters(observed: Coordinate, reference: Coordinate) -> f64 {
    let lat1 = observed.lat.to_radians();
    let lat2 = reference.lat.to_radians();
    let d_lat = (reference.lat - observed.lat).to_radians();
    let d_lng = (reference.lng - observed.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether the observed position falls inside the branch geofence.
/// Invalid coordinates fail closed: outside the fence.
pub fn is_within_fence(observed: Coordinate, branch: &Branch) -> bool {
    let reference = Coordinate::new(branch.lat, branch.lng);
    if !observed.is_valid() || !reference.is_valid() {
        return false;
    }
    distance_meters(observed, reference) <= branch.radius
}
