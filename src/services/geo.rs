// src/services/geo.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

use crate::{
    errors::{AppError, AppResult},
    models::{Employee, GpsFix, OfficeGeofence},
};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoCheck {
    pub distance_meters: u64,
    pub inside_radius: bool,
}

/// Why a clock action was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeoClearance {
    Onsite,
    CompanyRemote,
    EmployeeRemote,
}

/// Great-circle distance in meters, rounded to the nearest meter.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> u64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_METERS * c).round() as u64
}

/// `(distance, inside)` for a user position against an office. Boundary inclusive.
pub fn check_distance(
    user_lat: f64,
    user_lon: f64,
    office_lat: f64,
    office_lon: f64,
    radius_meters: f64,
) -> GeoCheck {
    let distance_meters = haversine_meters(user_lat, user_lon, office_lat, office_lon);
    GeoCheck {
        distance_meters,
        inside_radius: distance_meters as f64 <= radius_meters,
    }
}

/// A fix is usable when its coordinates are real and it is not older than `max_age`.
pub fn usable_fix(fix: &GpsFix, now: DateTime<Utc>, max_age: Duration) -> bool {
    let coords_ok = fix.latitude.is_finite()
        && fix.longitude.is_finite()
        && fix.latitude.abs() <= 90.0
        && fix.longitude.abs() <= 180.0;
    let fresh = match fix.captured_at {
        Some(at) => (now - at)
            .to_std()
            .map(|age| age <= max_age)
            // Captured "in the future" means the device clock is ahead; accept it.
            .unwrap_or(true),
        None => true,
    };
    coords_ok && fresh
}

/// Decides whether an attendance write may go ahead.
///
/// Remote permissions short-circuit the fix requirement. Without them, a
/// missing or unusable fix is `LocationUnavailable`, never "inside".
pub fn authorize_clock(
    employee: &Employee,
    geofence: &OfficeGeofence,
    fix: Option<&GpsFix>,
    now: DateTime<Utc>,
    max_fix_age: Duration,
) -> AppResult<(GeoClearance, Option<GeoCheck>)> {
    let check = fix
        .filter(|f| usable_fix(f, now, max_fix_age))
        .map(|f| {
            check_distance(
                f.latitude,
                f.longitude,
                geofence.latitude,
                geofence.longitude,
                geofence.radius_meters,
            )
        });

    if geofence.allow_remote {
        return Ok((GeoClearance::CompanyRemote, check));
    }
    if employee.remote_attendance {
        return Ok((GeoClearance::EmployeeRemote, check));
    }

    match check {
        None => Err(AppError::LocationUnavailable(
            "No usable GPS fix; enable location and try again".to_string(),
        )),
        Some(c) if c.inside_radius => Ok((GeoClearance::Onsite, Some(c))),
        Some(c) => Err(AppError::LocationOutOfRange {
            distance_meters: c.distance_meters,
            radius_meters: geofence.radius_meters,
            location: geofence.name.clone(),
        }),
    }
}
