//! A northbound drive on Las Vegas Boulevard, one fix every 15 seconds.
//!
//! Coordinates follow the road centerline (OpenStreetMap), with a few fixes
//! recorded while stopped at lights.

use chrono::{DateTime, Duration, TimeZone, Utc};
use route_refiner::Coordinate;

#[derive(Debug, Clone, Copy)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    /// Seconds since the start of the drive.
    pub offset_secs: i64,
}

impl Fix {
    pub const fn new(lat: f64, lng: f64, offset_secs: i64) -> Self {
        Self { lat, lng, offset_secs }
    }
}

pub const STRIP_DRIVE: &[Fix] = &[
    Fix::new(36.0909, -115.1744, 0),
    Fix::new(36.0931, -115.1744, 15),
    Fix::new(36.0953, -115.1744, 30),
    Fix::new(36.0975, -115.1743, 45),
    Fix::new(36.0997, -115.1743, 60),
    Fix::new(36.1019, -115.1729, 75),
    Fix::new(36.1019, -115.1729, 90),
    Fix::new(36.1019, -115.1729, 105),
    Fix::new(36.1046, -115.1725, 120),
    Fix::new(36.1073, -115.1723, 135),
    Fix::new(36.1100, -115.1721, 150),
    Fix::new(36.1126, -115.1719, 165),
    Fix::new(36.1152, -115.1717, 180),
    Fix::new(36.1178, -115.1714, 195),
    Fix::new(36.1204, -115.1702, 210),
    Fix::new(36.1230, -115.1690, 225),
    Fix::new(36.1263, -115.1658, 240),
];

pub fn drive_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 21, 30, 0).unwrap()
}

/// The drive as timestamped request coordinates.
pub fn strip_coordinates() -> Vec<Coordinate> {
    let start = drive_start();
    STRIP_DRIVE
        .iter()
        .map(|fix| {
            let mut coord = Coordinate::new(fix.lat, fix.lng)
                .with_timestamp(start + Duration::seconds(fix.offset_secs));
            coord.vehicle_id = Some("TRK-042".to_string());
            coord
        })
        .collect()
}
