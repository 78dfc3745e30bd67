use serde::{Deserialize, Serialize};
use std::{
    cmp,
    fmt::Display,
    ops::{Add, Div, Mul, Sub},
    str::FromStr,
};
use thiserror::Error;

/// A non-negative (in practice) distance, stored in meters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Distance {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<f64> for Distance {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl From<f64> for Distance {
    fn from(value: f64) -> Self {
        Distance(value)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

#[derive(Error, Debug)]
pub enum ParseCoordinateError {
    #[error("invalid latitude")]
    InvalidLatitude,
    #[error("invalid longitude")]
    InvalidLongitude,
    #[error("invalid format")]
    InvalidFormat,
}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains(',') {
            return Err(ParseCoordinateError::InvalidFormat);
        }
        let s: String = s.split_whitespace().collect();
        let split: Vec<_> = s.split(',').collect();
        let latitude: f64 = split
            .first()
            .ok_or(ParseCoordinateError::InvalidLatitude)?
            .parse()
            .map_err(|_| ParseCoordinateError::InvalidLatitude)?;
        let longitude: f64 = split
            .last()
            .ok_or(ParseCoordinateError::InvalidLongitude)?
            .parse()
            .map_err(|_| ParseCoordinateError::InvalidLongitude)?;
        Ok(Coordinate {
            latitude,
            longitude,
        })
    }
}

/// Mean earth radius in meters, the constant the great-circle distance below is built on.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

impl Coordinate {
    /// True great-circle distance. This is the only distance measure the
    /// search driver is allowed to trust; the spatial grid (C3) only ever
    /// uses it as a final filter after a cheap cell-based candidate scan.
    pub fn haversine_distance(&self, other: &Self) -> Distance {
        let dist_lat = (other.latitude - self.latitude).to_radians();
        let dist_lon = (other.longitude - self.longitude).to_radians();
        let a = (dist_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (dist_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::from_meters(EARTH_RADIUS_M * c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_paris_london() {
        let paris = Coordinate::from((48.858_01, 2.351_435));
        let london = Coordinate::from((51.505_24, -0.124_954_08));
        let d = paris.haversine_distance(&london);
        assert!((d.as_kilometers() - 343.0).abs() < 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::from((59.33, 18.06));
        let b = Coordinate::from((59.86, 17.63));
        assert!((a.haversine_distance(&b).as_meters() - b.haversine_distance(&a).as_meters()).abs() < 1e-6);
    }

    #[test]
    fn distance_eq() {
        assert_eq!(Distance::from_meters(1000.0), Distance::from_kilometers(1.0));
    }

    #[test]
    fn coordinate_parse() {
        let c: Coordinate = "59.33, 18.06".parse().unwrap();
        assert_eq!(c.latitude, 59.33);
        assert_eq!(c.longitude, 18.06);
    }

    #[test]
    fn coordinate_parse_rejects_missing_comma() {
        assert!("59.33 18.06".parse::<Coordinate>().is_err());
    }
}
