use crate::imports::*;
use geo::{GeodesicDistance, Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position with altitude
pub struct Coord {
    /// degrees north
    pub latitude: f64,
    /// degrees east
    pub longitude: f64,
    pub altitude: si::Length,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64, altitude: si::Length) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Geodesic distance on the WGS84 ellipsoid, ignoring altitude
    pub fn distance_to(&self, other: &Coord) -> si::Length {
        self.point().geodesic_distance(&other.point()) * uc::M
    }

    /// Grade angle from `self` to `other` over horizontal distance `length`;
    /// zero when `length` is zero
    pub fn grade_to(&self, other: &Coord, length: si::Length) -> si::Angle {
        if length == si::Length::ZERO {
            return si::Angle::ZERO;
        }
        let rise: si::Ratio = (other.altitude - self.altitude) / length;
        rise.get::<si::ratio>().atan() * uc::RAD
    }
}
