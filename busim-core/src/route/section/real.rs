use super::*;
use crate::route::input::RealPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Speeds and times observed by telemetry at both ends of a section
pub struct RealKinematics {
    pub start_speed: si::Velocity,
    pub end_speed: si::Velocity,
    pub start_time: si::Time,
    pub end_time: si::Time,
}

impl RealKinematics {
    pub fn new(start: &RealPoint, end: &RealPoint) -> Self {
        Self {
            start_speed: start.speed,
            end_speed: end.speed,
            start_time: start.time,
            end_time: end.time,
        }
    }
}

impl KinematicProfile for RealKinematics {
    fn start_speed(&self) -> si::Velocity {
        self.start_speed
    }
    fn end_speed(&self) -> si::Velocity {
        self.end_speed
    }
    fn start_time(&self) -> si::Time {
        self.start_time
    }
    fn end_time(&self) -> si::Time {
        self.end_time
    }
}
