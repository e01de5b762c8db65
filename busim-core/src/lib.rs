//! Core library for simulating the energy use, pollutant emissions and battery
//! degradation of an urban bus driving a route, either replaying recorded
//! telemetry or following a speed profile synthesized from speed limits.
//!
//! The crate is organized leaf to root:
//! - [route::resistance] turns vehicle and kinematic state into resistive forces
//! - [bus] holds the vehicle, its powertrain and battery
//! - [route] builds sections from raw points and solves simulated kinematics
//! - [model] repeats route traversals over simulated days, charging as needed

#[macro_use]
pub mod utils;

pub mod bus;
pub mod error;
pub mod imports;
pub mod model;
pub mod prelude;
pub mod route;
pub mod si;
pub mod traits;
pub mod uc;

pub use error::Error;
