//! Reading route points from CSV files

use super::coord::Coord;
use crate::imports::*;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Telemetry sample recorded on the bus
pub struct RealPoint {
    pub time: si::Time,
    pub coord: Coord,
    pub speed: si::Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Route vertex with the speed limit of the segment ending at it
pub struct SimPoint {
    pub coord: Coord,
    pub speed_limit: si::Velocity,
}

/// seconds, degrees, degrees, meters, m/s
#[derive(Debug, Deserialize)]
struct RealRow {
    time: f64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: f64,
}

/// degrees, degrees, meters, km/h
#[derive(Debug, Deserialize)]
struct SimRow {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed_limit: f64,
}

fn check_csv_extension(path: &Path) -> anyhow::Result<()> {
    let extension = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    if !extension.eq_ignore_ascii_case("csv") {
        bail!(Error::ConfigError(format!(
            "unsupported route file {path:?}, expected a `.csv` file"
        )));
    }
    Ok(())
}

fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

/// Drops leading zero-time samples except the last one, which anchors the
/// first section at the start of the recording
pub fn trim_leading_zero_time(points: Vec<RealPoint>) -> Vec<RealPoint> {
    match points.iter().position(|p| p.time != si::Time::ZERO) {
        Some(0) => points,
        Some(idx) => points[idx - 1..].to_vec(),
        None => points.last().into_iter().copied().collect(),
    }
}

/// Parses telemetry with columns `time, latitude, longitude, altitude, speed`.
/// Other columns are ignored.
pub fn real_points_from_reader<R: Read>(rdr: R) -> anyhow::Result<Vec<RealPoint>> {
    let mut points = Vec::new();
    for (i, row) in csv_reader(rdr).deserialize::<RealRow>().enumerate() {
        let row = row.with_context(|| format!("malformed telemetry row {}", i + 1))?;
        points.push(RealPoint {
            time: row.time * uc::S,
            coord: Coord::new(row.latitude, row.longitude, row.altitude * uc::M),
            speed: row.speed * uc::MPS,
        });
    }
    Ok(trim_leading_zero_time(points))
}

/// Parses speed-limit profiles with columns `latitude, longitude, altitude, speed_limit`
pub fn sim_points_from_reader<R: Read>(rdr: R) -> anyhow::Result<Vec<SimPoint>> {
    let mut points = Vec::new();
    for (i, row) in csv_reader(rdr).deserialize::<SimRow>().enumerate() {
        let row = row.with_context(|| format!("malformed route row {}", i + 1))?;
        points.push(SimPoint {
            coord: Coord::new(row.latitude, row.longitude, row.altitude * uc::M),
            speed_limit: row.speed_limit * uc::KPH,
        });
    }
    Ok(points)
}

pub fn read_real_points<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RealPoint>> {
    let path = path.as_ref();
    check_csv_extension(path)?;
    let file = File::open(path).with_context(|| format!("Could not open {path:?}"))?;
    real_points_from_reader(file).with_context(|| format!("{path:?}"))
}

pub fn read_sim_points<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<SimPoint>> {
    let path = path.as_ref();
    check_csv_extension(path)?;
    let file = File::open(path).with_context(|| format!("Could not open {path:?}"))?;
    sim_points_from_reader(file).with_context(|| format!("{path:?}"))
}
