use crate::imports::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Charger reachable by a detour from the end of the route
pub struct ChargingPoint {
    pub id: u32,
    /// rated charging power
    pub power: si::Power,
    /// extra distance driven to reach the charger
    pub detour_distance: si::Length,
    /// one-way travel time between the route and the charger
    pub detour_time: si::Time,
}

impl Init for ChargingPoint {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.power > si::Power::ZERO, || {
            format!(
                "{}\ncharging point {} must have positive power",
                format_dbg!(self.power),
                self.id
            )
        })?;
        check_config(
            self.detour_distance >= si::Length::ZERO && self.detour_time >= si::Time::ZERO,
            || format!("charging point {} has a negative detour", self.id),
        )?;
        Ok(())
    }
}
impl SerdeAPI for ChargingPoint {}

impl ChargingPoint {
    /// Time the bus is out of service for one charge taking `charging_time`,
    /// including the round trip to the charger
    pub fn unavailability(&self, charging_time: si::Time) -> si::Time {
        charging_time + 2.0 * self.detour_time
    }
}

/// Row of the charging-point file, in the units the file uses
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ChargingPointRecord {
    id: u32,
    power_watts: f64,
    distance_km: f64,
    time_min: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ChargingPointFile {
    charging_points: Vec<ChargingPointRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Charging points keyed by id
pub struct ChargingPoints(BTreeMap<u32, ChargingPoint>);

impl Init for ChargingPoints {
    fn init(&mut self) -> Result<(), Error> {
        for (id, cp) in self.0.iter_mut() {
            check_config(*id == cp.id, || {
                format!("charging point keyed {id} has id {}", cp.id)
            })?;
            cp.init()?;
        }
        Ok(())
    }
}
impl SerdeAPI for ChargingPoints {}

impl ChargingPoints {
    pub fn new(points: Vec<ChargingPoint>) -> anyhow::Result<Self> {
        let mut map = BTreeMap::new();
        for cp in points {
            if map.insert(cp.id, cp).is_some() {
                bail!(Error::ConfigError(format!(
                    "duplicate charging point id {}",
                    cp.id
                )));
            }
        }
        let mut cps = Self(map);
        cps.init()?;
        Ok(cps)
    }

    /// Parses `{"charging_points": [{"id", "power_watts", "distance_km", "time_min"}]}`
    pub fn from_json_records<S: AsRef<str>>(json: S) -> anyhow::Result<Self> {
        let file: ChargingPointFile =
            serde_json::from_str(json.as_ref()).with_context(|| format_dbg!())?;
        Self::new(
            file.charging_points
                .into_iter()
                .map(|rec| ChargingPoint {
                    id: rec.id,
                    power: rec.power_watts * uc::W,
                    detour_distance: rec.distance_km * uc::KM,
                    detour_time: rec.time_min * uc::MIN,
                })
                .collect(),
        )
    }

    /// Reads a charging-point file in the format of [Self::from_json_records]
    pub fn from_json_records_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read charging points from {path:?}"))?;
        Self::from_json_records(contents)
    }

    pub fn get(&self, id: u32) -> anyhow::Result<&ChargingPoint> {
        self.0.get(&id).ok_or_else(|| {
            anyhow!(Error::ConfigError(format!("unknown charging point id {id}")))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargingPoint> {
        self.0.values()
    }
}
