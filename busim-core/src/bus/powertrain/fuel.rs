use super::*;

/// Lower heating values of supported fuels, in J/L
const LHV_TABLE: [(&str, f64); 6] = [
    ("gasoline", 3.1536e7),
    ("diesel", 3.58e7),
    ("propane", 2.5e7),
    ("natural_gas", 3.6e7),
    ("E85", 2.4e7),
    ("E100", 2.68e7),
];

/// Looks up the lower heating value of a fuel by name, case-insensitively
pub fn lhv_lookup(fuel_type: &str) -> Option<si::EnergyDensity> {
    LHV_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(fuel_type))
        .map(|(_, lhv)| *lhv * uc::J / uc::L)
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
/// Fuel burned by a [CombustionEngine](super::CombustionEngine)
pub struct Fuel {
    /// name of the fuel, e.g. `diesel`
    pub fuel_type: String,
    /// lower heating value per unit volume; looked up from `fuel_type` when omitted
    #[serde(default)]
    lhv: Option<si::EnergyDensity>,
}

impl Init for Fuel {
    fn init(&mut self) -> Result<(), Error> {
        let lhv = match self.lhv {
            Some(lhv) => lhv,
            None => lhv_lookup(&self.fuel_type).ok_or_else(|| {
                Error::ConfigError(format!(
                    "unknown fuel type {:?} and no heating value given",
                    self.fuel_type
                ))
            })?,
        };
        check_config(lhv > si::EnergyDensity::ZERO, || {
            format!("{}\nheating value must be positive", format_dbg!(lhv))
        })?;
        self.lhv = Some(lhv);
        Ok(())
    }
}
impl SerdeAPI for Fuel {}

impl Fuel {
    /// Fuel with the tabulated heating value for `fuel_type`
    pub fn new(fuel_type: &str) -> anyhow::Result<Self> {
        let mut fuel = Self {
            fuel_type: fuel_type.into(),
            lhv: None,
        };
        fuel.init()?;
        Ok(fuel)
    }

    /// Fuel with an explicit heating value
    pub fn with_lhv(fuel_type: &str, lhv: si::EnergyDensity) -> anyhow::Result<Self> {
        let mut fuel = Self {
            fuel_type: fuel_type.into(),
            lhv: Some(lhv),
        };
        fuel.init()?;
        Ok(fuel)
    }

    pub fn lhv(&self) -> anyhow::Result<si::EnergyDensity> {
        self.lhv
            .or_else(|| lhv_lookup(&self.fuel_type))
            .ok_or_else(|| anyhow!("{}\nheating value unresolved", format_dbg!(self.fuel_type)))
    }
}
