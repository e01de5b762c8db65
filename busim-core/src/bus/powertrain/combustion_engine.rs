use super::*;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
/// Internal combustion engine burning a [Fuel]
pub struct CombustionEngine {
    /// max rated output power
    pub pwr_out_max: si::Power,
    /// fuel-to-wheel efficiency
    pub eta: si::Ratio,
    pub fuel: Fuel,
}

impl Init for CombustionEngine {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.pwr_out_max > si::Power::ZERO, || {
            format!("{}\nmax power must be positive", format_dbg!(self.pwr_out_max))
        })?;
        check_config(self.eta > si::Ratio::ZERO && self.eta <= uc::R, || {
            format!("{}\nefficiency must be within (0, 1]", format_dbg!(self.eta))
        })?;
        self.fuel.init()?;
        Ok(())
    }
}
impl SerdeAPI for CombustionEngine {}

impl CombustionEngine {
    pub fn new(pwr_out_max: si::Power, eta: si::Ratio, fuel: Fuel) -> anyhow::Result<Self> {
        let mut engine = Self {
            pwr_out_max,
            eta,
            fuel,
        };
        engine.init().with_context(|| format_dbg!())?;
        Ok(engine)
    }
}

impl EngineTrait for CombustionEngine {
    fn pwr_out_max(&self) -> si::Power {
        self.pwr_out_max
    }

    fn eta(&self) -> si::Ratio {
        self.eta
    }

    /// Burns fuel for the adjusted power.  Braking and coasting (negative
    /// power) and zero-duration sections burn nothing.
    fn solve_consumption(
        &mut self,
        pwr: si::Power,
        dt: si::Time,
        dist: si::Length,
    ) -> anyhow::Result<Consumption> {
        if pwr < si::Power::ZERO || dt <= si::Time::ZERO {
            return Ok(Consumption::default());
        }
        let energy: si::Energy = self.adjust_pwr(pwr) * dt / self.eta;
        let fuel: si::Volume = energy / self.fuel.lhv().with_context(|| format_dbg!())?;
        let fuel_l_per_km = if dist > si::Length::ZERO {
            fuel.get::<si::liter>() / dist.get::<si::kilometer>()
        } else {
            0.0
        };
        Ok(Consumption {
            fuel_rate: fuel / dt,
            fuel_l_per_km,
            fuel,
            ..Default::default()
        })
    }
}
