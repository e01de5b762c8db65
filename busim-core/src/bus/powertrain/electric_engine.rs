use super::*;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
/// Traction motor fed by a [Battery]
pub struct ElectricEngine {
    /// max rated output power
    pub pwr_out_max: si::Power,
    /// battery-to-wheel efficiency
    pub eta: si::Ratio,
    pub battery: Battery,
}

impl Init for ElectricEngine {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.pwr_out_max > si::Power::ZERO, || {
            format!("{}\nmax power must be positive", format_dbg!(self.pwr_out_max))
        })?;
        check_config(self.eta > si::Ratio::ZERO && self.eta <= uc::R, || {
            format!("{}\nefficiency must be within (0, 1]", format_dbg!(self.eta))
        })?;
        self.battery.init()?;
        Ok(())
    }
}
impl SerdeAPI for ElectricEngine {}

impl ElectricEngine {
    pub fn new(pwr_out_max: si::Power, eta: si::Ratio, battery: Battery) -> anyhow::Result<Self> {
        let mut engine = Self {
            pwr_out_max,
            eta,
            battery,
        };
        engine.init().with_context(|| format_dbg!())?;
        Ok(engine)
    }
}

impl EngineTrait for ElectricEngine {
    fn pwr_out_max(&self) -> si::Power {
        self.pwr_out_max
    }

    fn eta(&self) -> si::Ratio {
        self.eta
    }

    /// Draws the adjusted energy from the battery.  Negative power
    /// regenerates.  Zero duration consumes nothing and leaves the battery
    /// untouched.
    fn solve_consumption(
        &mut self,
        pwr: si::Power,
        dt: si::Time,
        _dist: si::Length,
    ) -> anyhow::Result<Consumption> {
        if dt <= si::Time::ZERO {
            return Ok(Consumption::default());
        }
        let energy: si::Energy = self.adjust_pwr(pwr) * dt;
        let charge: si::ElectricCharge = energy / self.battery.voltage;
        self.battery
            .update_soc_and_degradation(charge, dt)
            .with_context(|| format_dbg!())?;
        Ok(Consumption {
            energy,
            charge,
            battery_degradation: self.battery.state.degradation,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> ElectricEngine {
        let battery = Battery::new(
            uc::KWH * 392.0,
            uc::V * 400.0,
            3000.0,
            uc::R,
            uc::R * 0.75,
            uc::R * 0.2,
        )
        .unwrap();
        ElectricEngine::new(uc::KW * 240.0, uc::R * 0.92, battery).unwrap()
    }

    #[test]
    fn test_power_capped_and_scaled() {
        let engine = test_engine();
        assert!(almost_eq_uom(
            &engine.adjust_pwr(uc::KW * 300.0),
            &(uc::KW * 240.0 * 0.92),
            None
        ));
        assert!(almost_eq_uom(
            &engine.adjust_pwr(uc::KW * 100.0),
            &(uc::KW * 92.0),
            None
        ));
    }

    #[test]
    fn test_consumption_drains_battery() {
        let mut engine = test_engine();
        let cons = engine
            .solve_consumption(uc::KW * 100.0, uc::S * 3600.0, uc::KM * 10.0)
            .unwrap();
        assert!(almost_eq(cons.energy.get::<si::watt_hour>(), 92e3, None));
        assert!(almost_eq(cons.charge.get::<si::ampere_hour>(), 230.0, None));
        assert_eq!(cons.fuel, si::Volume::ZERO);
        assert!(engine.battery.soc() < uc::R);
        assert!(cons.battery_degradation > si::Ratio::ZERO);
    }

    #[test]
    fn test_regen_and_zero_duration() {
        let mut engine = test_engine();
        engine
            .solve_consumption(uc::KW * 100.0, uc::S * 600.0, uc::KM * 1.0)
            .unwrap();
        let soc = engine.battery.soc();
        let cons = engine
            .solve_consumption(uc::KW * -50.0, uc::S * 60.0, uc::KM * 0.2)
            .unwrap();
        assert!(cons.energy < si::Energy::ZERO);
        assert!(engine.battery.soc() > soc);

        let soc = engine.battery.soc();
        let cons = engine
            .solve_consumption(uc::KW * 100.0, si::Time::ZERO, si::Length::ZERO)
            .unwrap();
        assert_eq!(cons, Consumption::default());
        assert_eq!(engine.battery.soc(), soc);
    }
}
