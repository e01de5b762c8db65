use super::*;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
/// Coefficients of the cycle-counting multiplier applied to every SOC change.
///
/// The multiplier is the product of an SOC term, which grows when charging
/// near full or discharging near empty, and a current term, which grows
/// linearly with the magnitude of the current.
pub struct DegradationParams {
    /// SOC above which charging wears the cells faster
    pub chrg_soc_knee: si::Ratio,
    /// SOC term when charging below [Self::chrg_soc_knee]
    pub chrg_base: f64,
    /// increase of the SOC term per percent of SOC above [Self::chrg_soc_knee]
    pub chrg_slope: f64,
    /// SOC below which discharging wears the cells faster
    pub disch_soc_knee: si::Ratio,
    /// SOC term when discharging above [Self::disch_soc_knee]
    pub disch_base: f64,
    /// increase of the SOC term per percent of SOC below [Self::disch_soc_knee]
    pub disch_slope: f64,
    /// increase of the current term per ampere
    pub current_slope: f64,
}

impl Default for DegradationParams {
    fn default() -> Self {
        Self {
            chrg_soc_knee: 80.0 * uc::PERCENT,
            chrg_base: 1.005,
            chrg_slope: 0.02,
            disch_soc_knee: 20.0 * uc::PERCENT,
            disch_base: 1.05,
            disch_slope: 0.02,
            current_slope: 0.0002,
        }
    }
}

impl Init for DegradationParams {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.chrg_base > 0.0 && self.disch_base > 0.0, || {
            format!(
                "{}\ndegradation base factors must be positive",
                format_dbg!((self.chrg_base, self.disch_base))
            )
        })?;
        check_config(
            self.chrg_slope >= 0.0 && self.disch_slope >= 0.0 && self.current_slope >= 0.0,
            || "degradation slopes must not be negative".into(),
        )?;
        for knee in [self.chrg_soc_knee, self.disch_soc_knee] {
            check_config(knee >= si::Ratio::ZERO && knee <= uc::R, || {
                format!("{}\nSOC knee must be within [0, 1]", format_dbg!(knee))
            })?;
        }
        Ok(())
    }
}
impl SerdeAPI for DegradationParams {}

impl DegradationParams {
    /// SOC term of the multiplier.  Negative `current` means charging.
    pub fn soc_factor(&self, soc: si::Ratio, current: si::ElectricCurrent) -> f64 {
        let soc_pct = soc.get::<si::percent>();
        if current < si::ElectricCurrent::ZERO {
            let knee = self.chrg_soc_knee.get::<si::percent>();
            if soc_pct < knee {
                self.chrg_base
            } else {
                self.chrg_base + self.chrg_slope * (soc_pct - knee)
            }
        } else {
            let knee = self.disch_soc_knee.get::<si::percent>();
            if soc_pct > knee {
                self.disch_base
            } else {
                self.disch_base + self.disch_slope * (knee - soc_pct)
            }
        }
    }

    /// Current term of the multiplier, symmetric in charge and discharge
    pub fn current_factor(&self, current: si::ElectricCurrent) -> f64 {
        1.0 + self.current_slope * current.abs().get::<si::ampere>()
    }

    pub fn multiplier(&self, soc: si::Ratio, current: si::ElectricCurrent) -> f64 {
        self.soc_factor(soc, current) * self.current_factor(current)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
/// Traction battery with SOC tracking and cycle-based capacity fade
pub struct Battery {
    /// rated energy capacity when new
    pub energy_capacity: si::Energy,
    /// nominal pack voltage, used to convert between energy and charge
    pub voltage: si::ElectricPotential,
    /// equivalent full cycles after which SOH reaches [Self::min_soh]
    pub max_cycles: f64,
    /// state of health at end of life, e.g. 0.75
    pub min_soh: si::Ratio,
    /// SOC below which the battery is considered out of its operating window
    pub min_soc_operable: si::Ratio,
    /// pack specific energy, used to derive battery mass
    #[serde(default)]
    pub specific_energy: Option<si::SpecificEnergy>,
    #[serde(default)]
    pub degradation: DegradationParams,
    /// struct for tracking current state
    #[serde(default)]
    pub state: BatteryState,
    /// update interval between saves to [Self::history].  If None, no saving occurs.
    #[serde(default)]
    pub save_interval: Option<usize>,
    /// Custom vector of [Self::state]
    #[serde(default, skip_serializing_if = "BatteryStateHistoryVec::is_empty")]
    pub history: BatteryStateHistoryVec,
}

impl Init for Battery {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.energy_capacity > si::Energy::ZERO, || {
            format!(
                "{}\nbattery capacity must be positive",
                format_dbg!(self.energy_capacity)
            )
        })?;
        check_config(self.voltage > si::ElectricPotential::ZERO, || {
            format!(
                "{}\nbattery voltage must be positive",
                format_dbg!(self.voltage)
            )
        })?;
        check_config(self.max_cycles > 0.0, || {
            format!(
                "{}\nbattery max cycles must be positive",
                format_dbg!(self.max_cycles)
            )
        })?;
        check_config(self.min_soh >= si::Ratio::ZERO && self.min_soh < uc::R, || {
            format!("{}\nmin SOH must be within [0, 1)", format_dbg!(self.min_soh))
        })?;
        check_config(
            self.min_soc_operable >= si::Ratio::ZERO && self.min_soc_operable <= uc::R,
            || {
                format!(
                    "{}\nmin operable SOC must be within [0, 1]",
                    format_dbg!(self.min_soc_operable)
                )
            },
        )?;
        check_config(
            self.state.soc >= si::Ratio::ZERO && self.state.soc <= uc::R,
            || format!("{}\nSOC must be within [0, 1]", format_dbg!(self.state.soc)),
        )?;
        if let Some(se) = self.specific_energy {
            check_config(se > si::SpecificEnergy::ZERO, || {
                format!("{}\nspecific energy must be positive", format_dbg!(se))
            })?;
        }
        if let Some(interval) = self.save_interval {
            check_config(interval > 0, || {
                format!("{}\nsave interval must be positive", format_dbg!(interval))
            })?;
        }
        self.degradation.init()?;
        // capacity and SOH always follow from the accumulated cycles
        self.state.soh = self.soh_at(self.state.cycles);
        self.state.capacity = self.capacity_initial() * self.state.soh;
        self.state.below_min_soc = self.state.soc < self.min_soc_operable;
        Ok(())
    }
}
impl SerdeAPI for Battery {}

impl Battery {
    pub fn new(
        energy_capacity: si::Energy,
        voltage: si::ElectricPotential,
        max_cycles: f64,
        initial_soc: si::Ratio,
        min_soh: si::Ratio,
        min_soc_operable: si::Ratio,
    ) -> anyhow::Result<Self> {
        let mut battery = Self {
            energy_capacity,
            voltage,
            max_cycles,
            min_soh,
            min_soc_operable,
            specific_energy: None,
            degradation: Default::default(),
            state: BatteryState {
                soc: initial_soc,
                ..Default::default()
            },
            save_interval: None,
            history: Default::default(),
        };
        battery.init().with_context(|| format_dbg!())?;
        Ok(battery)
    }

    /// Charge capacity when new
    pub fn capacity_initial(&self) -> si::ElectricCharge {
        self.energy_capacity / self.voltage
    }

    /// Fraction of SOH lost per equivalent full cycle
    pub fn degradation_rate(&self) -> f64 {
        (uc::R - self.min_soh).get::<si::ratio>() / self.max_cycles
    }

    fn soh_at(&self, cycles: f64) -> si::Ratio {
        (uc::R * (1.0 - cycles * self.degradation_rate())).max(si::Ratio::ZERO)
    }

    /// Charge currently stored
    pub fn soc_charge(&self) -> si::ElectricCharge {
        self.state.capacity * self.state.soc
    }

    pub fn soc(&self) -> si::Ratio {
        self.state.soc
    }

    pub fn is_below_min_soc(&self) -> bool {
        self.state.soc < self.min_soc_operable
    }

    /// Pack mass derived from [Self::specific_energy], if provided
    pub fn mass(&self) -> Option<si::Mass> {
        self.specific_energy.map(|se| self.energy_capacity / se)
    }

    /// Removes `charge_out` from the battery over `dt` (negative values charge
    /// it) and advances cycle counting, SOH, capacity and the below-minimum
    /// SOC timer.  SOC saturates at the current capacity on the way up and at
    /// zero on the way down, the latter flagging [BatteryState::drained].
    pub fn update_soc_and_degradation(
        &mut self,
        charge_out: si::ElectricCharge,
        dt: si::Time,
    ) -> anyhow::Result<()> {
        ensure!(
            dt > si::Time::ZERO,
            "{}\nbattery update duration must be positive",
            format_dbg!(dt)
        );
        let soc_prev = self.state.soc;
        let capacity = self.state.capacity;
        let mut charge_new = (self.soc_charge() - charge_out).min(capacity);
        if charge_new < si::ElectricCharge::ZERO {
            if !self.state.drained {
                log::warn!(
                    "battery drained: requested {:.3} Ah with {:.3} Ah stored",
                    charge_out.get::<si::ampere_hour>(),
                    self.soc_charge().get::<si::ampere_hour>()
                );
            }
            self.state.drained = true;
            charge_new = si::ElectricCharge::ZERO;
        } else {
            self.state.drained = false;
        }
        let soc_new = if capacity > si::ElectricCharge::ZERO {
            (charge_new / capacity).max(si::Ratio::ZERO).min(uc::R)
        } else {
            si::Ratio::ZERO
        };

        let current: si::ElectricCurrent = charge_out / dt;
        let multiplier = self.degradation.multiplier(soc_new, current);
        let soc_delta = (soc_new - soc_prev).abs();
        self.state.cycles += soc_delta.get::<si::ratio>() * multiplier;
        self.state.soh = self.soh_at(self.state.cycles);
        self.state.capacity = self.capacity_initial() * self.state.soh;
        self.state.degradation = soc_delta / self.max_cycles;

        self.state.soc = soc_new;
        self.state.current = current;
        if self.state.below_min_soc {
            self.state.time_below_min_soc += dt;
        }
        self.state.below_min_soc = soc_new < self.min_soc_operable;
        self.state.time += dt;
        self.state.i += 1;
        self.save_state();
        Ok(())
    }

    /// Charges at constant `power` until SOC reaches `desired_soc`, returning
    /// the time spent.  Returns zero time without touching the state when the
    /// battery already holds at least the desired charge.
    pub fn charge_in_charging_point(
        &mut self,
        power: si::Power,
        desired_soc: si::Ratio,
    ) -> anyhow::Result<si::Time> {
        check_config(power > si::Power::ZERO, || {
            format!("{}\ncharging power must be positive", format_dbg!(power))
        })?;
        check_config(desired_soc >= si::Ratio::ZERO && desired_soc <= uc::R, || {
            format!(
                "{}\ndesired SOC must be within [0, 1]",
                format_dbg!(desired_soc)
            )
        })?;
        let charge_needed = self.state.capacity * desired_soc - self.soc_charge();
        if charge_needed <= si::ElectricCharge::ZERO {
            return Ok(si::Time::ZERO);
        }
        let time: si::Time = charge_needed * self.voltage / power;
        self.update_soc_and_degradation(-charge_needed, time)
            .with_context(|| format_dbg!())?;
        log::debug!(
            "charged {:.2} Ah in {:.2} h, SOC now {:.1} %",
            charge_needed.get::<si::ampere_hour>(),
            time.get::<si::hour>(),
            self.state.soc.get::<si::percent>()
        );
        Ok(time)
    }

    fn save_state(&mut self) {
        if let Some(interval) = self.save_interval {
            if self.state.i % interval == 0 {
                self.history.push(self.state);
            }
        }
    }
}

#[derive(Clone, Copy, Deserialize, Serialize, Debug, PartialEq, HistoryVec)]
#[serde(default)]
/// Battery state variables
pub struct BatteryState {
    /// update counter
    pub i: usize,
    /// state of charge as a fraction of current capacity
    pub soc: si::Ratio,
    /// current charge capacity after fade
    pub capacity: si::ElectricCharge,
    /// equivalent full cycles, weighted by the degradation multiplier
    pub cycles: f64,
    /// state of health
    pub soh: si::Ratio,
    /// current of the latest update; positive is discharging
    pub current: si::ElectricCurrent,
    /// share of the cycle life used by the latest update, `|ΔSOC| / max_cycles`
    pub degradation: si::Ratio,
    /// cumulative time over all updates
    pub time: si::Time,
    /// cumulative time spent below the minimum operable SOC
    pub time_below_min_soc: si::Time,
    pub below_min_soc: bool,
    /// the latest update asked for more charge than was stored
    pub drained: bool,
}

impl Default for BatteryState {
    fn default() -> Self {
        Self {
            i: 0,
            soc: uc::R,
            capacity: si::ElectricCharge::ZERO,
            cycles: 0.0,
            soh: uc::R,
            current: si::ElectricCurrent::ZERO,
            degradation: si::Ratio::ZERO,
            time: si::Time::ZERO,
            time_below_min_soc: si::Time::ZERO,
            below_min_soc: false,
            drained: false,
        }
    }
}

impl Init for BatteryState {}
impl SerdeAPI for BatteryState {}

#[cfg(test)]
mod tests {
    use super::*;

    /// 300 Ah at 400 V
    fn test_battery() -> Battery {
        Battery::new(
            uc::AH * 300.0 * uc::V * 400.0,
            uc::V * 400.0,
            3000.0,
            uc::R,
            uc::R * 0.75,
            uc::R * 0.2,
        )
        .unwrap()
    }

    #[test]
    fn test_discharge_updates_soc_and_current() {
        let mut bat = test_battery();
        assert!(almost_eq_uom(
            &bat.capacity_initial(),
            &(uc::AH * 300.0),
            None
        ));
        bat.update_soc_and_degradation(uc::AH * 30.0, uc::S * 3600.0)
            .unwrap();
        assert!(almost_eq(bat.soc().get::<si::percent>(), 90.0, Some(1e-6)));
        assert!(almost_eq(
            bat.state.current.get::<si::ampere>(),
            30.0,
            Some(1e-9)
        ));
        assert!(bat.state.cycles > 0.0);
        assert!(bat.state.soh < uc::R);
        // a tenth of a cycle out of 3000
        assert!(almost_eq(
            bat.state.degradation.get::<si::ratio>() * 3000.0,
            0.1,
            None
        ));
        // fade is weighted by the multiplier and scaled to the SOH window
        assert!(almost_eq(
            (uc::R - bat.state.soh).get::<si::ratio>() * 3000.0,
            bat.state.cycles * 0.25,
            None
        ));
    }

    #[test]
    fn test_soc_stays_bounded() {
        let mut bat = test_battery();
        // regen into a full battery
        bat.update_soc_and_degradation(uc::AH * -50.0, uc::S * 60.0)
            .unwrap();
        assert!(bat.soc() <= uc::R);
        assert!(!bat.state.drained);
        // ask for more than is stored
        bat.update_soc_and_degradation(uc::AH * 1000.0, uc::S * 60.0)
            .unwrap();
        assert_eq!(bat.soc(), si::Ratio::ZERO);
        assert!(bat.state.drained);
    }

    #[test]
    fn test_capacity_never_increases() {
        let mut bat = test_battery();
        let mut cap_prev = bat.state.capacity;
        for i in 0..200 {
            let charge = if i % 2 == 0 { 40.0 } else { -40.0 };
            bat.update_soc_and_degradation(uc::AH * charge, uc::S * 600.0)
                .unwrap();
            assert!(bat.state.capacity <= cap_prev);
            cap_prev = bat.state.capacity;
        }
        assert!(bat.state.soh < uc::R);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut bat = test_battery();
        assert!(bat
            .update_soc_and_degradation(uc::AH * 1.0, si::Time::ZERO)
            .is_err());
    }

    #[test]
    fn test_charging_time() {
        let mut bat = test_battery();
        bat.update_soc_and_degradation(uc::AH * 270.0, uc::S * 3600.0)
            .unwrap();
        let cap = bat.state.capacity;
        let stored = bat.soc_charge();
        let time = bat
            .charge_in_charging_point(uc::KW * 100.0, uc::R * 0.8)
            .unwrap();
        let expected: si::Time = (cap * 0.8 - stored) * (uc::V * 400.0) / (uc::KW * 100.0);
        assert!(almost_eq_uom(&time, &expected, None));
        assert!(bat.soc() > uc::R * 0.79);

        // no SOC gap left, nothing to do
        let soc = bat.soc();
        let time = bat
            .charge_in_charging_point(uc::KW * 100.0, soc * 0.5)
            .unwrap();
        assert_eq!(time, si::Time::ZERO);
        assert_eq!(bat.soc(), soc);
    }

    #[test]
    fn test_below_min_soc_timer() {
        let mut bat = test_battery();
        bat.update_soc_and_degradation(uc::AH * 250.0, uc::S * 100.0)
            .unwrap();
        assert!(bat.state.below_min_soc);
        assert_eq!(bat.state.time_below_min_soc, si::Time::ZERO);
        bat.update_soc_and_degradation(uc::AH * 1.0, uc::S * 100.0)
            .unwrap();
        assert!(almost_eq_uom(
            &bat.state.time_below_min_soc,
            &(uc::S * 100.0),
            None
        ));
        bat.charge_in_charging_point(uc::KW * 100.0, uc::R * 0.8)
            .unwrap();
        assert!(!bat.state.below_min_soc);
    }

    #[test]
    fn test_degradation_multiplier() {
        let params = DegradationParams::default();
        // discharging mid-range: only the base and current terms apply
        let m = params.multiplier(uc::R * 0.5, uc::A * 100.0);
        assert!(almost_eq(m, 1.05 * 1.02, None));
        // charging above the knee
        let f = params.soc_factor(uc::R * 0.9, uc::A * -10.0);
        assert!(almost_eq(f, 1.005 + 0.02 * 10.0, None));
        // current term is symmetric
        assert_eq!(
            params.current_factor(uc::A * -50.0),
            params.current_factor(uc::A * 50.0)
        );
    }

    #[test]
    fn test_invalid_battery_config() {
        let res = Battery::new(
            uc::KWH * 100.0,
            si::ElectricPotential::ZERO,
            3000.0,
            uc::R,
            uc::R * 0.75,
            uc::R * 0.2,
        );
        assert!(res.is_err());

        let mut bat = test_battery();
        bat.save_interval = Some(0);
        assert!(bat.init().is_err());
        bat.save_interval = Some(5);
        assert!(bat.init().is_ok());
    }

    #[test]
    fn test_history_saving() {
        let mut bat = test_battery();
        bat.save_interval = Some(1);
        for _ in 0..3 {
            bat.update_soc_and_degradation(uc::AH * 1.0, uc::S * 10.0)
                .unwrap();
        }
        assert_eq!(bat.history.len(), 3);
    }
}
