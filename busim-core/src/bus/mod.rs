//! The vehicle: chassis, passengers and powertrain

use crate::imports::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod passengers;
pub mod powertrain;

pub use passengers::PassengerModel;
pub use powertrain::*;

#[cfg(test)]
mod tests;

fn default_mass_per_passenger() -> si::Mass {
    70.0 * uc::KG
}

fn default_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0)
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Urban bus with either an electric or a combustion powertrain
pub struct Bus {
    /// empty vehicle mass, excluding battery and passengers
    pub mass_chassis: si::Mass,
    /// aerodynamic drag coefficient
    pub drag_coef: f64,
    pub frontal_area: si::Area,
    /// rolling resistance coefficient
    pub rolling_res_coef: f64,
    #[serde(default = "default_mass_per_passenger")]
    pub mass_per_passenger: si::Mass,
    #[serde(default)]
    pub passenger_model: PassengerModel,
    /// passengers currently on board; drawn from [Self::passenger_model] on init
    #[serde(default)]
    pub n_passengers: u32,
    pub engine: Engine,
    #[serde(skip, default = "default_rng")]
    rng: ChaCha8Rng,
}

impl Init for Bus {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.mass_chassis > si::Mass::ZERO, || {
            format!("{}\nbus mass must be positive", format_dbg!(self.mass_chassis))
        })?;
        check_config(self.drag_coef > 0.0 && self.drag_coef < 1.0, || {
            format!(
                "{}\ndrag coefficient must be within (0, 1)",
                format_dbg!(self.drag_coef)
            )
        })?;
        check_config(self.frontal_area > si::Area::ZERO, || {
            format!(
                "{}\nfrontal area must be positive",
                format_dbg!(self.frontal_area)
            )
        })?;
        check_config(self.rolling_res_coef > 0.0, || {
            format!(
                "{}\nrolling resistance coefficient must be positive",
                format_dbg!(self.rolling_res_coef)
            )
        })?;
        check_config(self.mass_per_passenger >= si::Mass::ZERO, || {
            format!(
                "{}\npassenger mass must not be negative",
                format_dbg!(self.mass_per_passenger)
            )
        })?;
        self.passenger_model.init()?;
        self.engine.init()?;
        self.rng = ChaCha8Rng::seed_from_u64(self.passenger_model.seed());
        self.update_passengers();
        Ok(())
    }
}
impl SerdeAPI for Bus {}

impl Bus {
    pub fn new(
        mass_chassis: si::Mass,
        drag_coef: f64,
        frontal_area: si::Area,
        rolling_res_coef: f64,
        passenger_model: PassengerModel,
        engine: Engine,
    ) -> anyhow::Result<Self> {
        let mut bus = Self {
            mass_chassis,
            drag_coef,
            frontal_area,
            rolling_res_coef,
            mass_per_passenger: default_mass_per_passenger(),
            passenger_model,
            n_passengers: 0,
            engine,
            rng: default_rng(),
        };
        bus.init().with_context(|| format_dbg!())?;
        Ok(bus)
    }

    /// Battery-electric bus with a 392 kWh pack
    pub fn default_electric() -> anyhow::Result<Self> {
        Self::from_yaml(include_str!("electric_bus.default.yaml"), false)
    }

    /// Diesel bus
    pub fn default_combustion() -> anyhow::Result<Self> {
        Self::from_yaml(include_str!("combustion_bus.default.yaml"), false)
    }

    pub fn is_electric(&self) -> bool {
        self.engine.is_electric()
    }

    pub fn battery(&self) -> Option<&Battery> {
        self.engine.battery()
    }

    pub fn battery_mut(&mut self) -> Option<&mut Battery> {
        self.engine.battery_mut()
    }

    pub fn mass_passengers(&self) -> si::Mass {
        self.mass_per_passenger * self.n_passengers as f64
    }

    /// Chassis, battery and passenger mass
    pub fn mass_total(&self) -> si::Mass {
        self.mass_chassis + self.engine.mass() + self.mass_passengers()
    }

    /// Draws a new passenger count from [Self::passenger_model] and returns it
    pub fn update_passengers(&mut self) -> u32 {
        self.n_passengers = self.passenger_model.sample(&mut self.rng);
        log::trace!("{} passengers on board", self.n_passengers);
        self.n_passengers
    }
}
