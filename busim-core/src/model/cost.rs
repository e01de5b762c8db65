use crate::imports::*;

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Purchase and energy costs of an electric bus, in euros
pub struct CostCalculator {
    /// price of electricity per kWh
    pub electricity_cost: f64,
    /// price of battery capacity per kWh
    pub battery_capacity_cost: f64,
    /// price of the bus without battery
    pub base_bus_cost: f64,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self {
            electricity_cost: 0.15,
            battery_capacity_cost: 140.0,
            base_bus_cost: 450_000.0,
        }
    }
}

impl Init for CostCalculator {
    fn init(&mut self) -> Result<(), Error> {
        check_config(
            self.electricity_cost >= 0.0
                && self.battery_capacity_cost >= 0.0
                && self.base_bus_cost >= 0.0,
            || format!("{}\ncosts must not be negative", format_dbg!(self)),
        )
    }
}
impl SerdeAPI for CostCalculator {}

impl CostCalculator {
    /// Bus price including a battery of `battery_capacity`, rounded to cents
    pub fn bus_cost(&self, battery_capacity: si::Energy) -> f64 {
        round_cents(
            self.base_bus_cost
                + battery_capacity.get::<si::kilowatt_hour>() * self.battery_capacity_cost,
        )
    }

    /// Price of `consumed` electricity, rounded to cents
    pub fn consumption_cost(&self, consumed: si::Energy) -> f64 {
        round_cents(consumed.get::<si::kilowatt_hour>() * self.electricity_cost)
    }

    /// Returns `(bus cost, consumption cost)`
    pub fn calculate_costs(&self, battery_capacity: si::Energy, consumed: si::Energy) -> (f64, f64) {
        (
            self.bus_cost(battery_capacity),
            self.consumption_cost(consumed),
        )
    }
}
