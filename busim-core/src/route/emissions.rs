//! Pollutant emission rates from EURO standard limits and fuel flow

use crate::imports::*;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// CO2 released per liter of fuel burned
pub fn co2_per_fuel() -> si::MassDensity {
    2.64 * uc::KGPL
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// One value per tracked pollutant
pub struct Pollutants<T> {
    pub nox: T,
    pub co: T,
    pub hc: T,
    pub pm: T,
    pub co2: T,
}

impl<T: Copy> Pollutants<T> {
    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Pollutants<U> {
        Pollutants {
            nox: f(self.nox),
            co: f(self.co),
            hc: f(self.hc),
            pm: f(self.pm),
            co2: f(self.co2),
        }
    }

    /// Values labeled with their pollutant name
    pub fn named(&self) -> [(&'static str, T); 5] {
        [
            ("NOx", self.nox),
            ("CO", self.co),
            ("HC", self.hc),
            ("PM", self.pm),
            ("CO2", self.co2),
        ]
    }
}

impl<T: Add<Output = T>> Add for Pollutants<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            nox: self.nox + rhs.nox,
            co: self.co + rhs.co,
            hc: self.hc + rhs.hc,
            pm: self.pm + rhs.pm,
            co2: self.co2 + rhs.co2,
        }
    }
}

impl<T: AddAssign> AddAssign for Pollutants<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.nox += rhs.nox;
        self.co += rhs.co;
        self.hc += rhs.hc;
        self.pm += rhs.pm;
        self.co2 += rhs.co2;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// European emission standard for heavy-duty engines
pub enum EuroStandard {
    #[serde(rename = "EURO_1")]
    Euro1,
    #[serde(rename = "EURO_2")]
    Euro2,
    #[serde(rename = "EURO_3")]
    Euro3,
    #[serde(rename = "EURO_4")]
    Euro4,
    #[serde(rename = "EURO_5")]
    Euro5,
    #[default]
    #[serde(rename = "EURO_6")]
    Euro6,
}

impl EuroStandard {
    /// Engine-out limits in g/kWh.  CO2 is not regulated and is zero here.
    pub fn limits_g_per_kwh(&self) -> Pollutants<f64> {
        let (nox, co, hc, pm) = match self {
            Self::Euro1 => (8.0, 4.5, 1.1, 0.36),
            Self::Euro2 => (7.0, 4.0, 1.1, 0.15),
            Self::Euro3 => (5.0, 2.1, 0.66, 0.10),
            Self::Euro4 => (3.5, 1.5, 0.46, 0.02),
            Self::Euro5 => (2.0, 1.5, 0.46, 0.02),
            Self::Euro6 => (0.4, 1.5, 0.13, 0.01),
        };
        Pollutants {
            nox,
            co,
            hc,
            pm,
            co2: 0.0,
        }
    }
}

impl FromStr for EuroStandard {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "EURO_1" => Ok(Self::Euro1),
            "EURO_2" => Ok(Self::Euro2),
            "EURO_3" => Ok(Self::Euro3),
            "EURO_4" => Ok(Self::Euro4),
            "EURO_5" => Ok(Self::Euro5),
            "EURO_6" => Ok(Self::Euro6),
            _ => Err(Error::ConfigError(format!("invalid EURO standard: {s:?}"))),
        }
    }
}

impl fmt::Display for EuroStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Self::Euro1 => 1,
            Self::Euro2 => 2,
            Self::Euro3 => 3,
            Self::Euro4 => 4,
            Self::Euro5 => 5,
            Self::Euro6 => 6,
        };
        write!(f, "EURO_{n}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Emission model of one bus
pub struct Emissions {
    pub standard: EuroStandard,
    /// electric buses emit nothing at the tailpipe
    pub electric: bool,
}

impl Emissions {
    pub fn new(standard: EuroStandard, electric: bool) -> Self {
        Self { standard, electric }
    }

    /// Emission rates while delivering `pwr` and burning fuel at `fuel_rate`.
    /// Negative power is treated as idle and emits no regulated pollutants.
    pub fn calc_rates(&self, pwr: si::Power, fuel_rate: si::VolumeRate) -> Pollutants<si::MassRate> {
        if self.electric {
            return Pollutants::default();
        }
        let pwr_kw = pwr.max(si::Power::ZERO).get::<si::kilowatt>();
        let mut rates = self
            .standard
            .limits_g_per_kwh()
            .map(|g_per_kwh| g_per_kwh * pwr_kw / 3600.0 * uc::GPS);
        rates.co2 = fuel_rate * co2_per_fuel();
        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_electric_emits_nothing() {
        let em = Emissions::new(EuroStandard::Euro6, true);
        let rates = em.calc_rates(uc::KW * 150.0, uc::LPH * 20.0);
        assert_eq!(rates, Pollutants::default());
    }

    #[test]
    fn test_rates_from_limits() {
        let em = Emissions::new(EuroStandard::Euro3, false);
        let rates = em.calc_rates(uc::KW * 36.0, uc::LPH * 3.6);
        // 5 g/kWh at 36 kW is 180 g/h
        assert!(almost_eq(rates.nox.get::<si::gram_per_second>(), 0.05, None));
        assert!(almost_eq(rates.pm.get::<si::gram_per_second>(), 0.001, None));
        // 1 mL/s of fuel
        assert!(almost_eq(rates.co2.get::<si::gram_per_second>(), 2.64, None));
    }

    #[test]
    fn test_negative_power_clamped() {
        let em = Emissions::new(EuroStandard::Euro1, false);
        let rates = em.calc_rates(uc::KW * -50.0, si::VolumeRate::ZERO);
        for (_, rate) in rates.named() {
            assert_eq!(rate, si::MassRate::ZERO);
        }
    }

    #[test]
    fn test_parse_standard() {
        assert_eq!("EURO_4".parse::<EuroStandard>().unwrap(), EuroStandard::Euro4);
        assert_eq!("euro-2".parse::<EuroStandard>().unwrap(), EuroStandard::Euro2);
        assert!(matches!(
            "EURO_7".parse::<EuroStandard>(),
            Err(Error::ConfigError(_))
        ));
        assert_eq!(EuroStandard::Euro5.to_string(), "EURO_5");
        let parsed: EuroStandard = serde_json::from_str("\"EURO_1\"").unwrap();
        assert_eq!(parsed, EuroStandard::Euro1);
    }

    #[test]
    fn test_accumulate() {
        let mut total = Pollutants::<si::Mass>::default();
        let step = Pollutants {
            nox: uc::GRAM,
            co: uc::GRAM * 2.0,
            hc: si::Mass::ZERO,
            pm: si::Mass::ZERO,
            co2: uc::GRAM * 10.0,
        };
        total += step;
        total += step;
        assert!(almost_eq(total.co2.get::<si::gram>(), 20.0, None));
        assert_eq!(total, step + step);
    }
}
