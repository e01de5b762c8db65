use super::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// How many passengers ride on a traversal of the route
pub enum PassengerModel {
    /// constant load
    Fixed(u32),
    /// normal distribution rounded and clipped to `[0, max]`, drawn from a
    /// generator seeded with `seed`
    ClippedNormal {
        mean: f64,
        std_dev: f64,
        max: u32,
        seed: u64,
    },
}

impl Default for PassengerModel {
    fn default() -> Self {
        Self::ClippedNormal {
            mean: 40.0,
            std_dev: 30.0,
            max: 146,
            seed: 0,
        }
    }
}

impl Init for PassengerModel {
    fn init(&mut self) -> Result<(), Error> {
        if let Self::ClippedNormal { mean, std_dev, .. } = self {
            check_config(mean.is_finite() && *mean >= 0.0, || {
                format!("{}\npassenger mean must be non-negative", format_dbg!(mean))
            })?;
            check_config(std_dev.is_finite() && *std_dev >= 0.0, || {
                format!(
                    "{}\npassenger standard deviation must be non-negative",
                    format_dbg!(std_dev)
                )
            })?;
        }
        Ok(())
    }
}
impl SerdeAPI for PassengerModel {}

impl PassengerModel {
    pub fn seed(&self) -> u64 {
        match self {
            Self::Fixed(_) => 0,
            Self::ClippedNormal { seed, .. } => *seed,
        }
    }

    /// Draws a passenger count
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self {
            Self::Fixed(n) => *n,
            Self::ClippedNormal {
                mean,
                std_dev,
                max,
                ..
            } => {
                let draw = Normal::new(*mean, *std_dev)
                    .map(|dist| dist.sample(rng))
                    .unwrap_or(*mean);
                draw.round().clamp(0.0, *max as f64) as u32
            }
        }
    }
}
