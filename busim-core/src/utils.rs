//! Small helpers shared across the crate

use crate::error::Error;
use uom::si::{Dimension, Quantity, Units};

/// Formats the file and line of the call site, optionally followed by the
/// debug representation of an expression.  Used as `anyhow` context so that
/// error chains point at the code that produced them.
#[macro_export]
macro_rules! format_dbg {
    ($dbg_expr:expr) => {
        format!(
            "[{}:{}] {}: {:?}",
            file!(),
            line!(),
            stringify!($dbg_expr),
            $dbg_expr
        )
    };
    () => {
        format!("[{}:{}]", file!(), line!())
    };
}

/// Returns [Error::ConfigError] built from `msg` unless `cond` holds
pub fn check_config<F: FnOnce() -> String>(cond: bool, msg: F) -> Result<(), Error> {
    if cond {
        Ok(())
    } else {
        Err(Error::ConfigError(msg()))
    }
}

/// Returns true if `val1` and `val2` are within a relative or absolute
/// `epsilon` of each other (default 1e-8)
pub fn almost_eq(val1: f64, val2: f64, epsilon: Option<f64>) -> bool {
    let epsilon = epsilon.unwrap_or(1e-8);
    ((val2 - val1) / (val1 + val2)).abs() < epsilon || (val2 - val1).abs() < epsilon
}

pub fn almost_eq_uom<D, U>(
    val1: &Quantity<D, U, f64>,
    val2: &Quantity<D, U, f64>,
    epsilon: Option<f64>,
) -> bool
where
    D: Dimension + ?Sized,
    U: Units<f64> + ?Sized,
{
    almost_eq(val1.value, val2.value, epsilon)
}

/// Returns true if `val1` is less than `val2` or almost equal to it
pub fn almost_le_uom<D, U>(
    val1: &Quantity<D, U, f64>,
    val2: &Quantity<D, U, f64>,
    epsilon: Option<f64>,
) -> bool
where
    D: Dimension + ?Sized,
    U: Units<f64> + ?Sized,
{
    val1.value < val2.value || almost_eq(val1.value, val2.value, epsilon)
}
