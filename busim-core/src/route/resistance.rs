//! Road load of a bus: aerodynamic drag, inertia, grade and rolling resistance

use crate::bus::Bus;
use crate::imports::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Resistive force components acting on the bus
pub struct Resistance {
    pub aero: si::Force,
    /// force needed to change speed
    pub inertia: si::Force,
    pub grade: si::Force,
    pub rolling: si::Force,
}

impl Resistance {
    pub fn total(&self) -> si::Force {
        self.aero + self.inertia + self.grade + self.rolling
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Vehicle coefficients needed to compute [Resistance].  A snapshot of the
/// bus, so it must be rebuilt whenever the bus mass changes.
pub struct ResistanceCalculator {
    pub mass: si::Mass,
    pub drag_coef: f64,
    pub frontal_area: si::Area,
    pub rolling_res_coef: f64,
}

impl ResistanceCalculator {
    pub fn from_bus(bus: &Bus) -> Self {
        Self {
            mass: bus.mass_total(),
            drag_coef: bus.drag_coef,
            frontal_area: bus.frontal_area,
            rolling_res_coef: bus.rolling_res_coef,
        }
    }

    pub fn calc_res(
        &self,
        avg_speed: si::Velocity,
        accel: si::Acceleration,
        grade: si::Angle,
    ) -> Resistance {
        Resistance {
            aero: 0.5 * self.drag_coef * uc::rho_air() * self.frontal_area * avg_speed * avg_speed,
            inertia: self.mass * accel,
            grade: self.mass * uc::ACC_GRAV * grade.sin(),
            rolling: self.rolling_res_coef * self.mass * uc::ACC_GRAV,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_calc() -> ResistanceCalculator {
        ResistanceCalculator {
            mass: uc::KG * 18000.0,
            drag_coef: 0.8,
            frontal_area: uc::M2 * 9.0,
            rolling_res_coef: 0.01,
        }
    }

    #[test]
    fn test_flat_cruise() {
        let res = test_calc().calc_res(uc::MPS * 10.0, si::Acceleration::ZERO, si::Angle::ZERO);
        assert!(almost_eq(res.aero.get::<si::newton>(), 441.0, None));
        assert!(almost_eq(res.rolling.get::<si::newton>(), 1765.8, None));
        assert_eq!(res.inertia, si::Force::ZERO);
        assert!(almost_eq(res.grade.get::<si::newton>(), 0.0, None));
        assert!(almost_eq(res.total().get::<si::newton>(), 2206.8, None));
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let calc = test_calc();
        for (v, a, g) in [(3.0, 0.5, 2.0), (12.0, -0.8, -4.0), (0.0, 0.0, 0.0)] {
            let res = calc.calc_res(uc::MPS * v, uc::MPS2 * a, uc::DEG * g);
            assert!(almost_eq_uom(
                &res.total(),
                &(res.aero + res.inertia + res.grade + res.rolling),
                None
            ));
        }
    }

    #[test]
    fn test_repeatable() {
        let calc = test_calc();
        let a = calc.calc_res(uc::MPS * 7.0, uc::MPS2 * 0.3, uc::DEG * 1.5);
        let b = calc.calc_res(uc::MPS * 7.0, uc::MPS2 * 0.3, uc::DEG * 1.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_downhill_grade_helps() {
        let res = test_calc().calc_res(uc::MPS * 5.0, si::Acceleration::ZERO, uc::DEG * -3.0);
        assert!(res.grade < si::Force::ZERO);
    }

    #[test]
    fn test_from_bus_includes_passengers() {
        let mut bus = Bus::default_combustion().unwrap();
        bus.passenger_model = crate::bus::PassengerModel::Fixed(20);
        bus.update_passengers();
        let calc = ResistanceCalculator::from_bus(&bus);
        assert!(almost_eq(calc.mass.get::<si::kilogram>(), 19400.0, None));
    }
}
