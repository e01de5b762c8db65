use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Limits and step sizes of the kinematic solver
pub struct SolverParams {
    /// comfort acceleration limit on flat ground at rest
    pub accel_max: si::Acceleration,
    /// comfort deceleration limit, negative
    pub decel_max: si::Acceleration,
    /// amount speeds are lowered by per iteration when a target is infeasible
    pub speed_step: si::Velocity,
    /// speed used to time sections driven at a constant speed near zero
    pub speed_floor: si::Velocity,
    /// cap on speed-lowering iterations per section
    pub max_iter: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            accel_max: 1.5 * uc::MPS2,
            decel_max: -1.0 * uc::MPS2,
            speed_step: 1.0 * uc::MPS,
            speed_floor: 0.1 * uc::MPS,
            max_iter: 10_000,
        }
    }
}

impl Init for SolverParams {
    fn init(&mut self) -> Result<(), Error> {
        check_config(self.accel_max > si::Acceleration::ZERO, || {
            format!("{}\nmust be positive", format_dbg!(self.accel_max))
        })?;
        check_config(self.decel_max < si::Acceleration::ZERO, || {
            format!("{}\nmust be negative", format_dbg!(self.decel_max))
        })?;
        check_config(self.speed_step > si::Velocity::ZERO, || {
            format!("{}\nmust be positive", format_dbg!(self.speed_step))
        })?;
        check_config(self.speed_floor > si::Velocity::ZERO, || {
            format!("{}\nmust be positive", format_dbg!(self.speed_floor))
        })?;
        check_config(self.max_iter > 0, || {
            format!("{}\nmust be positive", format_dbg!(self.max_iter))
        })?;
        Ok(())
    }
}
impl SerdeAPI for SolverParams {}

/// Constant acceleration taking `v_start` to `v_end` over `length`
fn constant_accel(
    v_start: si::Velocity,
    v_end: si::Velocity,
    length: si::Length,
) -> si::Acceleration {
    (v_end * v_end - v_start * v_start) / (2.0 * length)
}

/// Lowers `v_start`, and `v_end` too unless `hold_end`, one `speed_step` at a
/// time until the constant acceleration over `length` fits within `bound`.
/// Speeds never drop below zero, so the loop ends at the latest once every
/// speed that is being lowered reaches zero.
fn fit_to_bound(
    mut v_start: si::Velocity,
    mut v_end: si::Velocity,
    hold_end: bool,
    length: si::Length,
    bound: si::Acceleration,
    params: &SolverParams,
) -> (si::Velocity, si::Velocity) {
    let mut accel = constant_accel(v_start, v_end, length);
    let mut iter = 0;
    while accel.abs() > bound.abs()
        && (v_start > si::Velocity::ZERO || (!hold_end && v_end > si::Velocity::ZERO))
    {
        if iter >= params.max_iter {
            log::warn!(
                "kinematic solver gave up after {iter} iterations with accel {:.3} m/s² over bound {:.3} m/s²",
                accel.get::<si::meter_per_second_squared>(),
                bound.get::<si::meter_per_second_squared>()
            );
            break;
        }
        v_start = (v_start - params.speed_step).max(si::Velocity::ZERO);
        if !hold_end {
            v_end = (v_end - params.speed_step).max(si::Velocity::ZERO);
        }
        accel = constant_accel(v_start, v_end, length);
        iter += 1;
    }
    (v_start, v_end)
}

/// Time to cover `length` at constant acceleration from `v_start` to `v_end`.
/// Constant speeds below `speed_floor` are timed at the floor.
fn travel_time(
    v_start: si::Velocity,
    v_end: si::Velocity,
    length: si::Length,
    params: &SolverParams,
) -> si::Time {
    if v_start == v_end {
        length / v_start.max(params.speed_floor)
    } else {
        2.0 * length / (v_start + v_end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Constant-acceleration profile solved from a speed limit and the state
/// carried in from the previous section
pub struct SimulatedKinematics {
    /// target speed at the end of the section
    pub speed_limit: si::Velocity,
    start_speed: si::Velocity,
    end_speed: si::Velocity,
    start_time: si::Time,
    end_time: si::Time,
    /// the carried-in start speed was lowered to keep the section feasible
    pub start_speed_lowered: bool,
}

impl SimulatedKinematics {
    /// Acceleration and deceleration limits reduced by the steady-state
    /// resistance per unit mass at `start_speed`
    pub fn effective_bounds(
        calc: &ResistanceCalculator,
        start_speed: si::Velocity,
        grade: si::Angle,
        params: &SolverParams,
    ) -> (si::Acceleration, si::Acceleration) {
        let res_per_mass: si::Acceleration =
            calc.calc_res(start_speed, si::Acceleration::ZERO, grade).total() / calc.mass;
        (
            params.accel_max - res_per_mass,
            params.decel_max + res_per_mass,
        )
    }

    pub fn solve(
        length: si::Length,
        grade: si::Angle,
        speed_limit: si::Velocity,
        start_speed: si::Velocity,
        start_time: si::Time,
        calc: &ResistanceCalculator,
        params: &SolverParams,
    ) -> Self {
        if length <= si::Length::ZERO {
            return Self {
                speed_limit,
                start_speed,
                end_speed: start_speed,
                start_time,
                end_time: start_time,
                start_speed_lowered: false,
            };
        }
        let (accel_bound, decel_bound) =
            Self::effective_bounds(calc, start_speed, grade, params);

        let (v_start, v_end) = if speed_limit <= si::Velocity::ZERO {
            fit_to_bound(
                start_speed,
                si::Velocity::ZERO,
                true,
                length,
                decel_bound,
                params,
            )
        } else if speed_limit < start_speed {
            fit_to_bound(start_speed, speed_limit, false, length, decel_bound, params)
        } else if speed_limit > start_speed {
            fit_to_bound(start_speed, speed_limit, false, length, accel_bound, params)
        } else {
            (start_speed, speed_limit)
        };
        let dt = travel_time(v_start, v_end, length, params);

        let start_speed_lowered = v_start < start_speed;
        if start_speed_lowered {
            log::debug!(
                "start speed lowered from {:.2} m/s to {:.2} m/s to reach {:.2} m/s within {:.1} m",
                start_speed.get::<si::meter_per_second>(),
                v_start.get::<si::meter_per_second>(),
                speed_limit.get::<si::meter_per_second>(),
                length.get::<si::meter>()
            );
        }

        Self {
            speed_limit,
            start_speed: v_start,
            end_speed: v_end,
            start_time,
            end_time: start_time + dt,
            start_speed_lowered,
        }
    }

    /// Ends the section at `end_speed`, the start speed the next section
    /// settled on.  If braking down to it would exceed the deceleration
    /// bound, the start speed is lowered as well and returned so the
    /// section before can brake into it in turn.  Times are stale until
    /// [Self::retime] is called.
    pub(crate) fn brake_into(
        &mut self,
        end_speed: si::Velocity,
        length: si::Length,
        grade: si::Angle,
        calc: &ResistanceCalculator,
        params: &SolverParams,
    ) -> Option<si::Velocity> {
        self.end_speed = end_speed;
        if end_speed >= self.start_speed {
            return None;
        }
        let v_start = if length <= si::Length::ZERO {
            end_speed
        } else {
            let (_, decel_bound) = Self::effective_bounds(calc, self.start_speed, grade, params);
            let (v_start, _) = fit_to_bound(
                self.start_speed,
                end_speed,
                true,
                length,
                decel_bound,
                params,
            );
            // a coarse step may overshoot the end speed
            v_start.max(end_speed)
        };
        if v_start < self.start_speed {
            log::debug!(
                "braking for {:.2} m/s moved back, start speed lowered from {:.2} m/s to {:.2} m/s",
                end_speed.get::<si::meter_per_second>(),
                self.start_speed.get::<si::meter_per_second>(),
                v_start.get::<si::meter_per_second>()
            );
            self.start_speed = v_start;
            self.start_speed_lowered = true;
            Some(v_start)
        } else {
            None
        }
    }

    /// Starts the section at `start_time` and derives its end time from the
    /// speeds, so that `length` is covered at constant acceleration
    pub(crate) fn retime(
        &mut self,
        start_time: si::Time,
        length: si::Length,
        params: &SolverParams,
    ) {
        self.start_time = start_time;
        self.end_time = start_time + travel_time(self.start_speed, self.end_speed, length, params);
    }
}

impl KinematicProfile for SimulatedKinematics {
    fn start_speed(&self) -> si::Velocity {
        self.start_speed
    }
    fn end_speed(&self) -> si::Velocity {
        self.end_speed
    }
    fn start_time(&self) -> si::Time {
        self.start_time
    }
    fn end_time(&self) -> si::Time {
        self.end_time
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
    fn test_forced_stop_within_bound() {
        let calc = test_calc();
        let params = SolverParams::default();
        for (v0, len) in [(15.0, 20.0), (15.0, 500.0), (8.0, 5.0), (0.0, 30.0)] {
            let start_speed = uc::MPS * v0;
            let (_, decel_bound) =
                SimulatedKinematics::effective_bounds(&calc, start_speed, si::Angle::ZERO, &params);
            let kin = SimulatedKinematics::solve(
                uc::M * len,
                si::Angle::ZERO,
                si::Velocity::ZERO,
                start_speed,
                si::Time::ZERO,
                &calc,
                &params,
            );
            assert_eq!(kin.end_speed(), si::Velocity::ZERO);
            assert!(almost_le_uom(&kin.accel().abs(), &decel_bound.abs(), None));
            assert!(kin.duration() > si::Time::ZERO);
        }
    }

    #[test]
    fn test_stop_lowers_start_speed() {
        let kin = SimulatedKinematics::solve(
            uc::M * 10.0,
            si::Angle::ZERO,
            si::Velocity::ZERO,
            uc::MPS * 15.0,
            si::Time::ZERO,
            &test_calc(),
            &SolverParams::default(),
        );
        assert!(kin.start_speed_lowered);
        assert!(kin.start_speed() < uc::MPS * 15.0);
    }

    #[test]
    fn test_accelerate_from_rest() {
        let calc = test_calc();
        let params = SolverParams::default();
        let kin = SimulatedKinematics::solve(
            uc::M * 200.0,
            si::Angle::ZERO,
            uc::KPH * 36.0,
            si::Velocity::ZERO,
            uc::S * 5.0,
            &calc,
            &params,
        );
        // 10 m/s over 200 m needs 0.25 m/s², well within the bound
        assert!(!kin.start_speed_lowered);
        assert!(almost_eq(kin.end_speed().get::<si::meter_per_second>(), 10.0, None));
        assert!(almost_eq(kin.accel().get::<si::meter_per_second_squared>(), 0.25, None));
        assert!(almost_eq(kin.duration().get::<si::second>(), 40.0, None));
        assert_eq!(kin.start_time(), uc::S * 5.0);
    }

    #[test]
    fn test_infeasible_acceleration_lowers_both_speeds() {
        let calc = test_calc();
        let params = SolverParams::default();
        let (accel_bound, _) =
            SimulatedKinematics::effective_bounds(&calc, uc::MPS * 2.0, si::Angle::ZERO, &params);
        let kin = SimulatedKinematics::solve(
            uc::M * 10.0,
            si::Angle::ZERO,
            uc::MPS * 14.0,
            uc::MPS * 2.0,
            si::Time::ZERO,
            &calc,
            &params,
        );
        assert!(kin.end_speed() < uc::MPS * 14.0);
        assert!(almost_le_uom(&kin.accel(), &accel_bound.abs(), None));
    }

    #[test]
    fn test_cruise_and_zero_length() {
        let calc = test_calc();
        let params = SolverParams::default();
        let kin = SimulatedKinematics::solve(
            uc::M * 100.0,
            si::Angle::ZERO,
            uc::MPS * 10.0,
            uc::MPS * 10.0,
            si::Time::ZERO,
            &calc,
            &params,
        );
        assert_eq!(kin.accel(), si::Acceleration::ZERO);
        assert!(almost_eq(kin.duration().get::<si::second>(), 10.0, None));

        // at rest with a zero limit the section is timed at the floor speed
        let kin = SimulatedKinematics::solve(
            uc::M * 1.0,
            si::Angle::ZERO,
            si::Velocity::ZERO,
            si::Velocity::ZERO,
            si::Time::ZERO,
            &calc,
            &params,
        );
        assert!(almost_eq(kin.duration().get::<si::second>(), 10.0, None));

        let kin = SimulatedKinematics::solve(
            si::Length::ZERO,
            si::Angle::ZERO,
            uc::MPS * 20.0,
            uc::MPS * 5.0,
            uc::S * 3.0,
            &calc,
            &params,
        );
        assert_eq!(kin.duration(), si::Time::ZERO);
        assert_eq!(kin.end_speed(), uc::MPS * 5.0);
    }

    #[test]
    fn test_tiny_step_terminates() {
        let params = SolverParams {
            speed_step: uc::MPS * 1e-6,
            max_iter: 100,
            ..Default::default()
        };
        let kin = SimulatedKinematics::solve(
            uc::M * 1.0,
            si::Angle::ZERO,
            si::Velocity::ZERO,
            uc::MPS * 20.0,
            si::Time::ZERO,
            &test_calc(),
            &params,
        );
        assert_eq!(kin.end_speed(), si::Velocity::ZERO);
    }

    #[test]
    fn test_invalid_params() {
        let mut params = SolverParams {
            decel_max: uc::MPS2 * 1.0,
            ..Default::default()
        };
        assert!(params.init().is_err());
        let mut params = SolverParams {
            speed_step: si::Velocity::ZERO,
            ..Default::default()
        };
        assert!(params.init().is_err());
    }
}
