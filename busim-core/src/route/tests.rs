use super::*;
use crate::bus::PassengerModel;

fn empty_bus() -> Bus {
    let mut bus = Bus::default_combustion().unwrap();
    bus.passenger_model = PassengerModel::Fixed(0);
    bus.update_passengers();
    bus
}

/// Points roughly 111 m apart heading north with the given limits in km/h
fn sim_points(limits: &[f64]) -> Vec<SimPoint> {
    limits
        .iter()
        .enumerate()
        .map(|(i, limit)| SimPoint {
            coord: Coord::new(40.0 + i as f64 * 1e-3, -3.7, uc::M * (650.0 + i as f64)),
            speed_limit: uc::KPH * *limit,
        })
        .collect()
}

fn sim_route(limits: &[f64], bus: &Bus) -> Route {
    Route::new(
        &RoutePoints::Simulated(sim_points(limits)),
        bus,
        Emissions::new(EuroStandard::Euro6, false),
        &SolverParams::default(),
    )
    .unwrap()
}

#[test]
fn test_simulated_continuity() {
    let bus = empty_bus();
    // includes a stop short enough to force braking back into the previous section
    let route = sim_route(&[0.0, 50.0, 50.0, 30.0, 0.0, 60.0, 20.0, 0.0], &bus);
    assert_eq!(route.sections.len(), 7);
    for pair in route.sections.windows(2) {
        let (a, b) = (&pair[0].kinematics, &pair[1].kinematics);
        assert_eq!(a.end_speed(), b.start_speed());
        assert_eq!(a.end_time(), b.start_time());
    }
    assert_eq!(route.sections[0].kinematics.start_speed(), si::Velocity::ZERO);
    assert_eq!(route.sections[0].kinematics.start_time(), si::Time::ZERO);
    assert_eq!(
        route.sections.last().unwrap().kinematics.end_speed(),
        si::Velocity::ZERO
    );
}

/// Every simulated section covers its length at constant acceleration and
/// stays within the effective bounds at its start speed
fn assert_kinematically_consistent(route: &Route, bus: &Bus, params: &SolverParams) {
    let calc = ResistanceCalculator::from_bus(bus);
    for (i, section) in route.sections.iter().enumerate() {
        let kin = &section.kinematics;
        if kin.avg_speed() >= params.speed_floor {
            assert!(
                almost_eq_uom(&(kin.avg_speed() * kin.duration()), &section.length, Some(1e-9)),
                "section {i} covers {:?} of {:?}",
                kin.avg_speed() * kin.duration(),
                section.length
            );
        }
        let (accel_bound, decel_bound) = SimulatedKinematics::effective_bounds(
            &calc,
            kin.start_speed(),
            section.grade,
            params,
        );
        let accel = kin.accel();
        if accel > si::Acceleration::ZERO {
            assert!(almost_le_uom(&accel, &accel_bound, Some(1e-9)), "section {i}");
        } else {
            assert!(
                almost_le_uom(&accel.abs(), &decel_bound.abs(), Some(1e-9)),
                "section {i} brakes at {accel:?}, bound {decel_bound:?}"
            );
        }
    }
}

#[test]
fn test_braking_moves_back_into_earlier_sections() {
    let bus = empty_bus();
    let params = SolverParams::default();
    // sections of about 44 m, too short to stop from 50 km/h in one
    let points: Vec<SimPoint> = [0.0, 50.0, 50.0, 50.0, 0.0]
        .iter()
        .enumerate()
        .map(|(i, limit)| SimPoint {
            coord: Coord::new(40.0 + i as f64 * 4e-4, -3.7, uc::M * 650.0),
            speed_limit: uc::KPH * *limit,
        })
        .collect();
    let route = Route::new(
        &RoutePoints::Simulated(points),
        &bus,
        Emissions::default(),
        &params,
    )
    .unwrap();
    assert_kinematically_consistent(&route, &bus, &params);
    // the stop starts at least two sections early
    assert!(route.sections[2].kinematics.start_speed() < uc::KPH * 50.0);
    assert!(route.sections[3].kinematics.start_speed() < route.sections[2].kinematics.start_speed());
    for pair in route.sections.windows(2) {
        assert_eq!(pair[0].kinematics.end_speed(), pair[1].kinematics.start_speed());
        assert_eq!(pair[0].kinematics.end_time(), pair[1].kinematics.start_time());
    }
    assert_eq!(
        route.sections.last().unwrap().kinematics.end_speed(),
        si::Velocity::ZERO
    );
}

#[test]
fn test_simulated_sections_consistent() {
    let bus = empty_bus();
    let params = SolverParams::default();
    let route = sim_route(&[0.0, 50.0, 50.0, 30.0, 0.0, 60.0, 20.0, 0.0], &bus);
    assert_kinematically_consistent(&route, &bus, &params);
}

#[test]
fn test_length_and_duration_sum() {
    let bus = empty_bus();
    let route = sim_route(&[0.0, 40.0, 40.0, 0.0], &bus);
    let length: f64 = route
        .sections
        .iter()
        .map(|s| s.length.get::<si::meter>())
        .sum();
    assert!(almost_eq(route.length().get::<si::meter>(), length, None));
    let end_time = route.sections.last().unwrap().kinematics.end_time();
    assert!(almost_eq_uom(&route.duration(), &end_time, None));
}

#[test]
fn test_traversal_accumulates() {
    let mut bus = empty_bus();
    let route = sim_route(&[0.0, 40.0, 40.0, 20.0, 0.0], &bus);
    let mut n_seen = 0;
    let trav = route
        .traverse_with(&mut bus, |_, _| n_seen += 1)
        .unwrap();
    assert_eq!(n_seen, route.sections.len());
    assert!(trav.fuel > si::Volume::ZERO);
    assert!(trav.emissions.co2 > si::Mass::ZERO);
    assert_eq!(trav.energy, si::Energy::ZERO);
    let doubled = trav.scaled(2.0);
    assert!(almost_eq_uom(&doubled.fuel, &(trav.fuel * 2.0), None));
    assert_eq!(doubled.duration, trav.duration);
}

#[test]
fn test_real_route() {
    let mut bus = Bus::default_electric().unwrap();
    let pts = vec![
        RealPoint {
            time: si::Time::ZERO,
            coord: Coord::new(40.0, -3.7, uc::M * 650.0),
            speed: si::Velocity::ZERO,
        },
        RealPoint {
            time: uc::S * 20.0,
            coord: Coord::new(40.001, -3.7, uc::M * 651.0),
            speed: uc::MPS * 9.0,
        },
        RealPoint {
            time: uc::S * 30.0,
            coord: Coord::new(40.002, -3.7, uc::M * 651.0),
            speed: uc::MPS * 12.0,
        },
    ];
    let route = Route::new(
        &RoutePoints::Real(pts),
        &bus,
        Emissions::new(EuroStandard::Euro6, true),
        &SolverParams::default(),
    )
    .unwrap();
    assert!(almost_eq(route.duration().get::<si::second>(), 30.0, None));
    let trav = route.traverse(&mut bus).unwrap();
    assert!(trav.energy > si::Energy::ZERO);
    assert!(trav.battery_degradation > si::Ratio::ZERO);
    assert_eq!(trav.fuel, si::Volume::ZERO);
}

#[test]
fn test_too_few_points() {
    let bus = empty_bus();
    let res = Route::new(
        &RoutePoints::Simulated(sim_points(&[30.0])),
        &bus,
        Emissions::default(),
        &SolverParams::default(),
    );
    assert!(res.is_err());
}
