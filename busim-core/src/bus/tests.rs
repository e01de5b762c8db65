use super::*;

#[test]
fn test_default_electric_bus() {
    let bus = Bus::default_electric().unwrap();
    assert!(bus.is_electric());
    let battery = bus.battery().unwrap();
    assert!(almost_eq(
        battery.energy_capacity.get::<si::kilowatt_hour>(),
        392.0,
        None
    ));
    assert!(almost_eq(
        battery.capacity_initial().get::<si::ampere_hour>(),
        980.0,
        None
    ));
    // 6 kg per kWh of battery on top of the chassis
    assert!(almost_eq(
        battery.mass().unwrap().get::<si::kilogram>(),
        392.0 * 6.0,
        None
    ));
    assert!(almost_eq_uom(
        &bus.mass_total(),
        &(uc::KG * (15000.0 + 392.0 * 6.0) + bus.mass_passengers()),
        None
    ));
}

#[test]
fn test_default_combustion_bus() {
    let bus = Bus::default_combustion().unwrap();
    assert!(!bus.is_electric());
    assert!(bus.battery().is_none());
    assert!(almost_eq_uom(
        &bus.mass_total(),
        &(uc::KG * 18000.0 + bus.mass_passengers()),
        None
    ));
    assert!(bus.n_passengers <= 146);
}

#[test]
fn test_passengers_add_mass() {
    let mut bus = Bus::new(
        uc::KG * 18000.0,
        0.8,
        uc::M2 * 9.0,
        0.01,
        PassengerModel::Fixed(10),
        Engine::Combustion(
            CombustionEngine::new(uc::KW * 240.0, uc::R * 0.35, Fuel::new("diesel").unwrap())
                .unwrap(),
        ),
    )
    .unwrap();
    assert_eq!(bus.n_passengers, 10);
    assert!(almost_eq(bus.mass_total().get::<si::kilogram>(), 18700.0, None));
    bus.passenger_model = PassengerModel::Fixed(0);
    bus.update_passengers();
    assert!(almost_eq(bus.mass_total().get::<si::kilogram>(), 18000.0, None));
}

#[test]
fn test_passenger_draws_reproducible() {
    let mut a = Bus::default_electric().unwrap();
    let mut b = Bus::default_electric().unwrap();
    for _ in 0..10 {
        assert_eq!(a.update_passengers(), b.update_passengers());
    }
}

#[test]
fn test_invalid_bus_config() {
    let yaml = include_str!("combustion_bus.default.yaml").replace("18000.0", "-1.0");
    assert!(Bus::from_yaml(yaml, false).is_err());
    let yaml = include_str!("combustion_bus.default.yaml").replace("diesel", "unobtainium");
    assert!(Bus::from_yaml(yaml, false).is_err());
    let yaml = include_str!("combustion_bus.default.yaml").replace("Combustion", "Steam");
    assert!(Bus::from_yaml(yaml, false).is_err());
}

#[test]
fn test_bus_serde_round_trip_keeps_battery_state() {
    let mut bus = Bus::default_electric().unwrap();
    bus.battery_mut()
        .unwrap()
        .update_soc_and_degradation(uc::AH * 100.0, uc::S * 600.0)
        .unwrap();
    let soc = bus.battery().unwrap().soc();
    let yaml = bus.to_yaml().unwrap();
    let bus2 = Bus::from_yaml(yaml, false).unwrap();
    assert!(almost_eq_uom(&bus2.battery().unwrap().soc(), &soc, None));
}

#[test]
fn test_loaded_bus_carries_passengers() {
    let yaml = include_str!("combustion_bus.default.yaml").replace(
        "  ClippedNormal:\n    mean: 40.0\n    std_dev: 30.0\n    max: 146\n    seed: 0\n",
        "  Fixed: 25\n",
    );
    let bus = Bus::from_yaml(yaml, false).unwrap();
    assert_eq!(bus.n_passengers, 25);
    assert!(almost_eq(bus.mass_total().get::<si::kilogram>(), 18000.0 + 25.0 * 70.0, None));

    // the first draw is the same whichever way the bus was built
    let mut a = Bus::default_combustion().unwrap();
    let b = Bus::from_yaml(a.to_yaml().unwrap(), false).unwrap();
    assert_eq!(a.n_passengers, b.n_passengers);
    a.init().unwrap();
    assert_eq!(a.n_passengers, b.n_passengers);
}
