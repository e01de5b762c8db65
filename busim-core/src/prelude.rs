pub use crate::bus::{
    Battery, BatteryState, BatteryStateHistoryVec, Bus, CombustionEngine, Consumption,
    DegradationParams, ElectricEngine, Engine, EngineTrait, Fuel, PassengerModel,
};
pub use crate::model::{
    run_models, write_section_report, write_summary_csv, CostCalculator, Model, ModelConfig,
    RunSummary, SectionRecord, SectionRecordHistoryVec,
};
pub use crate::route::{
    read_real_points, read_sim_points, ChargingPoint, ChargingPoints, Coord, Emissions,
    EuroStandard, KinematicProfile, Kinematics, Pollutants, RealPoint, Resistance,
    ResistanceCalculator, Route, RoutePoints, Section, SimPoint, SolverParams, Traversal,
};
pub use crate::traits::{Init, SerdeAPI};
