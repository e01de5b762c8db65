//! Per-section and per-run tabular output

use super::RunSummary;
use crate::imports::*;
use crate::route::{KinematicProfile, Section, SectionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, HistoryVec)]
/// One row of the section report, in report units
pub struct SectionRecord {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub start_altitude_m: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub end_altitude_m: f64,
    pub start_time_s: f64,
    pub end_time_s: f64,
    pub start_speed_mps: f64,
    pub end_speed_mps: f64,
    pub length_m: f64,
    pub grade_deg: f64,
    pub power_kw: Option<f64>,
    pub energy_wh: f64,
    pub charge_ah: f64,
    pub fuel_l_per_h: f64,
    pub fuel_l_per_km: f64,
    pub nox_g_per_s: f64,
    pub co_g_per_s: f64,
    pub hc_g_per_s: f64,
    pub pm_g_per_s: f64,
    pub co2_g_per_s: f64,
    /// battery cycle life used on this section, in percent
    pub battery_degradation_pct: f64,
}

impl SectionRecord {
    pub fn new(section: &Section, outcome: &SectionOutcome) -> Self {
        let kin = &section.kinematics;
        let cons = &outcome.consumption;
        let rates = outcome
            .emission_rates
            .map(|rate| rate.get::<si::gram_per_second>());
        Self {
            start_latitude: section.start.latitude,
            start_longitude: section.start.longitude,
            start_altitude_m: section.start.altitude.get::<si::meter>(),
            end_latitude: section.end.latitude,
            end_longitude: section.end.longitude,
            end_altitude_m: section.end.altitude.get::<si::meter>(),
            start_time_s: kin.start_time().get::<si::second>(),
            end_time_s: kin.end_time().get::<si::second>(),
            start_speed_mps: kin.start_speed().get::<si::meter_per_second>(),
            end_speed_mps: kin.end_speed().get::<si::meter_per_second>(),
            length_m: section.length.get::<si::meter>(),
            grade_deg: section.grade.get::<si::degree>(),
            power_kw: section.loads.pwr.map(|p| p.get::<si::kilowatt>()),
            energy_wh: cons.energy.get::<si::watt_hour>(),
            charge_ah: cons.charge.get::<si::ampere_hour>(),
            fuel_l_per_h: (cons.fuel_rate * uc::HR).get::<si::liter>(),
            fuel_l_per_km: cons.fuel_l_per_km,
            nox_g_per_s: rates.nox,
            co_g_per_s: rates.co,
            hc_g_per_s: rates.hc,
            pm_g_per_s: rates.pm,
            co2_g_per_s: rates.co2,
            battery_degradation_pct: cons.battery_degradation.get::<si::percent>(),
        }
    }
}

/// Writes one `;`-delimited row per section
pub fn write_section_report<P: AsRef<Path>>(
    records: &SectionRecordHistoryVec,
    filepath: P,
) -> anyhow::Result<()> {
    let filepath = filepath.as_ref();
    let mut wrtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(filepath)
        .with_context(|| format!("Could not create {filepath:?}"))?;
    for record in records.state_vec() {
        wrtr.serialize(record)?;
    }
    wrtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Flat rendition of [RunSummary] in report units
struct SummaryRecord {
    name: String,
    electric: bool,
    n_iters: u32,
    consumption_wh: f64,
    consumption_l: f64,
    nox_g: f64,
    co_g: f64,
    hc_g: f64,
    pm_g: f64,
    co2_g: f64,
    battery_degradation_pct: f64,
    soh_final_pct: Option<f64>,
    bus_cost: Option<f64>,
    consumption_cost: Option<f64>,
    availability_time_s: f64,
    unavailability_time_s: f64,
    n_buses: u32,
    n_charges: u32,
    time_below_min_soc_s: f64,
}

impl From<&RunSummary> for SummaryRecord {
    fn from(s: &RunSummary) -> Self {
        let em = s.emissions.map(|m| m.get::<si::gram>());
        Self {
            name: s.name.clone(),
            electric: s.electric,
            n_iters: s.n_iters,
            consumption_wh: s.energy.get::<si::watt_hour>(),
            consumption_l: s.fuel.get::<si::liter>(),
            nox_g: em.nox,
            co_g: em.co,
            hc_g: em.hc,
            pm_g: em.pm,
            co2_g: em.co2,
            battery_degradation_pct: s.battery_degradation.get::<si::percent>(),
            soh_final_pct: s.soh_final.map(|soh| soh.get::<si::percent>()),
            bus_cost: s.bus_cost,
            consumption_cost: s.consumption_cost,
            availability_time_s: s.availability_time.get::<si::second>(),
            unavailability_time_s: s.unavailability_time.get::<si::second>(),
            n_buses: s.n_buses,
            n_charges: s.n_charges,
            time_below_min_soc_s: s.time_below_min_soc.get::<si::second>(),
        }
    }
}

/// Writes one comma-delimited row per run
pub fn write_summary_csv<P: AsRef<Path>>(summaries: &[RunSummary], filepath: P) -> anyhow::Result<()> {
    let filepath = filepath.as_ref();
    let mut wrtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(filepath)
        .with_context(|| format!("Could not create {filepath:?}"))?;
    for summary in summaries {
        wrtr.serialize(SummaryRecord::from(summary))?;
    }
    wrtr.flush()?;
    Ok(())
}
