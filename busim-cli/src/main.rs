use anyhow::Context;
use busim_core::prelude::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "busim")]
#[command(about = "Urban bus energy, emissions and battery simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a bus serving a route for a number of days
    Run {
        /// Model configuration (yaml, json or bin)
        #[arg(long)]
        model: PathBuf,
        /// Bus configuration (yaml, json or bin)
        #[arg(long)]
        bus: PathBuf,
        /// Route points CSV
        #[arg(long)]
        route: PathBuf,
        /// Charging points JSON
        #[arg(long)]
        charging_points: PathBuf,
        /// Treat the route as recorded telemetry instead of speed limits
        #[arg(long)]
        real: bool,
        /// Days of service to simulate
        #[arg(long, default_value = "1")]
        days: u32,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Also write a per-section report of one traversal
        #[arg(long)]
        report: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            model,
            bus,
            route,
            charging_points,
            real,
            days,
            out,
            report,
        } => {
            let config = ModelConfig::from_file(&model, false)?;
            let bus = Bus::from_file(&bus, false)?;
            let points = if real {
                RoutePoints::Real(read_real_points(&route)?)
            } else {
                RoutePoints::Simulated(read_sim_points(&route)?)
            };
            let charging_points = ChargingPoints::from_json_records_file(&charging_points)?;
            let mut model = Model::from_points(config, bus, &points, charging_points)?;

            std::fs::create_dir_all(&out)
                .with_context(|| format!("Could not create output directory {out:?}"))?;
            if report {
                let records = model.section_report()?;
                let path = out.join("sections.csv");
                write_section_report(&records, &path)?;
                log::info!("wrote {} sections to {path:?}", records.len());
            }
            let summary = model.run(days)?;
            let path = out.join("summary.csv");
            summary.to_csv_file(&path)?;
            log::info!("wrote run summary to {path:?}");
        }
    }
    Ok(())
}
