// Copyright 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see
// <http://www.gnu.org/licenses/>.


use anyhow::bail;
use clap::Parser;
use commute_model::{
    configuration::read_config,
    distance::DistanceResolver,
    emissions::{EmissionsEngine, EmissionsReport, CAR_TIP},
    objects::{Period, TransportMode},
    Result,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

lazy_static::lazy_static! {
    pub static ref GIT_VERSION: String = commute_model::binary_full_version(env!("CARGO_PKG_VERSION"));
}

fn get_version() -> &'static str {
    &GIT_VERSION
}

#[derive(Debug, Parser)]
#[command(
    name = "trip2emissions",
    about = "Compute the carbon footprint of a commute.",
    version = get_version()
)]
struct Opt {
    /// Starting point of the commute.
    #[arg(short = 'f', long = "origin")]
    origin: Option<String>,

    /// Destination of the commute.
    #[arg(short = 't', long = "destination")]
    destination: Option<String>,

    /// Distance in km, replaces the estimation from origin and destination.
    #[arg(short = 'd', long)]
    distance: Option<f64>,

    /// Transport mode (car, carpool, bus, train, bike or walk).
    #[arg(short = 'm', long, default_value = "car")]
    mode: TransportMode,

    /// Compare every transport mode.
    #[arg(short = 'a', long, conflicts_with = "mode")]
    all_modes: bool,

    /// Period of aggregation (daily, weekly or yearly), overrides the configuration.
    #[arg(short = 'p', long)]
    period: Option<Period>,

    /// Number of commuting days in a week, overrides the configuration.
    #[arg(short = 'n', long)]
    days_per_week: Option<u8>,

    /// JSON configuration file.
    #[arg(short = 'c', long = "config")]
    config_path: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Output {
    distance_km: f64,
    reports: Vec<EmissionsReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trees_to_offset: Option<u64>,
}

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter_subscriber = EnvFilter::try_new(rust_log).unwrap_or_else(|e| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            e,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter_subscriber)
        .init();
}

fn print_report(report: &EmissionsReport) {
    println!(
        "{}: {:.2} kg CO₂ per {} ({:.2} kg driving alone)",
        report.mode.label(),
        report.emissions_kg,
        report.period,
        report.car_emissions_kg
    );
    match report.impact() {
        Some(impact) => {
            println!(
                "  saving {:.2} kg ({}%) - {}",
                report.savings_kg, report.savings_percent, impact
            );
        }
        None => println!("  {}", CAR_TIP),
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("Launching trip2emissions...");

    let config = read_config(opt.config_path)?;
    let period = opt.period.unwrap_or(config.period);
    let days_per_week = opt.days_per_week.unwrap_or(config.days_per_week);

    let distance_km = match (opt.distance, &opt.origin, &opt.destination) {
        (Some(distance), _, _) => distance,
        (None, Some(origin), Some(destination)) => {
            let resolver = DistanceResolver::with_policy(config.match_policy);
            match resolver.resolve(origin, destination) {
                Some(distance) => distance,
                None => bail!("origin and destination must not be blank"),
            }
        }
        _ => bail!("either --distance or both --origin and --destination are required"),
    };

    let engine = EmissionsEngine::default();
    let modes: Vec<TransportMode> = if opt.all_modes {
        TransportMode::ALL.to_vec()
    } else {
        vec![opt.mode]
    };
    let reports = modes
        .into_iter()
        .map(|mode| engine.compute(distance_km, mode, period, days_per_week))
        .collect::<Result<Vec<_>, _>>()?;
    let trees_to_offset = match (period, reports.as_slice()) {
        (Period::Yearly, [report]) => Some(engine.trees_to_offset(report.emissions_kg)?),
        _ => None,
    };

    if opt.json {
        let output = Output {
            distance_km,
            reports,
            trees_to_offset,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match (&opt.origin, &opt.destination) {
        (Some(origin), Some(destination)) if opt.distance.is_none() => {
            println!("{} -> {}: {} km", origin, destination, distance_km)
        }
        _ => println!("{} km", distance_km),
    }
    for report in &reports {
        print_report(report);
    }
    if let Some(trees) = trees_to_offset {
        println!("{} trees needed to offset a year of emissions", trees);
    }
    Ok(())
}

fn main() {
    init_logger();
    if let Err(err) = run(Opt::parse()) {
        for cause in err.chain() {
            eprintln!("{cause}");
        }
        std::process::exit(1);
    }
}
