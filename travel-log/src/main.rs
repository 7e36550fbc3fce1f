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


use anyhow::Context;
use clap::{Parser, Subcommand};
use commute_model::{
    carpool::{active_listings, join_carpool},
    configuration::read_config,
    distance::DistanceResolver,
    objects::{Date, TransportMode},
    travel_log::{record_trip, TravelHistory, TripSubmission},
    CsvStore, Result,
};
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};
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
    name = "travel-log",
    about = "Record commutes and join carpools.",
    version = get_version()
)]
struct Opt {
    /// Directory of the store.
    #[arg(short = 'i', long = "data", default_value = ".")]
    data: PathBuf,

    /// Identifier of the current user.
    #[arg(short = 'u', long = "user", global = true)]
    user: Option<String>,

    /// JSON configuration file.
    #[arg(short = 'c', long = "config")]
    config_path: Option<PathBuf>,

    /// Output report file path, listing the rows rejected while loading the store.
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a trip of the current user.
    Record {
        /// Starting point.
        #[arg(short = 'f', long)]
        origin: String,

        /// Destination.
        #[arg(short = 't', long)]
        destination: String,

        /// Transport mode (car, carpool, bus, train, bike or walk).
        #[arg(short = 'm', long)]
        mode: TransportMode,

        /// Day of the trip (YYYY-MM-DD), today by default.
        #[arg(short = 'd', long)]
        date: Option<Date>,

        /// Free comment.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the trips of the current user and their footprint.
    History,
    /// List the active carpools.
    Carpools,
    /// Ask to join a carpool.
    Join {
        /// Identifier of the carpool.
        #[arg(long = "carpool")]
        carpool_id: String,
    },
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

fn print_history(history: &TravelHistory) {
    if history.entries().is_empty() {
        println!("No trip recorded yet");
        return;
    }
    for entry in history.entries() {
        println!(
            "{} {} -> {}: {} km by {}, {:.2} kg CO₂",
            entry.date,
            entry.origin,
            entry.destination,
            entry.distance,
            entry.transport_mode.label(),
            history.trip_emissions(entry)
        );
    }
    println!("Total emissions: {:.2} kg CO₂", history.total_emissions_kg());
    println!(
        "Potential savings: {:.2} kg CO₂",
        history.potential_savings_kg()
    );
    println!("{}", history.improvement_tip());
}

fn run(opt: Opt) -> Result<()> {
    info!("Launching travel-log...");

    let config = read_config(opt.config_path)?;
    let mut store = CsvStore::open(&opt.data)?;
    if let Some(report_path) = opt.report {
        let report_file = File::create(&report_path)
            .with_context(|| format!("Error creating {:?}", report_path))?;
        serde_json::to_writer_pretty(report_file, store.report())?;
    }
    let report = store.report();
    if !report.is_empty() {
        warn!(
            "{} invalid records and {} warnings while loading {:?}",
            report.error_count(),
            report.warning_count(),
            store.path()
        );
    }

    let current_user = opt.user.as_ref();
    match opt.command {
        Command::Record {
            origin,
            destination,
            mode,
            date,
            notes,
        } => {
            let resolver = DistanceResolver::with_policy(config.match_policy);
            let submission = TripSubmission {
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                origin,
                destination,
                transport_mode: mode,
                notes,
            };
            let entry = record_trip(&mut store, current_user, &resolver, submission)?;
            store.save()?;
            println!(
                "Recorded {}: {} km by {}",
                entry.id,
                entry.distance,
                entry.transport_mode.label()
            );
        }
        Command::History => {
            let user_id = current_user.context("--user is required to show a history")?;
            print_history(&TravelHistory::load(&store, user_id)?);
        }
        Command::Carpools => {
            for listing in active_listings(&store)? {
                let offer = &listing.offer;
                println!(
                    "{} {} -> {} ({}): {} seats left",
                    offer.id,
                    offer.origin,
                    offer.destination,
                    offer.schedule,
                    listing.seats_left()
                );
            }
        }
        Command::Join { carpool_id } => {
            let participant = join_carpool(&mut store, current_user, &carpool_id)?;
            store.save()?;
            println!(
                "Request to join {} sent, waiting for the driver",
                participant.carpool_id
            );
        }
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
