// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Recording of the trips of a user and the summary of their history.

use crate::distance::DistanceResolver;
use crate::emissions::{round_kg, EmissionsEngine};
use crate::error::CoreError;
use crate::objects::{Date, TransportMode, TravelLogEntry, UserId};
use crate::store::DataStore;
use crate::Result;
use std::fmt;
use tracing::info;

/// A trip submitted by a user
#[derive(Debug, Clone, PartialEq)]
pub struct TripSubmission {
    /// Day of the trip
    pub date: Date,
    /// Free text starting point
    pub origin: String,
    /// Free text destination
    pub destination: String,
    /// Mode used for the trip
    pub transport_mode: TransportMode,
    /// Optional comment
    pub notes: Option<String>,
}

/// Record a trip of the current user.
///
/// The distance of the trip is estimated by the resolver.
pub fn record_trip<S: DataStore>(
    store: &mut S,
    current_user: Option<&UserId>,
    resolver: &DistanceResolver<'_>,
    submission: TripSubmission,
) -> Result<TravelLogEntry> {
    if submission.origin.trim().is_empty() || submission.destination.trim().is_empty() {
        return Err(CoreError::MissingLocation.into());
    }
    let user_id = current_user.ok_or(CoreError::AuthenticationRequired)?;
    let distance = resolver.resolve_or_default(&submission.origin, &submission.destination);
    let entry = TravelLogEntry {
        id: String::new(),
        user_id: user_id.clone(),
        date: submission.date,
        origin: submission.origin,
        destination: submission.destination,
        distance,
        transport_mode: submission.transport_mode,
        notes: submission.notes.filter(|notes| !notes.trim().is_empty()),
    };
    let entry = store.insert_travel_log(entry)?;
    info!("Your {} km trip has been recorded as {:?}", entry.distance, entry.id);
    Ok(entry)
}

/// Advice given from the travel history
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImprovementTip {
    /// More than 70% of the trips are made driving alone
    UsePublicTransport,
    /// More than 40% of the trips are made driving alone
    ReplaceSomeCarTrips,
    /// Switching the remaining car trips would save more than 5 kg
    SwitchRemainingCarTrips {
        /// kg of CO₂ that would be saved
        potential_savings_kg: f64,
    },
    /// Nothing to improve
    KeepGoing,
}

impl fmt::Display for ImprovementTip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImprovementTip::UsePublicTransport => write!(
                f,
                "Consider using public transport or carpooling for regular journeys. \
                 This could reduce your carbon footprint by up to 75%."
            ),
            ImprovementTip::ReplaceSomeCarTrips => write!(
                f,
                "Try replacing some car trips with train or bus travel to further reduce your emissions."
            ),
            ImprovementTip::SwitchRemainingCarTrips {
                potential_savings_kg,
            } => write!(
                f,
                "You could save approximately {:.1} kg of CO₂ by switching remaining car trips to public transport.",
                potential_savings_kg
            ),
            ImprovementTip::KeepGoing => write!(
                f,
                "Great job! You're already making sustainable transportation choices."
            ),
        }
    }
}

/// The trips of a user, most recent first, and the figures computed from them.
#[derive(Debug, Clone)]
pub struct TravelHistory {
    entries: Vec<TravelLogEntry>,
    engine: EmissionsEngine,
}

impl TravelHistory {
    /// Build the history with the builtin emissions model
    pub fn new(entries: Vec<TravelLogEntry>) -> Self {
        TravelHistory::with_engine(entries, EmissionsEngine::default())
    }

    /// Build the history with a given engine
    pub fn with_engine(mut entries: Vec<TravelLogEntry>, engine: EmissionsEngine) -> Self {
        // stable sort, trips of the same day keep their insertion order
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        TravelHistory { entries, engine }
    }

    /// Load the history of a user from a store
    pub fn load<S: DataStore>(store: &S, user_id: &str) -> Result<Self> {
        Ok(TravelHistory::new(store.travel_logs(user_id)?))
    }

    /// The trips, most recent first
    pub fn entries(&self) -> &[TravelLogEntry] {
        &self.entries
    }

    /// Emissions of one trip, in kg rounded to 2 decimals
    pub fn trip_emissions(&self, entry: &TravelLogEntry) -> f64 {
        round_kg(self.raw_emissions(entry))
    }

    fn raw_emissions(&self, entry: &TravelLogEntry) -> f64 {
        entry.distance * self.engine.model().factor(entry.transport_mode)
    }

    /// Emissions of all the trips, in kg rounded to 2 decimals
    pub fn total_emissions_kg(&self) -> f64 {
        round_kg(self.entries.iter().map(|e| self.raw_emissions(e)).sum())
    }

    /// CO₂ that would not have been emitted if the car trips had been made
    /// by train, in kg rounded to 2 decimals
    pub fn potential_savings_kg(&self) -> f64 {
        let model = self.engine.model();
        let per_km = model.factor(TransportMode::Car) - model.factor(TransportMode::Train);
        round_kg(
            self.entries
                .iter()
                .filter(|e| e.transport_mode == TransportMode::Car)
                .map(|e| e.distance * per_km)
                .sum(),
        )
    }

    /// Percentage of the trips made driving alone, 0 without trips
    pub fn car_trip_share(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let car_trips = self
            .entries
            .iter()
            .filter(|e| e.transport_mode == TransportMode::Car)
            .count();
        car_trips as f64 / self.entries.len() as f64 * 100.0
    }

    /// Advice depending on the habits of the user
    pub fn improvement_tip(&self) -> ImprovementTip {
        let car_share = self.car_trip_share();
        let potential_savings_kg = self.potential_savings_kg();
        if car_share > 70.0 {
            ImprovementTip::UsePublicTransport
        } else if car_share > 40.0 {
            ImprovementTip::ReplaceSomeCarTrips
        } else if potential_savings_kg > 5.0 {
            ImprovementTip::SwitchRemainingCarTrips {
                potential_savings_kg,
            }
        } else {
            ImprovementTip::KeepGoing
        }
    }
}
