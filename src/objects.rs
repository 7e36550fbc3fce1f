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

//! Definition of the objects manipulated by the library: transport modes,
//! reporting periods and the records persisted for travel logs and carpools.

use crate::error::CoreError;
use crate::serde_utils::*;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Calendar date of a trip
pub type Date = chrono::NaiveDate;

/// Identifier of a user, as given by the authentication provider
pub type UserId = String;

/// The modes a commuter can travel with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TransportMode {
    /// Driving alone, the baseline of every comparison
    Car,
    /// Sharing a car
    Carpool,
    /// Bus
    Bus,
    /// Train
    Train,
    /// Bicycle
    Bike,
    /// Walking
    Walk,
}

impl TransportMode {
    /// All the modes, baseline first
    pub const ALL: [TransportMode; 6] = [
        TransportMode::Car,
        TransportMode::Carpool,
        TransportMode::Bus,
        TransportMode::Train,
        TransportMode::Bike,
        TransportMode::Walk,
    ];

    /// Identifier of the mode, as persisted
    pub fn as_str(self) -> &'static str {
        use TransportMode::*;
        match self {
            Car => "car",
            Carpool => "carpool",
            Bus => "bus",
            Train => "train",
            Bike => "bike",
            Walk => "walk",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        use TransportMode::*;
        match self {
            Car => "Car (alone)",
            Carpool => "Carpool",
            Bus => "Bus",
            Train => "Train",
            Bike => "Bicycle",
            Walk => "Walking",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim().to_lowercase();
        TransportMode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == mode)
            .ok_or_else(|| CoreError::UnknownMode(s.to_string()))
    }
}

impl TryFrom<String> for TransportMode {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Time window over which the emissions of a commute are aggregated.
#[derive(Serialize, Deserialize, Debug, Derivative, Clone, Copy, PartialEq, Eq)]
#[derivative(Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// One commute
    #[derivative(Default)]
    Daily,
    /// One commute per commuting day of the week
    Weekly,
    /// 52 weeks of commute
    Yearly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Daily => write!(f, "day"),
            Period::Weekly => write!(f, "week"),
            Period::Yearly => write!(f, "year"),
        }
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "yearly" => Ok(Period::Yearly),
            _ => Err(CoreError::UnknownPeriod(s.to_string())),
        }
    }
}

/// A trip logged by a user. Never modified once recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TravelLogEntry {
    /// Identifier of the entry
    pub id: String,
    /// Owner of the entry
    pub user_id: UserId,
    /// Day of the trip
    #[serde(
        deserialize_with = "de_from_date_string",
        serialize_with = "ser_from_naive_date"
    )]
    pub date: Date,
    /// Free text starting point
    pub origin: String,
    /// Free text destination
    pub destination: String,
    /// Estimated distance of the trip, in kilometers
    #[serde(deserialize_with = "de_positive_distance")]
    pub distance: f64,
    /// Mode used for the trip
    pub transport_mode: TransportMode,
    /// Optional comment of the user
    #[serde(default, deserialize_with = "de_option_empty_string")]
    pub notes: Option<String>,
}

/// Publication status of a carpool offer
#[derive(Serialize, Deserialize, Debug, Derivative, Clone, Copy, PartialEq, Eq)]
#[derivative(Default)]
#[serde(rename_all = "lowercase")]
pub enum CarpoolStatus {
    /// Not visible to other users yet
    #[derivative(Default)]
    Draft,
    /// Open to join requests
    Active,
}

/// A shared ride proposed by a driver
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarpoolOffer {
    /// Identifier of the carpool
    #[serde(rename = "carpool_id")]
    pub id: String,
    /// Free text starting point
    pub origin: String,
    /// Free text destination
    pub destination: String,
    /// Free text schedule, e.g. "Mon-Fri 08:30"
    pub schedule: String,
    /// Total number of seats offered
    pub available_seats: u32,
    /// Driver owning the offer
    pub user_id: UserId,
    /// Publication status
    #[serde(default)]
    pub status: CarpoolStatus,
}

/// Status of a join request
#[derive(Serialize, Deserialize, Debug, Derivative, Clone, Copy, PartialEq, Eq)]
#[derivative(Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Waiting for the driver
    #[derivative(Default)]
    Pending,
    /// Accepted by the driver
    Accepted,
}

/// A request of a user to join a carpool
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarpoolParticipant {
    /// Carpool the user wants to join
    pub carpool_id: String,
    /// The requesting user
    pub user_id: UserId,
    /// Status of the request
    #[serde(default)]
    pub status: ParticipantStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_transport_mode() {
        assert_eq!(TransportMode::Bus, "bus".parse().unwrap());
        assert_eq!(TransportMode::Carpool, " CarPool ".parse().unwrap());
        assert_eq!(
            CoreError::UnknownMode(String::from("plane")),
            "plane".parse::<TransportMode>().unwrap_err()
        );
    }

    #[test]
    fn transport_mode_round_trips_through_display() {
        for mode in TransportMode::ALL.iter() {
            assert_eq!(*mode, mode.to_string().parse().unwrap());
        }
    }

    #[test]
    fn parse_period() {
        assert_eq!(Period::Yearly, "yearly".parse().unwrap());
        assert_eq!(Period::Daily, Period::default());
        assert_eq!(
            CoreError::UnknownPeriod(String::from("monthly")),
            "monthly".parse::<Period>().unwrap_err()
        );
    }

    #[test]
    fn default_statuses() {
        assert_eq!(CarpoolStatus::Draft, CarpoolStatus::default());
        assert_eq!(ParticipantStatus::Pending, ParticipantStatus::default());
    }
}
