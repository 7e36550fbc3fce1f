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

//! Local rejections raised by the distance and emissions computations and by
//! the travel log and carpool flows.

use thiserror::Error;

/// Errors that are surfaced synchronously to the immediate caller.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// The transport mode is not one of the known modes
    #[error("unknown transport mode '{0}'")]
    UnknownMode(String),
    /// The period is not one of daily, weekly or yearly
    #[error("unknown period '{0}'")]
    UnknownPeriod(String),
    /// The distance is negative, NaN or infinite
    #[error("invalid distance {0} km, a finite positive value is expected")]
    InvalidDistance(f64),
    /// The number of commuting days per week is out of 1..=7
    #[error("invalid number of days per week {0}, expected a value between 1 and 7")]
    InvalidDaysPerWeek(u8),
    /// The emissions amount is negative, NaN or infinite
    #[error("invalid emissions {0} kg, a finite positive value is expected")]
    InvalidEmissions(f64),
    /// Origin or destination is empty
    #[error("both origin and destination are required")]
    MissingLocation,
    /// No user is signed in
    #[error("authentication required")]
    AuthenticationRequired,
    /// The carpool does not exist or is not open to join requests
    #[error("carpool '{0}' not found among active carpools")]
    UnknownCarpool(String),
    /// The user already asked to join this carpool
    #[error("user '{user_id}' already requested to join carpool '{carpool_id}'")]
    AlreadyRequested {
        /// Identifier of the carpool
        carpool_id: String,
        /// Identifier of the user
        user_id: String,
    },
}
