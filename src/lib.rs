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

//! The `commute_model` crate estimates commute distances and the carbon
//! footprint of a trip depending on the transport mode used.
//!
//! It also manages the records built on top of those computations: the
//! travel log of a user and the carpool offers they can join, persisted as
//! CSV files in a directory.

#![deny(missing_docs)]

pub mod carpool;
pub mod configuration;
pub mod distance;
pub mod emissions;
mod error;
pub mod objects;
pub(crate) mod parser;
pub mod report;
pub mod serde_utils;
pub mod store;
#[doc(hidden)]
pub mod test_utils;
pub mod travel_log;
mod version_utils;

pub use crate::distance::{resolve_distance, DistanceResolver, MatchPolicy, DEFAULT_DISTANCE_KM};
pub use crate::emissions::{compute_emissions, trees_to_offset, EmissionsEngine, EmissionsReport};
pub use crate::error::CoreError;
pub use crate::store::{CsvStore, DataStore};
pub use version_utils::{binary_full_version, GIT_VERSION};

/// The error type used by the crate.
pub type Error = anyhow::Error;

/// The corresponding result type used by the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
