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

//! Configuration of the command line tools.

use crate::distance::MatchPolicy;
use crate::error::CoreError;
use crate::objects::Period;
use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::path;
use tracing::info;

fn default_days_per_week() -> u8 {
    5
}

/// Settings shared by the binaries
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// How locations are matched against the curated distances
    #[serde(default)]
    pub match_policy: MatchPolicy,
    /// Default reporting period
    #[serde(default)]
    pub period: Period,
    /// Number of commuting days in a week
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u8,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            match_policy: MatchPolicy::default(),
            period: Period::default(),
            days_per_week: default_days_per_week(),
        }
    }
}

/// Read a JSON configuration file, every key is optional.
///
/// Below is an example of this file
/// ```text
/// {
///     "match_policy": "exact",
///     "period": "weekly",
///     "days_per_week": 4
/// }
/// ```
pub fn read_config<P: AsRef<path::Path>>(config_path: Option<P>) -> Result<Configuration> {
    let config = match config_path {
        Some(config_path) => {
            let config_path = config_path.as_ref();
            info!("Reading configuration from {:?}", config_path);
            let json_config_file = File::open(config_path)
                .with_context(|| format!("Error reading {:?}", config_path))?;
            serde_json::from_reader(json_config_file)
                .with_context(|| format!("Error reading {:?}", config_path))?
        }
        None => Configuration::default(),
    };
    if !(1..=7).contains(&config.days_per_week) {
        return Err(CoreError::InvalidDaysPerWeek(config.days_per_week).into());
    }
    Ok(config)
}
