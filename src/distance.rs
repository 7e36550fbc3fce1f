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

//! Estimation of the distance between two free text locations.
//!
//! The distance comes from a curated table of the Navi Mumbai region when
//! both locations can be recognized, otherwise from a deterministic
//! pseudo-distance computed from the names. See [DistanceResolver::resolve].

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Distance used by the call sites that need a value when the locations are
/// not usable (empty origin or destination) or give a null distance.
pub const DEFAULT_DISTANCE_KM: f64 = 5.0;

// Lower bound and width (in tenths of km) of the synthetic distances.
const FALLBACK_MIN_KM: f64 = 5.0;
const FALLBACK_RANGE_TENTHS: i64 = 450;

type RawTable = &'static [(&'static str, &'static [(&'static str, f64)])];

// The order of the entries matters: with the substring policy, the first
// matching key wins.
const NAVI_MUMBAI_DISTANCES: RawTable = &[
    (
        "vashi",
        &[
            ("nerul", 5.2),
            ("belapur", 8.7),
            ("kharghar", 12.5),
            ("panvel", 19.8),
            ("airoli", 7.3),
            ("ghansoli", 4.6),
            ("kopar khairane", 3.2),
            ("sanpada", 1.8),
            ("juinagar", 3.5),
            ("seawoods", 6.1),
            ("cbd belapur", 8.7),
            ("khanda colony", 15.3),
            ("taloja", 22.4),
        ],
    ),
    (
        "nerul",
        &[
            ("vashi", 5.2),
            ("belapur", 3.5),
            ("kharghar", 7.3),
            ("panvel", 14.6),
            ("airoli", 12.5),
            ("ghansoli", 9.8),
            ("kopar khairane", 8.4),
            ("sanpada", 3.4),
            ("juinagar", 1.7),
            ("seawoods", 0.9),
            ("cbd belapur", 3.5),
            ("khanda colony", 10.1),
            ("taloja", 17.2),
        ],
    ),
    (
        "belapur",
        &[
            ("vashi", 8.7),
            ("nerul", 3.5),
            ("kharghar", 3.8),
            ("panvel", 11.1),
            ("airoli", 16.0),
            ("ghansoli", 13.3),
            ("kopar khairane", 11.9),
            ("sanpada", 6.9),
            ("juinagar", 5.2),
            ("seawoods", 2.6),
            ("cbd belapur", 0.0),
            ("khanda colony", 6.6),
            ("taloja", 13.7),
        ],
    ),
    (
        "kharghar",
        &[
            ("vashi", 12.5),
            ("nerul", 7.3),
            ("belapur", 3.8),
            ("panvel", 7.3),
            ("airoli", 19.8),
            ("ghansoli", 17.1),
            ("kopar khairane", 15.7),
            ("sanpada", 10.7),
            ("juinagar", 9.0),
            ("seawoods", 6.4),
            ("cbd belapur", 3.8),
            ("khanda colony", 2.8),
            ("taloja", 9.9),
        ],
    ),
    (
        "panvel",
        &[
            ("vashi", 19.8),
            ("nerul", 14.6),
            ("belapur", 11.1),
            ("kharghar", 7.3),
            ("airoli", 27.1),
            ("ghansoli", 24.4),
            ("kopar khairane", 23.0),
            ("sanpada", 18.0),
            ("juinagar", 16.3),
            ("seawoods", 13.7),
            ("cbd belapur", 11.1),
            ("khanda colony", 4.5),
            ("taloja", 9.1),
        ],
    ),
    (
        "airoli",
        &[
            ("vashi", 7.3),
            ("nerul", 12.5),
            ("belapur", 16.0),
            ("kharghar", 19.8),
            ("panvel", 27.1),
            ("ghansoli", 2.7),
            ("kopar khairane", 4.1),
            ("sanpada", 9.1),
            ("juinagar", 10.8),
            ("seawoods", 13.4),
            ("cbd belapur", 16.0),
            ("khanda colony", 22.6),
            ("taloja", 29.7),
        ],
    ),
    (
        "ghansoli",
        &[
            ("vashi", 4.6),
            ("nerul", 9.8),
            ("belapur", 13.3),
            ("kharghar", 17.1),
            ("panvel", 24.4),
            ("airoli", 2.7),
            ("kopar khairane", 1.4),
            ("sanpada", 6.4),
            ("juinagar", 8.1),
            ("seawoods", 10.7),
            ("cbd belapur", 13.3),
            ("khanda colony", 19.9),
            ("taloja", 27.0),
        ],
    ),
    (
        "kopar khairane",
        &[
            ("vashi", 3.2),
            ("nerul", 8.4),
            ("belapur", 11.9),
            ("kharghar", 15.7),
            ("panvel", 23.0),
            ("airoli", 4.1),
            ("ghansoli", 1.4),
            ("sanpada", 5.0),
            ("juinagar", 6.7),
            ("seawoods", 9.3),
            ("cbd belapur", 11.9),
            ("khanda colony", 18.5),
            ("taloja", 25.6),
        ],
    ),
    (
        "sanpada",
        &[
            ("vashi", 1.8),
            ("nerul", 3.4),
            ("belapur", 6.9),
            ("kharghar", 10.7),
            ("panvel", 18.0),
            ("airoli", 9.1),
            ("ghansoli", 6.4),
            ("kopar khairane", 5.0),
            ("juinagar", 1.7),
            ("seawoods", 4.3),
            ("cbd belapur", 6.9),
            ("khanda colony", 13.5),
            ("taloja", 20.6),
        ],
    ),
    (
        "juinagar",
        &[
            ("vashi", 3.5),
            ("nerul", 1.7),
            ("belapur", 5.2),
            ("kharghar", 9.0),
            ("panvel", 16.3),
            ("airoli", 10.8),
            ("ghansoli", 8.1),
            ("kopar khairane", 6.7),
            ("sanpada", 1.7),
            ("seawoods", 2.6),
            ("cbd belapur", 5.2),
            ("khanda colony", 11.8),
            ("taloja", 18.9),
        ],
    ),
    (
        "seawoods",
        &[
            ("vashi", 6.1),
            ("nerul", 0.9),
            ("belapur", 2.6),
            ("kharghar", 6.4),
            ("panvel", 13.7),
            ("airoli", 13.4),
            ("ghansoli", 10.7),
            ("kopar khairane", 9.3),
            ("sanpada", 4.3),
            ("juinagar", 2.6),
            ("cbd belapur", 2.6),
            ("khanda colony", 9.2),
            ("taloja", 16.3),
        ],
    ),
];

lazy_static::lazy_static! {
    /// The curated distances of the Navi Mumbai region
    pub static ref NAVI_MUMBAI: DistanceTable = DistanceTable::from_raw(NAVI_MUMBAI_DISTANCES);
    static ref BUILTIN_RESOLVER: DistanceResolver<'static> = DistanceResolver::new(&NAVI_MUMBAI, MatchPolicy::default());
}

/// Lower-case and trim a location label.
pub fn normalize(location: &str) -> String {
    location.trim().to_lowercase()
}

/// How the user's locations are compared to the keys of a [DistanceTable].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// A location matches a key when it contains it ("Vashi Station" matches
    /// "vashi"). Two unrelated places sharing a substring may match.
    Substring,
    /// A location matches a key only when both are equal once normalized.
    Exact,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Substring
    }
}

impl MatchPolicy {
    fn matches(self, location: &str, key: &str) -> bool {
        match self {
            MatchPolicy::Substring => location.contains(key),
            MatchPolicy::Exact => location == key,
        }
    }
}

/// Curated distances in kilometers, from a base location to target
/// locations. Both levels keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceTable {
    entries: Vec<(String, Vec<(String, f64)>)>,
}

impl DistanceTable {
    fn from_raw(raw: RawTable) -> Self {
        let entries = raw
            .iter()
            .map(|(base, targets)| {
                let targets = targets
                    .iter()
                    .map(|(target, km)| (normalize(target), *km))
                    .collect();
                (normalize(base), targets)
            })
            .collect();
        DistanceTable { entries }
    }

    /// Build a table from `(base, target, km)` triplets, keys are normalized.
    pub fn from_triplets<'a, I>(triplets: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, f64)>,
    {
        let mut table = DistanceTable::default();
        for (base, target, km) in triplets {
            let base = normalize(base);
            let target = normalize(target);
            match table.entries.iter_mut().find(|(b, _)| *b == base) {
                Some((_, targets)) => targets.push((target, km)),
                None => table.entries.push((base, vec![(target, km)])),
            }
        }
        table
    }

    /// Number of base locations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no base location
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distance stored for exactly this pair of keys
    pub fn get(&self, base: &str, target: &str) -> Option<f64> {
        let (base, target) = (normalize(base), normalize(target));
        self.entries
            .iter()
            .find(|(b, _)| *b == base)
            .and_then(|(_, targets)| targets.iter().find(|(t, _)| *t == target))
            .map(|(_, km)| *km)
    }

    /// Iterate over all `(base, target, km)` entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.entries.iter().flat_map(|(base, targets)| {
            targets
                .iter()
                .map(move |(target, km)| (base.as_str(), target.as_str(), *km))
        })
    }

    // `origin` and `destination` must be normalized
    fn find(&self, origin: &str, destination: &str, policy: MatchPolicy) -> Option<f64> {
        self.entries
            .iter()
            .filter(|(base, _)| policy.matches(origin, base))
            .find_map(|(_, targets)| {
                targets
                    .iter()
                    .find(|(target, _)| policy.matches(destination, target))
                    .map(|(_, km)| *km)
            })
    }
}

/// Resolve a pair of locations to a distance in kilometers.
#[derive(Debug, Clone, Copy)]
pub struct DistanceResolver<'t> {
    table: &'t DistanceTable,
    policy: MatchPolicy,
}

impl Default for DistanceResolver<'static> {
    fn default() -> Self {
        *BUILTIN_RESOLVER
    }
}

impl<'t> DistanceResolver<'t> {
    /// Create a resolver over a curated table
    pub fn new(table: &'t DistanceTable, policy: MatchPolicy) -> Self {
        DistanceResolver { table, policy }
    }

    /// Resolver over the builtin table with the given policy
    pub fn with_policy(policy: MatchPolicy) -> DistanceResolver<'static> {
        DistanceResolver::new(&NAVI_MUMBAI, policy)
    }

    /// The matching policy in use
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Look the pair up in the curated table only.
    ///
    /// The whole table is searched in the user's direction first, then in the
    /// reversed direction: the table is not symmetric by construction.
    pub fn lookup(&self, origin: &str, destination: &str) -> Option<f64> {
        let (origin, destination) = (normalize(origin), normalize(destination));
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        self.table
            .find(&origin, &destination, self.policy)
            .or_else(|| {
                debug!("No curated distance from {:?} to {:?}, trying reversed", origin, destination);
                self.table.find(&destination, &origin, self.policy)
            })
    }

    /// Best-effort distance for any pair of non empty locations.
    ///
    /// Returns `None` only when the origin or the destination is blank. An
    /// unknown pair is given a deterministic pseudo-distance in `[5, 50)` km,
    /// see [fallback_distance].
    pub fn resolve(&self, origin: &str, destination: &str) -> Option<f64> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return None;
        }
        self.lookup(origin, destination).or_else(|| {
            let km = fallback_distance(origin, destination);
            debug!("Using synthetic distance of {} km for {:?} -> {:?}", km, origin, destination);
            Some(km)
        })
    }

    /// Same as [DistanceResolver::resolve], always positive: [DEFAULT_DISTANCE_KM]
    /// is used for blank locations and for a null curated distance.
    pub fn resolve_or_default(&self, origin: &str, destination: &str) -> f64 {
        self.resolve(origin, destination)
            .filter(|km| *km > 0.0)
            .unwrap_or(DEFAULT_DISTANCE_KM)
    }
}

/// Deterministic pseudo-distance for a pair of locations.
///
/// The 32 bits rolling hash `hash * 31 + code unit` of the concatenated
/// normalized labels is mapped to `(|hash| mod 450) / 10 + 5`.
/// It has no geographical meaning.
pub fn fallback_distance(origin: &str, destination: &str) -> f64 {
    let key = normalize(origin) + &normalize(destination);
    let hash = key
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
    // i64 so that the absolute value of i32::MIN does not overflow
    let tenths = i64::from(hash).abs() % FALLBACK_RANGE_TENTHS;
    tenths as f64 / 10.0 + FALLBACK_MIN_KM
}

/// Resolve a distance with the builtin table and the legacy substring policy.
pub fn resolve_distance(origin: &str, destination: &str) -> Option<f64> {
    BUILTIN_RESOLVER.resolve(origin, destination)
}
