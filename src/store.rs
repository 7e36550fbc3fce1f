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

//! Persistence of the travel logs and carpools.
//!
//! The application only needs insert and select calls, described by the
//! [DataStore] trait. [CsvStore] implements it on a directory holding one CSV
//! file per table:
//! - `travel_logs.txt`
//! - `carpools.txt`
//! - `carpool_participants.txt`

use crate::objects::{CarpoolOffer, CarpoolParticipant, CarpoolStatus, TravelLogEntry};
use crate::parser::{read_objects_with_report, write_objects, RawRows};
use crate::report::{Report, StoreReportCategory};
use crate::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File of the travel logs
pub const TRAVEL_LOGS_FILE: &str = "travel_logs.txt";
/// File of the carpool offers
pub const CARPOOLS_FILE: &str = "carpools.txt";
/// File of the join requests
pub const CARPOOL_PARTICIPANTS_FILE: &str = "carpool_participants.txt";

/// Insert and select calls needed by the travel log and the carpool board.
pub trait DataStore {
    /// Append a travel log. An identifier is given to the entry if it has
    /// none, the stored entry is returned.
    fn insert_travel_log(&mut self, entry: TravelLogEntry) -> Result<TravelLogEntry>;

    /// Travel logs of a user, in insertion order
    fn travel_logs(&self, user_id: &str) -> Result<Vec<TravelLogEntry>>;

    /// Carpool offers with the given status
    fn carpools(&self, status: CarpoolStatus) -> Result<Vec<CarpoolOffer>>;

    /// Join requests of a carpool
    fn participants(&self, carpool_id: &str) -> Result<Vec<CarpoolParticipant>>;

    /// Append a join request
    fn insert_participant(&mut self, participant: CarpoolParticipant) -> Result<()>;
}

/// All the records of a store
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Collections {
    /// Logged trips of every user
    pub travel_logs: Vec<TravelLogEntry>,
    /// Carpool offers
    pub carpools: Vec<CarpoolOffer>,
    /// Join requests on the carpools
    pub carpool_participants: Vec<CarpoolParticipant>,
}

impl Collections {
    /// Remove the records that can't be used, recording them in the report.
    /// The removed records are returned.
    fn sanitize(&mut self, report: &mut Report<StoreReportCategory>) -> Collections {
        let mut dropped = Collections::default();

        let mut log_ids = HashSet::new();
        for log in std::mem::take(&mut self.travel_logs) {
            if log.origin.trim().is_empty() || log.destination.trim().is_empty() {
                report.add_error(
                    format!("travel log {:?} has no origin or destination", log.id),
                    StoreReportCategory::MissingLocation,
                );
                dropped.travel_logs.push(log);
            } else if !log_ids.insert(log.id.clone()) {
                report.add_error(
                    format!("travel log {:?} is declared more than once", log.id),
                    StoreReportCategory::DuplicateId,
                );
                dropped.travel_logs.push(log);
            } else {
                self.travel_logs.push(log);
            }
        }

        let mut carpool_ids = HashSet::new();
        for carpool in std::mem::take(&mut self.carpools) {
            if carpool_ids.insert(carpool.id.clone()) {
                self.carpools.push(carpool);
            } else {
                report.add_error(
                    format!("carpool {:?} is declared more than once", carpool.id),
                    StoreReportCategory::DuplicateId,
                );
                dropped.carpools.push(carpool);
            }
        }

        for participant in std::mem::take(&mut self.carpool_participants) {
            if carpool_ids.contains(&participant.carpool_id) {
                self.carpool_participants.push(participant);
            } else {
                report.add_warning(
                    format!(
                        "user {:?} asked to join the unknown carpool {:?}",
                        participant.user_id, participant.carpool_id
                    ),
                    StoreReportCategory::OrphanParticipant,
                );
                dropped.carpool_participants.push(participant);
            }
        }
        dropped
    }
}

// Rows of the directory that are not served by the store. They are written
// back by `save`.
#[derive(Debug, Default)]
struct SetAside {
    travel_logs: RawRows,
    carpools: RawRows,
    carpool_participants: RawRows,
    dropped: Collections,
}

impl SetAside {
    fn len(&self) -> usize {
        self.travel_logs.len()
            + self.carpools.len()
            + self.carpool_participants.len()
            + self.dropped.travel_logs.len()
            + self.dropped.carpools.len()
            + self.dropped.carpool_participants.len()
    }
}

/// A [DataStore] backed by a directory of CSV files.
///
/// Everything is loaded in memory by [CsvStore::open], inserts are only
/// persisted by [CsvStore::save]. Rows rejected while loading are listed in
/// [CsvStore::report], they are not served but are kept in the files.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    collections: Collections,
    set_aside: SetAside,
    report: Report<StoreReportCategory>,
}

impl CsvStore {
    /// An empty store that will be saved in `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvStore {
            path: path.as_ref().to_path_buf(),
            collections: Collections::default(),
            set_aside: SetAside::default(),
            report: Report::default(),
        }
    }

    /// Load the store of a directory. A missing directory or file is an
    /// empty table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = CsvStore::new(path);
        let path = store.path.as_path();
        info!("Loading store from {:?}", path);
        let mut report = Report::default();
        let (travel_logs, rejected_travel_logs) = read_objects_with_report(
            path,
            TRAVEL_LOGS_FILE,
            &mut report,
            StoreReportCategory::InvalidRecord,
        )?;
        let (carpools, rejected_carpools) = read_objects_with_report(
            path,
            CARPOOLS_FILE,
            &mut report,
            StoreReportCategory::InvalidRecord,
        )?;
        let (carpool_participants, rejected_participants) = read_objects_with_report(
            path,
            CARPOOL_PARTICIPANTS_FILE,
            &mut report,
            StoreReportCategory::InvalidRecord,
        )?;
        let mut collections = Collections {
            travel_logs,
            carpools,
            carpool_participants,
        };
        let dropped = collections.sanitize(&mut report);
        let set_aside = SetAside {
            travel_logs: rejected_travel_logs,
            carpools: rejected_carpools,
            carpool_participants: rejected_participants,
            dropped,
        };
        if set_aside.len() > 0 {
            info!("{} rows of {:?} are set aside", set_aside.len(), path);
        }
        store.collections = collections;
        store.set_aside = set_aside;
        store.report = report;
        Ok(store)
    }

    /// Write all the tables in the directory, creating it if needed. The rows
    /// set aside while loading are written after the records.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_path();
        info!("Writing store to {:?}", path);
        fs::create_dir_all(path).with_context(|| format!("Error creating {:?}", path))?;
        let (collections, set_aside) = (&self.collections, &self.set_aside);
        write_objects(
            path,
            TRAVEL_LOGS_FILE,
            &[&collections.travel_logs[..], &set_aside.dropped.travel_logs[..]].concat(),
            &set_aside.travel_logs,
        )?;
        write_objects(
            path,
            CARPOOLS_FILE,
            &[&collections.carpools[..], &set_aside.dropped.carpools[..]].concat(),
            &set_aside.carpools,
        )?;
        write_objects(
            path,
            CARPOOL_PARTICIPANTS_FILE,
            &[
                &collections.carpool_participants[..],
                &set_aside.dropped.carpool_participants[..],
            ]
            .concat(),
            &set_aside.carpool_participants,
        )?;
        Ok(())
    }

    /// Directory of the store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The records in memory
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Add a carpool offer
    pub fn insert_carpool(&mut self, carpool: CarpoolOffer) {
        self.collections.carpools.push(carpool);
    }

    /// Rows rejected while loading
    pub fn report(&self) -> &Report<StoreReportCategory> {
        &self.report
    }

    // first `log-N` not used by any row of the file, set aside ones included
    fn next_travel_log_id(&self) -> String {
        let ids: HashSet<&str> = self
            .collections
            .travel_logs
            .iter()
            .chain(&self.set_aside.dropped.travel_logs)
            .map(|log| log.id.as_str())
            .chain(self.set_aside.travel_logs.column("id"))
            .collect();
        (ids.len() + 1..)
            .map(|n| format!("log-{}", n))
            .find(|id| !ids.contains(id.as_str()))
            .unwrap_or_default()
    }
}

impl DataStore for CsvStore {
    fn insert_travel_log(&mut self, mut entry: TravelLogEntry) -> Result<TravelLogEntry> {
        if entry.id.is_empty() {
            entry.id = self.next_travel_log_id();
        }
        self.collections.travel_logs.push(entry.clone());
        Ok(entry)
    }

    fn travel_logs(&self, user_id: &str) -> Result<Vec<TravelLogEntry>> {
        Ok(self
            .collections
            .travel_logs
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect())
    }

    fn carpools(&self, status: CarpoolStatus) -> Result<Vec<CarpoolOffer>> {
        Ok(self
            .collections
            .carpools
            .iter()
            .filter(|carpool| carpool.status == status)
            .cloned()
            .collect())
    }

    fn participants(&self, carpool_id: &str) -> Result<Vec<CarpoolParticipant>> {
        Ok(self
            .collections
            .carpool_participants
            .iter()
            .filter(|participant| participant.carpool_id == carpool_id)
            .cloned()
            .collect())
    }

    fn insert_participant(&mut self, participant: CarpoolParticipant) -> Result<()> {
        self.collections.carpool_participants.push(participant);
        Ok(())
    }
}
