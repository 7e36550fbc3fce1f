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

//! Helpers to create a report of the records rejected while loading a store.
use serde::Serialize;

/// Each report record will be categorized with a type implementing this
/// `ReportCategory` trait.
pub trait ReportCategory: Serialize + PartialEq {}

/// Type of the report
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub enum StoreReportCategory {
    /// A row could not be parsed (unknown mode, negative distance, bad date...)
    InvalidRecord,
    /// A travel log has a blank origin or destination
    MissingLocation,
    /// An identifier is declared twice
    DuplicateId,
    /// A participant refers to an unknown carpool
    OrphanParticipant,
}

impl ReportCategory for StoreReportCategory {}

/// A report record.
#[derive(Debug, Serialize, PartialEq)]
struct ReportRow<R: ReportCategory> {
    category: R,
    message: String,
}

/// An report is a list of report records with 2 levels of recording: warnings
/// and errors.
#[derive(Debug, Serialize)]
pub struct Report<R: ReportCategory> {
    errors: Vec<ReportRow<R>>,
    warnings: Vec<ReportRow<R>>,
}

impl<R: ReportCategory> Default for Report<R> {
    fn default() -> Self {
        Report {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<R: ReportCategory> Report<R> {
    /// Add a warning report record.
    pub fn add_warning(&mut self, warning: String, warning_type: R) {
        let report_row = ReportRow {
            category: warning_type,
            message: warning,
        };
        if !self.warnings.contains(&report_row) {
            self.warnings.push(report_row);
        }
    }
    /// Add an error report record.
    pub fn add_error(&mut self, error: String, error_type: R) {
        let report_row = ReportRow {
            category: error_type,
            message: error,
        };
        if !self.errors.contains(&report_row) {
            self.errors.push(report_row);
        }
    }
    /// Number of errors
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
    /// Messages of the errors of a category
    pub fn errors_of(&self, category: &R) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|row| row.category == *category)
            .map(|row| row.message.as_str())
            .collect()
    }
    /// Messages of the warnings of a category
    pub fn warnings_of(&self, category: &R) -> Vec<&str> {
        self.warnings
            .iter()
            .filter(|row| row.category == *category)
            .map(|row| row.message.as_str())
            .collect()
    }
}
