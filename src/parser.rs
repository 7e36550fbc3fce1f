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

//! Reading and writing the CSV files of a store directory.

use crate::report::{Report, ReportCategory};
use crate::Result;
use anyhow::Context;
use csv::ByteRecord;
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

/// Rows of a file that could not be read as objects. They are kept as they
/// were read so that rewriting the file does not lose them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    headers: ByteRecord,
    rows: Vec<ByteRecord>,
}

impl RawRows {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there is no row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of a column, rows without the column or with a value that is
    /// not valid UTF-8 are skipped
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let index = self.headers.iter().position(|h| h == name.as_bytes());
        self.rows
            .iter()
            .filter_map(move |row| index.and_then(|i| row.get(i)))
            .filter_map(|value| std::str::from_utf8(value).ok())
    }

    // `row` laid out for `headers`, columns unknown to the row are empty
    fn reorder(&self, row: &ByteRecord, headers: &ByteRecord) -> ByteRecord {
        headers
            .iter()
            .map(|name| {
                self.headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|i| row.get(i))
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn open_reader(path: &Path, file_name: &str) -> Result<Option<csv::Reader<File>>> {
    let file_path = path.join(file_name);
    if !file_path.exists() {
        info!("Skipping {}", file_name);
        return Ok(None);
    }
    info!("Reading {}", file_name);
    let file = File::open(&file_path).with_context(|| format!("Error reading {:?}", file_path))?;
    Ok(Some(
        csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file),
    ))
}

/// Read a vector of objects from a file of the directory, a missing file is
/// an empty table.
///
/// The rows that can't be read as objects are recorded in the report and
/// returned aside.
pub fn read_objects_with_report<O, R>(
    path: &Path,
    file_name: &str,
    report: &mut Report<R>,
    category: R,
) -> Result<(Vec<O>, RawRows)>
where
    O: for<'de> serde::Deserialize<'de>,
    R: ReportCategory + Copy,
{
    let mut rdr = match open_reader(path, file_name)? {
        None => return Ok((vec![], RawRows::default())),
        Some(rdr) => rdr,
    };
    let file_path = path.join(file_name);
    let headers = rdr
        .byte_headers()
        .with_context(|| format!("Error reading {:?}", file_path))?
        .clone();
    let mut objects = Vec::new();
    let mut rejected = RawRows {
        headers: headers.clone(),
        rows: Vec::new(),
    };
    for record in rdr.byte_records() {
        let record = record.with_context(|| format!("Error reading {:?}", file_path))?;
        match record.deserialize::<O>(Some(&headers)) {
            Ok(object) => objects.push(object),
            Err(e) => {
                let line = record.position().map_or(0, |position| position.line());
                let message = format!("{} line {}: {}", file_name, line, e);
                warn!("Setting invalid record aside, {}", message);
                report.add_error(message, category);
                rejected.rows.push(record);
            }
        }
    }
    Ok((objects, rejected))
}

/// Write objects in a file of the directory, followed by the rows that were
/// set aside when reading it.
///
/// An empty table has no file, a previous file is removed.
pub fn write_objects<O>(path: &Path, file_name: &str, objects: &[O], rejected: &RawRows) -> Result<()>
where
    O: serde::Serialize,
{
    let file_path = path.join(file_name);
    let error = || format!("Error writing {:?}", file_path);
    if objects.is_empty() && rejected.is_empty() {
        if file_path.exists() {
            info!("Removing {}, the table is empty", file_name);
            fs::remove_file(&file_path).with_context(error)?;
        }
        return Ok(());
    }
    info!("Writing {}", file_name);

    // serialized first to know the columns of the objects
    let mut buffer = csv::Writer::from_writer(vec![]);
    for object in objects {
        buffer.serialize(object).with_context(error)?;
    }
    buffer.flush().with_context(error)?;
    let mut serialized = csv::Reader::from_reader(buffer.get_ref().as_slice());
    let headers = if objects.is_empty() {
        rejected.headers.clone()
    } else {
        serialized.byte_headers().with_context(error)?.clone()
    };

    let mut wtr = csv::Writer::from_path(&file_path).with_context(error)?;
    wtr.write_byte_record(&headers).with_context(error)?;
    for record in serialized.byte_records() {
        wtr.write_byte_record(&record.with_context(error)?)
            .with_context(error)?;
    }
    for row in &rejected.rows {
        wtr.write_byte_record(&rejected.reorder(row, &headers))
            .with_context(error)?;
    }
    wtr.flush().with_context(error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::StoreReportCategory;
    use crate::test_utils::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Seat {
        id: String,
        count: u32,
    }

    fn read_seats(path: &Path) -> (Vec<Seat>, RawRows, Report<StoreReportCategory>) {
        let mut report = Report::default();
        let (seats, rejected) = read_objects_with_report(
            path,
            "seats.txt",
            &mut report,
            StoreReportCategory::InvalidRecord,
        )
        .unwrap();
        (seats, rejected, report)
    }

    #[test]
    fn missing_file_is_an_empty_table() {
        test_in_tmp_dir(|path| {
            let (seats, rejected, report) = read_seats(path);
            assert!(seats.is_empty());
            assert!(rejected.is_empty());
            assert!(report.is_empty());
        });
    }

    #[test]
    fn invalid_rows_are_set_aside() {
        test_in_tmp_dir(|path| {
            create_file_with_content(path, "seats.txt", "id,count\na,1\nb,-2\nc,3\nd,many\n");
            let (seats, rejected, report) = read_seats(path);
            assert_eq!(vec!["a", "c"], seats.iter().map(|s| s.id.as_str()).collect::<Vec<_>>());
            assert_eq!(2, rejected.len());
            assert_eq!(vec!["b", "d"], rejected.column("id").collect::<Vec<_>>());
            assert!(rejected.column("unknown").next().is_none());
            assert_eq!(2, report.error_count());
        });
    }

    #[test]
    fn write_then_read() {
        test_in_tmp_dir(|path| {
            let seats = vec![
                Seat {
                    id: String::from("a"),
                    count: 4,
                },
                Seat {
                    id: String::from("b"),
                    count: 2,
                },
            ];
            write_objects(path, "seats.txt", &seats, &RawRows::default()).unwrap();
            assert_eq!("id,count\na,4\nb,2\n", get_file_content(path.join("seats.txt")));
        });
    }

    #[test]
    fn rows_set_aside_are_written_back() {
        test_in_tmp_dir(|path| {
            // columns in another order than the fields of the objects
            create_file_with_content(path, "seats.txt", "count,id\n1,a\n-2,b\n");
            let (seats, rejected, _) = read_seats(path);
            write_objects(path, "seats.txt", &seats, &rejected).unwrap();
            assert_eq!("id,count\na,1\nb,-2\n", get_file_content(path.join("seats.txt")));

            write_objects::<Seat>(path, "seats.txt", &[], &rejected).unwrap();
            assert_eq!("count,id\n-2,b\n", get_file_content(path.join("seats.txt")));
        });
    }

    #[test]
    fn empty_table_removes_the_file() {
        test_in_tmp_dir(|path| {
            create_file_with_content(path, "seats.txt", "id,count\na,1\n");
            write_objects::<Seat>(path, "seats.txt", &[], &RawRows::default()).unwrap();
            assert!(!path.join("seats.txt").exists());
            write_objects::<Seat>(path, "other.txt", &[], &RawRows::default()).unwrap();
            assert!(!path.join("other.txt").exists());
        });
    }
}
