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

use commute_model::{
    carpool::{active_listings, join_carpool},
    distance::DistanceResolver,
    objects::{Date, TransportMode},
    report::StoreReportCategory,
    store::{CsvStore, DataStore},
    test_utils::*,
    travel_log::{record_trip, ImprovementTip, TravelHistory, TripSubmission},
};
use pretty_assertions::assert_eq;

const INPUT: &str = "tests/fixtures/store/input";

#[test]
fn read_store_and_report_invalid_rows() {
    let store = CsvStore::open(INPUT).unwrap();
    let collections = store.collections();
    assert_eq!(3, collections.travel_logs.len());
    assert_eq!(3, collections.carpools.len());
    assert_eq!(2, collections.carpool_participants.len());

    let report = store.report();
    assert_eq!(3, report.error_count());
    assert_eq!(2, report.errors_of(&StoreReportCategory::InvalidRecord).len());
    assert_eq!(
        1,
        report
            .errors_of(&StoreReportCategory::MissingLocation)
            .len()
    );
    assert_eq!(
        vec!["user \"u2\" asked to join the unknown carpool \"c9\""],
        report.warnings_of(&StoreReportCategory::OrphanParticipant)
    );
}

#[test]
fn write_sanitized_store() {
    test_in_tmp_dir(|path| {
        let store = CsvStore::open(INPUT).unwrap();
        let mut output = CsvStore::new(path);
        for log in &store.collections().travel_logs {
            output.insert_travel_log(log.clone()).unwrap();
        }
        for carpool in &store.collections().carpools {
            output.insert_carpool(carpool.clone());
        }
        for participant in &store.collections().carpool_participants {
            output.insert_participant(participant.clone()).unwrap();
        }
        output.save().unwrap();
        compare_output_dir_with_expected(
            &path,
            vec!["travel_logs.txt", "carpools.txt", "carpool_participants.txt"],
            "tests/fixtures/store/output",
        );
    });
}

#[test]
fn record_then_reload_history() {
    test_in_tmp_dir(|path| {
        let user = String::from("u1");
        let mut store = CsvStore::new(path);
        let submission = TripSubmission {
            date: Date::from_ymd_opt(2024, 4, 8).unwrap(),
            origin: String::from("Taloja MIDC"),
            destination: String::from("Vashi"),
            transport_mode: TransportMode::Car,
            notes: Some(String::from("late meeting")),
        };
        let entry =
            record_trip(&mut store, Some(&user), &DistanceResolver::default(), submission).unwrap();
        assert_eq!(22.4, entry.distance);
        store.save().unwrap();

        let store = CsvStore::open(path).unwrap();
        assert!(store.report().is_empty());
        let history = TravelHistory::load(&store, "u1").unwrap();
        assert_eq!(vec![entry], history.entries().to_vec());
        // 22.4 * 0.192
        assert_eq!(4.3, history.total_emissions_kg());
        assert_eq!(100.0, history.car_trip_share());
        assert_eq!(ImprovementTip::UsePublicTransport, history.improvement_tip());
    });
}

#[test]
fn join_an_active_carpool() {
    let mut store = CsvStore::open(INPUT).unwrap();
    let user = String::from("u7");
    join_carpool(&mut store, Some(&user), "c3").unwrap();
    let listings = active_listings(&store).unwrap();
    let seats: Vec<(&str, u32)> = listings
        .iter()
        .map(|listing| (listing.offer.id.as_str(), listing.seats_left()))
        .collect();
    assert_eq!(vec![("c1", 2), ("c3", 0)], seats);
    assert!(join_carpool(&mut store, Some(&user), "c2").is_err());
}

#[test]
fn record_keeps_invalid_rows_on_disk() {
    test_in_tmp_dir(|path| {
        create_file_with_content(
            path,
            "travel_logs.txt",
            "id,user_id,date,origin,destination,distance,transport_mode,notes\n\
             log-1,u1,2024-04-01,Vashi,Nerul,5.2,train,\n\
             log-2,u1,2024-04-02,Vashi,Panvel,19.8,scooter,\n",
        );
        let mut store = CsvStore::open(path).unwrap();
        assert_eq!(1, store.report().error_count());
        let user = String::from("u1");
        let submission = TripSubmission {
            date: Date::from_ymd_opt(2024, 4, 8).unwrap(),
            origin: String::from("Belapur"),
            destination: String::from("CBD Belapur"),
            transport_mode: TransportMode::Car,
            notes: None,
        };
        let entry =
            record_trip(&mut store, Some(&user), &DistanceResolver::default(), submission).unwrap();
        assert_eq!("log-3", entry.id);
        assert_eq!(5.0, entry.distance);
        store.save().unwrap();

        assert_eq!(
            "id,user_id,date,origin,destination,distance,transport_mode,notes\n\
             log-1,u1,2024-04-01,Vashi,Nerul,5.2,train,\n\
             log-3,u1,2024-04-08,Belapur,CBD Belapur,5.0,car,\n\
             log-2,u1,2024-04-02,Vashi,Panvel,19.8,scooter,\n",
            get_file_content(path.join("travel_logs.txt"))
        );
        let store = CsvStore::open(path).unwrap();
        assert_eq!(2, store.collections().travel_logs.len());
        assert_eq!(1, store.report().error_count());
    });
}
