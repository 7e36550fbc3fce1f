// Copyright 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see
// <http://www.gnu.org/licenses/>.


use assert_cmd::{cargo_bin, prelude::*};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn copy_store(output_dir: &Path) {
    for file in &["travel_logs.txt", "carpools.txt", "carpool_participants.txt"] {
        fs::copy(
            Path::new("../tests/fixtures/store/input").join(file),
            output_dir.join(file),
        )
        .expect("copy fixture failed");
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is not utf-8")
}

#[test]
fn test_travel_log_record() {
    let data_dir = TempDir::new().expect("create temp dir failed");
    copy_store(data_dir.path());
    Command::new(cargo_bin!("travel-log"))
        .arg("--data")
        .arg(data_dir.path().to_str().unwrap())
        .arg("record")
        .arg("--user")
        .arg("u2")
        .arg("--origin")
        .arg("Vashi Station")
        .arg("--destination")
        .arg("Nerul")
        .arg("--mode")
        .arg("bus")
        .arg("--date")
        .arg("2024-04-05")
        .assert()
        .success();
    let travel_logs = fs::read_to_string(data_dir.path().join("travel_logs.txt")).unwrap();
    // ids of the invalid rows are not reused
    assert!(travel_logs.contains("log-7,u2,2024-04-05,Vashi Station,Nerul,5.2,bus,\n"));
    // the invalid rows are kept
    assert!(travel_logs.contains("log-4,u1,2024-04-03,Panvel,Vashi,15.8,plane,\n"));
    assert!(travel_logs.contains("log-5,u1,2024-04-03,,Vashi,15.8,car,\n"));
    assert!(travel_logs.contains("log-6,u1,2024-04-04,Airoli,Vashi,-3,car,\n"));
}

#[test]
fn test_travel_log_record_requires_user() {
    let data_dir = TempDir::new().expect("create temp dir failed");
    Command::new(cargo_bin!("travel-log"))
        .arg("--data")
        .arg(data_dir.path().to_str().unwrap())
        .arg("record")
        .arg("--origin")
        .arg("Vashi")
        .arg("--destination")
        .arg("Nerul")
        .arg("--mode")
        .arg("bus")
        .assert()
        .failure();
    assert!(!data_dir.path().join("travel_logs.txt").exists());
}

#[test]
fn test_travel_log_history() {
    let output = Command::new(cargo_bin!("travel-log"))
        .arg("--data")
        .arg("../tests/fixtures/store/input")
        .arg("history")
        .arg("--user")
        .arg("u1")
        .output()
        .expect("run travel-log failed");
    assert!(output.status.success());
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        "2024-04-02 Kharghar -> Belapur: 4.2 km by Car (alone), 0.81 kg CO₂",
        lines[0]
    );
    // 4.2 * 0.192 + 5.2 * 0.041
    assert_eq!("Total emissions: 1.02 kg CO₂", lines[2]);
    assert_eq!(
        "Try replacing some car trips with train or bus travel to further reduce your emissions.",
        lines[4]
    );
}

#[test]
fn test_travel_log_report() {
    let output_dir = TempDir::new().expect("create temp dir failed");
    let report_path = output_dir.path().join("report.json");
    Command::new(cargo_bin!("travel-log"))
        .arg("--data")
        .arg("../tests/fixtures/store/input")
        .arg("--report")
        .arg(report_path.to_str().unwrap())
        .arg("carpools")
        .assert()
        .success();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(3, report["errors"].as_array().unwrap().len());
    assert_eq!("OrphanParticipant", report["warnings"][0]["category"]);
}

#[test]
fn test_travel_log_carpools_and_join() {
    let data_dir = TempDir::new().expect("create temp dir failed");
    copy_store(data_dir.path());
    let data = data_dir.path().to_str().unwrap();
    Command::new(cargo_bin!("travel-log"))
        .args(["--data", data, "join", "--user", "u8", "--carpool", "c1"])
        .assert()
        .success();
    // a second request of the same user is rejected
    Command::new(cargo_bin!("travel-log"))
        .args(["--data", data, "join", "--user", "u8", "--carpool", "c1"])
        .assert()
        .failure();
    // draft carpools can't be joined
    Command::new(cargo_bin!("travel-log"))
        .args(["--data", data, "join", "--user", "u8", "--carpool", "c2"])
        .assert()
        .failure();

    let output = Command::new(cargo_bin!("travel-log"))
        .args(["--data", data, "carpools"])
        .output()
        .expect("run travel-log failed");
    assert!(output.status.success());
    assert_eq!(
        "c1 Kharghar -> Vashi (Mon-Fri 08:30): 1 seats left\n\
         c3 Panvel -> Airoli (Mon-Fri 07:45): 0 seats left\n",
        stdout(&output)
    );
}
