#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(state: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cover-cli").unwrap();
    cmd.arg("--state").arg(state);
    cmd
}

const HEADER: &str = "day,p1,p2,p3,p4,p5,p6,p7,p8\n";
const EMPTY_DAYS: &str = "Tue,,,,,,,,\nWed,,,,,,,,\nThu,,,,,,,,\nFri,,,,,,,,\nSat,,,,,,,,\n";

#[test]
fn report_absence_end_to_end() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("school.json");

    for name in ["alice", "bob", "carol"] {
        cli(&state)
            .args(["add-teacher", "--username", name, "--password", "pw"])
            .assert()
            .success()
            .stdout(predicate::str::ends_with(format!(" {name}\n")));
    }

    let busy = dir.path().join("alice.csv");
    fs::write(&busy, format!("{HEADER}Mon,,,Math-9A,,,,,\n{EMPTY_DAYS}")).unwrap();
    let free = dir.path().join("free.csv");
    fs::write(&free, format!("{HEADER}Mon,,,,,,,,\n{EMPTY_DAYS}")).unwrap();

    cli(&state)
        .args(["set-timetable", "--teacher", "alice", "--csv"])
        .arg(&busy)
        .assert()
        .success();
    for name in ["bob", "carol"] {
        cli(&state)
            .args(["set-timetable", "--teacher", name, "--csv"])
            .arg(&free)
            .assert()
            .success();
    }

    let output = cli(&state)
        .args(["timetable", "--teacher", "alice"])
        .output()
        .unwrap();
    let rendered = String::from_utf8(output.stdout).unwrap();
    insta::assert_snapshot!(rendered.trim_end(), @r###"
Mon | - | - | Math-9A | - | - | - | - | -
Tue | - | - | - | - | - | - | - | -
Wed | - | - | - | - | - | - | - | -
Thu | - | - | - | - | - | - | - | -
Fri | - | - | - | - | - | - | - | -
Sat | - | - | - | - | - | - | - | -
"###);

    cli(&state)
        .args(["report-absence", "--teacher", "alice", "--day", "0", "--period", "2", "--class", "Math-9A"])
        .assert()
        .success()
        .stdout("assigned bob\n");

    // rejouée : même résultat, pas de second remplacement
    cli(&state)
        .args(["report-absence", "--teacher", "alice", "--day", "0", "--period", "2", "--class", "Math-9A"])
        .assert()
        .success()
        .stdout("assigned bob\n");

    cli(&state)
        .args(["report-absence", "--teacher", "alice", "--day", "0", "--period", "3", "--class", "Math-9A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot substitute a free period"));

    cli(&state)
        .args(["substitutions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| Mon P3 | Math-9A | bob").and(predicate::str::contains("carol").not()));

    cli(&state).arg("check").assert().success().stdout("OK: no conflicts\n");
}

#[test]
fn unfilled_absence_exits_with_warning_code() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("school.json");
    cli(&state)
        .args(["add-teacher", "--username", "solo", "--password", "pw"])
        .assert()
        .success();
    let csv = dir.path().join("solo.csv");
    fs::write(&csv, format!("{HEADER}Mon,Art-7C,,,,,,,\n{EMPTY_DAYS}")).unwrap();
    cli(&state)
        .args(["set-timetable", "--teacher", "solo", "--csv"])
        .arg(&csv)
        .assert()
        .success();

    cli(&state)
        .args(["report-absence", "--teacher", "solo", "--day", "0", "--period", "0", "--class", "Art-7C"])
        .assert()
        .code(2)
        .stdout("unfilled (no candidate available)\n");
}

#[test]
fn zero_max_attempts_is_rejected() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("school.json");

    cli(&state)
        .args(["--max-attempts", "0", "teachers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-attempts"));
    assert!(!state.exists());
}

#[test]
fn removed_teacher_id_is_not_reused() {
    let dir = tempdir().unwrap();
    let state = dir.path().join("school.json");

    for name in ["alice", "bob"] {
        cli(&state)
            .args(["add-teacher", "--username", name, "--password", "pw"])
            .assert()
            .success();
    }
    cli(&state)
        .args(["remove-teacher", "--teacher", "bob"])
        .assert()
        .success();
    cli(&state)
        .args(["add-teacher", "--username", "newbie", "--password", "pw"])
        .assert()
        .success()
        .stdout("T3 newbie\n");
}
