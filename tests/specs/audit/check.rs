//! `mkw check` specs

use crate::prelude::*;

#[test]
fn check_passes_for_disjoint_sections() {
    let temp = Project::empty();
    temp.file(
        "out/node-1.log",
        "100 -> Node: 1 => ENTER\n110 -> Node: 1 => EXIT\n",
    )
    .file(
        "out/node-2.log",
        "110 -> Node: 2 => ENTER\n130 -> Node: 2 => EXIT\n",
    );

    temp.mkw().args(&["check", "out"]).passes().stdout_eq(
        "\
checked 4 records from 2 log files
mutual exclusion preserved
",
    );
}

#[test]
fn check_fails_on_overlap() {
    let temp = Project::empty();
    temp.file(
        "out/node-1.log",
        "100 -> Node: 1 => ENTER\n120 -> Node: 1 => EXIT\n",
    )
    .file(
        "out/node-3.log",
        "110 -> Node: 3 => ENTER\n130 -> Node: 3 => EXIT\n",
    );

    temp.mkw()
        .args(&["check", "out"])
        .fails()
        .stdout_has("VIOLATION at 110: node 3 entered while 1 inside")
        .stdout_has("mutual exclusion VIOLATED")
        .stderr_has("1 mutual exclusion violation(s)");
}

#[test]
fn check_ignores_daemon_logs_and_noise() {
    let temp = Project::empty();
    temp.file(
        "out/node-1.log",
        "starting\n100 -> Node: 1 => ENTER\n110 -> Node: 1 => EXIT\n",
    )
    .file("out/mkwd-1.log", "105 -> Node: 2 => ENTER\n");

    temp.mkw()
        .args(&["check", "out"])
        .passes()
        .stdout_has("checked 2 records from 1 log files");
}

#[test]
fn check_warns_about_open_sections() {
    let temp = Project::empty();
    temp.file("node-4.log", "100 -> Node: 4 => ENTER\n");

    temp.mkw()
        .args(&["check"])
        .passes()
        .stdout_has("still inside at end of logs: 4");
}

#[test]
fn check_json_output() {
    let temp = Project::empty();
    temp.file("node-1.log", "5 -> Node: 1 => EXIT\n");

    let out = temp
        .mkw()
        .args(&["--output", "json", "check"])
        .passes()
        .stdout_json();

    assert_eq!(out["ok"], true);
    assert_eq!(out["entries"], 1);
    assert_eq!(out["unmatched_exits"][0]["node"], 1);
}

#[test]
fn check_requires_audit_logs() {
    let temp = Project::empty();
    std::fs::create_dir_all(temp.path().join("empty")).unwrap();

    temp.mkw()
        .args(&["check", "empty"])
        .fails()
        .stderr_has("no audit logs in empty");
}
