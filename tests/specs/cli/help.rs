//! Top-level CLI specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.mkw()
        .args(&["--help"])
        .passes()
        .stdout_has("validate")
        .stdout_has("check")
        .stdout_has("quorum");
}

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();

    temp.mkw()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn completions_generate_for_bash() {
    let temp = Project::empty();

    temp.mkw()
        .args(&["completions", "bash"])
        .passes()
        .stdout_has("mkw");
}
