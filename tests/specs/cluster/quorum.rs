//! `mkw quorum` specs

use crate::prelude::*;

#[test]
fn quorum_shows_members_and_coordinated_nodes() {
    let temp = Project::empty();
    temp.file("config.txt", FIVE_NODE_LEGACY);

    temp.mkw().args(&["quorum", "config.txt", "4"]).passes().stdout_eq(
        "\
node 4 (127.0.0.1:7004)
quorum: 2, 4, 5
coordinates for: 2, 4, 5
",
    );
}

#[test]
fn quorum_json_output() {
    let temp = Project::empty();
    temp.file("config.txt", FIVE_NODE_LEGACY);

    let out = temp
        .mkw()
        .args(&["--output", "json", "quorum", "config.txt", "1"])
        .passes()
        .stdout_json();

    assert_eq!(out["quorum"], serde_json::json!([1, 2, 3]));
    assert_eq!(out["coordinates_for"], serde_json::json!([1, 2, 3]));
}

#[test]
fn quorum_rejects_unknown_node() {
    let temp = Project::empty();
    temp.file("config.txt", FIVE_NODE_LEGACY);

    temp.mkw()
        .args(&["quorum", "config.txt", "8"])
        .fails()
        .stderr_has("node 8 is not in the cluster")
        .stderr_has("Declared nodes: 1, 2, 3, 4, 5");
}
