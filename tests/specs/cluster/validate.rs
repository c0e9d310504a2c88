//! `mkw validate` specs

use crate::prelude::*;

#[test]
fn validate_prints_legacy_cluster() {
    let temp = Project::empty();
    temp.file("config.txt", FIVE_NODE_LEGACY);

    temp.mkw().args(&["validate", "config.txt"]).passes().stdout_eq(
        "\
cluster config OK: 5 nodes
timing: mean inter-request delay 20ms, mean cs execution 10ms, 3 requests per node
node 1 127.0.0.1:7001 quorum {1, 2, 3}
node 2 127.0.0.1:7002 quorum {1, 2, 4}
node 3 127.0.0.1:7003 quorum {1, 3, 5}
node 4 127.0.0.1:7004 quorum {2, 4, 5}
node 5 127.0.0.1:7005 quorum {3, 4, 5}
",
    );
}

#[test]
fn validate_reads_toml_by_extension() {
    let temp = Project::empty();
    temp.file("cluster.toml", TWO_NODE_TOML);

    temp.mkw()
        .args(&["validate", "cluster.toml"])
        .passes()
        .stdout_has("cluster config OK: 2 nodes")
        .stdout_has("node 2 127.0.0.1:7002 quorum {1, 2}");
}

#[test]
fn validate_json_output() {
    let temp = Project::empty();
    temp.file("cluster.toml", TWO_NODE_TOML);

    let out = temp
        .mkw()
        .args(&["--output", "json", "validate", "cluster.toml"])
        .passes()
        .stdout_json();

    assert_eq!(out["valid"], true);
    assert_eq!(out["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(out["timing"]["requests_per_node"], 3);
}

#[test]
fn validate_rejects_disjoint_quorums() {
    let temp = Project::empty();
    temp.file(
        "split.toml",
        &TWO_NODE_TOML
            .replace("quorum = [1, 2]", "quorum = [1]")
            .replace("quorum = [2, 1]", "quorum = [2]"),
    );

    temp.mkw()
        .args(&["validate", "split.toml"])
        .fails()
        .stderr_has("error: invalid cluster config split.toml")
        .stderr_has("quorums of nodes 1 and 2 do not intersect")
        .stderr_has("Add a node shared by the quorums of 1 and 2");
}

#[test]
fn validate_rejects_unknown_quorum_member() {
    let temp = Project::empty();
    temp.file(
        "cluster.toml",
        &TWO_NODE_TOML.replace("quorum = [1, 2]", "quorum = [1, 2, 9]"),
    );

    temp.mkw()
        .args(&["validate", "cluster.toml"])
        .fails()
        .stderr_has("quorum of node 1 names unknown node 9");
}

#[test]
fn validate_reports_missing_file() {
    let temp = Project::empty();

    temp.mkw()
        .args(&["validate", "absent.toml"])
        .fails()
        .stderr_has("failed to read absent.toml");
}

#[test]
fn validate_reports_truncated_legacy_file() {
    let temp = Project::empty();
    temp.file("config.txt", "3 20 10 5\n1 localhost 7001\n");

    temp.mkw()
        .args(&["validate", "config.txt"])
        .fails()
        .stderr_has("expected 3 node lines, found 1");
}
