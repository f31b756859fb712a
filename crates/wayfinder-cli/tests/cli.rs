use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("wayfinder").unwrap();
        cmd.arg("--data-dir")
            .arg(self.dir.path().join("data"))
            .env("WAYFINDER_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("RUST_LOG")
            .env_remove("WAYFINDER_DATA_DIR");
        cmd
    }

    fn add_node(&self, code: &str, name: &str, floor: &str) {
        self.cmd()
            .args(["node", "add", code, "--name", name, "--building", "Main"])
            .args(["--floor", floor])
            .assert()
            .success();
    }

    fn add_edge(&self, from: &str, to: &str, distance: &str, angle: &str, stairs: bool) -> String {
        let mut cmd = self.cmd();
        cmd.args(["--format", "json", "edge", "add", from, to])
            .args(["--distance", distance, "--angle", angle]);
        if stairs {
            cmd.arg("--stairs");
        }
        let output = cmd.assert().success().get_output().stdout.clone();
        let record: serde_json::Value = serde_json::from_slice(&output).unwrap();
        record["edge_id"].as_str().unwrap().to_string()
    }

    /// A(f0) --10 @90--> B(f0) --5 @0 stairs--> C(f1)
    fn campus(&self) -> String {
        self.add_node("A", "Atrium", "0");
        self.add_node("B", "Bridge", "0");
        self.add_node("C", "Chapel", "1");
        self.add_edge("A", "B", "10", "90", false);
        self.add_edge("B", "C", "5", "0", true)
    }
}

#[test]
fn test_route_table() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["route", "A", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 15m over 3 nodes"))
        .stdout(predicate::str::contains("E (90°)"));
}

#[test]
fn test_route_directions() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["route", "A", "C", "--directions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start at Atrium (Main, Floor 0)"))
        .stdout(predicate::str::contains("Go East (90°) for 10m to Bridge"))
        .stdout(predicate::str::contains("Go North (0°) for 5m via stairs to Chapel"));
}

#[test]
fn test_route_reverse_json() {
    let ws = Workspace::new();
    ws.campus();

    let output = ws
        .cmd()
        .args(["--format", "json", "route", "C", "A"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let path: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(path["total_distance"], 15.0);
    assert_eq!(path["num_nodes"], 3);
    assert_eq!(path["steps"][1]["compass_angle"], 180.0);
    assert_eq!(path["steps"][2]["compass_angle"], 270.0);
    assert!(path["steps"][0]["compass_angle"].is_null());
}

#[test]
fn test_route_avoid_stairs() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["route", "A", "C", "--avoid-stairs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No route from A to C without stairs"));
}

#[test]
fn test_route_unknown_node_suggests() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["route", "Atrum", "C"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Node 'Atrum' not found"))
        .stderr(predicate::str::contains("Did you mean: A"));
}

#[test]
fn test_disabled_edge_blocks_route() {
    let ws = Workspace::new();
    let stairs = ws.campus();

    ws.cmd().args(["edge", "disable", &stairs]).assert().success();
    ws.cmd()
        .args(["route", "A", "C"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No route from A to C"));

    ws.cmd().args(["edge", "enable", &stairs]).assert().success();
    ws.cmd().args(["route", "A", "C"]).assert().success();
}

#[test]
fn test_node_delete_cascades() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["node", "delete", "B", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 edges removed"));

    ws.cmd()
        .args(["edge", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No edges found"));
}

#[test]
fn test_duplicate_node_code_rejected() {
    let ws = Workspace::new();
    ws.add_node("A", "Atrium", "0");

    ws.cmd()
        .args(["node", "add", "A", "--name", "Again", "--building", "Main", "--floor", "0"])
        .assert()
        .failure();
}

#[test]
fn test_negative_floor_and_search() {
    let ws = Workspace::new();
    ws.add_node("B1-PLANT", "Plant Room", "-1");
    ws.add_node("L2-LIB", "Library", "2");

    ws.cmd()
        .args(["node", "search", "plant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("B1-PLANT"))
        .stdout(predicate::str::contains("L2-LIB").not());

    ws.cmd()
        .args(["node", "list", "--floor", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plant Room"));
}

#[test]
fn test_edge_validation() {
    let ws = Workspace::new();
    ws.add_node("A", "Atrium", "0");
    ws.add_node("B", "Bridge", "0");

    ws.cmd()
        .args(["edge", "add", "A", "B", "--distance", "5", "--angle", "400"])
        .assert()
        .failure();
    ws.cmd()
        .args(["edge", "add", "A", "A", "--distance", "5", "--angle", "0"])
        .assert()
        .failure();
}

#[test]
fn test_export_import_roundtrip() {
    let source = Workspace::new();
    source.campus();
    let file = source.dir.path().join("graph.json");

    source
        .cmd()
        .args(["export", "-o"])
        .arg(&file)
        .assert()
        .success();

    let target = Workspace::new();
    target.cmd().arg("import").arg(&file).assert().success();
    target
        .cmd()
        .args(["route", "A", "C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 15m over 3 nodes"));

    // A second import needs --merge
    target.cmd().arg("import").arg(&file).assert().failure();
    target
        .cmd()
        .arg("import")
        .arg(&file)
        .arg("--merge")
        .assert()
        .success();
}

#[test]
fn test_config_set_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "avoid_stairs", "true"])
        .assert()
        .success();
    ws.cmd()
        .args(["config", "get", "avoid_stairs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
    ws.cmd()
        .args(["config", "set", "meters_per_floor", "-3"])
        .assert()
        .failure();
}

#[test]
fn test_config_avoid_stairs_applies() {
    let ws = Workspace::new();
    ws.campus();

    ws.cmd()
        .args(["config", "set", "avoid_stairs", "true"])
        .assert()
        .success();
    ws.cmd().args(["route", "A", "C"]).assert().failure();
}

#[test]
fn test_completions() {
    Command::cargo_bin("wayfinder")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wayfinder"));
}
