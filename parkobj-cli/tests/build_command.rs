#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

/// Fake `gxc`: the container is a copy of the image manifest, one entry per image.
const FAKE_GXC: &str = r#"case "$1" in
  build) cp "$3" "$2" ;;
  details) echo "numEntries: $(grep -c '"path"' "$2")" ;;
esac
"#;

/// Fake `zip`: the archive is the list of archived paths.
const FAKE_ZIP: &str = r#"[ "$1" = "-r" ] && shift
out="$1"; shift
for p in "$@"; do echo "$p"; done > "$out"
"#;

fn setup() -> TempDir {
    let base = TempDir::new().expect("base");
    let tools = base.path().join("tools");
    fs::create_dir_all(&tools).expect("tools");
    fs::write(tools.join("gxc.sh"), FAKE_GXC).expect("gxc");
    fs::write(tools.join("zip.sh"), FAKE_ZIP).expect("zip");

    let foo = base.path().join("objects/foo");
    fs::create_dir_all(foo.join("images")).expect("foo");
    fs::write(foo.join("images/a.png"), "png").expect("image");
    let manifest = r#"{
        "id": "foo",
        "images": [{ "path": "images/a.png" }, { "path": "images/a.png", "x": 1 }]
    }"#;
    fs::write(foo.join("object.1.json"), manifest).expect("foo manifest");

    let bar = base.path().join("objects/bar");
    fs::create_dir_all(&bar).expect("bar");
    fs::write(bar.join("object.1.json"), r#"{ "id": "bar", "images": [] }"#).expect("bar manifest");
    base
}

fn parkobj_cmd(base: &Path) -> Command {
    let tools = base.join("tools");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("parkobj"));
    cmd.current_dir(base)
        .env("PARKOBJ_COMPILER", format!("sh {}", tools.join("gxc.sh").display()))
        .env("PARKOBJ_ARCHIVER", format!("sh {}", tools.join("zip.sh").display()))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn build_produces_parkobj_and_objects_zip() {
    let base = setup();

    parkobj_cmd(base.path())
        .assert()
        .success()
        .stdout(contains("Reprocessing foo"))
        .stdout(contains("Creating foo.parkobj"))
        .stdout(contains("Creating objects.zip"))
        .stdout(contains("2 objects (1 compiled, 1 packaged as .parkobj)"));

    let artifacts = base.path().join("artifacts");
    let parkobj = fs::read_to_string(artifacts.join("foo.parkobj")).expect("foo.parkobj");
    assert_eq!(parkobj, "images.dat\nobject.1.json\nobject.json\n");
    assert_eq!(fs::read_to_string(artifacts.join("objects.zip")).unwrap(), "bar\n");
    assert!(!artifacts.join("foo").exists());
    assert!(!artifacts.join("bar").exists());
}

#[test]
fn parallel_flag_builds_the_same_outputs() {
    let base = setup();

    parkobj_cmd(base.path()).arg("--parallel").assert().success();

    let artifacts = base.path().join("artifacts");
    assert!(artifacts.join("foo.parkobj").is_file());
    assert!(artifacts.join("objects.zip").is_file());
}

#[test]
fn verbose_flag_logs_tool_launches() {
    let base = setup();

    parkobj_cmd(base.path())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(contains("Launching \"sh"))
        .stdout(contains("build images.dat images.json"))
        .stdout(contains("Deleting"));
}

#[test]
fn quiet_run_does_not_log_launches() {
    let base = setup();

    parkobj_cmd(base.path())
        .assert()
        .success()
        .stdout(contains("Launching").not());
}

#[test]
fn missing_compiler_exits_with_code_one() {
    let base = setup();

    parkobj_cmd(base.path())
        .env("PARKOBJ_COMPILER", base.path().join("no-such-gxc"))
        .assert()
        .code(1)
        .stdout(contains("no-such-gxc was not found"));

    let artifacts = base.path().join("artifacts");
    assert!(!artifacts.join("foo.parkobj").exists());
    assert!(!artifacts.join("objects.zip").exists());
}

#[test]
fn missing_objects_directory_exits_with_code_one() {
    let base = TempDir::new().expect("base");

    let assert = parkobj_cmd(base.path()).assert().code(1);

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(stdout.contains("objects"), "stdout: {stdout}");
    assert_eq!(stdout.matches("os error 2").count(), 1, "stdout: {stdout}");
}

#[test]
fn help_lists_both_flags() {
    let base = TempDir::new().expect("base");

    parkobj_cmd(base.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--parallel"))
        .stdout(contains("--verbose"));
}
