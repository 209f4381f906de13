// Drive the wiregen binary end to end in a temp directory

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

const PROTOCOL: &str = r#"<Protocol name="Demo" prefix="Demo" endian="big">
  <Packet name="Burst" ID="9" array="4">
    <Data name="n" inMemoryType="unsigned16"/>
  </Packet>
</Protocol>
"#;

#[test]
fn successful_generation_exits_one() {
    let tmp = tempdir().expect("temp dir");
    let input = tmp.path().join("demo.xml");
    std::fs::write(&input, PROTOCOL).expect("write input");
    let out = tmp.path().join("gen");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    cmd.arg(&input).arg(&out).arg("-no-doxygen");

    // Historical convention: 1 on success, diagnostics on stdout
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("Burst: packets cannot be an array"));

    assert!(out.join("DemoProtocol.h").exists());
    assert!(out.join("DemoBurstPacket.h").exists());
    assert!(out.join("Demo.markdown").exists());
}

#[test]
fn usage_and_failures_exit_zero() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    cmd.assert().code(0).stdout(predicate::str::contains("Protocol generator usage:"));

    let tmp = tempdir().expect("temp dir");
    let mut missing = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    missing.arg(tmp.path().join("absent.xml"));
    missing.assert().code(0).stdout(predicate::str::contains("failed to open protocol file"));

    let mut no_input = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    no_input.arg("outputdir");
    no_input.assert().code(0).stdout(predicate::str::contains("must provide a protocol file."));
}

#[test]
fn flags_suppress_outputs() {
    let tmp = tempdir().expect("temp dir");
    let input = tmp.path().join("demo.xml");
    std::fs::write(&input, PROTOCOL).expect("write input");
    let out = tmp.path().join("gen");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    cmd.arg(&input).arg(&out).args(["-no-doxygen", "-no-markdown", "-no-helper-files"]);
    cmd.assert().code(1);

    assert!(out.join("DemoBurstPacket.c").exists());
    assert!(!out.join("Demo.markdown").exists());
    assert!(!out.join("fieldencode.h").exists());
}

#[test]
fn dump_model_writes_json() {
    let tmp = tempdir().expect("temp dir");
    let input = tmp.path().join("demo.xml");
    std::fs::write(&input, PROTOCOL).expect("write input");
    let model = tmp.path().join("model.json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wiregen"));
    cmd.arg("dump-model").arg(&input).arg(&model);
    cmd.assert().code(1);

    let json = std::fs::read_to_string(&model).expect("model should exist");
    assert!(json.contains("\"Burst\""));
}
