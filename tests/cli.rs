#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::{fake_dasm, nop32_image};
use std::fs;
use tempfile::tempdir;

#[test]
#[allow(deprecated)]
fn replays_trace_as_json_frames() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let image = dir.path().join("prog.bin");
    fs::write(&image, nop32_image(512))?;
    let trace = dir.path().join("commits.jsonl");
    fs::write(
        &trace,
        concat!(
            "[{\"address\": \"0x0\", \"valid\": false}, {\"address\": \"0x0\", \"valid\": false}]\n",
            "[{\"address\": \"0x80000100\", \"valid\": true}, {\"address\": \"0x800000fc\", \"valid\": true}]\n",
            "[{\"address\": \"0x80000108\", \"valid\": true}, {\"address\": \"0x80000104\", \"valid\": true}]\n",
        ),
    )?;
    let tool = fake_dasm(dir.path(), &dir.path().join("calls"));

    let output = Command::cargo_bin("disasm-view")?
        .arg("--image")
        .arg(&image)
        .arg("--trace")
        .arg(&trace)
        .arg("--height")
        .arg("6")
        .arg("--backend")
        .arg("tool")
        .arg("--dasm")
        .arg(&tool)
        .arg("--json")
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout)?;
    let frames: Vec<serde_json::Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["pc"], "0x80000000");
    assert_eq!(frames[1]["pc"], "0x80000100");
    assert_eq!(frames[2]["pc"], "0x80000108");

    let lines = frames[2]["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 6);
    // centre is index 2: the window cannot start before the block
    assert_eq!(lines[0][1], " |0x80000100: 00000013  nop  ");
    assert_eq!(lines[1][1], ">|0x80000104: 00000013  nop  ");
    assert_eq!(lines[2][0], "highlight");
    assert_eq!(lines[2][1], ">|0x80000108: 00000013  nop  ");
    assert_eq!(lines[3][0], "default");
    Ok(())
}

#[test]
#[allow(deprecated)]
fn text_output_without_trace() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let image = dir.path().join("prog.bin");
    fs::write(&image, nop32_image(64))?;

    let mut cmd = Command::cargo_bin("disasm-view")?;
    cmd.arg("-i")
        .arg(&image)
        .arg("--base")
        .arg("0x1000")
        .arg("--height")
        .arg("3")
        .arg("--backend")
        .arg("capstone");
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Commit PC: no commit ports"));
    assert!(stdout.contains(" |0x1000: 00000013"));
    assert!(stdout.contains(" |0x1008: 00000013"));
    assert!(!stdout.contains("0x100c"));
    Ok(())
}

#[test]
#[allow(deprecated)]
fn rejects_bad_block_size() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let image = dir.path().join("prog.bin");
    fs::write(&image, nop32_image(4))?;

    Command::cargo_bin("disasm-view")?
        .arg("-i")
        .arg(&image)
        .arg("--block-size")
        .arg("7")
        .assert()
        .failure();
    Ok(())
}
