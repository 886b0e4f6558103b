#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable shell script into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

/// A spike-dasm stand-in. Every invocation appends a line to `count_file`.
pub fn fake_dasm(dir: &Path, count_file: &Path) -> PathBuf {
    let body = format!(
        r#"echo call >> "{}"
while IFS= read -r line; do
  case "$line" in
    "DASM(0000000000000013)") echo "nop" ;;
    "DASM(0000000000000001)") echo "c.nop" ;;
    "DASM(00000000ff010113)") echo "addi    sp, sp, -16" ;;
    *) echo "unknown" ;;
  esac
done
"#,
        count_file.display()
    );
    write_script(dir, "fake-dasm", &body)
}

pub fn call_count(count_file: &Path) -> usize {
    fs::read_to_string(count_file)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

/// `count` copies of the 32-bit `nop` encoding.
pub fn nop32_image(count: usize) -> Vec<u8> {
    [0x13, 0x00, 0x00, 0x00].repeat(count)
}
