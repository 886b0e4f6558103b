// Copyright (c) 2026 MCU-Debug Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! We use an external spike-dasm compatible tool to get instruction text.
//! The tool reads lines of the form `DASM(<16 hex digits>)` on stdin and
//! writes one line of assembly per input line, in order, on stdout.
//!
//! One process is spawned per batch. There is no timeout; a tool that hangs
//! blocks the refresh that asked for it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::DecodeError;
use crate::scanner::TokenDecoder;

pub struct DasmTool {
    path: PathBuf,
}

impl DasmTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Build the request text for a batch of tokens.
pub fn format_request(tokens: &[u64]) -> String {
    tokens
        .iter()
        .map(|t| format!("DASM({:016x})", t))
        .collect::<Vec<_>>()
        .join("\n")
}

impl TokenDecoder for DasmTool {
    fn decode_tokens(&mut self, tokens: &[u64]) -> Result<Vec<String>, DecodeError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let spawn_err = |source| DecodeError::Spawn {
            path: self.path.clone(),
            source,
        };

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        // Feed stdin from a separate thread so a tool that starts answering
        // before it has read everything cannot fill the stdout pipe and stall.
        let mut request = format_request(tokens);
        request.push('\n');
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_err(std::io::Error::other("failed to capture tool stdin")))?;
        let writer = thread::spawn(move || stdin.write_all(request.as_bytes()));

        let output = child.wait_with_output().map_err(spawn_err)?;
        match writer.join() {
            Ok(Ok(())) => {}
            // The tool may exit without draining stdin; its exit status decides.
            Ok(Err(e)) => log::debug!("writing to {:?} failed: {}", self.path, e),
            Err(_) => log::warn!("stdin writer for {:?} panicked", self.path),
        }

        if !output.status.success() {
            return Err(DecodeError::ToolFailed {
                path: self.path.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<String> = stdout.trim().lines().map(str::to_string).collect();
        if lines.len() != tokens.len() {
            return Err(DecodeError::LineCountMismatch {
                expected: tokens.len(),
                got: lines.len(),
            });
        }
        log::debug!("{:?} decoded {} tokens", self.path, tokens.len());
        Ok(lines)
    }
}
