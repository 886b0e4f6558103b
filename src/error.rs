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

use std::path::PathBuf;
use std::process::ExitStatus;

/// Failures while turning instruction bytes into text. Any of these aborts
/// the current refresh; nothing is written to the decode cache.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to run disassembler {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("disassembler {path:?} exited with {status}: {stderr}")]
    ToolFailed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    #[error("disassembler returned {got} lines for {expected} instructions")]
    LineCountMismatch { expected: usize, got: usize },
    #[error("capstone: {0}")]
    Capstone(#[from] capstone::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
