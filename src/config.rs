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

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cache::{check_block_size, DEFAULT_BLOCK_SIZE};
use crate::capstone::Disassembler;
use crate::dasm_tool::DasmTool;
use crate::error::ConfigError;
use crate::scanner::{check_batch_size, Backend, DEFAULT_BATCH_SIZE};
use crate::utils::find_executable_in_dirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External tool if one can be found, capstone otherwise
    Auto,
    /// External spike-dasm compatible tool only
    Tool,
    /// Built-in capstone disassembler
    Capstone,
    /// No disassembler; every block shows an error line
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Bytes per cached block; blocks are aligned to this size.
    pub block_size: u64,
    /// Tokens per external tool invocation.
    pub batch_size: usize,
    pub backend: BackendKind,
    /// Tool name or path.
    pub dasm_tool: String,
    /// Searched before PATH when `dasm_tool` is a bare name.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            backend: BackendKind::Auto,
            dasm_tool: "spike-dasm".to_string(),
            search_dirs: vec![PathBuf::from("./ready-to-run")],
        }
    }
}

impl ViewerConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ViewerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_block_size(self.block_size)?;
        check_batch_size(self.batch_size)
    }

    /// Pick the decoding backend. Falling back never fails: the worst case is
    /// [`Backend::Unavailable`], which renders an inline error.
    pub fn build_backend(&self) -> Backend {
        let tool = || find_executable_in_dirs(&self.dasm_tool, self.search_dirs.as_slice());
        let library = || match Disassembler::new() {
            Ok(dis) => Backend::Library(dis),
            Err(e) => {
                log::warn!("capstone unavailable: {}", e);
                Backend::Unavailable
            }
        };

        match self.backend {
            BackendKind::None => Backend::Unavailable,
            BackendKind::Capstone => library(),
            BackendKind::Tool => match tool() {
                Some(path) => {
                    log::info!("Using {} for disassembly", path.display());
                    Backend::Tokens(Box::new(DasmTool::new(path)))
                }
                None => {
                    log::warn!("{} not found, disassembly unavailable", self.dasm_tool);
                    Backend::Unavailable
                }
            },
            BackendKind::Auto => match tool() {
                Some(path) => {
                    log::info!("Using {} for disassembly", path.display());
                    Backend::Tokens(Box::new(DasmTool::new(path)))
                }
                None => {
                    log::info!(
                        "{} not found, using capstone; some instructions may not decode",
                        self.dasm_tool
                    );
                    library()
                }
            },
        }
    }
}
