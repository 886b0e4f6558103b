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

//! The disassembly view as a whole: follows the commit stream and produces
//! one frame of display lines per refresh.
//!
//! A viewer owns its decode cache and commit history. Two viewers never share
//! either, and a viewer is meant to be driven from one thread.

use serde::Serialize;

use crate::cache::DecodeCache;
use crate::config::ViewerConfig;
use crate::error::{ConfigError, DecodeError};
use crate::memory::MemorySource;
use crate::render::{render, Line};
use crate::scanner::{Backend, InstructionScanner};
use crate::tracker::{valid_pcs, CommitSlot, PcTracker};
use crate::window::assemble_window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub last_pc: u64,
    pub lines: Vec<Line>,
}

pub struct DisasmViewer {
    base_addr: u64,
    cache: DecodeCache,
    tracker: PcTracker,
}

impl DisasmViewer {
    /// `base_addr` is the first mapped instruction address; nothing below it
    /// is ever read.
    pub fn new(config: &ViewerConfig, base_addr: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let backend = config.build_backend();
        Self::with_backend(config, base_addr, backend)
    }

    pub fn with_backend(
        config: &ViewerConfig,
        base_addr: u64,
        backend: Backend,
    ) -> Result<Self, ConfigError> {
        log::debug!(
            "viewer at 0x{:x}: block size {}, backend {}",
            base_addr,
            config.block_size,
            backend.name()
        );
        let scanner = InstructionScanner::new(backend, config.batch_size)?;
        Ok(Self {
            base_addr,
            cache: DecodeCache::new(config.block_size, scanner)?,
            tracker: PcTracker::new(),
        })
    }

    pub fn base_addr(&self) -> u64 {
        self.base_addr
    }

    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    pub fn tracker(&self) -> &PcTracker {
        &self.tracker
    }

    /// Produce the lines for one refresh.
    ///
    /// The commit snapshot is recorded before anything is decoded, so a
    /// decode failure only loses this frame; the next refresh starts clean.
    pub fn refresh(
        &mut self,
        memory: &dyn MemorySource,
        snapshot: &[CommitSlot],
        viewport: Viewport,
    ) -> Result<Frame, DecodeError> {
        let valid = valid_pcs(snapshot);
        let last_pc = self.tracker.compute_last_pc(snapshot, self.base_addr);
        let window = assemble_window(
            &mut self.cache,
            memory,
            last_pc,
            viewport.height as usize,
            self.base_addr,
        )?;
        Ok(Frame {
            last_pc,
            lines: render(&window, &valid, last_pc),
        })
    }

    /// Drop cached decodes for `[start, end)` after memory there changed.
    pub fn invalidate_range(&mut self, start: u64, end: u64) -> usize {
        self.cache.invalidate_range(start, end)
    }
}
