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

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{ConfigError, DecodeError};
use crate::instr::Instruction;
use crate::memory::MemorySource;
use crate::scanner::InstructionScanner;

pub const DEFAULT_BLOCK_SIZE: u64 = 256;

/// A block size must be a nonzero, even byte count that fits one memory
/// read. Returns it as the read length.
pub fn check_block_size(block_size: u64) -> Result<u32, ConfigError> {
    if block_size == 0 || block_size % 2 != 0 {
        return Err(ConfigError::Invalid(format!(
            "block_size must be a nonzero multiple of 2, got {}",
            block_size
        )));
    }
    u32::try_from(block_size)
        .map_err(|_| ConfigError::Invalid(format!("block_size {} is too large", block_size)))
}

/// Decoded instructions for `[address, address + block_size)`. The last
/// instruction may run past the nominal end of the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub address: u64,
    pub instructions: Vec<Instruction>,
}

/// Memoizes scanner output per aligned block. Entries are written once and
/// never evicted; instruction memory is assumed not to change during a run
/// unless the owner calls [`DecodeCache::invalidate_range`].
pub struct DecodeCache {
    block_size: u64,
    read_len: u32,
    // Key is the aligned block address
    blocks: BTreeMap<u64, Rc<Block>>,
    scanner: InstructionScanner,
}

impl DecodeCache {
    pub fn new(block_size: u64, scanner: InstructionScanner) -> Result<Self, ConfigError> {
        let read_len = check_block_size(block_size)?;
        Ok(Self {
            block_size,
            read_len,
            blocks: BTreeMap::new(),
            scanner,
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn align(&self, addr: u64) -> u64 {
        addr - addr % self.block_size
    }

    pub fn scanner(&self) -> &InstructionScanner {
        &self.scanner
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, aligned_addr: u64) -> bool {
        self.blocks.contains_key(&aligned_addr)
    }

    /// Return the block at `aligned_addr`, decoding it on first use.
    /// A failed decode leaves the cache untouched.
    pub fn get_or_decode(
        &mut self,
        aligned_addr: u64,
        memory: &dyn MemorySource,
    ) -> Result<Rc<Block>, DecodeError> {
        if let Some(block) = self.blocks.get(&aligned_addr) {
            return Ok(block.clone());
        }

        let bytes = memory.read_bytes(aligned_addr, self.read_len);
        let instructions = self.scanner.scan(&bytes, aligned_addr)?;
        log::debug!(
            "decoded block 0x{:x}: {} bytes, {} instructions",
            aligned_addr,
            bytes.len(),
            instructions.len()
        );

        let block = Rc::new(Block {
            address: aligned_addr,
            instructions,
        });
        self.blocks.insert(aligned_addr, block.clone());
        Ok(block)
    }

    /// Forget every block whose range intersects `[start, end)`, e.g. after
    /// the program patched its own code. Returns how many were dropped.
    pub fn invalidate_range(&mut self, start: u64, end: u64) -> usize {
        if start >= end {
            return 0;
        }
        let first = self.align(start);
        let stale: Vec<u64> = self.blocks.range(first..end).map(|(&a, _)| a).collect();
        for addr in &stale {
            self.blocks.remove(addr);
        }
        if !stale.is_empty() {
            log::debug!(
                "invalidated {} blocks in 0x{:x}..0x{:x}",
                stale.len(),
                start,
                end
            );
        }
        stale.len()
    }
}
