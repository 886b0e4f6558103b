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

use crate::cache::DecodeCache;
use crate::error::DecodeError;
use crate::instr::Instruction;
use crate::memory::MemorySource;

/// Find up to `height` instructions around `last_pc`, with `last_pc` near the
/// middle.
///
/// Only the block holding `last_pc` is decoded, plus at most one neighbour
/// when `last_pc` sits within `height` bytes of a block edge. A neighbour that
/// would start at or before `base_addr` is never read.
pub fn assemble_window(
    cache: &mut DecodeCache,
    memory: &dyn MemorySource,
    last_pc: u64,
    height: usize,
    base_addr: u64,
) -> Result<Vec<Instruction>, DecodeError> {
    let block_size = cache.block_size();
    let aligned = cache.align(last_pc);
    let offset = last_pc - aligned;
    let primary = cache.get_or_decode(aligned, memory)?;

    let h = height as u64;
    let neighbour = if offset < h {
        aligned.checked_sub(block_size)
    } else if block_size - offset < h {
        aligned.checked_add(block_size)
    } else {
        None
    };

    let mut sequence: Vec<Instruction> = Vec::new();
    match neighbour {
        Some(ext) if ext > base_addr => {
            let ext_block = cache.get_or_decode(ext, memory)?;
            log::debug!("window at 0x{:x} extends into block 0x{:x}", last_pc, ext);
            if ext < aligned {
                sequence.extend(ext_block.instructions.iter().cloned());
                sequence.extend(primary.instructions.iter().cloned());
            } else {
                sequence.extend(primary.instructions.iter().cloned());
                sequence.extend(ext_block.instructions.iter().cloned());
            }
        }
        _ => sequence.extend(primary.instructions.iter().cloned()),
    }

    // Left-most instruction at or after last_pc
    let center = sequence.partition_point(|i| i.address < last_pc);
    let start = center.saturating_sub(height / 2);
    let end = start.saturating_add(height).min(sequence.len());
    if start >= end {
        return Ok(Vec::new());
    }
    Ok(sequence.drain(start..end).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::{counting_cache, nop_image};

    const BASE: u64 = 0x8000_0000;

    fn addrs(w: &[Instruction]) -> Vec<u64> {
        w.iter().map(|i| i.address).collect()
    }

    #[test]
    fn centred_window_in_middle_of_block() {
        let mem = nop_image(BASE, 4096);
        let (mut cache, calls, _) = counting_cache(256);
        let pc = BASE + 0x480;
        let w = assemble_window(&mut cache, &mem, pc, 10, BASE).unwrap();
        assert_eq!(w.len(), 10);
        assert_eq!(w[5].address, pc);
        assert!(addrs(&w).windows(2).all(|p| p[0] < p[1]));
        // not near an edge: only the primary block was decoded
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn near_start_of_block_pulls_previous_block() {
        let mem = nop_image(BASE, 4096);
        let (mut cache, calls, _) = counting_cache(256);
        let pc = BASE + 0x404;
        let w = assemble_window(&mut cache, &mem, pc, 20, BASE).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(cache.contains(BASE + 0x300));
        assert_eq!(w.len(), 20);
        assert_eq!(w[10].address, pc);
        assert_eq!(w[0].address, BASE + 0x3f0);
    }

    #[test]
    fn near_end_of_block_pulls_next_block() {
        let mem = nop_image(BASE, 4096);
        let (mut cache, calls, _) = counting_cache(256);
        let pc = BASE + 0x4fc;
        let w = assemble_window(&mut cache, &mem, pc, 20, BASE).unwrap();
        assert_eq!(calls.get(), 2);
        assert!(cache.contains(BASE + 0x500));
        assert_eq!(w.len(), 20);
        assert_eq!(w[10].address, pc);
        assert_eq!(w.last().map(|i| i.address), Some(BASE + 0x50e));
    }

    #[test]
    fn never_reads_before_base() {
        let mem = nop_image(BASE, 4096);
        let (mut cache, calls, _) = counting_cache(256);
        let w = assemble_window(&mut cache, &mem, BASE, 8, BASE).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(!cache.contains(BASE - 256));
        assert_eq!(addrs(&w)[0], BASE);
        assert_eq!(w.len(), 8);
    }

    #[test]
    fn block_just_after_base_is_not_extended_backwards_to_base() {
        // The neighbour must start strictly above base_addr.
        let mem = nop_image(BASE, 4096);
        let (mut cache, _, _) = counting_cache(256);
        assemble_window(&mut cache, &mem, BASE + 0x102, 16, BASE).unwrap();
        assert!(!cache.contains(BASE));
    }

    #[test]
    fn short_data_returns_fewer_lines() {
        let mem = nop_image(BASE, 16);
        let (mut cache, _, _) = counting_cache(256);
        let w = assemble_window(&mut cache, &mem, BASE + 14, 10, BASE).unwrap();
        // 8 instructions exist; centre index 7, start 2
        assert_eq!(addrs(&w), vec![BASE + 4, BASE + 6, BASE + 8, BASE + 10, BASE + 12, BASE + 14]);
    }

    #[test]
    fn repeated_refreshes_hit_the_cache() {
        let mem = nop_image(BASE, 4096);
        let (mut cache, calls, _) = counting_cache(256);
        for _ in 0..3 {
            assemble_window(&mut cache, &mem, BASE + 0x404, 20, BASE).unwrap();
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_height_is_empty() {
        let mem = nop_image(BASE, 512);
        let (mut cache, _, _) = counting_cache(256);
        assert!(assemble_window(&mut cache, &mem, BASE + 0x80, 0, BASE)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn pc_past_decoded_data_clamps_to_tail() {
        let mem = nop_image(BASE, 8);
        let (mut cache, _, _) = counting_cache(256);
        let w = assemble_window(&mut cache, &mem, BASE + 0x80, 4, BASE).unwrap();
        // centre index = len (4); start = 2
        assert_eq!(addrs(&w), vec![BASE + 4, BASE + 6]);
    }
}
