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

use capstone::prelude::*;

use crate::instr::{reversed_hex, Instruction};

/// In-process RISC-V disassembler, used when no external tool is configured.
pub struct Disassembler {
    cs: Capstone,
}

impl Disassembler {
    pub fn new() -> Result<Self, capstone::Error> {
        // RV64 with the compressed extension; RV32 code decodes the same for display
        let cs = Capstone::new()
            .riscv()
            .mode(arch::riscv::ArchMode::RiscV64)
            .extra_mode([arch::riscv::ArchExtraMode::RiscVC].iter().copied())
            .detail(false)
            .build()?;

        Ok(Self { cs })
    }

    /// Disassembles a block of memory.
    ///
    /// Capstone stops at the first encoding it cannot decode. We emit a
    /// byte-dump record for the next 2 bytes (the smallest RISC-V encoding)
    /// and resume after them, so the result always covers the whole block.
    pub fn disassemble_block(
        &self,
        code: &[u8],
        address: u64,
    ) -> Result<Vec<Instruction>, capstone::Error> {
        let mut results = Vec::new();
        let mut offset = 0usize;

        while offset < code.len() {
            let insns = self.cs.disasm_all(&code[offset..], address + offset as u64)?;
            for i in insns.iter() {
                results.push(Instruction::new(
                    i.address(),
                    reversed_hex(i.bytes()),
                    i.mnemonic().unwrap_or("").to_string(),
                    i.op_str().unwrap_or("").to_string(),
                ));
                offset += i.bytes().len();
            }
            if offset >= code.len() {
                break;
            }

            let end = (offset + 2).min(code.len());
            let raw = reversed_hex(&code[offset..end]);
            log::debug!(
                "capstone could not decode 0x{:x} ({}), emitting byte dump",
                address + offset as u64,
                raw
            );
            results.push(Instruction::unknown(address + offset as u64, raw));
            offset = end;
        }

        Ok(results)
    }
}
