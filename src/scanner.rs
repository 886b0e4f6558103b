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

//! Splits raw memory into RISC-V instruction tokens and turns them into
//! [`Instruction`] records through one of the decoding backends.
//!
//! RISC-V instructions are either 16 bits (compressed) or 32 bits wide. The
//! low two bits of the first halfword tell them apart: `0b11` means the
//! halfword is the first half of a 32-bit instruction.

use regex::Regex;

use crate::capstone::Disassembler;
use crate::error::{ConfigError, DecodeError};
use crate::instr::{reversed_hex, Instruction};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

pub fn check_batch_size(batch_size: usize) -> Result<(), ConfigError> {
    if batch_size == 0 {
        return Err(ConfigError::Invalid("batch_size must be nonzero".to_string()));
    }
    Ok(())
}

/// A fixed-width instruction encoding before it is turned into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub address: u64,
    pub value: u64,
    pub raw_hex: String,
}

impl Token {
    fn from_bytes(address: u64, bytes: &[u8]) -> Self {
        let value = bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        Self {
            address,
            value,
            raw_hex: reversed_hex(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.raw_hex.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.raw_hex.is_empty()
    }
}

enum ScanState {
    Idle,
    AwaitingSecondHalf { first: [u8; 2], address: u64 },
}

/// Segment `bytes` into 16/32-bit tokens. A dangling first half or an odd
/// trailing byte is dropped.
pub fn segment_tokens(bytes: &[u8], base_address: u64) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(bytes.len() / 2);
    let mut state = ScanState::Idle;

    for (i, chunk) in bytes.chunks_exact(2).enumerate() {
        let address = base_address + (i as u64) * 2;
        state = match state {
            ScanState::AwaitingSecondHalf {
                first,
                address: start,
            } => {
                let full = [first[0], first[1], chunk[0], chunk[1]];
                tokens.push(Token::from_bytes(start, &full));
                ScanState::Idle
            }
            ScanState::Idle if chunk[0] & 0b11 == 0b11 => ScanState::AwaitingSecondHalf {
                first: [chunk[0], chunk[1]],
                address,
            },
            ScanState::Idle => {
                tokens.push(Token::from_bytes(address, chunk));
                ScanState::Idle
            }
        };
    }

    tokens
}

/// Batch decoder speaking the token protocol: one output line per token,
/// in request order.
pub trait TokenDecoder {
    fn decode_tokens(&mut self, tokens: &[u64]) -> Result<Vec<String>, DecodeError>;
}

pub enum Backend {
    Tokens(Box<dyn TokenDecoder>),
    Library(Disassembler),
    Unavailable,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Tokens(_) => "external tool",
            Backend::Library(_) => "capstone",
            Backend::Unavailable => "none",
        }
    }
}

pub struct InstructionScanner {
    backend: Backend,
    batch_size: usize,
    line_re: Regex,
}

impl InstructionScanner {
    pub fn new(backend: Backend, batch_size: usize) -> Result<Self, ConfigError> {
        check_batch_size(batch_size)?;
        Ok(Self {
            backend,
            batch_size,
            line_re: Regex::new(r"^\s*(\S+)\s*(.*?)\s*$").expect("static regex"),
        })
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Decode every instruction in `bytes`, which starts at `base_address`.
    ///
    /// A failing batch aborts the whole scan; callers never see a partial
    /// block.
    pub fn scan(
        &mut self,
        bytes: &[u8],
        base_address: u64,
    ) -> Result<Vec<Instruction>, DecodeError> {
        let line_re = &self.line_re;
        let batch_size = self.batch_size;
        match &mut self.backend {
            Backend::Unavailable => Ok(vec![Instruction::new(
                base_address,
                String::new(),
                "<error: no disassembler backend available>".to_string(),
                String::new(),
            )]),
            Backend::Library(dis) => Ok(dis.disassemble_block(bytes, base_address)?),
            Backend::Tokens(decoder) => {
                let tokens = segment_tokens(bytes, base_address);
                let mut out = Vec::with_capacity(tokens.len());
                for batch in tokens.chunks(batch_size) {
                    let values: Vec<u64> = batch.iter().map(|t| t.value).collect();
                    let lines = decoder.decode_tokens(&values)?;
                    if lines.len() != batch.len() {
                        return Err(DecodeError::LineCountMismatch {
                            expected: batch.len(),
                            got: lines.len(),
                        });
                    }
                    for (token, line) in batch.iter().zip(lines) {
                        out.push(token_to_instruction(line_re, token, &line));
                    }
                }
                Ok(out)
            }
        }
    }
}

fn token_to_instruction(line_re: &Regex, token: &Token, line: &str) -> Instruction {
    if line.contains("unknown") {
        return Instruction::unknown(token.address, token.raw_hex.clone());
    }
    let (mnemonic, operands) = match line_re.captures(line) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (String::new(), String::new()),
    };
    Instruction::new(token.address, token.raw_hex.clone(), mnemonic, operands)
}
