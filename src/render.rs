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

use std::collections::HashSet;

use serde::Serialize;

use crate::instr::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Default,
    Highlight,
}

/// A display line. The style travels next to the text, never inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Line {
    Plain(String),
    Styled { style: Style, text: String },
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Line::Plain(text) => text,
            Line::Styled { text, .. } => text,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Line::Plain(_) => Style::Default,
            Line::Styled { style, .. } => *style,
        }
    }
}

pub fn render(window: &[Instruction], valid_pcs: &HashSet<u64>, last_pc: u64) -> Vec<Line> {
    window
        .iter()
        .map(|instr| {
            let committed = valid_pcs.contains(&instr.address);
            let text = format!(
                "{}|0x{:x}: {}  {}  {}",
                if committed { ">" } else { " " },
                instr.address,
                instr.raw_hex,
                instr.mnemonic,
                instr.operands
            );
            if committed && instr.address == last_pc {
                Line::Styled {
                    style: Style::Highlight,
                    text,
                }
            } else {
                Line::Plain(text)
            }
        })
        .collect()
}
