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

//! Works out which PC the view should follow from per-cycle commit port
//! snapshots.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// One commit port's state for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSlot {
    #[serde(deserialize_with = "deserialize_address")]
    pub address: u64,
    pub valid: bool,
}

impl CommitSlot {
    pub fn new(address: u64, valid: bool) -> Self {
        Self { address, valid }
    }
}

/// All commit ports for one cycle, in port order.
pub type CommitSnapshot = Vec<CommitSlot>;

/// Addresses of the slots that committed this cycle.
pub fn valid_pcs(snapshot: &[CommitSlot]) -> HashSet<u64> {
    snapshot
        .iter()
        .filter(|s| s.valid)
        .map(|s| s.address)
        .collect()
}

/// `0x80000000 0x80000004*` style summary; `*` marks ports that did not
/// commit. Followed by the highest port address.
pub fn format_commit_pcs(snapshot: &[CommitSlot]) -> String {
    let ports = snapshot
        .iter()
        .map(|s| format!("0x{:x}{}", s.address, if s.valid { "" } else { "*" }))
        .collect::<Vec<_>>()
        .join(" ");
    match snapshot.iter().map(|s| s.address).max() {
        Some(max) => format!("{}  max commit: 0x{:x}", ports, max),
        None => "no commit ports".to_string(),
    }
}

/// Remembers the previous snapshot so the next one can be diffed against it.
/// One tracker per view; its state means "the last snapshot this view saw".
#[derive(Debug, Default)]
pub struct PcTracker {
    previous: Option<CommitSnapshot>,
}

impl PcTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&[CommitSlot]> {
        self.previous.as_deref()
    }

    /// Pick the PC to centre on.
    ///
    /// Ports whose address moved since the previous snapshot (ignoring ports
    /// that previously held address 0) win, highest address first. Otherwise
    /// the highest currently valid address, otherwise `base_addr`. The
    /// snapshot is always kept for the next call.
    pub fn compute_last_pc(&mut self, snapshot: &[CommitSlot], base_addr: u64) -> u64 {
        let changed = self.previous.as_ref().and_then(|prev| {
            prev.iter()
                .zip(snapshot)
                .filter(|(p, c)| p.address != c.address && p.address != 0)
                .map(|(_, c)| c.address)
                .max()
        });
        let valid_max = snapshot.iter().filter(|s| s.valid).map(|s| s.address).max();

        self.previous = Some(snapshot.to_vec());

        let pc = changed.or(valid_max).unwrap_or(base_addr);
        log::trace!("last pc 0x{:x} (changed {:?}, valid max {:?})", pc, changed, valid_max);
        pc
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Number(u64),
    Text(String),
}

/// Accept `"0x80000000"`, `"80000000"` or a plain JSON integer. Hex strings
/// are preferred since JSON consumers often lose 64-bit precision.
fn deserialize_address<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match AddressRepr::deserialize(deserializer)? {
        AddressRepr::Number(n) => Ok(n),
        AddressRepr::Text(s) => parse_hex_address(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex address {:?}", s))),
    }
}

/// Parse hex address from string (supports "0x1234" or "1234" format)
pub fn parse_hex_address(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let hex_str = hex_str.replace('_', "");
    u64::from_str_radix(&hex_str, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u64 = 0x8000_0000;

    fn slot(a: u64, v: bool) -> CommitSlot {
        CommitSlot::new(a, v)
    }

    #[test]
    fn moved_port_wins() {
        let mut t = PcTracker::new();
        assert_eq!(t.compute_last_pc(&[slot(0x1000, true)], BASE), 0x1000);
        assert_eq!(t.compute_last_pc(&[slot(0x1004, true)], BASE), 0x1004);
    }

    #[test]
    fn unchanged_snapshot_uses_highest_valid() {
        let mut t = PcTracker::new();
        let snap = vec![slot(0x2000, true), slot(0x2008, true), slot(0x3000, false)];
        t.compute_last_pc(&snap, BASE);
        assert_eq!(t.compute_last_pc(&snap, BASE), 0x2008);
    }

    #[test]
    fn cold_start_all_invalid_returns_base() {
        let mut t = PcTracker::new();
        let snap = vec![slot(0, false), slot(0, false)];
        assert_eq!(t.compute_last_pc(&snap, BASE), BASE);
        assert_eq!(t.previous(), Some(&snap[..]));
    }

    #[test]
    fn ports_previously_zero_are_ignored() {
        let mut t = PcTracker::new();
        t.compute_last_pc(&[slot(0, false), slot(0x1000, true)], BASE);
        // port 0 moved from 0 to 0x9000 but was zero before; port 1 moved
        let pc = t.compute_last_pc(&[slot(0x9000, false), slot(0x1002, true)], BASE);
        assert_eq!(pc, 0x1002);
    }

    #[test]
    fn changed_ports_count_even_when_invalid() {
        let mut t = PcTracker::new();
        t.compute_last_pc(&[slot(0x1000, true), slot(0x1002, true)], BASE);
        let pc = t.compute_last_pc(&[slot(0x1010, false), slot(0x1002, true)], BASE);
        assert_eq!(pc, 0x1010);
    }

    #[test]
    fn highest_changed_address_breaks_ties() {
        let mut t = PcTracker::new();
        t.compute_last_pc(&[slot(0x1000, true), slot(0x1002, true)], BASE);
        let pc = t.compute_last_pc(&[slot(0x2000, true), slot(0x1800, true)], BASE);
        assert_eq!(pc, 0x2000);
    }

    #[test]
    fn comparison_is_positional() {
        let mut t = PcTracker::new();
        t.compute_last_pc(&[slot(0x1000, true), slot(0x1004, true)], BASE);
        // same addresses, swapped ports: both positions differ
        let pc = t.compute_last_pc(&[slot(0x1004, true), slot(0x1000, true)], BASE);
        assert_eq!(pc, 0x1004);
    }

    #[test]
    fn summary_marks_invalid_ports() {
        let s = format_commit_pcs(&[slot(0x80000000, true), slot(0x80000004, false)]);
        assert_eq!(s, "0x80000000 0x80000004*  max commit: 0x80000004");
        assert_eq!(format_commit_pcs(&[]), "no commit ports");
    }

    #[test]
    fn slots_accept_hex_or_numbers() {
        let snap: CommitSnapshot = serde_json::from_str(
            r#"[{"address": "0x80000004", "valid": true}, {"address": 4096, "valid": false}]"#,
        )
        .unwrap();
        assert_eq!(snap, vec![slot(0x8000_0004, true), slot(0x1000, false)]);
        assert!(serde_json::from_str::<CommitSnapshot>(r#"[{"address": "0xzz", "valid": true}]"#).is_err());
    }

    #[test]
    fn parse_hex_variants() {
        assert_eq!(parse_hex_address("0x8000_0000"), Some(0x8000_0000));
        assert_eq!(parse_hex_address(" 1234 "), Some(0x1234));
        assert_eq!(parse_hex_address("nope"), None);
    }
}
