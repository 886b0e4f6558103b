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

//! Recorded commit feed: one JSON array of commit slots per line, one line
//! per simulated cycle. Blank lines and `#` comments are skipped.

use std::io::BufRead;

use anyhow::{Context, Result};

use crate::tracker::CommitSnapshot;

pub fn read_snapshots<R: BufRead>(reader: R) -> Result<Vec<CommitSnapshot>> {
    let mut snapshots = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let snap: CommitSnapshot =
            serde_json::from_str(s).with_context(|| format!("trace line {}", n + 1))?;
        snapshots.push(snap);
    }
    Ok(snapshots)
}
