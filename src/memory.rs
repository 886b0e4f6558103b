use std::path::Path;

use anyhow::{bail, Context, Result};
use object::{Object, ObjectSegment};
use serde_json::{json, Value};

/// Source of instruction bytes. Reads are only ever issued for mapped
/// addresses; what comes back for anything else is up to the implementation.
pub trait MemorySource {
    fn read_bytes(&self, address: u64, length: u32) -> Vec<u8>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub name: String,
    pub start: u64,
    pub size: u64,
}

impl MemoryRegion {
    pub fn new(name: String, start: u64, size: u64) -> Self {
        Self { name, start, size }
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end()
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "start": format!("0x{:x}", self.start),
            "size": format!("0x{:x}", self.size),
        })
    }

    pub fn clip_region(&self, low_addr: u64, high_addr: u64) -> Option<MemoryRegion> {
        let new_start = self.start.max(low_addr);
        let new_end = self.end().min(high_addr);
        if new_start < new_end {
            Some(MemoryRegion::new(
                self.name.clone(),
                new_start,
                new_end - new_start,
            ))
        } else {
            None
        }
    }
}

struct Segment {
    region: MemoryRegion,
    data: Vec<u8>,
}

/// Read-only program memory made of one or more loaded segments.
///
/// The image spans from the lowest segment start to the highest segment end.
/// Holes between segments read as zero but are never allocated, so sparse
/// ELF layouts cost only what their segments hold.
pub struct MemoryImage {
    base: u64,
    end: u64,
    // Sorted by start address
    segments: Vec<Segment>,
}

impl MemoryImage {
    pub fn new(base: u64, data: Vec<u8>) -> Self {
        let region = MemoryRegion::new("image".to_string(), base, data.len() as u64);
        Self {
            base,
            end: region.end(),
            segments: vec![Segment { region, data }],
        }
    }

    /// Load a raw binary file and place it at `base`.
    pub fn from_flat_file(path: &Path, base: u64) -> Result<Self> {
        let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        log::info!(
            "Loaded {} bytes from {} at 0x{:x}",
            data.len(),
            path.display(),
            base
        );
        Ok(Self::new(base, data))
    }

    /// Load the non-empty loadable segments of an ELF file. The image is based
    /// at the lowest segment address.
    pub fn from_elf(path: &Path) -> Result<Self> {
        let file_data =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let obj_file = object::File::parse(&*file_data)?;

        let mut segments = Vec::new();
        for (i, seg) in obj_file.segments().enumerate() {
            let data = seg.data()?;
            if data.is_empty() {
                continue;
            }
            let region =
                MemoryRegion::new(format!("segment{}", i), seg.address(), data.len() as u64);
            log::debug!("ELF segment {}", region.to_json());
            segments.push(Segment {
                region,
                data: data.to_vec(),
            });
        }
        if segments.is_empty() {
            bail!("{} has no loadable segments", path.display());
        }
        segments.sort_by_key(|s| s.region.start);

        let base = segments[0].region.start;
        let end = segments
            .iter()
            .map(|s| s.region.end())
            .max()
            .unwrap_or(base);
        log::info!(
            "Loaded {} segments from {} spanning 0x{:x}..0x{:x}",
            segments.len(),
            path.display(),
            base,
            end
        );

        Ok(Self {
            base,
            end,
            segments,
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Span in bytes, holes included.
    pub fn len(&self) -> u64 {
        self.end - self.base
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.base
    }

    pub fn regions(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.segments.iter().map(|s| &s.region)
    }
}

impl MemorySource for MemoryImage {
    /// Reads are clipped to the image span; bytes outside it are not returned.
    fn read_bytes(&self, address: u64, length: u32) -> Vec<u8> {
        let span = MemoryRegion::new(String::new(), self.base, self.len());
        let Some(want) = span.clip_region(address, address.saturating_add(u64::from(length)))
        else {
            return Vec::new();
        };

        let mut out = vec![0u8; want.size as usize];
        for seg in &self.segments {
            if let Some(part) = seg.region.clip_region(want.start, want.end()) {
                let src = (part.start - seg.region.start) as usize;
                let dst = (part.start - want.start) as usize;
                let n = part.size as usize;
                out[dst..dst + n].copy_from_slice(&seg.data[src..src + n]);
            }
        }
        out
    }
}
