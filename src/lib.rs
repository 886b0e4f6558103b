// Crate root: declare modules and control visibility
pub mod cache;
pub mod capstone;
pub mod config;
pub mod dasm_tool;
pub mod debug;
pub mod disasm_serializer;
pub mod error;
pub mod instr;
pub mod memory;
pub mod render;
pub mod scanner;
pub mod trace;
pub mod tracker;
pub mod utils;
pub mod viewer;
pub mod window;

// Re-export commonly used API from the library for binaries/tests
pub use config::{BackendKind, ViewerConfig};
pub use error::{ConfigError, DecodeError};
pub use instr::Instruction;
pub use memory::{MemoryImage, MemorySource};
pub use render::{Line, Style};
pub use tracker::{CommitSlot, CommitSnapshot, PcTracker};
pub use viewer::{DisasmViewer, Frame, Viewport};
