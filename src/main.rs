//! Replays a recorded commit trace against a program image and prints the
//! disassembly view for every cycle.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use disasm_view::debug::init_logging;
use disasm_view::disasm_serializer::serialize_frame;
use disasm_view::trace::read_snapshots;
use disasm_view::tracker::{format_commit_pcs, parse_hex_address};
use disasm_view::{
    BackendKind, CommitSnapshot, DisasmViewer, Frame, Line, MemoryImage, ViewerConfig, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "disasm-view", version, about = "Commit-following disassembly view")]
struct Args {
    /// Program image (raw binary, or ELF with --elf)
    #[arg(short = 'i', long = "image")]
    image: PathBuf,

    /// Treat the image as an ELF file and load its segments
    #[arg(long = "elf", default_value_t = false)]
    elf: bool,

    /// Load address of a raw image (hex)
    #[arg(short = 'b', long = "base", default_value = "0x80000000", value_parser = parse_base)]
    base: u64,

    /// Commit trace, one JSON array of {address, valid} per cycle
    #[arg(short = 't', long = "trace")]
    trace: Option<PathBuf>,

    /// Lines per frame
    #[arg(long = "height", default_value_t = 20)]
    height: u32,

    #[arg(long = "width", default_value_t = 80)]
    width: u32,

    /// JSON config file; command line flags override it
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[arg(long = "block-size")]
    block_size: Option<u64>,

    #[arg(long = "batch-size")]
    batch_size: Option<usize>,

    #[arg(long = "backend", value_enum)]
    backend: Option<BackendKind>,

    /// Disassembler tool name or path (spike-dasm compatible)
    #[arg(long = "dasm")]
    dasm: Option<String>,

    /// Emit one JSON record per frame instead of text
    #[arg(long = "json", default_value_t = false)]
    json: bool,

    /// Enable debug output
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,
}

fn parse_base(s: &str) -> Result<u64, String> {
    parse_hex_address(s).ok_or_else(|| format!("invalid hex address: {}", s))
}

fn build_config(args: &Args) -> Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(dasm) = &args.dasm {
        config.dasm_tool = dasm.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_frame(out: &mut impl Write, frame: &Frame, snapshot: &CommitSnapshot) -> io::Result<()> {
    writeln!(out, "Commit PC: {}", format_commit_pcs(snapshot))?;
    for line in &frame.lines {
        match line {
            Line::Plain(text) => writeln!(out, "{}", text)?,
            // highlighted line in bold red
            Line::Styled { text, .. } => writeln!(out, "\x1b[1;31m{}\x1b[0m", text)?,
        }
    }
    writeln!(out)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = init_logging(args.debug)?;

    let config = build_config(&args)?;
    let memory = if args.elf {
        MemoryImage::from_elf(&args.image)?
    } else {
        MemoryImage::from_flat_file(&args.image, args.base)?
    };
    for region in memory.regions() {
        log::debug!("mapped {}", region.to_json());
    }
    log::info!("Image spans 0x{:x}..0x{:x}", memory.base(), memory.end());

    let snapshots: Vec<CommitSnapshot> = match &args.trace {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening trace {}", path.display()))?;
            read_snapshots(BufReader::new(file))?
        }
        // No trace: one cold-start frame at the image base
        None => vec![Vec::new()],
    };
    log::info!("Replaying {} snapshots", snapshots.len());

    let mut viewer = DisasmViewer::new(&config, memory.base())?;
    let viewport = Viewport {
        width: args.width,
        height: args.height,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (cycle, snapshot) in snapshots.iter().enumerate() {
        let frame = viewer
            .refresh(&memory, snapshot, viewport)
            .with_context(|| format!("refresh for cycle {}", cycle))?;
        if args.json {
            writeln!(out, "{}", serialize_frame(&frame, cycle as u64))?;
        } else {
            print_frame(&mut out, &frame, snapshot)?;
        }
    }
    out.flush()?;

    log::debug!("{} blocks decoded", viewer.cache().len());
    Ok(())
}
