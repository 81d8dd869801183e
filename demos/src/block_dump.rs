//! Decodes hex encoded blocks, one per line, assembles them into a chain and
//! prints every record the engine exposes.
//!
//! Usage: `block_dump <path_to_hex_blocks> [--debug]`

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process;

use btck::{prelude::*, Block, Chain, KernelError, Log, LogLevel, Logger, TransactionRef};
use env_logger::Builder;
use log::LevelFilter;

#[derive(Debug)]
enum DumpError {
    Kernel(KernelError),
    Io(std::io::Error),
    InvalidInput(String),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::Kernel(e) => write!(f, "Kernel error: {}", e),
            DumpError::Io(e) => write!(f, "IO error: {}", e),
            DumpError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for DumpError {}

impl From<KernelError> for DumpError {
    fn from(e: KernelError) -> Self {
        DumpError::Kernel(e)
    }
}

impl From<std::io::Error> for DumpError {
    fn from(e: std::io::Error) -> Self {
        DumpError::Io(e)
    }
}

struct MainLog {}

impl Log for MainLog {
    fn log(&self, message: &str) {
        log::info!(
            target: "libbtck",
            "{}", message.strip_suffix("\r\n").or_else(|| message.strip_suffix('\n')).unwrap_or(message));
    }
}

fn setup_logging() -> Result<Logger, KernelError> {
    let mut builder = Builder::from_default_env();
    builder.filter(None, LevelFilter::Info).init();
    Logger::new(MainLog {})
}

fn read_blocks(path: &str) -> Result<Vec<Block>, DumpError> {
    let reader = BufReader::new(File::open(path)?);
    let mut blocks = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw = hex::decode(line)
            .map_err(|e| DumpError::InvalidInput(format!("line {}: {}", number + 1, e)))?;
        blocks.push(Block::new(&raw)?);
    }
    Ok(blocks)
}

fn dump_transaction(index: usize, tx: TransactionRef<'_>) {
    println!(
        "  tx {}: {} ({} inputs, {} outputs, {} bytes)",
        index,
        tx.txid(),
        tx.input_count(),
        tx.output_count(),
        tx.to_bytes().len()
    );
    for output in tx.outputs() {
        println!(
            "    {} sats to {}",
            output.amount(),
            hex::encode(output.script_pubkey().to_bytes())
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path_to_hex_blocks> [--debug]", args[0]);
        process::exit(1);
    }

    let logger = setup_logging()?;
    if args.iter().any(|arg| arg == "--debug") {
        logger.set_level(LogLevel::Debug);
    }

    let blocks = read_blocks(&args[1])?;
    let chain = Chain::new(&blocks)?;
    drop(blocks);

    for (height, block) in chain.blocks().enumerate() {
        println!("block {}: {}", height, block.hash());
        for (index, tx) in block.transactions().enumerate() {
            dump_transaction(index, tx.as_ref());
        }
    }

    if let Some(tip) = chain.tip() {
        println!(
            "tip {} at index {:?}",
            tip.hash(),
            chain.find(&tip.hash())
        );
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
