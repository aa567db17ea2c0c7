use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use pscmap::{CMapType, PSCMap};

#[derive(Parser, Debug)]
#[clap(author, version, about = "CMap utility program using the pscmap library", arg_required_else_help = true)]
struct Args {
    /// CMap program named by `usecmap` in the input file.
    #[clap(short, long, global = true)]
    parent: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the codespace ranges in evaluation order.
    Ranges { file: PathBuf },
    /// Decode a hex string into CIDs or text.
    Decode { file: PathBuf, hex: String },
    /// Print the code bytes producing a CID.
    Encode { file: PathBuf, cid: u32 },
}

impl Command {
    fn file(&self) -> &PathBuf {
        match self {
            Command::Ranges { file } | Command::Decode { file, .. } | Command::Encode { file, .. } => file,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    CMap(#[from] pscmap::Error),
    #[error("{0:?} is not a hex string: {1}")]
    Hex(String, hex::FromHexError),
}

/// Accepts `<8140>` as well as bare digits, with any whitespace in between.
fn parse_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, '<' | '>') && !c.is_whitespace())
        .collect();
    hex::decode(digits)
}

fn load(args: &Args) -> pscmap::Result<PSCMap> {
    let program = std::fs::read(args.command.file())?;
    match &args.parent {
        Some(parent) => PSCMap::parse_with_parent(&program, &PSCMap::load(parent)?),
        None => PSCMap::parse(&program),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let cmap = load(&args)?;
    match args.command {
        Command::Ranges { .. } => {
            println!("{} ({:?}, {:?})", cmap.name(), cmap.cmap_type(), cmap.wmode());
            for range in cmap.code_map().codespace_ranges() {
                println!("<{}> <{}>", hex::encode_upper(range.start_bytes()), hex::encode_upper(range.end_bytes()));
            }
        }
        Command::Decode { hex: text, .. } => {
            let bytes = parse_hex(&text).map_err(|err| CliError::Hex(text.clone(), err))?;
            match cmap.cmap_type() {
                CMapType::Cid => {
                    let cids: Vec<String> = cmap.decode_cids(&bytes).iter().map(u32::to_string).collect();
                    println!("{}", cids.join(" "));
                }
                CMapType::ToUnicode => println!("{}", cmap.decode_text(&bytes)?),
            }
        }
        Command::Encode { cid, .. } => println!("<{}>", hex::encode_upper(cmap.encode_cid(cid)?)),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("cmaputil: {err}");
            ExitCode::FAILURE
        }
    }
}
