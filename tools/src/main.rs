use std::fs;
use std::path::{Path, PathBuf};

use abnet_tools::{
    decode_payload, encode_document, format_decode_pretty, format_inspect_pretty,
    inspect_payload, Document, Framing, PayloadKind,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, RequestFlag, RequestFlags};
use glob::Pattern;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "abnet-tools",
    version,
    about = "abnet payload inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a payload file into JSON or a readable summary.
    Decode {
        /// Path to the payload bytes.
        payload_file: PathBuf,
        /// Payload kind: request, origin, target or location.
        #[arg(long)]
        kind: PayloadKind,
        #[command(flatten)]
        framing: FramingArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Encode a JSON document (as printed by `decode`) into payload bytes.
    Encode {
        /// Path to the JSON document.
        document: PathBuf,
        /// Where to write the payload bytes.
        #[arg(long)]
        out: PathBuf,
        /// Write a leading flags byte.
        #[arg(long)]
        prefixed: bool,
    },
    /// Show the byte span of each stage in a payload.
    Inspect {
        /// Path to a payload file or a directory of them.
        payload_path: PathBuf,
        /// Payload kind: request, origin, target or location.
        #[arg(long)]
        kind: PayloadKind,
        #[command(flatten)]
        framing: FramingArgs,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
    },
}

#[derive(Args)]
struct FramingArgs {
    /// Comma-separated flags the payload was encoded with (timestamp, rtt, reconciliation-id).
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["raw_flags", "prefixed"])]
    flags: Vec<RequestFlag>,
    /// Raw presence byte the payload was encoded with.
    #[arg(long, conflicts_with = "prefixed")]
    raw_flags: Option<u8>,
    /// The payload starts with its flags byte.
    #[arg(long)]
    prefixed: bool,
}

impl FramingArgs {
    fn framing(&self) -> Framing {
        if self.prefixed {
            Framing::Prefixed
        } else if let Some(raw) = self.raw_flags {
            Framing::Plain(RequestFlags::from_raw(raw))
        } else {
            Framing::Plain(self.flags.iter().copied().collect())
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let limits = CodecLimits::default();
    match cli.command {
        Command::Decode {
            payload_file,
            kind,
            framing,
            format,
        } => {
            let bytes = read_payload(&payload_file)?;
            let report = decode_payload(&bytes, kind, framing.framing(), &limits)
                .with_context(|| format!("decode {kind} payload {}", payload_file.display()))?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&report.document)
                        .context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    println!("{}", format_decode_pretty(&report));
                }
            }
        }
        Command::Encode {
            document,
            out,
            prefixed,
        } => {
            let contents = fs::read_to_string(&document)
                .with_context(|| format!("read document {}", document.display()))?;
            let parsed: Document =
                serde_json::from_str(&contents).context("parse document json")?;
            let bytes = encode_document(&parsed, prefixed, &limits)
                .with_context(|| format!("encode {} document", parsed.kind()))?;
            fs::write(&out, &bytes).with_context(|| format!("write payload {}", out.display()))?;
            println!(
                "wrote {} bytes to {} (flags: {})",
                bytes.len(),
                out.display(),
                parsed.replication().flags()
            );
        }
        Command::Inspect {
            payload_path,
            kind,
            framing,
            glob,
        } => {
            let framing = framing.framing();
            if payload_path.is_dir() {
                for path in collect_payload_paths(&payload_path, glob.as_deref())? {
                    let bytes = read_payload(&path)?;
                    let report = inspect_payload(&bytes, kind, framing, &limits);
                    println!("== {} ==", path.display());
                    println!("{}", format_inspect_pretty(&report));
                }
            } else {
                if glob.is_some() {
                    bail!("--glob only applies when inspecting a directory");
                }
                let bytes = read_payload(&payload_path)?;
                let report = inspect_payload(&bytes, kind, framing, &limits);
                println!("{}", format_inspect_pretty(&report));
            }
        }
    }
    Ok(())
}

fn read_payload(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read payload {}", path.display()))
}

fn collect_payload_paths(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}
