use clap::{Parser, Subcommand};
use jagpack::archive::Archive;
use jagpack::buffer::Buffer;
use jagpack::wire::{self, DEFAULT_COMPRESS_THRESHOLD};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(name = "jag", about = "The JAG container format CLI")]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack one or more files into a new archive
    Create {
        #[arg(short, long)]
        output: PathBuf,
        /// Body size in bytes at which whole-archive compression kicks in
        #[arg(short, long, default_value_t = DEFAULT_COMPRESS_THRESHOLD)]
        threshold: usize,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Extract entries by name
    Extract {
        archive: PathBuf,
        /// Entry names to look up (lookups are case-insensitive)
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Insert files into an existing archive, replacing same-named entries
    Insert {
        archive: PathBuf,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// Where to write the updated archive (defaults to in-place)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, default_value_t = DEFAULT_COMPRESS_THRESHOLD)]
        threshold: usize,
    },
    /// List entry hashes and sizes
    List {
        archive: PathBuf,
    },
    /// Show container header metadata
    Info {
        archive: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { output, threshold, input } => {
            let mut ar = Archive::new();
            for path in &input {
                ar.put(&entry_name(path)?, std::fs::read(path)?);
                println!("  packed  {}", path.display());
            }
            std::fs::write(&output, wire::encode(&ar, threshold)?)?;
            println!("Created: {}", output.display());
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { archive, names, output_dir } => {
            let ar = wire::decode(&std::fs::read(&archive)?)?;
            if !output_dir.exists() {
                std::fs::create_dir_all(&output_dir)?;
            }
            for name in &names {
                match ar.get(name) {
                    Some(payload) => {
                        std::fs::write(output_dir.join(name), payload)?;
                        println!("  extracted  {name}");
                    }
                    None => warn!("couldn't find {name} in {}", archive.display()),
                }
            }
        }

        // ── Insert ───────────────────────────────────────────────────────────
        Commands::Insert { archive, input, output, threshold } => {
            let mut ar = wire::decode(&std::fs::read(&archive)?)?;
            for path in &input {
                ar.put(&entry_name(path)?, std::fs::read(path)?);
                println!("  inserted  {}", path.display());
            }
            let destination = output.unwrap_or(archive);
            std::fs::write(&destination, wire::encode(&ar, threshold)?)?;
            println!("Updated: {}", destination.display());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { archive } => {
            let ar = wire::decode(&std::fs::read(&archive)?)?;
            println!("Archive: {}", archive.display());
            println!("{:<10} {:>12}", "Hash", "Size");
            for entry in ar.entries() {
                println!("{:08x}   {:>12}", entry.name_hash, entry.payload.len());
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { archive } => {
            let mut buf = Buffer::from_vec(std::fs::read(&archive)?);
            let decoded_len = buf.read_uint(3)?;
            let encoded_len = buf.read_uint(3)?;
            let ar = wire::decode(buf.as_slice())?;

            println!("── JAG Archive ─────────────────────────────────────────");
            println!("  Path          {}", archive.display());
            println!("  Decoded size  {decoded_len} B");
            println!("  Encoded size  {encoded_len} B");
            println!("  Compressed    {}", decoded_len != encoded_len);
            println!("  Entries       {}", ar.len());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn entry_name(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(path
        .file_name()
        .ok_or_else(|| format!("{} has no file name", path.display()))?
        .to_string_lossy()
        .into_owned())
}
