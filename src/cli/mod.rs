//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::character::Character;
use crate::core::config::Config;
use crate::export::pipeline::{export_character, ExportProfile, ExportRequest};
use crate::export::{read_interchange_card, read_native_export, ImportError};

#[derive(Parser)]
#[command(name = "swelld")]
#[command(version)]
#[command(about = "Export SwellDreams characters as portable PNG character cards")]
#[command(
    long_about = "Swelld turns a character record snapshot into a PNG that displays normally \
in any image viewer while carrying the full character data in tEXt metadata chunks.\n\n\
Profiles:\n\
  card              Interchange card ('chara' + 'ccv3' chunks) readable by\n\
                    third-party character-card frontends\n\
  native            Full-fidelity envelope ('swelld' chunk) including stories,\n\
                    reminders, and optionally automation flows\n\n\
Configuration (optional, TOML in the platform config directory):\n\
  output_dir        Root directory for exported cards\n\
  logo_path         Logo image composited onto native exports"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// Interchange card with `chara` + `ccv3` chunks
    Card,
    /// Full-fidelity native envelope with a `swelld` chunk
    Native,
}

impl From<ProfileArg> for ExportProfile {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Card => ExportProfile::Interchange,
            ProfileArg::Native => ExportProfile::Native,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a character record snapshot as a card PNG
    Export {
        /// Path to the character record JSON snapshot
        record: PathBuf,

        /// Output profile
        #[arg(short, long, value_enum, default_value_t = ProfileArg::Card)]
        profile: ProfileArg,

        /// Story ids to include (default: all stories)
        #[arg(short, long, value_delimiter = ',')]
        stories: Vec<String>,

        /// Avatar image path, overriding the record's own
        #[arg(short, long)]
        avatar: Option<PathBuf>,

        /// JSON file with automation flows to embed (native profile only)
        #[arg(short, long)]
        flows: Option<PathBuf>,

        /// Output root directory (default: configured or platform directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the metadata embedded in an exported card PNG
    Inspect {
        /// Path to an exported PNG
        file: PathBuf,
    },
}

/// Parse arguments and run the requested command.
pub fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Commands::Export {
            record,
            profile,
            stories,
            avatar,
            flows,
            out,
        } => run_export(record, profile, stories, avatar, flows, out),
        Commands::Inspect { file } => run_inspect(file),
    }
}

fn run_export(
    record: PathBuf,
    profile: ProfileArg,
    stories: Vec<String>,
    avatar: Option<PathBuf>,
    flows: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let contents = fs::read_to_string(&record)
        .map_err(|e| format!("Failed to read record {}: {}", record.display(), e))?;
    let character: Character = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid character record {}: {}", record.display(), e))?;

    let config = Config::load()?;

    let avatar_path = avatar.or_else(|| character.avatar_path.clone().map(PathBuf::from));

    let flows = match flows {
        Some(path) => {
            let contents = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read flows {}: {}", path.display(), e))?;
            let flows: Vec<serde_json::Value> = serde_json::from_str(&contents)
                .map_err(|e| format!("Invalid flows file {}: {}", path.display(), e))?;
            Some(flows)
        }
        None => None,
    };

    let logo = match config.logo_path.as_deref() {
        Some(path) => match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(path, %err, "configured logo unreadable, using built-in badge");
                None
            }
        },
        None => None,
    };

    let request = ExportRequest {
        character: &character,
        profile: profile.into(),
        selected_story_ids: stories,
        avatar_path,
        flows,
        logo,
        output_root: out.unwrap_or_else(|| config.output_root()),
    };

    let path = export_character(&request)?;
    println!("✅ Exported '{}' to {}", character.name, path.display());
    Ok(())
}

fn run_inspect(file: PathBuf) -> Result<(), Box<dyn Error>> {
    match read_native_export(&file) {
        Ok(envelope) => {
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            return Ok(());
        }
        Err(ImportError::MissingMetadata(_)) => {}
        Err(err) => return Err(err.into()),
    }

    let card = read_interchange_card(&file)?;
    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}
