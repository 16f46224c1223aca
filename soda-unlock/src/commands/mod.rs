mod decrypt;
mod inspect;
mod key;

pub use decrypt::Decrypt;
pub use inspect::Inspect;
pub use key::Key;

use anyhow::{Context, Result};
use clap::{ArgAction, ColorChoice, Parser, Subcommand};
use log::LevelFilter;
use std::{fs, path::PathBuf};

/// Restore playable audio from protected Soda Music (汽水音乐) downloads.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Print more details, repeat for per sample output.
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Args {
    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }

        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Decrypt(Decrypt),
    Inspect(Inspect),
    Key(Key),
}

/// Where to read the `PlayAuth` token from.
///
/// `--auth-file` takes precedence, so a token exported in the environment
/// can be overridden by a file.
#[derive(Debug, Clone, clap::Args)]
#[group(required = true, multiple = true)]
pub struct AuthArgs {
    /// PlayAuth token returned with the playback url (base64).
    #[arg(long, env = "SODA_PLAY_AUTH", hide_env_values = true)]
    auth: Option<String>,

    /// Read the PlayAuth token from a file.
    #[arg(long)]
    auth_file: Option<PathBuf>,
}

impl AuthArgs {
    pub fn token(&self) -> Result<String> {
        if let Some(path) = &self.auth_file {
            let token = fs::read_to_string(path)
                .with_context(|| format!("Cannot read auth token from {}.", path.display()))?;
            return Ok(token.trim().to_owned());
        }

        Ok(self.auth.as_deref().unwrap_or_default().trim().to_owned())
    }
}
