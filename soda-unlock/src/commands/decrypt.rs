use super::AuthArgs;
use crate::utils;
use anyhow::{Context, Result, bail};
use clap::Args;
use std::{fs, path::PathBuf, time::Instant};

/// Decrypt a downloaded file into a playable m4a.
#[derive(Debug, Clone, Args)]
pub struct Decrypt {
    /// Encrypted file as downloaded from the playback url.
    #[arg(required = true)]
    input: PathBuf,

    /// Path for decrypted output file [default: <INPUT>_decrypted.m4a].
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite the output file if it already exists.
    #[arg(long)]
    overwrite: bool,

    #[command(flatten)]
    auth: AuthArgs,
}

impl Decrypt {
    pub fn execute(self) -> Result<()> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| utils::default_output(&self.input));

        if output.exists() && !self.overwrite {
            bail!(
                "{} already exists, use --overwrite to replace it.",
                output.display()
            );
        }

        let token = self.auth.token()?;
        let mut data = fs::read(&self.input)
            .with_context(|| format!("Cannot read {}.", self.input.display()))?;

        log::info!(
            "Decrypting {} ({})",
            self.input.display(),
            utils::format_bytes(data.len(), 2)
        );

        let started = Instant::now();
        let stats = soda_mp4::decrypt(&mut data, &token)
            .with_context(|| format!("Cannot decrypt {}.", self.input.display()))?;

        log::debug!(
            "{} samples decrypted, {} copied, {} trailing bytes untouched in {:.2?}",
            stats.samples_decrypted,
            stats.samples_copied,
            stats.bytes_untouched,
            started.elapsed()
        );

        fs::write(&output, &data)
            .with_context(|| format!("Cannot write {}.", output.display()))?;
        log::info!("Saved {}", output.display());
        Ok(())
    }
}
