use crate::utils;
use anyhow::{Context, Result};
use clap::Args;
use std::{fs, path::PathBuf};

/// Show the sample and encryption tables of a downloaded file.
#[derive(Debug, Clone, Args)]
pub struct Inspect {
    /// File to inspect.
    #[arg(required = true)]
    input: PathBuf,

    /// Print as json.
    #[arg(long)]
    json: bool,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let data = fs::read(&self.input)
            .with_context(|| format!("Cannot read {}.", self.input.display()))?;
        let info = soda_mp4::inspect(&data)
            .with_context(|| format!("Cannot inspect {}.", self.input.display()))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        println!("samples         {}", info.sample_count);
        println!(
            "sample bytes    {}",
            utils::format_bytes(info.sample_bytes as usize, 2)
        );
        println!("ivs             {}", info.iv_count);
        println!("subsamples      {}", info.has_subsamples);
        println!(
            "mdat            {}",
            utils::format_bytes(info.mdat_size, 2)
        );
        println!(
            "encrypted       {}",
            if info.encrypted_entry { "yes (enca)" } else { "no" }
        );

        Ok(())
    }
}
