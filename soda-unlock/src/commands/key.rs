use super::AuthArgs;
use anyhow::Result;
use clap::Args;

/// Print the AES key hidden in a PlayAuth token.
///
/// Useful to tell a bad token apart from a bad file.
#[derive(Debug, Clone, Args)]
pub struct Key {
    #[command(flatten)]
    pub auth: AuthArgs,
}

impl Key {
    pub fn execute(self) -> Result<()> {
        let key = soda_mp4::recover_key(&self.auth.token()?)?;
        log::debug!("recovered a {} bit key", key.len() * 8);
        println!("{}", key.to_hex());
        Ok(())
    }
}
