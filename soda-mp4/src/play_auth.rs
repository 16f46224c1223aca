//! Recovery of the AES key hidden in a `PlayAuth` token.
//!
//! The token is base64 of `[3 header bytes][obfuscated key text][padding]`. The
//! padding length comes from the header bytes. The obfuscation is a rolling xor
//! with the bytes two positions back, minus a position dependent offset folded
//! back into range by repeated additions of 255. Its first output byte is a base36
//! digit telling how many trailing bytes to drop, the rest is the key as hex text.

use crate::{Error, Result};
use base64::Engine;

/// Seed of the rolling xor buffer.
const ROLLING_SEED: [u8; 2] = [0xFA, 0x55];

/// AES key recovered from a `PlayAuth` token.
///
/// Lives for one decryption call, it is never cached by this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKey(Vec<u8>);

impl ContentKey {
    /// Wrap raw key bytes, which must be an AES-128, AES-192 or AES-256 key.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        match bytes.len() {
            16 | 24 | 32 => Ok(Self(bytes)),
            len => Err(Error::token(format!(
                "key is {len} bytes long, expected 16, 24 or 32"
            ))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex, the form the token carries the key in.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentKey({} bytes)", self.0.len())
    }
}

/// Recover the AES key from a base64 `PlayAuth` token.
///
/// The result is always 16, 24 or 32 bytes long.
///
/// # Example
///
/// ```
/// let key = soda_mp4::recover_key("nL8T+VS+E/dbvhz1VLkc91W6EvVapRLcW6UT3lqiE9xZoA==")?;
/// assert_eq!(key.to_hex(), "000102030405060708090a0b0c0d0e0f");
/// # Ok::<(), soda_mp4::Error>(())
/// ```
pub fn recover_key(play_auth: &str) -> Result<ContentKey> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(play_auth.trim())
        .map_err(|e| Error::token(format!("not base64 ({e})")))?;

    let key_text = extract_key_text(&raw)?;
    let key = hex::decode(key_text)
        .map_err(|e| Error::token(format!("key is not hex text ({e})")))?;

    ContentKey::from_bytes(key)
}

/// Strip header and padding from the decoded token and undo the obfuscation.
fn extract_key_text(raw: &[u8]) -> Result<Vec<u8>> {
    if raw.len() < 3 {
        return Err(Error::token(format!("{} bytes is too short", raw.len())));
    }

    // 8 bit arithmetic, the subtraction wraps
    let padding_len = (raw[0] ^ raw[1] ^ raw[2]).wrapping_sub(48) as usize;

    if raw.len() < padding_len + 2 {
        return Err(Error::token(format!(
            "padding of {padding_len} bytes does not fit {} bytes",
            raw.len()
        )));
    }

    let inner = &raw[1..raw.len() - padding_len];
    let mut text = deobfuscate(inner);

    let skip = base36_digit(text[0])
        .ok_or_else(|| Error::token(format!("invalid skip digit {:#04x}", text[0])))?;
    let decoded_len = raw.len() - padding_len - 2;
    let end = (1 + decoded_len)
        .checked_sub(skip)
        .filter(|end| (1..=text.len()).contains(end))
        .ok_or_else(|| {
            Error::token(format!(
                "skipping {skip} bytes leaves no key in {decoded_len} bytes"
            ))
        })?;

    text.truncate(end);
    text.remove(0);
    Ok(text)
}

fn deobfuscate(inner: &[u8]) -> Vec<u8> {
    let rolling = ROLLING_SEED.iter().chain(inner);

    inner
        .iter()
        .zip(rolling)
        .enumerate()
        .map(|(i, (byte, prev))| {
            let mut value = (byte ^ prev) as i32 - (i as u32).count_ones() as i32 - 21;
            while value < 0 {
                value += 255;
            }
            value as u8
        })
        .collect()
}

fn base36_digit(c: u8) -> Option<usize> {
    match c {
        b'0'..=b'9' => Some((c - b'0') as usize),
        b'a'..=b'z' => Some((c - b'a') as usize + 10),
        _ => None,
    }
}
