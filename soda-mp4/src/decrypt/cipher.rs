use crate::{ContentKey, Error, Result};
use aes::{
    Aes128, Aes192, Aes256,
    cipher::{InnerIvInit, KeyInit, StreamCipher},
};
use ctr::CtrCore;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes192Ctr = ctr::Ctr128BE<Aes192>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// AES-CTR context shared by every sample of one file.
///
/// The key schedule is expanded once, each sample only starts a new counter from its IV.
pub enum SampleCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl SampleCipher {
    pub fn new(key: &ContentKey) -> Result<Self> {
        let key = key.as_bytes();
        let invalid = |_| Error::token(format!("unsupported key length {}", key.len()));

        Ok(match key.len() {
            16 => Self::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
            24 => Self::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
            32 => Self::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
            len => return Err(Error::token(format!("unsupported key length {len}"))),
        })
    }

    /// Decrypt one sample in place, the counter block starts at `iv`.
    ///
    /// Only the counter is set up here, the expanded key schedule is cloned.
    pub fn apply(&self, iv: &[u8; 16], data: &mut [u8]) {
        match self {
            Self::Aes128(cipher) => {
                Aes128Ctr::from_core(CtrCore::inner_iv_init(cipher.clone(), iv.into()))
                    .apply_keystream(data)
            }
            Self::Aes192(cipher) => {
                Aes192Ctr::from_core(CtrCore::inner_iv_init(cipher.clone(), iv.into()))
                    .apply_keystream(data)
            }
            Self::Aes256(cipher) => {
                Aes256Ctr::from_core(CtrCore::inner_iv_init(cipher.clone(), iv.into()))
                    .apply_keystream(data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(bytes: &[u8]) -> ContentKey {
        ContentKey::from_bytes(bytes.to_vec()).unwrap()
    }

    impl SampleCipher {
        fn decrypt_sample(&self, iv: &[u8; 16], data_in: &[u8]) -> Vec<u8> {
            let mut data_out = data_in.to_vec();
            self.apply(iv, &mut data_out);
            data_out
        }
    }

    #[test]
    fn known_answer_aes_128_ctr() {
        let cipher = SampleCipher::new(&key(&(0..16).collect::<Vec<u8>>())).unwrap();
        let mut iv = [0; 16];
        iv[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(cipher.decrypt_sample(&iv, b"abcd"), vec![121, 216, 10, 223]);
        assert_eq!(cipher.decrypt_sample(&iv, &[121, 216, 10, 223]), b"abcd");
    }

    #[test]
    fn length_is_preserved() {
        let cipher = SampleCipher::new(&key(&[7; 32])).unwrap();
        for len in [0, 1, 15, 16, 17, 100] {
            assert_eq!(cipher.decrypt_sample(&[0; 16], &vec![0; len]).len(), len);
        }
    }

    #[test]
    fn aes_192_and_256() {
        let iv = [9; 16];
        let data = b"the same plaintext".to_vec();

        let aes192 = SampleCipher::new(&key(&[1; 24])).unwrap();
        let aes256 = SampleCipher::new(&key(&[1; 32])).unwrap();
        assert!(matches!(aes192, SampleCipher::Aes192(_)));
        assert!(matches!(aes256, SampleCipher::Aes256(_)));
        assert_ne!(aes192.decrypt_sample(&iv, &data), aes256.decrypt_sample(&iv, &data));
        assert_eq!(
            aes256.decrypt_sample(&iv, &aes256.decrypt_sample(&iv, &data)),
            data
        );
    }

    #[test]
    fn every_sample_restarts_the_counter() {
        let cipher = SampleCipher::new(&key(&(0..16).collect::<Vec<u8>>())).unwrap();
        let mut iv = [0; 16];
        iv[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut first = *b"abcd";
        let mut second = *b"abcd";
        cipher.apply(&iv, &mut first);
        cipher.apply(&iv, &mut second);
        assert_eq!(first, [121, 216, 10, 223]);
        assert_eq!(first, second);
    }
}
