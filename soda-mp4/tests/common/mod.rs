#![allow(dead_code)]

use aes::cipher::{KeyIvInit, StreamCipher};
use base64::Engine;

pub const KEY_128: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];
/// `PlayAuth` token carrying [`KEY_128`].
pub const TOKEN_128: &str = "nL8T+VS+E/dbvhz1VLkc91W6EvVapRLcW6UT3lqiE9xZoA==";

pub fn mp4_box(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut data = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    data.extend_from_slice(name);
    data.extend_from_slice(payload);
    data
}

/// Encrypt (or decrypt) one sample the way the platform does.
pub fn encrypt_sample(key: &[u8], iv: &[u8; 8], data: &[u8]) -> Vec<u8> {
    let mut block = [0; 16];
    block[..8].copy_from_slice(iv);

    let mut out = data.to_vec();
    match key.len() {
        16 => ctr::Ctr128BE::<aes::Aes128>::new(key.into(), (&block).into())
            .apply_keystream(&mut out),
        24 => ctr::Ctr128BE::<aes::Aes192>::new(key.into(), (&block).into())
            .apply_keystream(&mut out),
        32 => ctr::Ctr128BE::<aes::Aes256>::new(key.into(), (&block).into())
            .apply_keystream(&mut out),
        len => panic!("bad key length {len}"),
    }
    out
}

/// Build a `PlayAuth` token for `key`, the inverse of the key recovery.
pub fn seal_key(key: &[u8], skip: u8, padding: u8) -> String {
    let mut text = vec![b"0123456789abcdefghijklmnopqrstuvwxyz"[skip as usize]];
    text.extend(hex::encode(key).bytes());
    text.extend(std::iter::repeat_n(b'z', skip as usize));

    let mut inner: Vec<u8> = Vec::with_capacity(text.len());
    for (i, &t) in text.iter().enumerate() {
        let value = t + (i as u32).count_ones() as u8 + 21;
        let prev = match i {
            0 => 0xFA,
            1 => 0x55,
            _ => inner[i - 2],
        };
        inner.push(value ^ prev);
    }

    let mut raw = vec![padding.wrapping_add(48) ^ inner[0] ^ inner[1]];
    raw.extend(&inner);
    raw.extend((0..padding).map(|i| i.wrapping_mul(7).wrapping_add(3)));
    base64::engine::general_purpose::STANDARD.encode(raw)
}

/// Synthetic single track m4a with an encrypted audio sample entry.
#[derive(Clone)]
pub struct Container {
    /// Per sample sizes, written as a variable size table.
    pub sizes: Vec<u32>,
    /// Written instead of `sizes` when set: (fixed size, count).
    pub fixed_size: Option<(u32, u32)>,
    pub ivs: Vec<[u8; 8]>,
    /// Add an empty subsample map after every IV.
    pub subsamples: bool,
    /// Place senc directly in moov instead of stbl.
    pub senc_in_moov: bool,
    /// Extra senc left in stbl when `senc_in_moov` is set.
    pub stbl_ivs: Option<Vec<[u8; 8]>>,
    pub entry: [u8; 4],
    pub mdat: Vec<u8>,
    /// Leave this box out of the tree.
    pub omit: Option<&'static str>,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            fixed_size: None,
            ivs: Vec::new(),
            subsamples: false,
            senc_in_moov: false,
            stbl_ivs: None,
            entry: *b"enca",
            mdat: Vec::new(),
            omit: None,
        }
    }
}

impl Container {
    /// Samples encrypted with `key`, one IV per sample.
    pub fn encrypted(key: &[u8], samples: &[&[u8]]) -> Self {
        let ivs = (0..samples.len())
            .map(|i| [i as u8 + 1, 0xa5, 0x5a, i as u8, 0, 0, 0, 0])
            .collect::<Vec<_>>();

        let mdat = samples
            .iter()
            .zip(&ivs)
            .flat_map(|(sample, iv)| encrypt_sample(key, iv, sample))
            .collect();

        Self {
            sizes: samples.iter().map(|s| s.len() as u32).collect(),
            ivs,
            mdat,
            ..Default::default()
        }
    }

    fn node(&self, name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        if self.omit.is_some_and(|omit| omit.as_bytes() == name) {
            Vec::new()
        } else {
            mp4_box(name, payload)
        }
    }

    fn stsz(&self) -> Vec<u8> {
        let mut payload = vec![0; 4];
        match self.fixed_size {
            Some((size, count)) => {
                payload.extend(size.to_be_bytes());
                payload.extend(count.to_be_bytes());
            }
            None => {
                payload.extend(0u32.to_be_bytes());
                payload.extend((self.sizes.len() as u32).to_be_bytes());
                for size in &self.sizes {
                    payload.extend(size.to_be_bytes());
                }
            }
        }
        self.node(b"stsz", &payload)
    }

    fn senc(&self, ivs: &[[u8; 8]]) -> Vec<u8> {
        let flags: u32 = if self.subsamples { 0x02 } else { 0 };
        let mut payload = flags.to_be_bytes().to_vec();
        payload.extend((ivs.len() as u32).to_be_bytes());
        for iv in ivs {
            payload.extend(iv);
            if self.subsamples {
                payload.extend(1u16.to_be_bytes());
                payload.extend([0, 0, 0, 0, 0, 0]);
            }
        }
        self.node(b"senc", &payload)
    }

    fn stsd(&self) -> Vec<u8> {
        // reserved(6) + data_reference_index(2) + version .. sample_rate(20)
        let mut entry = vec![0; 28];
        let mut sinf = mp4_box(b"frma", b"mp4a");
        sinf.extend(mp4_box(b"schm", &[0, 0, 0, 0, b'c', b'e', b'n', b'c', 0, 1, 0, 0]));
        entry.extend(mp4_box(b"sinf", &sinf));

        let mut payload = vec![0, 0, 0, 0, 0, 0, 0, 1];
        payload.extend(mp4_box(&self.entry, &entry));
        self.node(b"stsd", &payload)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut stbl = self.stsd();
        stbl.extend(mp4_box(b"stts", &[0; 8]));
        stbl.extend(self.stsz());
        stbl.extend(mp4_box(b"stco", &[0; 8]));
        if !self.senc_in_moov {
            stbl.extend(self.senc(&self.ivs));
        } else if let Some(ivs) = &self.stbl_ivs {
            stbl.extend(self.senc(ivs));
        }

        let mut minf = mp4_box(b"smhd", &[0; 8]);
        minf.extend(self.node(b"stbl", &stbl));

        let mut mdia = mp4_box(b"mdhd", &[0; 24]);
        mdia.extend(mp4_box(b"hdlr", b"\0\0\0\0\0\0\0\0soun"));
        mdia.extend(self.node(b"minf", &minf));

        let mut trak = mp4_box(b"tkhd", &[0; 84]);
        trak.extend(self.node(b"mdia", &mdia));

        let mut moov = mp4_box(b"mvhd", &[0; 100]);
        moov.extend(self.node(b"trak", &trak));
        if self.senc_in_moov {
            moov.extend(self.senc(&self.ivs));
        }

        let mut data = mp4_box(b"ftyp", b"M4A \0\0\0\0M4A mp42isom");
        data.extend(self.node(b"moov", &moov));
        data.extend(mp4_box(b"free", &[0; 4]));
        data.extend(self.node(b"mdat", &self.mdat));
        data
    }
}

/// Offset of the first occurrence of `needle`.
pub fn find(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).position(|window| window == needle)
}

/// Payload of the top level mdat box.
pub fn mdat_payload(data: &[u8]) -> &[u8] {
    let start = find(data, b"mdat").expect("mdat") + 4;
    &data[start..]
}
