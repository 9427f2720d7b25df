// src/rc4.rs
//
// RC4 byte transform. Fresh permutation per call, consumed once.
// XOR-symmetric: apply == un-apply under the same key.

use anyhow::{bail, Result};

/// Apply the keystream to `data` under `key`. Keys of any length >= 1
/// are accepted; empty keys are rejected at the boundary.
pub fn apply(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        bail!("rc4 key must not be empty");
    }

    let mut s: [u8; 256] = core::array::from_fn(|i| i as u8);
    let mut j = 0usize;
    for i in 0..256 {
        j = (j + s[i] as usize + key[i % key.len()] as usize) % 256;
        s.swap(i, j);
    }

    let mut i = 0usize;
    j = 0;
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        i = (i + 1) % 256;
        j = (j + s[i] as usize) % 256;
        s.swap(i, j);
        let k = s[(s[i] as usize + s[j] as usize) % 256];
        out.push(k ^ byte);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involution() {
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let key = b"y";
        let ct = apply(plaintext, key).unwrap();
        let rt = apply(&ct, key).unwrap();
        assert_eq!(rt, plaintext);
    }

    #[test]
    fn involution_long_key() {
        let plaintext = vec![0x5Au8; 300];
        let key = b"a much longer key than the plaintext block size demands";
        let rt = apply(&apply(&plaintext, key).unwrap(), key).unwrap();
        assert_eq!(rt, plaintext);
    }

    #[test]
    fn five_byte_vector_under_y() {
        let ct = apply(b"hello", b"y").unwrap();
        assert_eq!(ct, [45, 225, 200, 46, 235]);
        // reproducible across calls
        assert_eq!(ct, apply(b"hello", b"y").unwrap());
        // and nowhere equal to the plaintext
        for (c, p) in ct.iter().zip(b"hello") {
            assert_ne!(c, p);
        }
    }

    #[test]
    fn empty_key_rejected() {
        assert!(apply(b"data", b"").is_err());
    }

    #[test]
    fn length_preserved() {
        for len in [0usize, 1, 44, 256, 1000] {
            let data = vec![3u8; len];
            assert_eq!(apply(&data, b"y").unwrap().len(), len);
        }
    }
}
