//! §1.1.0 Overview — signature assembly core
//! - Double SM3 over method/params (+"cus" tag)
//! - 44-byte record + fingerprint + XOR checksum
//! - RC4 pass under the fixed single-byte key
//! - 12-byte entropy header, then the s4 alphabet encode

/* =============================================================================
 * ABSIGN — signer.rs — Program v1.0.0
 * Numbering: Program=1.0.0, Sections=§1.X.0, Subsections=§1.X.Y
 * =============================================================================
 */

// ============================================================================
// §1.2.0 Imports & Constants
// ============================================================================
use anyhow::Result;
use rand::Rng;

use crate::encoding;
use crate::rc4;
use crate::record::{self, entropy_header, fresh_seed, Record, DEFAULT_FINGERPRINT};
use crate::sm3;

/// Tag appended to method/params before hashing.
pub const END_SUFFIX: &str = "cus";

/// Fixed stream-cipher key (the literal character `y`).
pub const CIPHER_KEY: &[u8] = b"y";

// ============================================================================
// §1.3.0 Small Helpers
// ============================================================================

/* §1.3.1 now_ms: wall clock, milliseconds */
#[inline]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/* §1.3.2 window_jitter: default end-of-window offset, 4..=8 ms */
#[inline]
pub fn window_jitter(rng: &mut impl Rng) -> u64 {
    rng.gen_range(4..=8)
}

// ============================================================================
// §1.4.0 Signer
// ============================================================================

/* §1.4.1 Signer struct */
/// One signer per fingerprint. Every call builds fresh hash/cipher state,
/// so independent calls never share mutable state.
pub struct Signer {
    fingerprint: String,
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer {
    /* §1.4.2 constructors */
    pub fn new() -> Self {
        Self { fingerprint: DEFAULT_FINGERPRINT.to_string() }
    }

    pub fn with_fingerprint(fingerprint: impl Into<String>) -> Self {
        Self { fingerprint: fingerprint.into() }
    }

    /// Generated screen geometry for `platform` (e.g. "Win32").
    pub fn for_platform(platform: &str, rng: &mut impl Rng) -> Self {
        Self { fingerprint: record::browser_info(platform, rng) }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /* §1.4.3 sign: stock entry point (GET, now, fresh entropy) */
    pub fn sign(&self, params: &str) -> Result<String> {
        let mut rng = rand::thread_rng();
        let window_start = now_ms();
        let window_end = window_start + window_jitter(&mut rng);
        let seeds = [
            fresh_seed(&mut rng),
            fresh_seed(&mut rng),
            fresh_seed(&mut rng),
        ];
        self.sign_with(params, "GET", window_start, window_end, seeds)
    }

    /* §1.4.4 sign_with: fully explicit, deterministic */
    /// Deterministic form: identical inputs (seeds included) always yield
    /// the identical token.
    pub fn sign_with(
        &self,
        params: &str,
        method: &str,
        window_start: u64,
        window_end: u64,
        seeds: [u32; 3],
    ) -> Result<String> {
        let params_hash = sm3::digest2(format!("{params}{END_SUFFIX}").as_bytes());
        let method_hash = sm3::digest2(format!("{method}{END_SUFFIX}").as_bytes());

        let record = Record {
            window_start,
            window_end,
            params_hash,
            method_hash,
            fingerprint_len: self.fingerprint.len() as u8,
        }
        .encode();

        let mut body = Vec::with_capacity(record.len() + self.fingerprint.len() + 1);
        body.extend_from_slice(&record);
        body.extend_from_slice(self.fingerprint.as_bytes());
        body.push(record::checksum(&record));

        let ciphertext = rc4::apply(&body, CIPHER_KEY)?;

        let mut payload = Vec::with_capacity(12 + ciphertext.len());
        payload.extend_from_slice(&entropy_header(seeds));
        payload.extend_from_slice(&ciphertext);

        encoding::encode(&payload, encoding::S4)
    }
}
