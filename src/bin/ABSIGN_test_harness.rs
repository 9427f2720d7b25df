//! §5.1.0 Overview — property/vector harness
//! - SM3 reference vectors, cipher involution sweep, encoder length grid,
//!   alphabet round-trips, token determinism and shape
//! Output: absign_harness.log (configurable via -log)

/* =============================================================================
 * ABSIGN — ABSIGN_test_harness.rs — Program v5.0.0
 * Numbering: Sections §5.X.0, Subsections §5.X.Y (code-only labels)
 * =============================================================================
 */

// ============================================================================
// §5.2.0 Imports
// ============================================================================
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use absign::encoding;
use absign::rc4;
use absign::signer::Signer;
use absign::sm3;

// ============================================================================
// §5.3.0 Params & CLI
// ============================================================================

/* §5.3.1 Params struct */
#[derive(Clone)]
struct Params {
    n_cipher_cases: usize,
    max_plaintext: usize,
    seed: u64,
    log_path: String,
}

/* §5.3.2 parse_args: CLI → Params */
fn parse_args() -> Params {
    let mut p = Params {
        n_cipher_cases: 64,
        max_plaintext: 512,
        seed: 0xC0DEFACE12345678u64,
        log_path: "absign_harness.log".to_string(),
    };
    let it = env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < it.len() {
        match it[i].as_str() {
            "-cases" if i + 1 < it.len() => {
                p.n_cipher_cases = it[i + 1].parse().unwrap_or(p.n_cipher_cases);
                i += 2;
            }
            "-maxlen" if i + 1 < it.len() => {
                p.max_plaintext = it[i + 1].parse().unwrap_or(p.max_plaintext);
                i += 2;
            }
            "-seed" if i + 1 < it.len() => {
                p.seed = it[i + 1].parse().unwrap_or(p.seed);
                i += 2;
            }
            "-log" if i + 1 < it.len() => {
                p.log_path = it[i + 1].clone();
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }
    p
}

// ============================================================================
// §5.4.0 Deterministic byte source (splitmix64)
// ============================================================================

/* §5.4.1 Splitmix struct */
struct Splitmix(u64);

impl Splitmix {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            out.extend_from_slice(&self.next().to_le_bytes());
        }
        out.truncate(len);
        out
    }
}

// ============================================================================
// §5.5.0 Checks
// ============================================================================

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/* §5.5.1 sm3 reference vectors */
fn check_sm3(log: &mut impl Write, fails: &mut usize) -> Result<()> {
    let cases: [(&[u8], &str); 2] = [
        (b"", "1ab21d8355cfa17f8e61194831e81a8f22bec8c728fefb747ed035eb5082aa2b"),
        (b"abc", "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"),
    ];
    for (input, want) in cases {
        let got = hex(&sm3::digest(input));
        let ok = got == want;
        if !ok {
            *fails += 1;
        }
        writeln!(
            log,
            "[sm3] input={:?} got={} want={} {}",
            String::from_utf8_lossy(input),
            got,
            want,
            if ok { "OK" } else { "FAIL" }
        )?;
    }
    Ok(())
}

/* §5.5.2 cipher involution sweep */
fn check_cipher(p: &Params, log: &mut impl Write, fails: &mut usize) -> Result<()> {
    let mut src = Splitmix(p.seed);
    for case in 0..p.n_cipher_cases {
        let key_len = 1 + (src.next() as usize % 16);
        let key = src.bytes(key_len);
        let pt_len = src.next() as usize % p.max_plaintext.max(1);
        let pt = src.bytes(pt_len);
        let ct = rc4::apply(&pt, &key)?;
        let rt = rc4::apply(&ct, &key)?;
        let ok = rt == pt && ct.len() == pt.len();
        if !ok {
            *fails += 1;
            writeln!(log, "[rc4] case={case} key_len={key_len} pt_len={pt_len} FAIL")?;
        }
    }
    writeln!(log, "[rc4] {} involution cases swept", p.n_cipher_cases)?;
    Ok(())
}

/* §5.5.3 encoder length grid + round-trips */
fn check_encoder(log: &mut impl Write, fails: &mut usize) -> Result<()> {
    let grid = [(0usize, 0usize), (1, 4), (2, 4), (3, 4), (4, 8), (5, 8), (6, 8)];
    for (input_len, want) in grid {
        let data: Vec<u8> = (0..input_len as u8).collect();
        let encoded = encoding::encode(&data, encoding::S4)?;
        let ok = encoded.len() == want && encoded.len() % 4 == 0;
        if !ok {
            *fails += 1;
        }
        writeln!(
            log,
            "[encode] len={input_len} out={} want={want} {}",
            encoded.len(),
            if ok { "OK" } else { "FAIL" }
        )?;
    }
    let mut src = Splitmix(0x5EED_5EED_5EED_5EED);
    for len in 0..48usize {
        let data = src.bytes(len);
        for alphabet in [encoding::S0, encoding::S1, encoding::S2, encoding::S3, encoding::S4] {
            let decoded = encoding::decode(&encoding::encode(&data, alphabet)?, alphabet)?;
            if decoded != data {
                *fails += 1;
                writeln!(log, "[encode] roundtrip len={len} FAIL")?;
            }
        }
    }
    writeln!(log, "[encode] round-trips swept over all five alphabets")?;
    Ok(())
}

/* §5.5.4 token determinism + shape */
fn check_token(log: &mut impl Write, fails: &mut usize) -> Result<()> {
    let params = "device_platform=webapp&aid=6383&channel=channel_pc_web";
    let a = Signer::new().sign_with(params, "GET", 1_700_000_000_000, 1_700_000_000_005, [4444, 5555, 6666])?;
    let b = Signer::new().sign_with(params, "GET", 1_700_000_000_000, 1_700_000_000_005, [4444, 5555, 6666])?;
    let deterministic = a == b;
    let body = a.trim_end_matches('=');
    let shape = !a.is_empty()
        && a.len() % 4 == 0
        && body.bytes().all(|c| encoding::S4.contains(&c));
    if !deterministic || !shape {
        *fails += 1;
    }
    writeln!(
        log,
        "[token] len={} deterministic={deterministic} shape={shape} {}",
        a.len(),
        if deterministic && shape { "OK" } else { "FAIL" }
    )?;
    Ok(())
}

// ============================================================================
// §5.6.0 main
// ============================================================================
fn main() -> Result<()> {
    let p = parse_args();
    let file = File::create(&p.log_path)
        .with_context(|| format!("create log {}", p.log_path))?;
    let mut log = BufWriter::new(file);

    let mut fails = 0usize;
    check_sm3(&mut log, &mut fails)?;
    check_cipher(&p, &mut log, &mut fails)?;
    check_encoder(&mut log, &mut fails)?;
    check_token(&mut log, &mut fails)?;

    writeln!(log, "== summary: {} failure(s) ==", fails)?;
    log.flush()?;

    println!(
        "harness done: {} failure(s), log written to {}",
        fails, p.log_path
    );
    if fails > 0 {
        std::process::exit(1);
    }
    Ok(())
}
