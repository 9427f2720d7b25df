//! §2.1.0 Overview — CLI: sign a query string → print the token
//! - Params from argv, or stdin when the argument is `-`
//! - Optional explicit method/window/seeds for reproducible output
//! - TTY-aware output (banner on a terminal, bare token otherwise)

/* =============================================================================
 * ABSIGN — ABSIGN_sign.rs — Program v2.0.0
 * Numbering: Sections §2.X.0, Subsections §2.X.Y (code-only labels)
 * =============================================================================
 */

// ============================================================================
// §2.2.0 Imports
// ============================================================================
use anyhow::{bail, Context, Result};
use std::io::Read;

use absign::signer::{now_ms, window_jitter, Signer};

// ============================================================================
// §2.3.0 main: CLI Signing Flow
// ============================================================================
fn main() -> Result<()> {
    /* §2.3.1 parse args (flag stripping, positional params last) */
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();

    let mut method = "GET".to_string();
    if let Some(pos) = args.iter().position(|a| a == "--method") {
        if pos + 1 >= args.len() {
            bail!("--method needs a value");
        }
        method = args.remove(pos + 1);
        args.remove(pos);
    }

    let mut fingerprint: Option<String> = None;
    if let Some(pos) = args.iter().position(|a| a == "--fingerprint") {
        if pos + 1 >= args.len() {
            bail!("--fingerprint needs a value");
        }
        fingerprint = Some(args.remove(pos + 1));
        args.remove(pos);
    }

    let mut platform: Option<String> = None;
    if let Some(pos) = args.iter().position(|a| a == "--platform") {
        if pos + 1 >= args.len() {
            bail!("--platform needs a value");
        }
        platform = Some(args.remove(pos + 1));
        args.remove(pos);
    }

    let mut window: Option<(u64, u64)> = None;
    if let Some(pos) = args.iter().position(|a| a == "--window") {
        if pos + 2 >= args.len() {
            bail!("--window needs <start_ms> <end_ms>");
        }
        let end: u64 = args.remove(pos + 2).parse().context("--window end")?;
        let start: u64 = args.remove(pos + 1).parse().context("--window start")?;
        args.remove(pos);
        window = Some((start, end));
    }

    let mut seeds: Option<[u32; 3]> = None;
    if let Some(pos) = args.iter().position(|a| a == "--seeds") {
        if pos + 3 >= args.len() {
            bail!("--seeds needs three integers");
        }
        let c: u32 = args.remove(pos + 3).parse().context("--seeds third")?;
        let b: u32 = args.remove(pos + 2).parse().context("--seeds second")?;
        let a: u32 = args.remove(pos + 1).parse().context("--seeds first")?;
        args.remove(pos);
        seeds = Some([a, b, c]);
    }

    let params_arg = args.first().cloned().context(
        "Usage: ABSIGN_sign [--method M] [--fingerprint FP | --platform P] \
         [--window START END] [--seeds A B C] <params | ->",
    )?;

    /* §2.3.2 params: argv or stdin */
    let params = if params_arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read params from stdin")?;
        buf.trim_end_matches(['\r', '\n']).to_string()
    } else {
        params_arg
    };

    /* §2.3.3 signer selection */
    let signer = match (fingerprint, platform) {
        (Some(fp), _) => Signer::with_fingerprint(fp),
        (None, Some(p)) => Signer::for_platform(&p, &mut rand::thread_rng()),
        (None, None) => Signer::new(),
    };

    /* §2.3.4 sign */
    let token = if method == "GET" && window.is_none() && seeds.is_none() {
        signer.sign(&params)?
    } else {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let (start, end) = window.unwrap_or_else(|| {
            let start = now_ms();
            (start, start + window_jitter(&mut rng))
        });
        let seeds = seeds.unwrap_or_else(|| {
            [
                rng.gen_range(0..10000),
                rng.gen_range(0..10000),
                rng.gen_range(0..10000),
            ]
        });
        signer.sign_with(&params, &method, start, end, seeds)?
    };

    /* §2.3.5 output (TTY banner vs bare token) */
    if atty::is(atty::Stream::Stdout) {
        println!("✅ Signed ({} bytes of params)\ntoken: {token}", params.len());
    } else {
        println!("{token}");
    }
    Ok(())
}
