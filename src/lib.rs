//! absign — deterministic request-signature tokens.
//!
//! A single forward pipeline: double SM3-family hash over method/params,
//! a fixed-layout 44-byte record mixed with timestamp and fingerprint
//! bytes, an RC4 pass, and a truncation-sensitive base64 variant over a
//! custom 64-symbol alphabet. Every primitive is bit-exact by contract;
//! a single-bit deviation yields a different (silently invalid) token.

pub mod encoding;
pub mod rc4;
pub mod record;
pub mod signer;
pub mod sm3;

pub use signer::Signer;
