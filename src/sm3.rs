// src/sm3.rs
//
// SM3-family compression core (nonstandard padding variant).
// - 8×u32 state, 64-byte blocks, 132-word message schedule, 64 rounds
// - Pad target is 60 bytes + a 32-bit big-endian bit-length field,
//   NOT the textbook 64-bit field. The rest of the pipeline depends on
//   this bit-exactly; do not widen it.
// - One-shot digests only: every digest() starts from reset(). There is
//   no multi-call incremental write in this system.

/// Initial hash state.
const IV: [u32; 8] = [
    0x7380166F, 0x4914B2B9, 0x172442D7, 0xDA8A0600,
    0xA96F30BC, 0x163138AA, 0xE38DEE4D, 0xB0FB0E4E,
];

/// Round constant: one value for rounds 0..16, another for 16..64.
#[inline(always)]
fn t(j: usize) -> u32 {
    if j < 16 { 0x79CC4519 } else { 0x7A879D8A }
}

/// Boolean mixing 1: XOR for the first 16 rounds, majority after.
#[inline(always)]
fn ff(j: usize, x: u32, y: u32, z: u32) -> u32 {
    assert!(j < 64, "round index out of range");
    if j < 16 { x ^ y ^ z } else { (x & y) | (x & z) | (y & z) }
}

/// Boolean mixing 2: XOR for the first 16 rounds, choose after.
#[inline(always)]
fn gg(j: usize, x: u32, y: u32, z: u32) -> u32 {
    assert!(j < 64, "round index out of range");
    if j < 16 { x ^ y ^ z } else { (x & y) | (!x & z) }
}

/// Expand one 64-byte block into the 132-word schedule.
/// Words 0..68 feed the additive term, 68..132 are the pairwise XORs
/// `w[n-68] ^ w[n-64]` used as the schedule-only term.
fn schedule(block: &[u8; 64]) -> [u32; 132] {
    let mut w = [0u32; 132];
    for i in 0..16 {
        w[i] = u32::from_be_bytes([
            block[4 * i], block[4 * i + 1], block[4 * i + 2], block[4 * i + 3],
        ]);
    }
    for n in 16..68 {
        let mut a = w[n - 16] ^ w[n - 9] ^ w[n - 3].rotate_left(15);
        a = a ^ a.rotate_left(15) ^ a.rotate_left(23);
        w[n] = a ^ w[n - 13].rotate_left(7) ^ w[n - 6];
    }
    for n in 68..132 {
        w[n] = w[n - 68] ^ w[n - 64];
    }
    w
}

/// Running digest state. One instance per computation; `digest` resets
/// on entry so a reused instance behaves exactly like a fresh one.
pub struct Sm3 {
    reg: [u32; 8],
    chunk: Vec<u8>,
    size: usize,
}

impl Default for Sm3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sm3 {
    pub fn new() -> Self {
        Self { reg: IV, chunk: Vec::new(), size: 0 }
    }

    pub fn reset(&mut self) {
        self.reg = IV;
        self.chunk.clear();
        self.size = 0;
    }

    /// Record the input. Complete leading 64-byte chunks are compressed
    /// immediately; the last chunk (even when it is exactly 64 bytes)
    /// stays in the pending buffer for `pad` to finish.
    pub fn write(&mut self, data: &[u8]) {
        self.size = data.len();
        if data.len() <= 64 {
            self.chunk.clear();
            self.chunk.extend_from_slice(data);
            return;
        }
        let mut off = 0usize;
        while data.len() - off > 64 {
            let block: &[u8; 64] = data[off..off + 64].try_into().unwrap();
            self.compress(block);
            off += 64;
        }
        self.chunk.clear();
        self.chunk.extend_from_slice(&data[off..]);
    }

    /// Append 0x80, zero-fill to `target` bytes, then the 32-bit
    /// big-endian bit length (wrapping). When the pending buffer already
    /// holds 60..=64 bytes the result runs past one block; only the first
    /// 64 bytes reach `compress`, so the tail of the length field (or all
    /// of it) drops out of the digest. That lossy behavior is part of the
    /// fixed algorithm — tokens for those input lengths depend on it.
    pub fn pad(&mut self, target: usize) {
        let bits = (self.size as u64).wrapping_mul(8) as u32;
        self.chunk.push(0x80);
        while self.chunk.len() < target {
            self.chunk.push(0);
        }
        self.chunk.extend_from_slice(&bits.to_be_bytes());
        assert!(self.chunk.len() >= 64, "padded buffer is short of one block");
    }

    pub fn compress(&mut self, block: &[u8; 64]) {
        let w = schedule(block);
        let mut v = self.reg;
        for j in 0..64 {
            let c = (v[0]
                .rotate_left(12)
                .wrapping_add(v[4])
                .wrapping_add(t(j).rotate_left((j % 32) as u32)))
            .rotate_left(7);
            let s = c ^ v[0].rotate_left(12);

            let u = ff(j, v[0], v[1], v[2])
                .wrapping_add(v[3])
                .wrapping_add(s)
                .wrapping_add(w[j + 68]);
            let b = gg(j, v[4], v[5], v[6])
                .wrapping_add(v[7])
                .wrapping_add(c)
                .wrapping_add(w[j]);

            v[3] = v[2];
            v[2] = v[1].rotate_left(9);
            v[1] = v[0];
            v[0] = u;
            v[7] = v[6];
            v[6] = v[5].rotate_left(19);
            v[5] = v[4];
            v[4] = b ^ b.rotate_left(9) ^ b.rotate_left(17);
        }
        for (r, vi) in self.reg.iter_mut().zip(v.iter()) {
            *r ^= vi;
        }
    }

    /// Serialize the state, big-endian per word.
    pub fn extract(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, r) in self.reg.iter().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&r.to_be_bytes());
        }
        out
    }

    /// One-shot digest: reset → write → pad(60) → compress → extract.
    /// Compresses exactly one block; padding bytes past the 64th are
    /// discarded (see `pad`).
    pub fn digest(&mut self, data: &[u8]) -> [u8; 32] {
        self.reset();
        self.write(data);
        self.pad(60);
        let block: [u8; 64] = self.chunk[..64].try_into().expect("padded block");
        self.compress(&block);
        self.extract()
    }
}

/// Convenience one-shot digest.
pub fn digest(data: &[u8]) -> [u8; 32] {
    Sm3::new().digest(data)
}

/// Double digest: the 32 raw bytes of the first pass feed the second.
pub fn digest2(data: &[u8]) -> [u8; 32] {
    let first = digest(data);
    digest(&first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn vector_empty() {
        assert_eq!(
            hex(&digest(b"")),
            "1ab21d8355cfa17f8e61194831e81a8f22bec8c728fefb747ed035eb5082aa2b"
        );
    }

    #[test]
    fn vector_abc() {
        assert_eq!(
            hex(&digest(b"abc")),
            "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"
        );
    }

    #[test]
    fn reset_matches_fresh_instance() {
        let mut engine = Sm3::new();
        engine.digest(b"warm it up first");
        let reused = engine.digest(b"abc");
        let fresh = Sm3::new().digest(b"abc");
        assert_eq!(reused, fresh);
    }

    #[test]
    fn double_digest_chains_raw_bytes() {
        let inner = digest(b"GETcus");
        assert_eq!(digest2(b"GETcus"), digest(&inner));
    }

    #[test]
    fn long_input_compresses_leading_chunks() {
        // 130 bytes: two full blocks compressed in write, 2-byte remainder
        // padded. Deterministic and stable across instances.
        let data = vec![0xA5u8; 130];
        assert_eq!(digest(&data), Sm3::new().digest(&data));
    }

    #[test]
    fn pending_buffer_never_exceeds_block() {
        let mut engine = Sm3::new();
        engine.write(&vec![7u8; 200]);
        assert!(engine.chunk.len() <= 64);
        engine.write(&vec![7u8; 128]);
        // exact multiple: the final 64-byte chunk is retained, not compressed
        assert_eq!(engine.chunk.len(), 64);
    }

    #[test]
    fn overlong_pad_drops_trailing_length_bytes() {
        // Pending buffers of 60..=64 bytes overrun the block; only the
        // first 64 padded bytes are digested. Pinned values keep that
        // residue class stable.
        assert_eq!(
            hex(&digest(&[b'a'; 60])),
            "04ebb577e32e2f5b197f4ff52223e86a39731b0271c044ce7ae5d19f3d6605de"
        );
        // exact block multiple: the retained 64-byte chunk is digested
        // with no padding material at all
        assert_eq!(
            hex(&digest(&[b'b'; 64])),
            "b1b04b48db5495ddad7d806a6115c65bfb5bb8b9f245978c8cf0ae8bb924ae0b"
        );
        assert_eq!(
            hex(&digest(&[b'b'; 128])),
            "ba6a926cd820ddad632d80d01c9f6339b7b24ea37f51e0923260bbde34098256"
        );
    }
}
