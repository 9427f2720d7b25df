// src/encoding.rs
//
// Base64 variant with a truncation rule that differs from RFC 4648:
// a trailing 2-byte group emits 3 symbols and a trailing 1-byte group
// emits 2 (symbols that would encode only zero padding are withheld),
// then `=` pads the total symbol count to a multiple of 4. Alphabets
// are selectable; the default pipeline uses `S4`.

use anyhow::{bail, Result};

/// Standard table (with its historical trailing `=`, which never indexes).
pub const S0: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";
pub const S1: &[u8] = b"Dkdpgh4ZKsQB80/Mfvw36XI1R25+WUAlEi7NLboqYTOPuzmFjJnryx9HVGcaStCe=";
pub const S2: &[u8] = b"Dkdpgh4ZKsQB80/Mfvw36XI1R25-WUAlEi7NLboqYTOPuzmFjJnryx9HVGcaStCe=";
pub const S3: &[u8] = b"ckdp1h4ZKsUB80/Mfvw36XIgR25+WQAlEi7NLboqYTOPuzmFjJnryx9HVGcaStCe";
/// Default token alphabet.
pub const S4: &[u8] = b"Dkdpgh2ZmsQB80/MfvV36XI1R45-WUAlEixNLwoqYTOPuzKFjJnry79HbGcaStCe";

/// Encode `data` over the first 64 symbols of `alphabet`.
pub fn encode(data: &[u8], alphabet: &[u8]) -> Result<String> {
    if alphabet.len() < 64 {
        bail!("alphabet must carry at least 64 symbols (got {})", alphabet.len());
    }

    let mut out = Vec::with_capacity(data.len().div_ceil(3) * 4);
    for group in data.chunks(3) {
        let n = ((group[0] as u32) << 16)
            | ((*group.get(1).unwrap_or(&0) as u32) << 8)
            | (*group.get(2).unwrap_or(&0) as u32);
        out.push(alphabet[((n >> 18) & 63) as usize]);
        out.push(alphabet[((n >> 12) & 63) as usize]);
        if group.len() > 1 {
            out.push(alphabet[((n >> 6) & 63) as usize]);
        }
        if group.len() > 2 {
            out.push(alphabet[(n & 63) as usize]);
        }
    }
    let pad = (4 - out.len() % 4) % 4;
    out.resize(out.len() + pad, b'=');

    String::from_utf8(out).map_err(|_| anyhow::anyhow!("alphabet is not ASCII"))
}

/// Inverse transform: undoes the truncation rule and `=` padding.
pub fn decode(text: &str, alphabet: &[u8]) -> Result<Vec<u8>> {
    if alphabet.len() < 64 {
        bail!("alphabet must carry at least 64 symbols (got {})", alphabet.len());
    }
    let bytes = text.as_bytes();
    if bytes.len() % 4 != 0 {
        bail!("encoded length {} is not a multiple of 4", bytes.len());
    }

    let mut table = [-1i16; 256];
    for (i, &sym) in alphabet[..64].iter().enumerate() {
        table[sym as usize] = i as i16;
    }

    // strip trailing '=' (at most 2), reject interior '='
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b'=' {
        end -= 1;
    }
    if bytes.len() - end > 2 {
        bail!("more than two padding symbols");
    }
    let body = &bytes[..end];
    if body.contains(&b'=') {
        bail!("padding symbol inside encoded body");
    }
    if body.len() % 4 == 1 {
        bail!("truncated group of one symbol cannot decode");
    }

    let mut out = Vec::with_capacity(body.len() / 4 * 3 + 2);
    for group in body.chunks(4) {
        let mut n = 0u32;
        for (i, &sym) in group.iter().enumerate() {
            let v = table[sym as usize];
            if v < 0 {
                bail!("symbol {:?} not in alphabet", sym as char);
            }
            n |= (v as u32) << (18 - 6 * i);
        }
        out.push(((n >> 16) & 255) as u8);
        if group.len() > 2 {
            out.push(((n >> 8) & 255) as u8);
        }
        if group.len() > 3 {
            out.push((n & 255) as u8);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_triple_is_first_symbol_repeated() {
        assert_eq!(encode(&[0, 0, 0], S4).unwrap(), "DDDD");
    }

    #[test]
    fn exact_output_lengths() {
        // (input len, output len, symbols) for L = 0..=6 over S4
        let expected = [
            (0usize, ""),
            (1, "DD=="),
            (2, "DDg="),
            (3, "DDgd"),
            (4, "DDgdDj=="),
            (5, "DDgdDjf="),
            (6, "DDgdDjfh"),
        ];
        for (len, text) in expected {
            let data: Vec<u8> = (0..len as u8).collect();
            let encoded = encode(&data, S4).unwrap();
            assert_eq!(encoded, text, "input length {len}");
            assert_eq!(encoded.len() % 4, 0);
        }
    }

    #[test]
    fn roundtrip_all_residues() {
        // lengths covering 0, 1, 2 mod 3
        for data in [
            &b""[..],
            b"f",
            b"fo",
            b"foo",
            b"foob",
            b"fooba",
            b"foobar",
            b"\x00\xff\x80\x7f binary-ish",
        ] {
            for alphabet in [S0, S1, S2, S3, S4] {
                let encoded = encode(data, alphabet).unwrap();
                let decoded = decode(&encoded, alphabet).unwrap();
                assert_eq!(decoded, data);
            }
        }
    }

    #[test]
    fn no_padding_for_multiple_of_three() {
        let encoded = encode(b"abcdef", S4).unwrap();
        assert!(!encoded.contains('='));
        assert_eq!(encoded.len(), 8);
    }

    #[test]
    fn short_alphabet_rejected() {
        assert!(encode(b"abc", b"tooshort").is_err());
        assert!(decode("DDDD", b"tooshort").is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("DDD", S4).is_err()); // bad length
        assert!(decode("D=DD", S4).is_err()); // interior padding
        assert!(decode("!!!!", S4).is_err()); // foreign symbols
    }
}
