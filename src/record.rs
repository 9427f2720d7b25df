// src/record.rs
//
// Fixed-layout 44-byte record assembled before the cipher pass, plus the
// XOR checksum, the 12-byte entropy header groups, and the browser
// fingerprint material. Slot positions are load-bearing: the consumer
// reads every dynamic byte at a fixed offset.

use rand::Rng;

pub const RECORD_LEN: usize = 44;

/// Fingerprint for callers without a real browser context.
pub const DEFAULT_FINGERPRINT: &str =
    "1536|742|1536|864|0|0|0|0|1536|864|1536|864|1536|742|24|24|MacIntel";

/// Fixed 32-byte user-agent code table; only bytes 23 and 24 reach the
/// record (slots 10 and 20).
pub const UA_CODE: [u8; 32] = [
    76, 98, 15, 131, 97, 245, 224, 133, 122, 199, 241, 166, 79, 34, 90, 191,
    128, 126, 122, 98, 66, 11, 14, 40, 49, 110, 110, 173, 67, 96, 138, 252,
];

/// Dynamic inputs of the record; `encode` lays them into the template.
pub struct Record {
    pub window_start: u64,
    pub window_end: u64,
    pub params_hash: [u8; 32],
    pub method_hash: [u8; 32],
    pub fingerprint_len: u8,
}

impl Record {
    /// Position-for-position template fill. Constant marker bytes
    /// (44, 24, 1, 239, 14, 3, 1, 1) sit at their fixed slots.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let ws = self.window_start;
        let we = self.window_end;
        [
            44,
            (we >> 24) as u8,
            0,
            0,
            0,
            0,
            24,
            self.params_hash[21],
            self.method_hash[21],
            0,
            UA_CODE[23],
            (we >> 16) as u8,
            0,
            0,
            0,
            1,
            0,
            239,
            self.params_hash[22],
            self.method_hash[22],
            UA_CODE[24],
            (we >> 8) as u8,
            0,
            0,
            0,
            0,
            we as u8,
            0,
            0,
            14,
            (ws >> 24) as u8,
            (ws >> 16) as u8,
            0,
            (ws >> 8) as u8,
            ws as u8,
            3,
            (we >> 32) as u8,
            1,
            (ws >> 32) as u8,
            1,
            self.fingerprint_len,
            0,
            0,
            0,
        ]
    }
}

/// XOR fold over the record bytes.
pub fn checksum(record: &[u8; RECORD_LEN]) -> u8 {
    record.iter().fold(0, |acc, b| acc ^ b)
}

/// Map a seed to one 4-byte entropy group. Only the low 16 seed bits
/// reach the output; the or-pattern plants the group's marker bits.
pub fn entropy_group(seed: u32, ors: [u8; 4]) -> [u8; 4] {
    let lo = (seed & 255) as u8;
    let hi = ((seed >> 8) & 255) as u8;
    [
        lo & 170 | ors[0],
        lo & 85 | ors[1],
        hi & 170 | ors[2],
        hi & 85 | ors[3],
    ]
}

/// The three concrete groups, concatenated into the 12-byte header.
pub fn entropy_header(seeds: [u32; 3]) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[0..4].copy_from_slice(&entropy_group(seeds[0], [1, 2, 5, 40]));
    out[4..8].copy_from_slice(&entropy_group(seeds[1], [1, 0, 0, 0]));
    out[8..12].copy_from_slice(&entropy_group(seeds[2], [1, 0, 5, 0]));
    out
}

/// Fresh seed in the range the stock generator draws from.
pub fn fresh_seed(rng: &mut impl Rng) -> u32 {
    rng.gen_range(0..10000)
}

/// Generate a plausible 17-field pipe-joined geometry string for
/// `platform` (e.g. "Win32", "MacIntel").
pub fn browser_info(platform: &str, rng: &mut impl Rng) -> String {
    let inner_w: u32 = rng.gen_range(1280..=1920);
    let inner_h: u32 = rng.gen_range(720..=1080);
    let outer_w: u32 = rng.gen_range(inner_w..=1920);
    let outer_h: u32 = rng.gen_range(inner_h..=1080);
    let screen_x = 0u32;
    let screen_y = if rng.gen_bool(0.5) { 0u32 } else { 30 };
    format!(
        "{inner_w}|{inner_h}|{outer_w}|{outer_h}|{screen_x}|{screen_y}|0|0|\
         {outer_w}|{outer_h}|{outer_w}|{outer_h}|{inner_w}|{inner_h}|24|24|{platform}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm3;

    #[test]
    fn record_template_reference() {
        let params = "device_platform=webapp&aid=6383&channel=channel_pc_web";
        let record = Record {
            window_start: 1_700_000_000_000,
            window_end: 1_700_000_000_005,
            params_hash: sm3::digest2(format!("{params}cus").as_bytes()),
            method_hash: sm3::digest2(b"GETcus"),
            fingerprint_len: DEFAULT_FINGERPRINT.len() as u8,
        }
        .encode();
        assert_eq!(
            record,
            [
                44, 207, 0, 0, 0, 0, 24, 46, 251, 0, 40, 229, 0, 0, 0, 1, 0, 239, 117, 167,
                49, 104, 0, 0, 0, 0, 5, 0, 0, 14, 207, 229, 0, 104, 0, 3, 139, 1, 139, 1, 67,
                0, 0, 0,
            ]
        );
        assert_eq!(checksum(&record), 143);
    }

    #[test]
    fn checksum_is_plain_xor_fold() {
        let mut record = [0u8; RECORD_LEN];
        record[0] = 0b1010;
        record[43] = 0b0110;
        assert_eq!(checksum(&record), 0b1100);
    }

    #[test]
    fn entropy_groups_reference() {
        assert_eq!(entropy_group(4444, [1, 2, 5, 40]), [9, 86, 5, 57]);
        assert_eq!(entropy_group(5555, [1, 0, 0, 0]), [163, 17, 0, 21]);
        assert_eq!(entropy_group(6666, [1, 0, 5, 0]), [11, 0, 15, 16]);
    }

    #[test]
    fn entropy_header_concatenates_groups() {
        let header = entropy_header([4444, 5555, 6666]);
        assert_eq!(&header[0..4], &entropy_group(4444, [1, 2, 5, 40]));
        assert_eq!(&header[4..8], &entropy_group(5555, [1, 0, 0, 0]));
        assert_eq!(&header[8..12], &entropy_group(6666, [1, 0, 5, 0]));
    }

    #[test]
    fn default_fingerprint_shape() {
        assert_eq!(DEFAULT_FINGERPRINT.len(), 67);
        assert_eq!(DEFAULT_FINGERPRINT.split('|').count(), 17);
    }

    #[test]
    fn generated_fingerprint_shape() {
        let mut rng = rand::thread_rng();
        let info = browser_info("Win32", &mut rng);
        let fields: Vec<&str> = info.split('|').collect();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[16], "Win32");
        assert!(fields[..16].iter().all(|f| f.parse::<u32>().is_ok()));
    }
}
