//! Optional digest computation over a raw 1024-byte record, enabled by the
//! `compute_hashes` configuration option. Grounded on `MftRecord.compute_hashes`
//! in the analyzeMFT Python source.

use md5::{Digest as _, Md5};
use sha2::{Sha256, Sha512};

pub struct RecordHashes {
    pub md5: String,
    pub sha256: String,
    pub sha512: String,
    pub crc32: String,
}

pub fn compute(raw: &[u8]) -> RecordHashes {
    let mut md5 = Md5::new();
    md5.update(raw);

    let mut sha256 = Sha256::new();
    sha256.update(raw);

    let mut sha512 = Sha512::new();
    sha512.update(raw);

    let crc32 = crc32fast::hash(raw);

    RecordHashes {
        md5: hex::encode(md5.finalize()),
        sha256: hex::encode(sha256.finalize()),
        sha512: hex::encode(sha512.finalize()),
        crc32: format!("{crc32:08x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_deterministic_and_correct_width() {
        let raw = vec![0u8; 1024];
        let h = compute(&raw);
        assert_eq!(h.md5.len(), 32);
        assert_eq!(h.sha256.len(), 64);
        assert_eq!(h.sha512.len(), 128);
        assert_eq!(h.crc32.len(), 8);

        let h2 = compute(&raw);
        assert_eq!(h.md5, h2.md5);
    }
}
