//! NTFS `$MFT` forensic parser: decode raw Master File Table records into a
//! structured catalog, resolve full paths, and project each record into
//! analyst-facing report formats (CSV, bodyfile, L2T-CSV, JSON lines).

pub mod attributes;
pub mod catalog;
pub mod error;
pub mod format;
pub mod hashes;
pub mod pipeline;
pub mod record;
pub mod windows_time;
