//! The small set of typed, fatal errors. Per-record and per-attribute
//! decode failures never reach here — they're recorded on the offending
//! [`crate::record::Record`] and the pipeline keeps going (spec §7).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeMftError {
    #[error("input $MFT not available at {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output unavailable at {path}: {source}")]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
