//! Chunk reader -> decode -> catalog insert -> path resolution -> row
//! emission. Decoding may run in parallel across records (they're mutually
//! independent until catalog insertion); everything after is
//! single-threaded, matching the concurrency model in the spec.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use memmap2::Mmap;
use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::error::AnalyzeMftError;
use crate::format::{bodyfile, csv as csv_format, json as json_format, l2t};
use crate::hashes;
use crate::record::{decode, RECORD_SIZE};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub input_path: PathBuf,
    pub csv_output: Option<PathBuf>,
    pub bodyfile_output: Option<PathBuf>,
    pub json_output: Option<PathBuf>,
    pub l2t_output: Option<PathBuf>,
    pub bodyfile_full_path: bool,
    pub bodyfile_std_info: bool,
    pub compute_hashes: bool,
    pub debug: bool,
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub records_ingested: u64,
    pub rows_emitted: u64,
    pub cancelled: bool,
}

/// Run the full pipeline against `config`. `cancel` is polled at chunk
/// boundaries during ingestion and before each record during output; when
/// it returns `true` the driver stops and returns whatever has been
/// written so far (spec §5 cancellation, §7 `Cancelled`).
pub fn run(config: &Config, cancel: impl Fn() -> bool) -> anyhow::Result<PipelineStats> {
    let buf = map_input(&config.input_path)?;

    let total_records = buf.len() / RECORD_SIZE;
    let short_tail = buf.len() % RECORD_SIZE;
    if short_tail != 0 {
        debug!(
            "input is not a multiple of {RECORD_SIZE} bytes; discarding trailing {short_tail} bytes"
        );
    }

    info!("Starting to parse {total_records} MFT records");
    let progress = ProgressBar::new(total_records as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} records",
    ) {
        progress.set_style(style);
    }

    let mut catalog = Catalog::new();
    let mut records_ingested = 0u64;

    const DECODE_BATCH: usize = 65_536;
    let mut batch_start = 0usize;
    let mut cancelled = false;

    while batch_start < total_records {
        if cancel() {
            cancelled = true;
            break;
        }
        let batch_end = (batch_start + DECODE_BATCH).min(total_records);

        let decoded: Vec<_> = (batch_start..batch_end)
            .into_par_iter()
            .map(|i| {
                let start = i * RECORD_SIZE;
                let raw = &buf[start..start + RECORD_SIZE];
                let mut record = decode(raw, i as u32);
                if config.compute_hashes {
                    let h = hashes::compute(raw);
                    record.md5 = Some(h.md5);
                    record.sha256 = Some(h.sha256);
                    record.sha512 = Some(h.sha512);
                    record.crc32 = Some(h.crc32);
                }
                record
            })
            .collect();

        for record in decoded {
            catalog.insert(record);
            records_ingested += 1;
            progress.inc(1);
        }

        batch_start = batch_end;
    }

    progress.finish_and_clear();
    info!("Total records processed: {records_ingested}");

    catalog.resolve_all_paths();

    let mut stats = PipelineStats {
        records_ingested,
        rows_emitted: 0,
        cancelled,
    };

    if cancelled {
        return Ok(stats);
    }

    let mut csv_writer = open_csv_writer(config.csv_output.as_deref())?;
    if let Some(w) = &mut csv_writer {
        w.write_record(csv_format::header(config.compute_hashes))?;
    }

    let mut bodyfile_writer = open_plain_writer(config.bodyfile_output.as_deref())?;
    let mut json_writer = open_plain_writer(config.json_output.as_deref())?;

    for record in catalog.iter() {
        if cancel() {
            stats.cancelled = true;
            break;
        }

        if let Some(w) = &mut csv_writer {
            w.write_record(csv_format::row(record))?;
        }

        if let Some(w) = &mut bodyfile_writer {
            w.write_all(
                bodyfile::row(record, config.bodyfile_full_path, config.bodyfile_std_info)
                    .as_bytes(),
            )?;
        }

        if let Some(w) = &mut json_writer {
            let json_record = json_format::to_json_record(record);
            let line = serde_json::to_string(&json_record)?;
            writeln!(w, "{line}")?;
        }

        stats.rows_emitted += 1;
    }

    if let Some(mut w) = csv_writer {
        w.flush()?;
    }
    if let Some(mut w) = bodyfile_writer {
        w.flush()?;
    }
    if let Some(mut w) = json_writer {
        w.flush()?;
    }

    if let Some(path) = &config.l2t_output {
        if !stats.cancelled {
            write_l2t(&catalog, path)?;
        }
    }

    info!("analyzemft-rs completed, {} rows emitted", stats.rows_emitted);
    Ok(stats)
}

/// L2T-CSV is written separately since it emits a variable number of rows
/// per record (4, or 1 placeholder) rather than one row per record.
fn write_l2t(catalog: &Catalog, path: &Path) -> anyhow::Result<u64> {
    let file = File::create(path)
        .map_err(|source| AnalyzeMftError::OutputUnavailable {
            path: path.to_path_buf(),
            source,
        })
        .context("opening L2T-CSV output")?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", l2t::HEADER.join(","))?;

    let mut rows_written = 0u64;
    for record in catalog.iter() {
        for line in l2t::rows(record) {
            writer.write_all(line.as_bytes())?;
            rows_written += 1;
        }
    }
    writer.flush()?;
    Ok(rows_written)
}

fn map_input(path: &Path) -> anyhow::Result<Mmap> {
    let file = File::open(path)
        .map_err(|source| AnalyzeMftError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })
        .context("opening $MFT input")?;
    debug!("Opened input file: {}", path.display());

    // Advisory lock reduces the risk of reading a truncated/rewritten file
    // mid-scan; it does not prevent writes by uncooperative processes.
    file.lock_shared()
        .map_err(|source| AnalyzeMftError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Locked input file: {}", path.display());

    let mmap = unsafe { Mmap::map(&file) }
        .map_err(|source| AnalyzeMftError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    mmap.advise(memmap2::Advice::Sequential).ok();
    Ok(mmap)
}

fn open_csv_writer(path: Option<&Path>) -> anyhow::Result<Option<csv::Writer<File>>> {
    match path {
        None => Ok(None),
        Some(path) => {
            let file = File::create(path)
                .map_err(|source| AnalyzeMftError::OutputUnavailable {
                    path: path.to_path_buf(),
                    source,
                })
                .context("opening CSV output")?;
            Ok(Some(csv::WriterBuilder::new().from_writer(file)))
        }
    }
}

fn open_plain_writer(path: Option<&Path>) -> anyhow::Result<Option<BufWriter<File>>> {
    match path {
        None => Ok(None),
        Some(path) => {
            let file = File::create(path)
                .map_err(|source| AnalyzeMftError::OutputUnavailable {
                    path: path.to_path_buf(),
                    source,
                })
                .context("opening output")?;
            Ok(Some(BufWriter::new(file)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn good_record(record_number: u32, parent_ref: u64, name: &str) -> Vec<u8> {
        let mut raw = vec![0u8; RECORD_SIZE];
        raw[0..4].copy_from_slice(&crate::record::MAGIC_GOOD.to_le_bytes());
        raw[36..38].copy_from_slice(&0x0003u16.to_le_bytes()); // in-use + directory
        raw[56..60].copy_from_slice(&record_number.to_le_bytes());

        // One resident FILE_NAME attribute starting right after the 42-byte
        // fixed header region used by this test (first_attr@34).
        let first_attr = 56usize;
        raw[34..36].copy_from_slice(&(first_attr as u16).to_le_bytes());

        let name_utf16: Vec<u16> = name.encode_utf16().collect();
        let payload_len = 66 + name_utf16.len() * 2;
        let attr_len = 24 + payload_len;
        let attr_len = attr_len + (8 - attr_len % 8) % 8; // 8-byte align, as on real disks

        let attr_start = first_attr;
        raw[attr_start..attr_start + 4].copy_from_slice(&0x30u32.to_le_bytes());
        raw[attr_start + 4..attr_start + 8].copy_from_slice(&(attr_len as u32).to_le_bytes());
        // non_resident=0, name_length=0, name_offset=0, flags=0, attr_id=0
        raw[attr_start + 16..attr_start + 20]
            .copy_from_slice(&(payload_len as u32).to_le_bytes());
        raw[attr_start + 20..attr_start + 22].copy_from_slice(&24u16.to_le_bytes());

        let content_start = attr_start + 24;
        raw[content_start..content_start + 8].copy_from_slice(&parent_ref.to_le_bytes());
        raw[content_start + 64] = name_utf16.len() as u8;
        raw[content_start + 65] = 1; // Win32 namespace
        for (i, unit) in name_utf16.iter().enumerate() {
            let off = content_start + 66 + i * 2;
            raw[off..off + 2].copy_from_slice(&unit.to_le_bytes());
        }

        let end_marker_off = attr_start + attr_len;
        if end_marker_off + 4 <= raw.len() {
            raw[end_marker_off..end_marker_off + 4].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        }

        raw
    }

    #[test]
    fn records_emitted_matches_input_length() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("MFT");
        let mut data = Vec::new();
        data.extend(good_record(5, 5, "."));
        data.extend(good_record(6, 5, "Windows"));
        data.extend(good_record(7, 6, "System32"));
        std::fs::write(&input_path, &data).unwrap();

        let csv_path = dir.path().join("out.csv");
        let config = Config {
            input_path,
            csv_output: Some(csv_path.clone()),
            ..Default::default()
        };

        let stats = run(&config, || false).unwrap();
        assert_eq!(stats.records_ingested, 3);
        assert_eq!(stats.rows_emitted, 3);

        let mut contents = String::new();
        File::open(&csv_path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // header + 3 rows, in ascending record_number order
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with('5'));
        assert!(lines[2].starts_with('6'));
        assert!(lines[3].starts_with('7'));
        assert!(contents.contains("/Windows"));
        assert!(contents.contains("/Windows/System32"));
    }

    #[test]
    fn short_trailing_chunk_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("MFT");
        let mut data = good_record(5, 5, ".");
        data.extend_from_slice(&[0u8; 100]); // short trailing chunk
        std::fs::write(&input_path, &data).unwrap();

        let config = Config {
            input_path,
            ..Default::default()
        };
        let stats = run(&config, || false).unwrap();
        assert_eq!(stats.records_ingested, 1);
    }

    #[test]
    fn missing_input_is_fatal() {
        let config = Config {
            input_path: PathBuf::from("/nonexistent/path/to/MFT"),
            ..Default::default()
        };
        assert!(run(&config, || false).is_err());
    }
}
