//! log2timeline CSV timeline format: four MACB rows per record (one per
//! timestamp), or a single placeholder row for records with neither
//! FILE_NAME nor STANDARD_INFORMATION timestamps.

use crate::record::Record;
use crate::windows_time::FileTime;

pub const HEADER: [&str; 17] = [
    "date", "time", "timezone", "MACB", "source", "sourcetype", "type", "user", "host", "short",
    "desc", "version", "filename", "inode", "notes", "format", "extra",
];

struct TimestampKind {
    macb: &'static str,
    label_fn: &'static str,
    label_si: &'static str,
}

const KINDS: [(&str, TimestampKind); 4] = [
    (
        "atime",
        TimestampKind {
            macb: ".A..",
            label_fn: "$FN [.A..] time",
            label_si: "$SI [.A..] time",
        },
    ),
    (
        "mtime",
        TimestampKind {
            macb: "M...",
            label_fn: "$FN [M...] time",
            label_si: "$SI [M...] time",
        },
    ),
    (
        "ctime",
        TimestampKind {
            macb: "..C.",
            label_fn: "$FN [..C.] time",
            label_si: "$SI [..C.] time",
        },
    ),
    (
        "crtime",
        TimestampKind {
            macb: "...B",
            label_fn: "$FN [...B] time",
            label_si: "$SI [...B] time",
        },
    ),
];

fn split_date_time(ft: &FileTime) -> (String, String) {
    let iso = ft.iso_string();
    match iso.split_once(' ') {
        Some((date, time)) => (date.to_string(), time.to_string()),
        None => ("-".to_string(), "-".to_string()),
    }
}

fn emit_row(
    date: &str,
    time: &str,
    macb: &str,
    type_str: &str,
    short: &str,
    filename: &str,
    inode: u16,
    notes: &str,
) -> String {
    format!(
        "{date}|{time}|TZ|{macb}|FILE|NTFS $MFT|{type_str}|user|host|{short}|desc|version|{filename}|{inode}|{notes}|format|extra\n"
    )
}

/// All L2T-CSV rows for `record` (4 rows, or 1 placeholder row).
pub fn rows(record: &Record) -> Vec<String> {
    let notes = record.notes.join("; ");
    let display_name = record
        .primary_name()
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "NoFNRecord".to_string());

    if let Some(fn0) = record.primary_name() {
        let times = [
            ("atime", &fn0.atime),
            ("mtime", &fn0.mtime),
            ("ctime", &fn0.ctime),
            ("crtime", &fn0.crtime),
        ];
        return KINDS
            .iter()
            .zip(times.iter())
            .map(|((_, kind), (_, ft))| {
                let (date, time) = split_date_time(ft);
                emit_row(
                    &date,
                    &time,
                    kind.macb,
                    kind.label_fn,
                    &display_name,
                    &display_name,
                    record.sequence,
                    &notes,
                )
            })
            .collect();
    }

    if let Some(si) = &record.standard_info {
        let times = [
            ("atime", &si.atime),
            ("mtime", &si.mtime),
            ("ctime", &si.ctime),
            ("crtime", &si.crtime),
        ];
        return KINDS
            .iter()
            .zip(times.iter())
            .map(|((_, kind), (_, ft))| {
                let (date, time) = split_date_time(ft);
                emit_row(
                    &date,
                    &time,
                    kind.macb,
                    kind.label_si,
                    &display_name,
                    &display_name,
                    record.sequence,
                    &notes,
                )
            })
            .collect();
    }

    vec![format!(
        "-|-|TZ|unknown time|FILE|NTFS $MFT|unknown time|user|host|Corrupt Record|desc|version|NoFNRecord|{}|-|format|extra\n",
        record.sequence
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::decode;

    #[test]
    fn zero_record_yields_single_placeholder_row() {
        let raw = vec![0u8; crate::record::RECORD_SIZE];
        let record = decode(&raw, 0);
        let out = rows(&record);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("Corrupt Record"));
    }
}
