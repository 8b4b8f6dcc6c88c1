//! Sleuth Kit bodyfile export: `0|name|0|0|0|0|size|atime|mtime|ctime|crtime`.

use crate::record::Record;

/// Render one bodyfile line (including trailing `\n`) for `record`.
///
/// `full_path`: use the resolved `parsed_path` instead of the short
/// `file_names[0].name`.
/// `std_info`: source timestamps from STANDARD_INFORMATION instead of the
/// primary FILE_NAME attribute. Per Sleuth Kit convention the bodyfile's
/// 4th timestamp slot is labeled "crtime" under FN mode but is `ctime`
/// again under SI mode (STANDARD_INFORMATION's creation time is treated
/// as unreliable, so SI mode repeats the more trustworthy entry-modified
/// time there).
pub fn row(record: &Record, full_path: bool, std_info: bool) -> String {
    let Some(fn0) = record.primary_name() else {
        return match &record.standard_info {
            Some(si) => format!(
                "0|No FN Record|0|0|0|0|0|{}|{}|{}|{}\n",
                si.atime.unix_seconds_int(),
                si.mtime.unix_seconds_int(),
                si.ctime.unix_seconds_int(),
                si.ctime.unix_seconds_int(),
            ),
            None => "0|Corrupt Record|0|0|0|0|0|0|0|0|0\n".to_string(),
        };
    };

    let name = if full_path {
        record.parsed_path.clone().unwrap_or_else(|| fn0.name.clone())
    } else {
        fn0.name.clone()
    };

    let size = fn0.real_size;

    let (atime, mtime, ctime, fourth) = if std_info {
        match &record.standard_info {
            Some(si) => (
                si.atime.unix_seconds_int(),
                si.mtime.unix_seconds_int(),
                si.ctime.unix_seconds_int(),
                si.ctime.unix_seconds_int(),
            ),
            None => (0, 0, 0, 0),
        }
    } else {
        (
            fn0.atime.unix_seconds_int(),
            fn0.mtime.unix_seconds_int(),
            fn0.ctime.unix_seconds_int(),
            fn0.crtime.unix_seconds_int(),
        )
    };

    format!("0|{name}|0|0|0|0|{size}|{atime}|{mtime}|{ctime}|{fourth}\n")
}
