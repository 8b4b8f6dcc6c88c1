//! 54-column (58 with `--compute-hashes`) analyst CSV report.

use crate::record::Record;

use super::{in_use_label, magic_label, type_label, PRESENCE_ATTRIBUTE_TYPES};

const BASE_HEADER: [&str; 54] = [
    "Record Number",
    "Good",
    "Active",
    "Record type",
    "Sequence Number",
    "Parent File Rec. #",
    "Parent File Rec. Seq. #",
    "Base Record #",
    "Filename #1",
    "Std Info Creation date",
    "Std Info Modification date",
    "Std Info Access date",
    "Std Info Entry date",
    "FN Info Creation date",
    "FN Info Modification date",
    "FN Info Access date",
    "FN Info Entry date",
    "Object ID",
    "Birth Volume ID",
    "Birth Object ID",
    "Birth Domain ID",
    "Filename #2",
    "FN Info Creation date",
    "FN Info Modify date",
    "FN Info Access date",
    "FN Info Entry date",
    "Filename #3",
    "FN Info Creation date",
    "FN Info Modify date",
    "FN Info Access date",
    "FN Info Entry date",
    "Filename #4",
    "FN Info Creation date",
    "FN Info Modify date",
    "FN Info Access date",
    "FN Info Entry date",
    "Standard Information",
    "Attribute List",
    "Object ID",
    "Volume Name",
    "Volume Info",
    "Data",
    "Index Root",
    "Index Allocation",
    "Bitmap",
    "Reparse Point",
    "EA Information",
    "EA",
    "Property Set",
    "Logged Utility Stream",
    "Has FN",
    "Log/Notes",
    "STF FN Shift",
    "uSec Zero",
];

const HASH_HEADER: [&str; 4] = ["MD5", "SHA-256", "SHA-512", "CRC-32"];

/// The CSV header row. 54 columns normally, 58 when hashes are enabled.
pub fn header(compute_hashes: bool) -> Vec<String> {
    let mut cols: Vec<String> = BASE_HEADER.iter().map(|s| s.to_string()).collect();
    if compute_hashes {
        cols.extend(HASH_HEADER.iter().map(|s| s.to_string()));
    }
    cols
}

/// One analyst report row for `record`.
pub fn row(record: &Record) -> Vec<String> {
    let mut cols: Vec<String> = Vec::with_capacity(58);

    cols.push(record.record_number.to_string());
    cols.push(magic_label(record.status).to_string());
    cols.push(in_use_label(record).to_string());
    cols.push(type_label(record));
    cols.push(record.sequence.to_string());

    let primary = record.primary_name();
    match primary {
        Some(fn_attr) => {
            cols.push(fn_attr.parent_record_number().to_string());
            cols.push(fn_attr.parent_sequence().to_string());
        }
        None => {
            cols.push("NoParent".to_string());
            cols.push("NoParent".to_string());
        }
    }

    let base_record_number = record.base_ref & 0x0000_FFFF_FFFF_FFFF;
    cols.push(base_record_number.to_string());

    match (primary, &record.standard_info) {
        (Some(fn0), Some(si)) => {
            cols.push(fn0.name.clone());
            cols.push(si.crtime.iso_string());
            cols.push(si.mtime.iso_string());
            cols.push(si.atime.iso_string());
            cols.push(si.ctime.iso_string());
            cols.push(fn0.crtime.iso_string());
            cols.push(fn0.mtime.iso_string());
            cols.push(fn0.atime.iso_string());
            cols.push(fn0.ctime.iso_string());
        }
        (None, Some(si)) => {
            cols.push("NoFNRecord".to_string());
            cols.push(si.crtime.iso_string());
            cols.push(si.mtime.iso_string());
            cols.push(si.atime.iso_string());
            cols.push(si.ctime.iso_string());
            cols.extend(["NoFNRecord", "NoFNRecord", "NoFNRecord", "NoFNRecord"].map(String::from));
        }
        (Some(fn0), None) => {
            cols.push(fn0.name.clone());
            cols.extend(["NoSIRecord", "NoSIRecord", "NoSIRecord", "NoSIRecord"].map(String::from));
            cols.push(fn0.crtime.iso_string());
            cols.push(fn0.mtime.iso_string());
            cols.push(fn0.atime.iso_string());
            cols.push(fn0.ctime.iso_string());
        }
        (None, None) => {
            cols.push("NoFNRecord".to_string());
            cols.extend(["NoSIRecord", "NoSIRecord", "NoSIRecord", "NoSIRecord"].map(String::from));
            cols.extend(["NoFNRecord", "NoFNRecord", "NoFNRecord", "NoFNRecord"].map(String::from));
        }
    }

    match &record.object_id {
        Some(oid) => {
            cols.push(oid.object_id.clone());
            cols.push(oid.birth_volume_id.clone());
            cols.push(oid.birth_object_id.clone());
            cols.push(oid.birth_domain_id.clone());
        }
        None => cols.extend(["", "", "", ""].map(String::from)),
    }

    for slot in 0..3 {
        match record.file_names.get(slot + 1) {
            Some(fn_attr) => {
                cols.push(fn_attr.name.clone());
                cols.push(fn_attr.crtime.iso_string());
                cols.push(fn_attr.mtime.iso_string());
                cols.push(fn_attr.atime.iso_string());
                cols.push(fn_attr.ctime.iso_string());
            }
            None => cols.extend(["", "", "", "", ""].map(String::from)),
        }
    }

    for (type_code, _label) in PRESENCE_ATTRIBUTE_TYPES {
        let present = record.attribute_presence.contains(&type_code);
        cols.push(if present { "True" } else { "False" }.to_string());
    }

    cols.push(if record.file_names.is_empty() { "False" } else { "True" }.to_string());
    cols.push(record.notes.join("; "));
    // "STF FN Shift" is always "N" in this implementation: no decode path
    // sets it, matching every known analyzeMFT source variant (reserved).
    cols.push("N".to_string());
    cols.push(if record.usec_zero { "Y" } else { "N" }.to_string());

    if let Some(md5) = &record.md5 {
        cols.push(md5.clone());
        cols.push(record.sha256.clone().unwrap_or_default());
        cols.push(record.sha512.clone().unwrap_or_default());
        cols.push(record.crc32.clone().unwrap_or_default());
    }

    cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::decode;

    #[test]
    fn header_has_54_columns_without_hashes() {
        assert_eq!(header(false).len(), 54);
    }

    #[test]
    fn header_has_58_columns_with_hashes() {
        assert_eq!(header(true).len(), 58);
    }

    #[test]
    fn baad_record_row_is_54_wide_and_flags_in_type_column() {
        let mut raw = vec![0u8; crate::record::RECORD_SIZE];
        raw[0..4].copy_from_slice(&crate::record::MAGIC_BAD.to_le_bytes());
        let record = decode(&raw, 0);
        let row = row(&record);
        assert_eq!(row.len(), 54);
        assert_eq!(row[3], "BAAD MFT Record");
    }

    #[test]
    fn active_flag_yields_active_label() {
        let mut raw = vec![0u8; crate::record::RECORD_SIZE];
        raw[0..4].copy_from_slice(&crate::record::MAGIC_GOOD.to_le_bytes());
        raw[36..38].copy_from_slice(&0x0001u16.to_le_bytes());
        raw[34..36].copy_from_slice(&56u16.to_le_bytes());
        raw[56..60].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        let record = decode(&raw, 0);
        let row = row(&record);
        assert_eq!(row[2], "Active");
    }
}
