//! JSON-lines projection: one object per record, same fields as the CSV
//! report but with natural JSON types instead of string columns.

use serde::Serialize;

use crate::record::Record;

use super::{in_use_label, magic_label, type_label, PRESENCE_ATTRIBUTE_TYPES};

#[derive(Serialize)]
pub struct JsonFileName {
    pub name: String,
    pub namespace: &'static str,
    pub crtime: Option<String>,
    pub mtime: Option<String>,
    pub atime: Option<String>,
    pub ctime: Option<String>,
    pub allocated_size: u64,
    pub real_size: u64,
}

#[derive(Serialize)]
pub struct JsonObjectId {
    pub object_id: String,
    pub birth_volume_id: String,
    pub birth_object_id: String,
    pub birth_domain_id: String,
}

#[derive(Serialize)]
pub struct JsonStandardInformation {
    pub crtime: Option<String>,
    pub mtime: Option<String>,
    pub atime: Option<String>,
    pub ctime: Option<String>,
}

#[derive(Serialize)]
pub struct JsonRecord {
    pub record_number: u32,
    pub sequence: u16,
    pub hard_link_count: u16,
    pub flags: u16,
    pub magic_label: &'static str,
    pub in_use: bool,
    pub is_directory: bool,
    pub type_label: String,
    pub base_record_number: u64,
    pub parent_record_number: Option<u64>,
    pub parent_sequence: Option<u16>,
    pub filename: Option<String>,
    pub standard_information: Option<JsonStandardInformation>,
    pub file_names: Vec<JsonFileName>,
    pub object_id: Option<JsonObjectId>,
    pub attribute_presence: Vec<&'static str>,
    pub has_fn: bool,
    pub notes: Vec<String>,
    pub usec_zero: bool,
    pub parsed_path: Option<String>,
    pub md5: Option<String>,
    pub sha256: Option<String>,
    pub sha512: Option<String>,
    pub crc32: Option<String>,
}

fn opt_iso(present: bool, iso: String) -> Option<String> {
    if present && !iso.is_empty() {
        Some(iso)
    } else {
        None
    }
}

/// Project `record` into the JSON-lines representation.
pub fn to_json_record(record: &Record) -> JsonRecord {
    let primary = record.primary_name();

    let file_names = record
        .file_names
        .iter()
        .map(|f| JsonFileName {
            name: f.name.clone(),
            namespace: match f.namespace {
                crate::attributes::FileNameNamespace::Posix => "POSIX",
                crate::attributes::FileNameNamespace::Win32 => "Win32",
                crate::attributes::FileNameNamespace::Dos => "DOS",
                crate::attributes::FileNameNamespace::Win32AndDos => "Win32AndDOS",
            },
            crtime: opt_iso(true, f.crtime.iso_string()),
            mtime: opt_iso(true, f.mtime.iso_string()),
            atime: opt_iso(true, f.atime.iso_string()),
            ctime: opt_iso(true, f.ctime.iso_string()),
            allocated_size: f.allocated_size,
            real_size: f.real_size,
        })
        .collect();

    let standard_information = record.standard_info.as_ref().map(|si| JsonStandardInformation {
        crtime: opt_iso(true, si.crtime.iso_string()),
        mtime: opt_iso(true, si.mtime.iso_string()),
        atime: opt_iso(true, si.atime.iso_string()),
        ctime: opt_iso(true, si.ctime.iso_string()),
    });

    let object_id = record.object_id.as_ref().map(|oid| JsonObjectId {
        object_id: oid.object_id.clone(),
        birth_volume_id: oid.birth_volume_id.clone(),
        birth_object_id: oid.birth_object_id.clone(),
        birth_domain_id: oid.birth_domain_id.clone(),
    });

    let attribute_presence = PRESENCE_ATTRIBUTE_TYPES
        .iter()
        .filter(|(code, _)| record.attribute_presence.contains(code))
        .map(|(_, label)| *label)
        .collect();

    JsonRecord {
        record_number: record.record_number,
        sequence: record.sequence,
        hard_link_count: record.hard_link_count,
        flags: record.flags,
        magic_label: magic_label(record.status),
        in_use: record.is_in_use(),
        is_directory: record.is_directory(),
        type_label: type_label(record),
        base_record_number: record.base_ref & 0x0000_FFFF_FFFF_FFFF,
        parent_record_number: primary.map(|f| f.parent_record_number()),
        parent_sequence: primary.map(|f| f.parent_sequence()),
        filename: primary.map(|f| f.name.clone()),
        standard_information,
        file_names,
        object_id,
        attribute_presence,
        has_fn: !record.file_names.is_empty(),
        notes: record.notes.clone(),
        usec_zero: record.usec_zero,
        parsed_path: record.parsed_path.clone(),
        md5: record.md5.clone(),
        sha256: record.sha256.clone(),
        sha512: record.sha512.clone(),
        crc32: record.crc32.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::decode;

    #[test]
    fn zero_record_serializes() {
        let raw = vec![0u8; crate::record::RECORD_SIZE];
        let record = decode(&raw, 0);
        let json_record = to_json_record(&record);
        let text = serde_json::to_string(&json_record).unwrap();
        assert!(text.contains("\"magic_label\":\"Zero\""));
    }
}
