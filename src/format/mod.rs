//! Pure projections of a decoded [`crate::record::Record`] into the
//! analyst-facing report formats: CSV, bodyfile, L2T-CSV, and JSON lines.

pub mod bodyfile;
pub mod csv;
pub mod json;
pub mod l2t;

/// The 14 attribute type codes rendered as CSV/JSON presence booleans.
/// FILE_NAME (0x30) is intentionally excluded — its presence is carried by
/// the separate `has_fn` field — and SECURITY_DESCRIPTOR (0x50) is not
/// surfaced as a presence column, matching the teacher source's own
/// `attributes` list.
pub const PRESENCE_ATTRIBUTE_TYPES: [(u32, &str); 14] = [
    (crate::attributes::ATTR_STANDARD_INFORMATION, "Standard Information"),
    (crate::attributes::ATTR_ATTRIBUTE_LIST, "Attribute List"),
    (crate::attributes::ATTR_OBJECT_ID, "Object ID"),
    (crate::attributes::ATTR_VOLUME_NAME, "Volume Name"),
    (crate::attributes::ATTR_VOLUME_INFORMATION, "Volume Info"),
    (crate::attributes::ATTR_DATA, "Data"),
    (crate::attributes::ATTR_INDEX_ROOT, "Index Root"),
    (crate::attributes::ATTR_INDEX_ALLOCATION, "Index Allocation"),
    (crate::attributes::ATTR_BITMAP, "Bitmap"),
    (crate::attributes::ATTR_REPARSE_POINT, "Reparse Point"),
    (crate::attributes::ATTR_EA_INFORMATION, "EA Information"),
    (crate::attributes::ATTR_EA, "EA"),
    (crate::attributes::ATTR_PROPERTY_SET, "Property Set"),
    (crate::attributes::ATTR_LOGGED_UTILITY_STREAM, "Logged Utility Stream"),
];

pub fn magic_label(status: crate::record::RecordStatus) -> &'static str {
    use crate::record::RecordStatus::*;
    match status {
        Good => "Good",
        Bad => "Bad",
        Zero => "Zero",
        Corrupt => "Unknown",
    }
}

pub fn in_use_label(record: &crate::record::Record) -> &'static str {
    if record.is_in_use() {
        "Active"
    } else {
        "Inactive"
    }
}

/// "Folder"/"File" plus optional "+ Unknown1"/"+ Unknown2" suffixes for
/// flag bits 2 and 3, EXCEPT for Bad/Corrupt records, where this column
/// instead carries the degraded-record diagnostic text so every row stays
/// a fixed width (Bad: "BAAD MFT Record", Corrupt: "Corrupt MFT Record").
pub fn type_label(record: &crate::record::Record) -> String {
    use crate::record::RecordStatus;
    match record.status {
        RecordStatus::Bad => "BAAD MFT Record".to_string(),
        RecordStatus::Corrupt => "Corrupt MFT Record".to_string(),
        _ => {
            let mut label = if record.is_directory() { "Folder" } else { "File" }.to_string();
            if record.flags & 0x0004 != 0 {
                label.push_str(" + Unknown1");
            }
            if record.flags & 0x0008 != 0 {
                label.push_str(" + Unknown2");
            }
            label
        }
    }
}
