//! Decoding of one fixed-size MFT record into a structured [`Record`].

use std::collections::BTreeSet;

use crate::attributes::{
    self, decode_file_name, decode_object_id, decode_standard_information, AttrDecodeError,
    FileNameAttr, ObjectId, ParsedHeader, StandardInformation, ATTR_ATTRIBUTE_LIST, ATTR_DATA,
    ATTR_EA, ATTR_EA_INFORMATION, ATTR_FILE_NAME, ATTR_INDEX_ALLOCATION, ATTR_INDEX_ROOT,
    ATTR_LOGGED_UTILITY_STREAM, ATTR_OBJECT_ID, ATTR_PROPERTY_SET, ATTR_REPARSE_POINT,
    ATTR_SECURITY_DESCRIPTOR, ATTR_STANDARD_INFORMATION, ATTR_VOLUME_INFORMATION,
    ATTR_VOLUME_NAME,
};

pub const RECORD_SIZE: usize = 1024;

pub const MAGIC_GOOD: u32 = 0x454C_4946; // "FILE" little-endian on disk reads as this u32
pub const MAGIC_BAD: u32 = 0x4441_4142; // "BAAD"

const MAX_ATTRIBUTE_ITERATIONS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Good,
    Bad,
    Zero,
    Corrupt,
}

/// One decoded MFT record. Mutated exactly once after construction, by
/// [`crate::catalog::Catalog::resolve_all_paths`], to fill `parsed_path`.
#[derive(Debug, Clone)]
pub struct Record {
    pub record_number: u32,
    pub sequence: u16,
    pub hard_link_count: u16,
    pub flags: u16,
    pub magic: u32,
    pub base_ref: u64,
    pub standard_info: Option<StandardInformation>,
    pub file_names: Vec<FileNameAttr>,
    pub attribute_presence: BTreeSet<u32>,
    pub object_id: Option<ObjectId>,
    pub parsed_path: Option<String>,
    pub notes: Vec<String>,
    pub usec_zero: bool,
    pub status: RecordStatus,
    pub md5: Option<String>,
    pub sha256: Option<String>,
    pub sha512: Option<String>,
    pub crc32: Option<String>,
}

impl Record {
    pub fn is_in_use(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    pub fn is_directory(&self) -> bool {
        self.flags & 0x0002 != 0
    }

    /// The FIRST FileNameAttr encountered on-disk, used for display
    /// purposes (CSV "Filename #1" and similar). See the Open Question in
    /// §9 of the spec: display uses the first name, path resolution the
    /// last — both are preserved verbatim.
    pub fn primary_name(&self) -> Option<&FileNameAttr> {
        self.file_names.first()
    }

    /// The LAST FileNameAttr encountered on-disk, used when resolving
    /// `parsed_path` (matches the namespace typically holding the long
    /// Win32 name on real volumes).
    pub fn path_name(&self) -> Option<&FileNameAttr> {
        self.file_names.last()
    }

    fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

fn empty_record(record_number: u32) -> Record {
    Record {
        record_number,
        sequence: 0,
        hard_link_count: 0,
        flags: 0,
        magic: 0,
        base_ref: 0,
        standard_info: None,
        file_names: Vec::new(),
        attribute_presence: BTreeSet::new(),
        object_id: None,
        parsed_path: None,
        notes: Vec::new(),
        usec_zero: false,
        status: RecordStatus::Corrupt,
        md5: None,
        sha256: None,
        sha512: None,
        crc32: None,
    }
}

/// Decode one `raw` record. `raw` is expected to be exactly
/// [`RECORD_SIZE`] bytes but shorter/longer slices are handled without
/// panicking (an undersized final chunk is the driver's concern, not this
/// function's, but defensive bounds checks throughout mean a truncated
/// slice just yields a degraded record rather than a panic).
///
/// `fallback_record_number` is used when the record's own header can't be
/// read (e.g. a too-short slice), so callers always get a record keyed by
/// its byte-offset-derived position.
pub fn decode(raw: &[u8], fallback_record_number: u32) -> Record {
    if raw.len() < 60 {
        let mut r = empty_record(fallback_record_number);
        r.add_note("record shorter than fixed header; skipped");
        return r;
    }

    let magic = u32::from_le_bytes(raw[0..4].try_into().unwrap());
    let seq = u16::from_le_bytes(raw[30..32].try_into().unwrap());
    let link = u16::from_le_bytes(raw[32..34].try_into().unwrap());
    let first_attr = u16::from_le_bytes(raw[34..36].try_into().unwrap()) as usize;
    let flags = u16::from_le_bytes(raw[36..38].try_into().unwrap());
    let base_ref = u64::from_le_bytes(raw[44..52].try_into().unwrap());
    let record_num = u32::from_le_bytes(raw[56..60].try_into().unwrap());

    let mut record = Record {
        record_number: record_num,
        sequence: seq,
        hard_link_count: link,
        flags,
        magic,
        base_ref,
        standard_info: None,
        file_names: Vec::new(),
        attribute_presence: BTreeSet::new(),
        object_id: None,
        parsed_path: None,
        notes: Vec::new(),
        usec_zero: false,
        status: RecordStatus::Good,
        md5: None,
        sha256: None,
        sha512: None,
        crc32: None,
    };

    match magic {
        MAGIC_GOOD => {
            record.status = RecordStatus::Good;
            parse_attributes(raw, first_attr, &mut record);
        }
        MAGIC_BAD => {
            record.status = RecordStatus::Bad;
            record.add_note("BAAD MFT Record");
        }
        0 => {
            record.status = RecordStatus::Zero;
        }
        _ => {
            record.status = RecordStatus::Corrupt;
        }
    }

    derive_usec_zero(&mut record);
    record
}

/// Re-encode the fixed-header fields `decode` reads back onto the canonical
/// on-disk offsets, leaving every byte it doesn't own (update-sequence
/// fields, LSN, `first_attr`, `alloc`/`used`, `next_attr_id`) zeroed. Used to
/// verify the spec's §8 round-trip property: decoding a record and
/// re-encoding its header fields recovers every declared field bit-exactly.
pub fn encode_header(record: &Record) -> [u8; 60] {
    let mut raw = [0u8; 60];
    raw[0..4].copy_from_slice(&record.magic.to_le_bytes());
    raw[30..32].copy_from_slice(&record.sequence.to_le_bytes());
    raw[32..34].copy_from_slice(&record.hard_link_count.to_le_bytes());
    raw[36..38].copy_from_slice(&record.flags.to_le_bytes());
    raw[44..52].copy_from_slice(&record.base_ref.to_le_bytes());
    raw[56..60].copy_from_slice(&record.record_number.to_le_bytes());
    raw
}

fn parse_attributes(raw: &[u8], first_attr: usize, record: &mut Record) {
    let mut offset = first_attr;
    let mut iterations = 0usize;

    loop {
        if iterations >= MAX_ATTRIBUTE_ITERATIONS {
            record.add_note("attribute iteration limit reached; stopping");
            break;
        }
        iterations += 1;

        let header = match attributes::parse_header(raw, offset) {
            ParsedHeader::EndMarker => break,
            ParsedHeader::Malformed => break,
            ParsedHeader::Header(h) => h,
        };

        record.attribute_presence.insert(header.type_code);

        if let Some(payload) = header.resident_payload(&raw[offset..offset + header.length]) {
            match header.type_code {
                ATTR_STANDARD_INFORMATION => match decode_standard_information(payload) {
                    Ok(si) => record.standard_info = Some(si),
                    Err(e) => record.add_note(format_attr_error(header.type_code, &e)),
                },
                ATTR_FILE_NAME => match decode_file_name(payload) {
                    Ok((fn_attr, truncation_note)) => {
                        if let Some(note) = truncation_note {
                            record.add_note(note);
                        }
                        record.file_names.push(fn_attr);
                    }
                    Err(e) => record.add_note(format_attr_error(header.type_code, &e)),
                },
                ATTR_OBJECT_ID => {
                    if record.object_id.is_none() {
                        record.object_id = decode_object_id(payload);
                    }
                }
                _ => {}
            }
        } else if matches!(
            header.type_code,
            ATTR_STANDARD_INFORMATION | ATTR_FILE_NAME | ATTR_OBJECT_ID
        ) {
            record.add_note(format!(
                "Error parsing attribute 0x{:X}: resident payload out of bounds",
                header.type_code
            ));
        }

        // Other recognized types are presence-only; nothing further to do for
        // ATTR_ATTRIBUTE_LIST, ATTR_SECURITY_DESCRIPTOR, ATTR_VOLUME_NAME,
        // ATTR_VOLUME_INFORMATION, ATTR_DATA, ATTR_INDEX_ROOT,
        // ATTR_INDEX_ALLOCATION, ATTR_BITMAP, ATTR_REPARSE_POINT,
        // ATTR_EA_INFORMATION, ATTR_EA, ATTR_PROPERTY_SET,
        // ATTR_LOGGED_UTILITY_STREAM.
        let _ = (
            ATTR_ATTRIBUTE_LIST,
            ATTR_SECURITY_DESCRIPTOR,
            ATTR_VOLUME_NAME,
            ATTR_VOLUME_INFORMATION,
            ATTR_DATA,
            ATTR_INDEX_ROOT,
            ATTR_INDEX_ALLOCATION,
            ATTR_REPARSE_POINT,
            ATTR_EA_INFORMATION,
            ATTR_EA,
            ATTR_PROPERTY_SET,
            ATTR_LOGGED_UTILITY_STREAM,
        );

        offset += header.length;
        if offset >= raw.len() {
            break;
        }
    }
}

fn format_attr_error(type_code: u32, err: &AttrDecodeError) -> String {
    format!("Error parsing attribute 0x{type_code:X}: {err}")
}

fn derive_usec_zero(record: &mut Record) {
    record.usec_zero = match &record.standard_info {
        Some(si) => [si.crtime, si.mtime, si.atime, si.ctime]
            .iter()
            .all(|ft| ft.unix_seconds.fract() == 0.0),
        None => false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baad_record() -> Vec<u8> {
        let mut raw = vec![0u8; RECORD_SIZE];
        raw[0..4].copy_from_slice(&MAGIC_BAD.to_le_bytes());
        raw
    }

    #[test]
    fn scenario_c_baad_record() {
        let raw = baad_record();
        let record = decode(&raw, 0);
        assert_eq!(record.status, RecordStatus::Bad);
        assert!(record.notes.iter().any(|n| n == "BAAD MFT Record"));
        assert!(!record.usec_zero);
        assert!(record.file_names.is_empty());
    }

    #[test]
    fn scenario_d_zero_record() {
        let raw = vec![0u8; RECORD_SIZE];
        let record = decode(&raw, 0);
        assert_eq!(record.status, RecordStatus::Zero);
        assert!(!record.is_in_use());
        assert!(record.file_names.is_empty());
    }

    #[test]
    fn in_use_flag_maps_to_active() {
        let mut raw = vec![0u8; RECORD_SIZE];
        raw[0..4].copy_from_slice(&MAGIC_GOOD.to_le_bytes());
        raw[36..38].copy_from_slice(&0x0001u16.to_le_bytes());
        raw[34..36].copy_from_slice(&56u16.to_le_bytes()); // first_attr past header, hits end marker immediately
        raw[56..60].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        let record = decode(&raw, 0);
        assert!(record.is_in_use());
    }

    #[test]
    fn unknown_magic_is_corrupt() {
        let mut raw = vec![0u8; RECORD_SIZE];
        raw[0..4].copy_from_slice(&0x1234_5678u32.to_le_bytes());
        let record = decode(&raw, 0);
        assert_eq!(record.status, RecordStatus::Corrupt);
    }

    #[test]
    fn header_fields_round_trip_through_decode_and_encode() {
        let mut raw = vec![0u8; RECORD_SIZE];
        raw[0..4].copy_from_slice(&MAGIC_GOOD.to_le_bytes());
        raw[30..32].copy_from_slice(&7u16.to_le_bytes()); // sequence
        raw[32..34].copy_from_slice(&3u16.to_le_bytes()); // hard_link_count
        raw[34..36].copy_from_slice(&56u16.to_le_bytes()); // first_attr, hits end marker immediately
        raw[36..38].copy_from_slice(&0x0003u16.to_le_bytes()); // flags: in-use + directory
        raw[44..52].copy_from_slice(&0x0001_0000_0000_002Au64.to_le_bytes()); // base_ref
        raw[56..60].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes()); // also the end marker at first_attr

        let record = decode(&raw, 0);
        let reencoded = encode_header(&record);
        let roundtripped = decode(&reencoded, 0);

        assert_eq!(roundtripped.magic, record.magic);
        assert_eq!(roundtripped.sequence, record.sequence);
        assert_eq!(roundtripped.hard_link_count, record.hard_link_count);
        assert_eq!(roundtripped.flags, record.flags);
        assert_eq!(roundtripped.base_ref, record.base_ref);
        assert_eq!(roundtripped.record_number, record.record_number);
    }
}
