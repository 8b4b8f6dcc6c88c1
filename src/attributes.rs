//! Decoding of a single NTFS attribute: header plus the handful of resident
//! payloads this parser understands fully (STANDARD_INFORMATION, FILE_NAME,
//! OBJECT_ID). Every other recognized type is recorded as "present" only.

use crate::windows_time::FileTime;

pub const ATTR_STANDARD_INFORMATION: u32 = 0x10;
pub const ATTR_ATTRIBUTE_LIST: u32 = 0x20;
pub const ATTR_FILE_NAME: u32 = 0x30;
pub const ATTR_OBJECT_ID: u32 = 0x40;
pub const ATTR_SECURITY_DESCRIPTOR: u32 = 0x50;
pub const ATTR_VOLUME_NAME: u32 = 0x60;
pub const ATTR_VOLUME_INFORMATION: u32 = 0x70;
pub const ATTR_DATA: u32 = 0x80;
pub const ATTR_INDEX_ROOT: u32 = 0x90;
pub const ATTR_INDEX_ALLOCATION: u32 = 0xA0;
pub const ATTR_BITMAP: u32 = 0xB0;
pub const ATTR_REPARSE_POINT: u32 = 0xC0;
pub const ATTR_EA_INFORMATION: u32 = 0xD0;
pub const ATTR_EA: u32 = 0xE0;
pub const ATTR_PROPERTY_SET: u32 = 0xF0;
pub const ATTR_LOGGED_UTILITY_STREAM: u32 = 0x100;
pub const ATTR_END: u32 = 0xFFFF_FFFF;

/// All 16 recognized NTFS attribute type codes, in on-disk order, used for
/// the CSV report's attribute-presence columns.
pub const ALL_ATTRIBUTE_TYPES: [u32; 16] = [
    ATTR_STANDARD_INFORMATION,
    ATTR_ATTRIBUTE_LIST,
    ATTR_FILE_NAME,
    ATTR_OBJECT_ID,
    ATTR_SECURITY_DESCRIPTOR,
    ATTR_VOLUME_NAME,
    ATTR_VOLUME_INFORMATION,
    ATTR_DATA,
    ATTR_INDEX_ROOT,
    ATTR_INDEX_ALLOCATION,
    ATTR_BITMAP,
    ATTR_REPARSE_POINT,
    ATTR_EA_INFORMATION,
    ATTR_EA,
    ATTR_PROPERTY_SET,
    ATTR_LOGGED_UTILITY_STREAM,
];

const ATTR_HEADER_SIZE: usize = 16;
const RESIDENT_HEADER_EXTRA_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct AttributeHeader {
    pub type_code: u32,
    pub length: usize,
    pub non_resident_flag: bool,
    pub name_length: u8,
    pub name_offset: u16,
    pub flags: u16,
    pub attribute_id: u16,
    /// `Some` only for resident attributes.
    pub content_length: Option<u32>,
    pub content_offset: Option<u16>,
}

impl AttributeHeader {
    /// The resident payload window, or `None` for non-resident attributes
    /// or if the declared window falls outside the attribute's own bounds.
    pub fn resident_payload<'a>(&self, attr_bytes: &'a [u8]) -> Option<&'a [u8]> {
        if self.non_resident_flag {
            return None;
        }
        let content_offset = self.content_offset? as usize;
        let content_length = self.content_length? as usize;
        let end = content_offset.checked_add(content_length)?;
        if end > attr_bytes.len() {
            return None;
        }
        Some(&attr_bytes[content_offset..end])
    }
}

pub enum ParsedHeader {
    EndMarker,
    Malformed,
    Header(AttributeHeader),
}

/// Parse the 16-byte (or 24-byte for resident) attribute header starting at
/// `offset` in `buf`. Never panics on adversarial input.
pub fn parse_header(buf: &[u8], offset: usize) -> ParsedHeader {
    if offset + ATTR_HEADER_SIZE > buf.len() {
        return ParsedHeader::Malformed;
    }

    let type_code = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap());
    if type_code == ATTR_END {
        return ParsedHeader::EndMarker;
    }

    let length = u32::from_le_bytes(buf[offset + 4..offset + 8].try_into().unwrap()) as usize;
    if length == 0 || length < ATTR_HEADER_SIZE || offset + length > buf.len() {
        return ParsedHeader::Malformed;
    }

    let non_resident_flag = buf[offset + 8] != 0;
    let name_length = buf[offset + 9];
    let name_offset = u16::from_le_bytes(buf[offset + 10..offset + 12].try_into().unwrap());
    let flags = u16::from_le_bytes(buf[offset + 12..offset + 14].try_into().unwrap());
    let attribute_id = u16::from_le_bytes(buf[offset + 14..offset + 16].try_into().unwrap());

    let (content_length, content_offset) = if !non_resident_flag
        && offset + ATTR_HEADER_SIZE + RESIDENT_HEADER_EXTRA_SIZE <= buf.len()
    {
        let base = offset + ATTR_HEADER_SIZE;
        let content_length = u32::from_le_bytes(buf[base..base + 4].try_into().unwrap());
        let content_offset = u16::from_le_bytes(buf[base + 4..base + 6].try_into().unwrap());
        let content_start = offset + content_offset as usize;
        let content_end = content_start.saturating_add(content_length as usize);
        if content_start < offset || content_end > offset + length {
            (None, None)
        } else {
            (Some(content_length), Some(content_offset))
        }
    } else {
        (None, None)
    };

    ParsedHeader::Header(AttributeHeader {
        type_code,
        length,
        non_resident_flag,
        name_length,
        name_offset,
        flags,
        attribute_id,
        content_length,
        content_offset,
    })
}

/// Re-encode a parsed header onto the same on-disk layout `parse_header`
/// reads, zero-padded out to `header.length` bytes. Used to verify the
/// spec's §8 round-trip property for attribute headers.
pub fn encode_header(header: &AttributeHeader) -> Vec<u8> {
    let mut buf = vec![0u8; header.length];
    buf[0..4].copy_from_slice(&header.type_code.to_le_bytes());
    buf[4..8].copy_from_slice(&(header.length as u32).to_le_bytes());
    buf[8] = header.non_resident_flag as u8;
    buf[9] = header.name_length;
    buf[10..12].copy_from_slice(&header.name_offset.to_le_bytes());
    buf[12..14].copy_from_slice(&header.flags.to_le_bytes());
    buf[14..16].copy_from_slice(&header.attribute_id.to_le_bytes());
    if let (Some(content_length), Some(content_offset)) =
        (header.content_length, header.content_offset)
    {
        buf[16..20].copy_from_slice(&content_length.to_le_bytes());
        buf[20..22].copy_from_slice(&content_offset.to_le_bytes());
    }
    buf
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardInformation {
    pub crtime: FileTime,
    pub mtime: FileTime,
    pub atime: FileTime,
    pub ctime: FileTime,
}

#[derive(Debug)]
pub struct AttrDecodeError(pub String);

impl std::fmt::Display for AttrDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn decode_standard_information(payload: &[u8]) -> Result<StandardInformation, AttrDecodeError> {
    if payload.len() < 32 {
        return Err(AttrDecodeError(format!(
            "STANDARD_INFORMATION payload too short ({} bytes)",
            payload.len()
        )));
    }
    let read_ft = |off: usize| -> FileTime {
        let low = u32::from_le_bytes(payload[off..off + 4].try_into().unwrap());
        let high = u32::from_le_bytes(payload[off + 4..off + 8].try_into().unwrap());
        FileTime::from_halves(low, high)
    };
    Ok(StandardInformation {
        crtime: read_ft(0),
        mtime: read_ft(8),
        atime: read_ft(16),
        ctime: read_ft(24),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNameNamespace {
    Posix,
    Win32,
    Dos,
    Win32AndDos,
}

impl FileNameNamespace {
    fn from_code(code: u8) -> Self {
        match code {
            0 => FileNameNamespace::Posix,
            1 => FileNameNamespace::Win32,
            2 => FileNameNamespace::Dos,
            _ => FileNameNamespace::Win32AndDos,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileNameAttr {
    pub parent_ref: u64,
    pub crtime: FileTime,
    pub mtime: FileTime,
    pub atime: FileTime,
    pub ctime: FileTime,
    pub allocated_size: u64,
    pub real_size: u64,
    pub flags: u32,
    pub namespace: FileNameNamespace,
    pub name: String,
}

impl FileNameAttr {
    pub fn parent_record_number(&self) -> u64 {
        self.parent_ref & 0x0000_FFFF_FFFF_FFFF
    }

    pub fn parent_sequence(&self) -> u16 {
        ((self.parent_ref >> 48) & 0xFFFF) as u16
    }
}

/// Decode a FILE_NAME payload. Requires at least 66 bytes but tolerates a
/// truncated name buffer (Scenario E): the declared `name_length` may
/// exceed what's actually available, in which case as many UTF-16 code
/// units as remain are decoded and the caller is expected to note the
/// truncation.
pub fn decode_file_name(payload: &[u8]) -> Result<(FileNameAttr, Option<String>), AttrDecodeError> {
    if payload.len() < 66 {
        return Err(AttrDecodeError(format!(
            "FILE_NAME payload too short ({} bytes)",
            payload.len()
        )));
    }

    let read_u64 = |off: usize| u64::from_le_bytes(payload[off..off + 8].try_into().unwrap());
    let read_u32 = |off: usize| u32::from_le_bytes(payload[off..off + 4].try_into().unwrap());
    let read_ft = |off: usize| -> FileTime {
        let low = read_u32(off);
        let high = read_u32(off + 4);
        FileTime::from_halves(low, high)
    };

    let parent_ref = read_u64(0);
    let crtime = read_ft(8);
    let mtime = read_ft(16);
    let ctime = read_ft(24);
    let atime = read_ft(32);
    let allocated_size = read_u64(40);
    let real_size = read_u64(48);
    let flags = read_u32(56);
    let namespace = FileNameNamespace::from_code(payload[65]);
    let name_len_units = payload[64] as usize;
    let declared_bytes = name_len_units * 2;
    let available = payload.len().saturating_sub(66);
    let take_bytes = declared_bytes.min(available);
    let take_bytes = take_bytes - (take_bytes % 2);

    let raw = &payload[66..66 + take_bytes];
    let utf16: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let name = String::from_utf16_lossy(&utf16);

    let note = if take_bytes < declared_bytes {
        Some(format!(
            "FILE_NAME declared {declared_bytes} bytes of name but only {take_bytes} were available; name truncated"
        ))
    } else {
        None
    };

    Ok((
        FileNameAttr {
            parent_ref,
            crtime,
            mtime,
            atime,
            ctime,
            allocated_size,
            real_size,
            flags,
            namespace,
            name,
        },
        note,
    ))
}

#[derive(Debug, Clone)]
pub struct ObjectId {
    pub object_id: String,
    pub birth_volume_id: String,
    pub birth_object_id: String,
    pub birth_domain_id: String,
}

/// Decode the four mixed-endian GUIDs of an OBJECT_ID attribute. Returns
/// `None` if the payload is entirely zero (no object id assigned).
pub fn decode_object_id(payload: &[u8]) -> Option<ObjectId> {
    if payload.len() < 64 || payload.iter().take(64).all(|&b| b == 0) {
        return None;
    }
    Some(ObjectId {
        object_id: format_guid(&payload[0..16]),
        birth_volume_id: format_guid(&payload[16..32]),
        birth_object_id: format_guid(&payload[32..48]),
        birth_domain_id: format_guid(&payload[48..64]),
    })
}

/// Render 16 raw bytes as a canonical GUID string, reversing the byte order
/// of the first three fields (Microsoft mixed-endian GUID encoding).
fn format_guid(bytes: &[u8]) -> String {
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[3], bytes[2], bytes[1], bytes[0],
        bytes[5], bytes[4],
        bytes[7], bytes[6],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}
