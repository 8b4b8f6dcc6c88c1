//! In-memory record table and path resolution.

use std::collections::{BTreeMap, HashSet};

use crate::record::Record;

/// Record 5 is the volume root sentinel: `parsed_path` is unconditionally
/// `"/"`, regardless of its own FILE_NAME content.
pub const VOLUME_ROOT_RECORD_NUMBER: u32 = 5;

/// Table mapping `record_number -> Record`. Keys are unique; insertion
/// order corresponds to byte offset in the source image, but the table
/// itself is ordered by record number so iteration always yields ascending
/// `record_number` (spec §5 ordering guarantee).
#[derive(Debug, Default)]
pub struct Catalog {
    records: BTreeMap<u32, Record>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Insert a decoded record, keyed by its own `record_number`. A
    /// duplicate record number is last-write-wins; the surviving record
    /// gains a diagnostic note.
    pub fn insert(&mut self, mut record: Record) {
        let rn = record.record_number;
        if self.records.contains_key(&rn) {
            record.notes.push("Duplicate record number, overwritten".to_string());
        }
        self.records.insert(rn, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, record_number: u32) -> Option<&Record> {
        self.records.get(&record_number)
    }

    /// Records in ascending `record_number` order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Resolve `parsed_path` for every record in the table. Uses an
    /// explicit work stack (not language recursion) so arbitrarily deep or
    /// cyclic parent-reference chains terminate without overflowing the
    /// call stack (spec §4.4, §9: "convert recursion to iteration once
    /// depth exceeds a threshold").
    pub fn resolve_all_paths(&mut self) {
        let record_numbers: Vec<u32> = self.records.keys().copied().collect();
        for rn in record_numbers {
            if self
                .records
                .get(&rn)
                .map(|r| r.parsed_path.is_none())
                .unwrap_or(false)
            {
                self.resolve_path(rn);
            }
        }
    }

    fn resolve_path(&mut self, start: u32) -> String {
        let mut chain: Vec<(u32, String)> = Vec::new();
        let mut chain_set: HashSet<u32> = HashSet::new();
        let mut current = start;

        loop {
            if chain_set.contains(&current) {
                return self.unwind(chain, "Circular_Reference".to_string());
            }

            if current == VOLUME_ROOT_RECORD_NUMBER {
                let result = "/".to_string();
                if let Some(r) = self.records.get_mut(&current) {
                    if r.parsed_path.is_none() {
                        r.parsed_path = Some(result.clone());
                    }
                }
                return self.unwind(chain, result);
            }

            let record = match self.records.get(&current) {
                None => return self.unwind(chain, "Orphan".to_string()),
                Some(r) => r,
            };

            if let Some(existing) = &record.parsed_path {
                let existing = existing.clone();
                return self.unwind(chain, existing);
            }

            if record.file_names.is_empty() {
                self.records.get_mut(&current).unwrap().parsed_path = Some("NoFNRecord".to_string());
                return self.unwind(chain, "NoFNRecord".to_string());
            }

            let fn_attr = record.path_name().unwrap();
            let pref = fn_attr.parent_record_number();
            let name = fn_attr.name.clone();

            if pref == VOLUME_ROOT_RECORD_NUMBER as u64 {
                let result = format!("/{name}");
                self.records.get_mut(&current).unwrap().parsed_path = Some(result.clone());
                return self.unwind(chain, result);
            }

            if pref == current as u64 {
                let result = format!("ORPHAN/{name}");
                self.records.get_mut(&current).unwrap().parsed_path = Some(result.clone());
                return self.unwind(chain, result);
            }

            chain.push((current, name));
            chain_set.insert(current);

            if pref > u32::MAX as u64 {
                return self.unwind(chain, "Orphan".to_string());
            }
            current = pref as u32;
        }
    }

    fn unwind(&mut self, mut chain: Vec<(u32, String)>, mut result: String) -> String {
        while let Some((rn, name)) = chain.pop() {
            result = format!("{result}/{name}");
            if let Some(r) = self.records.get_mut(&rn) {
                r.parsed_path = Some(result.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{FileNameAttr, FileNameNamespace};
    use crate::record::RecordStatus;
    use crate::windows_time::FileTime;
    use std::collections::BTreeSet;

    fn bare_record(record_number: u32, parent_ref: u64, name: &str) -> Record {
        Record {
            record_number,
            sequence: 1,
            hard_link_count: 1,
            flags: 0x0003,
            magic: crate::record::MAGIC_GOOD,
            base_ref: 0,
            standard_info: None,
            file_names: vec![FileNameAttr {
                parent_ref,
                crtime: FileTime::default(),
                mtime: FileTime::default(),
                atime: FileTime::default(),
                ctime: FileTime::default(),
                allocated_size: 0,
                real_size: 0,
                flags: 0,
                namespace: FileNameNamespace::Win32,
                name: name.to_string(),
            }],
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
        }
    }

    #[test]
    fn scenario_a_root_resolution() {
        let mut catalog = Catalog::new();
        catalog.insert(bare_record(5, 5, "."));
        catalog.insert(bare_record(6, 5, "Windows"));
        catalog.resolve_all_paths();

        assert_eq!(catalog.get(5).unwrap().parsed_path.as_deref(), Some("/"));
        assert_eq!(
            catalog.get(6).unwrap().parsed_path.as_deref(),
            Some("/Windows")
        );
    }

    #[test]
    fn scenario_b_cycle() {
        let mut catalog = Catalog::new();
        catalog.insert(bare_record(100, 101, "a"));
        catalog.insert(bare_record(101, 100, "b"));
        catalog.resolve_all_paths();

        let p100 = catalog.get(100).unwrap().parsed_path.clone().unwrap();
        let p101 = catalog.get(101).unwrap().parsed_path.clone().unwrap();
        assert!(p100.contains("Circular_Reference"));
        assert!(p101.contains("Circular_Reference"));
    }

    #[test]
    fn orphan_parent_missing() {
        let mut catalog = Catalog::new();
        catalog.insert(bare_record(10, 9999, "lost"));
        catalog.resolve_all_paths();
        assert_eq!(
            catalog.get(10).unwrap().parsed_path.as_deref(),
            Some("Orphan/lost")
        );
    }

    #[test]
    fn self_parent_is_orphan_marker() {
        let mut catalog = Catalog::new();
        catalog.insert(bare_record(42, 42, "self"));
        catalog.resolve_all_paths();
        assert_eq!(
            catalog.get(42).unwrap().parsed_path.as_deref(),
            Some("ORPHAN/self")
        );
    }

    #[test]
    fn deep_chain_does_not_overflow_stack() {
        let mut catalog = Catalog::new();
        catalog.insert(bare_record(5, 5, "."));
        let depth = 50_000u32;
        for k in 6..(6 + depth) {
            let parent = if k == 6 { 5 } else { k - 1 };
            catalog.insert(bare_record(k, parent as u64, &format!("n{k}")));
        }
        catalog.resolve_all_paths();
        let deepest = catalog.get(5 + depth).unwrap();
        assert!(deepest.parsed_path.as_ref().unwrap().starts_with("/n6/"));
    }
}
