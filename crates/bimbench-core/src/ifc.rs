//! Light textual probe over IFC STEP (ISO-10303-21) files.
//!
//! [`ModelFile`] indexes `#id=IFCTYPE(...)` instance records and a few header
//! fields without interpreting attributes. That is enough for entity-level
//! statistics; schema semantics and geometry stay out of this crate.
//!
//! Each task opens its own `ModelFile` inside its own process and discards it
//! on exit, so the index is never shared across tasks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use memchr::memchr;

/// Fields lifted from the STEP header section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    pub file_name: Option<String>,
    pub schema: Option<String>,
}

/// One opened model: header info plus an entity-type index.
#[derive(Debug)]
pub struct ModelFile {
    path: PathBuf,
    header: HeaderInfo,
    /// Upper-cased entity type name (e.g. `IFCWALL`) to instance ids,
    /// in file order.
    by_type: BTreeMap<String, Vec<u32>>,
    entity_count: usize,
}

impl ModelFile {
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model {}", path.display()))?;
        if !content.contains("ISO-10303-21") {
            bail!("{} is not a STEP (ISO-10303-21) file", path.display());
        }

        let header = parse_header(&content);
        let mut by_type: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut entity_count = 0usize;
        scan_instances(&content, |id, type_name| {
            entity_count += 1;
            by_type.entry(type_name.to_string()).or_default().push(id);
        });

        Ok(Self {
            path: path.to_path_buf(),
            header,
            by_type,
            entity_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    /// Total number of instance records in the data section.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Instance count for one entity type (case-insensitive).
    pub fn count_of(&self, ifc_type: &str) -> usize {
        self.ids_of(ifc_type).len()
    }

    pub fn ids_of(&self, ifc_type: &str) -> &[u32] {
        self.by_type
            .get(&ifc_type.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All entity types present, with instance counts, in type-name order.
    pub fn type_counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.by_type.iter().map(|(t, ids)| (t.as_str(), ids.len()))
    }
}

/// Scan `#id=NAME(...)` records, invoking `visit` per instance line.
/// Malformed fragments are skipped rather than reported: the probe
/// enumerates what it can read.
fn scan_instances(content: &str, mut visit: impl FnMut(u32, &str)) {
    let bytes = content.as_bytes();
    let len = bytes.len();
    let mut pos = 0usize;

    while pos < len {
        let Some(offset) = memchr(b'#', &bytes[pos..]) else {
            break;
        };
        pos += offset + 1;

        let id_start = pos;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let id_end = pos;

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if id_end == id_start || pos >= len || bytes[pos] != b'=' {
            continue;
        }
        pos += 1;
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let name_start = pos;
        while pos < len && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
            pos += 1;
        }
        if pos == name_start {
            continue;
        }
        let name = &content[name_start..pos];

        if let Ok(id) = content[id_start..id_end].parse::<u32>() {
            visit(id, &name.to_ascii_uppercase());
        }

        // Skip to the end of the record so ids inside attribute lists
        // (references like `#12`) are not miscounted as instances.
        match memchr(b';', &bytes[pos..]) {
            Some(semi) => pos += semi + 1,
            None => break,
        }
    }
}

fn parse_header(content: &str) -> HeaderInfo {
    HeaderInfo {
        file_name: first_quoted_after(content, "FILE_NAME"),
        schema: first_quoted_after(content, "FILE_SCHEMA"),
    }
}

/// First `'...'` literal following the given header keyword.
fn first_quoted_after(content: &str, keyword: &str) -> Option<String> {
    let start = content.find(keyword)? + keyword.len();
    let rest = &content[start..];
    let open = rest.find('\'')?;
    let rest = &rest[open + 1..];
    let close = rest.find('\'')?;
    Some(rest[..close].to_string())
}

#[cfg(test)]
pub(crate) const SAMPLE_STEP: &str = "ISO-10303-21;\n\
HEADER;\n\
FILE_DESCRIPTION((''),'2;1');\n\
FILE_NAME('house.ifc','2024-03-01T10:00:00',(''),(''),'','','');\n\
FILE_SCHEMA(('IFC4'));\n\
ENDSEC;\n\
DATA;\n\
#1=IFCPROJECT('2DxGD4$nv4uBmkJyVnS6nm',#2,'House',$,$,$,$,(#9),#5);\n\
#2=IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);\n\
#10=IFCWALL('0DxGD4$nv4uBmkJyVnS600',#2,'Wall-1',$,$,#11,#12,$,$);\n\
#11=IFCWALL('0DxGD4$nv4uBmkJyVnS601',#2,'Wall-2',$,$,#13,#14,$,$);\n\
#12=IFCWALLSTANDARDCASE('0DxGD4$nv4uBmkJyVnS602',#2,'Wall-3',$,$,#15,#16,$,$);\n\
#20=IFCCOLUMN('0DxGD4$nv4uBmkJyVnS603',#2,'Col-1',$,$,#17,#18,$,$);\n\
#30=IFCSPACE('0DxGD4$nv4uBmkJyVnS604',#2,'Room-1',$,$,#19,#21,$,.ELEMENT.,.INTERNAL.,$);\n\
#31=IFCDOOR('0DxGD4$nv4uBmkJyVnS605',#2,'Door-1',$,$,#22,#23,$,2.1,0.9);\n\
ENDSEC;\n\
END-ISO-10303-21;\n";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn sample_model(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("house.ifc");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE_STEP.as_bytes()).unwrap();
        path
    }

    #[test]
    fn indexes_instances_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelFile::open(&sample_model(&dir)).unwrap();

        assert_eq!(model.count_of("IfcWall"), 2);
        assert_eq!(model.count_of("IFCWALLSTANDARDCASE"), 1);
        assert_eq!(model.count_of("IfcColumn"), 1);
        assert_eq!(model.count_of("IfcBeam"), 0);
        assert_eq!(model.entity_count(), 8);
        assert_eq!(model.ids_of("IFCWALL"), [10, 11]);
    }

    #[test]
    fn entity_references_inside_attributes_are_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelFile::open(&sample_model(&dir)).unwrap();
        // #9, #13..#23 only appear as references; none become instances.
        assert_eq!(model.ids_of("IFCPROJECT"), [1]);
    }

    #[test]
    fn reads_header_fields() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelFile::open(&sample_model(&dir)).unwrap();
        assert_eq!(model.header().schema.as_deref(), Some("IFC4"));
        assert_eq!(model.header().file_name.as_deref(), Some("house.ifc"));
    }

    #[test]
    fn rejects_non_step_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.ifc");
        std::fs::write(&path, "this is not a building model").unwrap();
        let err = ModelFile::open(&path).unwrap_err();
        assert!(err.to_string().contains("not a STEP"));
    }
}
