//! Display names for hierarchy paths.
//!
//! Raw hierarchical path segments are opaque identifiers; the sheet-file /
//! sheet-name metadata carried on footprints lets us render them as the
//! sheet names a designer actually sees. Built once per board by indexing
//! every footprint's enclosing-path metadata. Display-only: nothing in the
//! selection or replication engine depends on these names.

use std::collections::BTreeMap;

use log::warn;

use sublayout_board::{Board, Footprint};

use crate::hier;

#[derive(Debug)]
pub struct HierarchyNamer {
    /// path prefix → (sheetfile, sheetname) for every sheet instance
    /// observed on the board.
    sheetfile_names: BTreeMap<Vec<String>, (String, String)>,
}

impl HierarchyNamer {
    pub fn new(board: &Board) -> Self {
        let mut sheetfile_names: BTreeMap<Vec<String>, (String, String)> = BTreeMap::new();
        for (_, fp) in board.footprints() {
            let segs = hier::path_of(fp);
            if segs.len() < 2 {
                // Root components have no enclosing sheet.
                continue;
            }
            let (Some(file), Some(name)) = (&fp.sheetfile, &fp.sheetname) else {
                continue;
            };
            if file.is_empty() || name.is_empty() {
                continue;
            }
            let key = segs[..segs.len() - 1].to_vec();
            match sheetfile_names.get(&key) {
                Some((known_file, known_name)) => {
                    if known_file != file || known_name != name {
                        warn!(
                            "conflicting sheet metadata for {}: keeping {}:{}, ignoring {}:{}",
                            key.join("/"),
                            known_file,
                            known_name,
                            file,
                            name
                        );
                    }
                }
                None => {
                    sheetfile_names.insert(key, (file.clone(), name.clone()));
                }
            }
        }
        Self { sheetfile_names }
    }

    /// Name each prefix of `path` by its sheet name, `?` when unknown. The
    /// leaf position has no sheet name of its own; when `leaf_ref` is given
    /// it names the leaf instead.
    pub fn name_path(&self, path: &[String], leaf_ref: Option<&str>) -> Vec<String> {
        (1..=path.len())
            .map(|depth| {
                let sub = &path[..depth];
                match (self.sheetfile_names.get(sub), leaf_ref) {
                    (Some((_, name)), _) => name.clone(),
                    (None, Some(reference)) if depth == path.len() => reference.to_string(),
                    _ => "?".to_string(),
                }
            })
            .collect()
    }

    /// Structured display name of a footprint, slash-joined down to its
    /// reference designator.
    pub fn name_footprint(&self, footprint: &Footprint) -> String {
        self.name_path(&hier::path_of(footprint), Some(&footprint.reference))
            .join("/")
    }

    /// Name of the sheet containing a footprint (empty for root-level
    /// components).
    pub fn containing_name(&self, footprint: &Footprint) -> String {
        let path = hier::path_of(footprint);
        self.name_path(&path[..path.len() - 1], None).join("/")
    }

    /// Sheet file instantiated at `path`, if known.
    pub fn sheetfile_of(&self, path: &[String]) -> Option<&str> {
        self.sheetfile_names.get(path).map(|(file, _)| file.as_str())
    }

    /// All hierarchy paths instantiating the given sheet file: the other
    /// instances a laid-out sub-circuit can be replicated onto.
    pub fn instances_of(&self, sheetfile: &str) -> Vec<Vec<String>> {
        self.sheetfile_names
            .iter()
            .filter(|(_, (file, _))| file == sheetfile)
            .map(|(path, _)| path.clone())
            .collect()
    }
}
