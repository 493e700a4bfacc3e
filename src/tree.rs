//! Grouping tree construction.
//!
//! Records are bucketed into nested [`GroupNode`]s, one level per grouping
//! key. Interior nodes only hold child groups and leaf nodes only hold
//! records; the split is carried by [`GroupContents`] rather than by checking
//! which collection happens to be empty.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::errors::ConvertError;
use crate::record::Record;
use crate::types::{FieldName, GroupName, RowIndex};

/// Children of a group node: either nested groups or the records of a leaf.
#[derive(Clone, Debug)]
pub enum GroupContents {
    /// Child groups keyed by name, in first-insertion order.
    Groups(IndexMap<GroupName, GroupNode>),
    /// Records owned by a leaf group, in insertion order.
    Records(Vec<Record>),
}

/// A named group at one depth of the tree.
#[derive(Clone, Debug)]
pub struct GroupNode {
    name: GroupName,
    contents: GroupContents,
}

impl GroupNode {
    fn interior(name: GroupName) -> Self {
        Self {
            name,
            contents: GroupContents::Groups(IndexMap::new()),
        }
    }

    fn leaf(name: GroupName) -> Self {
        Self {
            name,
            contents: GroupContents::Records(Vec::new()),
        }
    }

    /// Value identifying this group at its depth.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child groups or records.
    pub fn contents(&self) -> &GroupContents {
        &self.contents
    }

    /// True when the node holds records rather than child groups.
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, GroupContents::Records(_))
    }

    /// Child groups; empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = &GroupNode> {
        let children = match &self.contents {
            GroupContents::Groups(children) => Some(children.values()),
            GroupContents::Records(_) => None,
        };
        children.into_iter().flatten()
    }

    /// Records held directly by this node; empty for interior nodes.
    pub fn records(&self) -> &[Record] {
        match &self.contents {
            GroupContents::Records(records) => records,
            GroupContents::Groups(_) => &[],
        }
    }

    fn count_nodes(&self, folders: &mut usize, leaves: &mut usize) {
        *folders += 1;
        if self.is_leaf() {
            *leaves += 1;
        }
        for child in self.children() {
            child.count_nodes(folders, leaves);
        }
    }
}

/// Where a record ended up after insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Stored in the leaf at `depth` (the grouping path length).
    Grouped { depth: usize },
    /// Stored in the root-level ungrouped list.
    Ungrouped,
}

/// A record left out of the grouped hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Data row index of the skipped record.
    pub row: RowIndex,
    /// Grouping field that could not be resolved.
    pub missing_key: FieldName,
}

/// Outcome counters for [`GroupTree::build`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Records stored in leaf groups.
    pub grouped: usize,
    /// Records stored in the ungrouped list.
    pub ungrouped: usize,
    /// Records excluded because a grouping field was missing.
    pub skipped: Vec<SkippedRecord>,
}

/// Root of the grouping hierarchy.
#[derive(Clone, Debug, Default)]
pub struct GroupTree {
    groups: IndexMap<GroupName, GroupNode>,
    ungrouped: Vec<Record>,
    depth: Option<usize>,
}

impl GroupTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every record, skipping (and logging) those with missing grouping fields.
    ///
    /// Structural violations abort the build.
    pub fn build<I>(records: I) -> Result<(Self, BuildReport), ConvertError>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut tree = Self::new();
        let mut report = BuildReport::default();
        for record in records {
            match tree.insert(record) {
                Ok(Placement::Grouped { .. }) => report.grouped += 1,
                Ok(Placement::Ungrouped) => report.ungrouped += 1,
                Err(ConvertError::MissingGroupKey { key, row }) => {
                    warn!(
                        row,
                        key = %key,
                        "[darwin_kml:tree] skipping record without grouping field"
                    );
                    report.skipped.push(SkippedRecord {
                        row,
                        missing_key: key,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        debug!(
            grouped = report.grouped,
            ungrouped = report.ungrouped,
            skipped = report.skipped.len(),
            "[darwin_kml:tree] build complete"
        );
        Ok((tree, report))
    }

    /// Insert one record at the path named by its grouping values.
    ///
    /// Missing nodes are created on the way down; existing children are never
    /// reordered, merged, or removed. A record whose grouping values cannot be
    /// resolved is rejected before the tree is touched.
    pub fn insert(&mut self, record: Record) -> Result<Placement, ConvertError> {
        let values = record.group_values()?.to_vec();
        let Some((leaf_name, interior)) = values.split_last() else {
            self.ungrouped.push(record);
            return Ok(Placement::Ungrouped);
        };

        match self.depth {
            Some(depth) if depth != values.len() => {
                return Err(ConvertError::StructuralInvariant(format!(
                    "row {} has {} grouping values but the tree is {depth} levels deep",
                    record.row(),
                    values.len()
                )));
            }
            Some(_) => {}
            None => self.depth = Some(values.len()),
        }

        let mut siblings = &mut self.groups;
        for name in interior {
            let node = siblings
                .entry(name.clone())
                .or_insert_with(|| GroupNode::interior(name.clone()));
            siblings = match &mut node.contents {
                GroupContents::Groups(children) => children,
                GroupContents::Records(_) => {
                    return Err(ConvertError::StructuralInvariant(format!(
                        "leaf group '{name}' was reached as an interior group"
                    )));
                }
            };
        }

        let leaf = siblings
            .entry(leaf_name.clone())
            .or_insert_with(|| GroupNode::leaf(leaf_name.clone()));
        match &mut leaf.contents {
            GroupContents::Records(records) => records.push(record),
            GroupContents::Groups(_) => {
                return Err(ConvertError::StructuralInvariant(format!(
                    "interior group '{leaf_name}' was reached as a leaf group"
                )));
            }
        }
        Ok(Placement::Grouped {
            depth: values.len(),
        })
    }

    /// Top-level groups in first-insertion order.
    pub fn groups(&self) -> &IndexMap<GroupName, GroupNode> {
        &self.groups
    }

    /// Records inserted without a grouping path.
    pub fn ungrouped(&self) -> &[Record] {
        &self.ungrouped
    }

    /// Grouping depth fixed by the first grouped record.
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Follow `path` from the root.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&GroupNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.groups.get(first.as_ref())?;
        for name in rest {
            node = match &node.contents {
                GroupContents::Groups(children) => children.get(name.as_ref())?,
                GroupContents::Records(_) => return None,
            };
        }
        Some(node)
    }

    /// Number of group nodes (every depth) and number of leaf groups.
    pub fn node_counts(&self) -> (usize, usize) {
        let mut folders = 0;
        let mut leaves = 0;
        for node in self.groups.values() {
            node.count_nodes(&mut folders, &mut leaves);
        }
        (folders, leaves)
    }

    /// True when nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.ungrouped.is_empty()
    }
}
