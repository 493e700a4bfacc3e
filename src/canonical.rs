//! Canonical visiting order for a finished [`GroupTree`].
//!
//! The order is computed once and shared by color assignment and
//! serialization so leaf indices and output order always agree:
//! - sibling groups ascend by case-sensitive byte-wise name comparison;
//! - records inside a leaf ascend by their grouping tuple, compared element
//!   by element, with ties kept in input order.

use std::cmp::Ordering;

use crate::constants::PATH_SEPARATOR;
use crate::record::Record;
use crate::tree::{GroupContents, GroupNode, GroupTree};
use crate::types::StyleId;

/// Sorted contents of a [`CanonicalGroup`].
#[derive(Clone, Debug)]
pub enum CanonicalContents<'a> {
    /// Sorted child groups.
    Groups(Vec<CanonicalGroup<'a>>),
    /// Sorted records of a leaf group.
    Records(Vec<&'a Record>),
}

/// A group node viewed in canonical order, with its full ancestor path.
#[derive(Clone, Debug)]
pub struct CanonicalGroup<'a> {
    path: Vec<&'a str>,
    contents: CanonicalContents<'a>,
}

impl<'a> CanonicalGroup<'a> {
    fn new(node: &'a GroupNode, parent: &[&'a str]) -> Self {
        let mut path = parent.to_vec();
        path.push(node.name());
        let contents = match node.contents() {
            GroupContents::Groups(children) => {
                let mut nodes: Vec<&'a GroupNode> = children.values().collect();
                nodes.sort_by(|a, b| compare_names(a.name(), b.name()));
                CanonicalContents::Groups(
                    nodes
                        .into_iter()
                        .map(|child| CanonicalGroup::new(child, &path))
                        .collect(),
                )
            }
            GroupContents::Records(records) => CanonicalContents::Records(sort_records(records)),
        };
        Self { path, contents }
    }

    /// Group name at this depth.
    pub fn name(&self) -> &'a str {
        self.path.last().copied().unwrap_or_default()
    }

    /// Ancestor names from the top-level group down to this one (inclusive).
    pub fn path(&self) -> &[&'a str] {
        &self.path
    }

    /// Depth below the root, starting at 1 for top-level groups.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Space-joined ancestor path, trimmed; used as the leaf style identifier.
    pub fn style_id(&self) -> StyleId {
        self.path.join(PATH_SEPARATOR).trim().to_string()
    }

    /// Sorted children or records.
    pub fn contents(&self) -> &CanonicalContents<'a> {
        &self.contents
    }

    /// True when the group holds records.
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, CanonicalContents::Records(_))
    }

    /// Sorted child groups; empty for leaves.
    pub fn children(&self) -> &[CanonicalGroup<'a>] {
        match &self.contents {
            CanonicalContents::Groups(children) => children,
            CanonicalContents::Records(_) => &[],
        }
    }

    /// Sorted records; empty for interior groups.
    pub fn records(&self) -> &[&'a Record] {
        match &self.contents {
            CanonicalContents::Records(records) => records,
            CanonicalContents::Groups(_) => &[],
        }
    }
}

/// Whole tree in canonical order.
#[derive(Clone, Debug)]
pub struct CanonicalTree<'a> {
    groups: Vec<CanonicalGroup<'a>>,
    ungrouped: Vec<&'a Record>,
}

impl<'a> CanonicalTree<'a> {
    /// Sort every level of `tree`. The tree itself is not modified.
    pub fn new(tree: &'a GroupTree) -> Self {
        let mut nodes: Vec<&'a GroupNode> = tree.groups().values().collect();
        nodes.sort_by(|a, b| compare_names(a.name(), b.name()));
        Self {
            groups: nodes
                .into_iter()
                .map(|node| CanonicalGroup::new(node, &[]))
                .collect(),
            ungrouped: sort_records(tree.ungrouped()),
        }
    }

    /// Top-level groups in canonical order.
    pub fn groups(&self) -> &[CanonicalGroup<'a>] {
        &self.groups
    }

    /// Ungrouped records in canonical order.
    pub fn ungrouped(&self) -> &[&'a Record] {
        &self.ungrouped
    }

    /// Leaf groups in depth-first canonical order.
    ///
    /// Children are always visited before a node is considered as a leaf, so
    /// this is the order in which leaf indices are handed out.
    pub fn leaves(&self) -> Vec<&CanonicalGroup<'a>> {
        let mut leaves = Vec::new();
        collect_leaves(&self.groups, &mut leaves);
        leaves
    }
}

fn collect_leaves<'t, 'a>(
    groups: &'t [CanonicalGroup<'a>],
    out: &mut Vec<&'t CanonicalGroup<'a>>,
) {
    for group in groups {
        match &group.contents {
            CanonicalContents::Groups(children) => collect_leaves(children, out),
            CanonicalContents::Records(_) => out.push(group),
        }
    }
}

/// Ordering for sibling group names: plain byte-wise string comparison.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Ordering for records: element-wise comparison of grouping tuples.
pub fn compare_records(a: &Record, b: &Record) -> Ordering {
    a.sort_key().cmp(b.sort_key())
}

fn sort_records(records: &[Record]) -> Vec<&Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    // `sort_by` is stable; equal tuples keep input order.
    sorted.sort_by(|a, b| compare_records(a, b));
    sorted
}
