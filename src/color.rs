//! Leaf-group color assignment.
//!
//! Leaves are numbered in canonical order across the whole tree. Index `i`
//! picks base color `i % 6` and darkens every non-zero channel by
//! `20 * (i / 6)`, flooring at zero. Colors are rendered in KML's
//! `aabbggrr` hex form with a fixed `ff` alpha.

use std::fmt;

use indexmap::IndexMap;

use crate::canonical::{CanonicalGroup, CanonicalTree};
use crate::constants::palette::{BASE_COLORS, DARKEN_STEP, OPACITY_PREFIX};
use crate::record::Record;
use crate::types::{GroupName, StyleId};

/// An opaque icon color, stored per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KmlColor {
    /// Blue channel.
    pub blue: u8,
    /// Green channel.
    pub green: u8,
    /// Red channel.
    pub red: u8,
}

impl KmlColor {
    /// Color for the leaf visited at `index` in canonical order.
    pub fn for_leaf_index(index: usize) -> Self {
        let cycle = index / BASE_COLORS.len();
        let (blue, green, red) = BASE_COLORS[index % BASE_COLORS.len()];
        let amount = DARKEN_STEP.saturating_mul(cycle);
        Self {
            blue: darken(blue, amount),
            green: darken(green, amount),
            red: darken(red, amount),
        }
    }
}

fn darken(channel: u8, amount: usize) -> u8 {
    u8::try_from(usize::from(channel).saturating_sub(amount)).unwrap_or(0)
}

impl fmt::Display for KmlColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{OPACITY_PREFIX}{:02x}{:02x}{:02x}",
            self.blue, self.green, self.red
        )
    }
}

/// Style handed to one leaf group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeafStyle {
    /// Position of the leaf in canonical order.
    pub index: usize,
    /// Icon color.
    pub color: KmlColor,
    /// Space-joined ancestor path of the leaf.
    pub style_id: StyleId,
}

/// Leaf ancestor path -> style, in canonical leaf order.
#[derive(Clone, Debug, Default)]
pub struct ColorAssignment {
    styles: IndexMap<Vec<GroupName>, LeafStyle>,
}

impl ColorAssignment {
    /// Style of the leaf whose ancestor path is `path`.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&LeafStyle> {
        let key: Vec<GroupName> = path.iter().map(|name| name.as_ref().to_string()).collect();
        self.styles.get(&key)
    }

    /// Style of the leaf that holds `record` (its grouping values are the leaf path).
    pub fn for_record(&self, record: &Record) -> Option<&LeafStyle> {
        if record.sort_key().is_empty() {
            return None;
        }
        self.styles.get(record.sort_key())
    }

    /// Styles in canonical leaf order.
    pub fn iter(&self) -> impl Iterator<Item = (&[GroupName], &LeafStyle)> {
        self.styles.iter().map(|(path, style)| (path.as_slice(), style))
    }

    /// Style ids carried by more than one leaf, in first-seen order.
    ///
    /// Distinct paths can join to the same id when group names contain spaces
    /// or are empty; a document viewer resolves such an id to its first style.
    pub fn colliding_style_ids(&self) -> Vec<&str> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for style in self.styles.values() {
            *counts.entry(style.style_id.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(style_id, _)| style_id)
            .collect()
    }

    /// Number of colored leaves.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when no leaf was colored.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Number every leaf of `tree` in canonical order and derive its style.
///
/// Interior groups get no style of their own. The tree is only read.
pub fn assign_colors(tree: &CanonicalTree<'_>) -> ColorAssignment {
    tree.leaves()
        .into_iter()
        .enumerate()
        .fold(ColorAssignment::default(), |mut assignment, (index, leaf)| {
            assignment.styles.insert(leaf_key(leaf), leaf_style(index, leaf));
            assignment
        })
}

fn leaf_key(leaf: &CanonicalGroup<'_>) -> Vec<GroupName> {
    leaf.path().iter().map(|name| name.to_string()).collect()
}

fn leaf_style(index: usize, leaf: &CanonicalGroup<'_>) -> LeafStyle {
    LeafStyle {
        index,
        color: KmlColor::for_leaf_index(index),
        style_id: leaf.style_id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldMap;
    use crate::tree::GroupTree;
    use crate::types::FieldName;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn genus_record(row: usize, genus: &str) -> Record {
        let fields: FieldMap = [("genus".to_string(), genus.to_string())]
            .into_iter()
            .collect();
        let path: Arc<[FieldName]> = Arc::from(vec!["genus".to_string()]);
        Record::new(row, fields, path)
    }

    #[test]
    fn first_cycle_uses_base_palette() {
        let rendered: Vec<String> = (0..6)
            .map(|index| KmlColor::for_leaf_index(index).to_string())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "ffff0000", "ff00ff00", "ff0000ff", "ffffff00", "ffff00ff", "ff00ffff"
            ]
        );
    }

    #[test]
    fn later_cycles_darken_non_zero_channels() {
        assert_eq!(KmlColor::for_leaf_index(6).to_string(), "ffeb0000");
        assert_eq!(KmlColor::for_leaf_index(9).to_string(), "ffebeb00");
        assert_eq!(KmlColor::for_leaf_index(17).to_string(), "ff00d7d7");
        assert_eq!(KmlColor::for_leaf_index(72).to_string(), "ff0f0000");
    }

    #[test]
    fn channels_floor_at_zero() {
        assert_eq!(KmlColor::for_leaf_index(78).to_string(), "ff000000");
        assert_eq!(KmlColor::for_leaf_index(10_000).to_string(), "ff000000");
        assert_eq!(KmlColor::for_leaf_index(usize::MAX).to_string(), "ff000000");
    }

    #[test]
    fn colors_are_distinct_until_channels_collapse() {
        let distinct: HashSet<KmlColor> = (0..78).map(KmlColor::for_leaf_index).collect();
        assert_eq!(distinct.len(), 78);
        assert_eq!(
            KmlColor::for_leaf_index(78),
            KmlColor::for_leaf_index(79)
        );
    }

    #[test]
    fn assignment_follows_canonical_leaf_order() {
        let (tree, _) = GroupTree::build([
            genus_record(0, "Vulpes"),
            genus_record(1, "Canis"),
            genus_record(2, "Lynx"),
        ])
        .unwrap();
        let canonical = CanonicalTree::new(&tree);
        let colors = assign_colors(&canonical);

        let order: Vec<(&str, usize)> = colors
            .iter()
            .map(|(_, style)| (style.style_id.as_str(), style.index))
            .collect();
        assert_eq!(order, vec![("Canis", 0), ("Lynx", 1), ("Vulpes", 2)]);
        assert_eq!(colors.get(&["Lynx"]).unwrap().color.to_string(), "ff00ff00");
        assert!(colors.get(&["Felis"]).is_none());
    }

    #[test]
    fn record_color_is_its_leaf_color() {
        let (tree, _) = GroupTree::build([genus_record(0, "Canis"), genus_record(1, "Vulpes")])
            .unwrap();
        let canonical = CanonicalTree::new(&tree);
        let colors = assign_colors(&canonical);
        let vulpes = &tree.groups()["Vulpes"].records()[0];
        assert_eq!(colors.for_record(vulpes).unwrap().style_id, "Vulpes");
    }

    #[test]
    fn empty_tree_has_no_styles() {
        let tree = GroupTree::new();
        let colors = assign_colors(&CanonicalTree::new(&tree));
        assert!(colors.is_empty());
        assert_eq!(colors.len(), 0);
    }

    fn species_record(row: usize, genus: &str, epithet: &str) -> Record {
        let fields: FieldMap = [
            ("genus".to_string(), genus.to_string()),
            ("specificEpithet".to_string(), epithet.to_string()),
        ]
        .into_iter()
        .collect();
        let path: Arc<[FieldName]> =
            Arc::from(vec!["genus".to_string(), "specificEpithet".to_string()]);
        Record::new(row, fields, path)
    }

    #[test]
    fn style_ids_are_trimmed_around_empty_names() {
        let (tree, _) = GroupTree::build([
            species_record(0, "Canis", ""),
            species_record(1, "", "lupus"),
        ])
        .unwrap();
        let colors = assign_colors(&CanonicalTree::new(&tree));
        assert_eq!(colors.get(&["Canis", ""]).unwrap().style_id, "Canis");
        assert_eq!(colors.get(&["", "lupus"]).unwrap().style_id, "lupus");
        assert!(colors.colliding_style_ids().is_empty());
    }

    #[test]
    fn colliding_style_ids_are_reported_once() {
        let (tree, _) = GroupTree::build([
            species_record(0, "", "x"),
            species_record(1, "x", ""),
            species_record(2, "Canis", "lupus"),
            species_record(3, "x", ""),
        ])
        .unwrap();
        let colors = assign_colors(&CanonicalTree::new(&tree));
        assert_eq!(colors.len(), 3);
        assert_eq!(colors.get(&["", "x"]).unwrap().style_id, "x");
        assert_eq!(colors.get(&["x", ""]).unwrap().style_id, "x");
        assert_ne!(
            colors.get(&["", "x"]).unwrap().color,
            colors.get(&["x", ""]).unwrap().color
        );
        assert_eq!(colors.colliding_style_ids(), vec!["x"]);
    }
}
