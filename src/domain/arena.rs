//! Arena-backed prefix tree of slash-delimited paths.

use generational_arena::{Arena, Index};
use tracing::instrument;

pub const PATH_SEPARATOR: char = '/';

/// Tree node: one path segment, or a chain of segments after compression.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub value: String,
    /// Child indices in insertion order; child values are unique among siblings
    pub children: Vec<Index>,
}

/// Prefix tree over paths, one root per distinct first segment.
///
/// Nodes live in a generational arena and are addressed by index. Compression
/// never rewrites a node; it inserts a new node holding the joined chain.
#[derive(Debug)]
pub struct PathTree {
    arena: Arena<TreeNode>,
    roots: Vec<Index>,
    separator: char,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    pub fn new() -> Self {
        Self::with_separator(PATH_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            separator,
        }
    }

    /// Build a tree from paths, roots ordered by first appearance.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.insert_path(path.as_ref());
        }
        tree
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_path(&mut self, path: &str) {
        let mut segments = path.split(self.separator);
        let Some(first) = segments.next() else {
            return;
        };

        let mut current = match self.find(&self.roots, first) {
            Some(idx) => idx,
            None => {
                let idx = self.new_node(first);
                self.roots.push(idx);
                idx
            }
        };

        for segment in segments {
            current = self.child_or_insert(current, segment);
        }
    }

    fn child_or_insert(&mut self, parent: Index, segment: &str) -> Index {
        let siblings = self
            .arena
            .get(parent)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        if let Some(existing) = self.find(&siblings, segment) {
            return existing;
        }

        let idx = self.new_node(segment);
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(idx);
        }
        idx
    }

    fn find(&self, candidates: &[Index], value: &str) -> Option<Index> {
        candidates
            .iter()
            .copied()
            .find(|&idx| self.arena.get(idx).is_some_and(|n| n.value == value))
    }

    fn new_node(&mut self, value: &str) -> Index {
        self.arena.insert(TreeNode {
            value: value.to_string(),
            children: Vec::new(),
        })
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    /// Collapse a chain of single-child nodes starting at `idx`.
    ///
    /// Returns `idx` unchanged if the node has zero or several children, otherwise a
    /// new node whose value joins the chain with the separator and whose children
    /// are those of the last node in the chain.
    #[instrument(level = "trace", skip(self))]
    pub fn compress(&mut self, idx: Index) -> Index {
        let Some(start) = self.arena.get(idx) else {
            return idx;
        };
        if start.children.len() != 1 {
            return idx;
        }

        let mut value = start.value.clone();
        let mut children = start.children.clone();
        while children.len() == 1 {
            let Some(child) = self.arena.get(children[0]) else {
                break;
            };
            value.push(self.separator);
            value.push_str(&child.value);
            children = child.children.clone();
        }

        self.arena.insert(TreeNode { value, children })
    }

    /// Number of nodes stored, including superseded chain nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
