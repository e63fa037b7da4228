//! Text rendering of a compressed path tree.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::PathTree;

/// One output line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRow {
    pub value: String,
    pub depth: usize,
    pub is_last_child: bool,
}

/// Glyph set used to draw connectors. All columns have equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStyle {
    pub through_tee: &'static str,
    pub end_tee: &'static str,
    pub vertical: &'static str,
    pub empty_column: &'static str,
}

impl TreeStyle {
    pub const UNICODE: TreeStyle = TreeStyle {
        through_tee: "├──",
        end_tee: "└──",
        vertical: "|  ",
        empty_column: "   ",
    };

    pub const ASCII: TreeStyle = TreeStyle {
        through_tee: "|--",
        end_tee: "`--",
        vertical: "|  ",
        empty_column: "   ",
    };
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self::UNICODE
    }
}

/// Config-facing selector for a [`TreeStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeStyleKind {
    #[default]
    Unicode,
    Ascii,
}

impl From<TreeStyleKind> for TreeStyle {
    fn from(kind: TreeStyleKind) -> Self {
        match kind {
            TreeStyleKind::Unicode => TreeStyle::UNICODE,
            TreeStyleKind::Ascii => TreeStyle::ASCII,
        }
    }
}

/// Visit the tree depth-first, left to right, compressing each node before
/// looking at its children.
#[instrument(level = "debug", skip(tree))]
pub fn render_rows(tree: &mut PathTree) -> Vec<RenderRow> {
    let mut rows = Vec::new();
    // stack top is the front of the frontier
    let mut frontier: Vec<(Index, usize, bool)> = Vec::new();

    let roots = tree.roots().to_vec();
    let last_root = roots.len().saturating_sub(1);
    for (i, &root) in roots.iter().enumerate().rev() {
        frontier.push((root, 0, i == last_root));
    }

    while let Some((idx, depth, is_last_child)) = frontier.pop() {
        let idx = tree.compress(idx);
        let Some(node) = tree.get_node(idx) else {
            continue;
        };

        let last = node.children.len().saturating_sub(1);
        for (i, &child) in node.children.iter().enumerate().rev() {
            frontier.push((child, depth + 1, i == last));
        }

        rows.push(RenderRow {
            value: node.value.clone(),
            depth,
            is_last_child,
        });
    }
    rows
}

/// Draw rows with connector glyphs, newline separated, no trailing newline.
pub fn draw(rows: &[RenderRow], style: &TreeStyle) -> String {
    // active[d]: an ancestor at depth d still has siblings to come
    let mut active: Vec<bool> = Vec::new();
    let mut lines = Vec::with_capacity(rows.len());

    for row in rows {
        let mut line = String::new();
        if row.depth == 0 {
            line.push_str(&row.value);
        } else {
            for column in 1..row.depth {
                if active.get(column).copied().unwrap_or(false) {
                    line.push_str(style.vertical);
                } else {
                    line.push_str(style.empty_column);
                }
            }
            line.push_str(if row.is_last_child {
                style.end_tee
            } else {
                style.through_tee
            });
            line.push(' ');
            line.push_str(&row.value);
        }
        lines.push(line);

        if active.len() <= row.depth {
            active.resize(row.depth + 1, false);
        }
        active[row.depth] = !row.is_last_child;
    }
    lines.join("\n")
}

/// Build, compress and draw the tree for `paths`.
pub fn render_paths<I, S>(paths: I, style: &TreeStyle) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = PathTree::from_paths(paths);
    draw(&render_rows(&mut tree), style)
}
