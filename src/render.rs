use std::fmt;

use itertools::Itertools;
use procstat::ProcessRecord;

use crate::{Error, ProcessTree, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append `(<pid>)` to every process name
    pub show_pids: bool,
    /// Visit siblings by ascending pid instead of discovery order
    pub numeric_sort: bool,
}

/// One process of the rendered tree.
///
/// Displays as one tab per ancestor followed by the process name and, when
/// requested, its pid in parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedLine<'a> {
    pub index: usize,
    pub level: usize,
    pub record: &'a ProcessRecord,
    show_pid: bool,
}

impl fmt::Display for RenderedLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            f.write_str("\t")?;
        }
        f.write_str(&self.record.name)?;
        if self.show_pid {
            write!(f, "({})", self.record.id)?;
        }
        Ok(())
    }
}

/// Depth-first preorder walk over a [`ProcessTree`].
///
/// Each position is emitted at most once. Reaching a position a second time
/// yields [`Error::StructuralInconsistency`] in place of the line, and the
/// walk goes on without descending into it again.
pub struct Render<'a> {
    tree: &'a ProcessTree,
    options: RenderOptions,
    /// Pending `(position, level)` pairs, next one on top
    stack: Vec<(usize, usize)>,
    visited: Vec<bool>,
}

impl<'a> Render<'a> {
    /// Walk the subtree rooted at `root`. An out of range root renders
    /// nothing.
    pub fn new(tree: &'a ProcessTree, root: usize, options: RenderOptions) -> Self {
        Self::with_roots(tree, &[root], options)
    }

    /// Walk every root of the tree, orphans included, one after the other.
    pub fn forest(tree: &'a ProcessTree, options: RenderOptions) -> Self {
        Self::with_roots(tree, tree.roots(), options)
    }

    fn with_roots(tree: &'a ProcessTree, roots: &[usize], options: RenderOptions) -> Self {
        let roots: Vec<usize> = roots
            .iter()
            .copied()
            .filter(|&index| index < tree.len())
            .collect();
        let stack = sibling_order(tree, &roots, options.numeric_sort)
            .into_iter()
            .rev()
            .map(|index| (index, 0))
            .collect();

        Self {
            tree,
            options,
            stack,
            visited: vec![false; tree.len()],
        }
    }
}

impl<'a> Iterator for Render<'a> {
    type Item = Result<RenderedLine<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, level) = self.stack.pop()?;
        let record = &self.tree.records()[index];

        if std::mem::replace(&mut self.visited[index], true) {
            return Some(Err(Error::StructuralInconsistency {
                index,
                id: record.id,
            }));
        }

        let children = sibling_order(
            self.tree,
            self.tree.children(index),
            self.options.numeric_sort,
        );
        self.stack
            .extend(children.into_iter().rev().map(|child| (child, level + 1)));

        Some(Ok(RenderedLine {
            index,
            level,
            record,
            show_pid: self.options.show_pids,
        }))
    }
}

/// Order in which the given siblings are visited. The pid sort is stable, so
/// records sharing a pid keep their discovery order.
fn sibling_order(tree: &ProcessTree, siblings: &[usize], numeric_sort: bool) -> Vec<usize> {
    if numeric_sort {
        siblings
            .iter()
            .copied()
            .sorted_by_key(|&index| tree.records()[index].id)
            .collect()
    } else {
        siblings.to_vec()
    }
}
