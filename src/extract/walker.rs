//! Depth-first block tree walker.
//!
//! The walker keeps an explicit stack instead of recursing, so tree depth
//! costs heap memory only. Children are pushed in reverse so that popping
//! yields them in reading order.

use std::collections::HashSet;
use std::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::model::{Block, Document};

/// Decides whether the walker descends into a block's children.
pub trait TraversalPolicy {
    /// Return `true` to enqueue the children of `block`.
    fn descend(&self, block: &Block) -> bool;
}

impl<P: TraversalPolicy + ?Sized> TraversalPolicy for &P {
    fn descend(&self, block: &Block) -> bool {
        (**self).descend(block)
    }
}

/// Policy that descends into every block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescendAll;

impl TraversalPolicy for DescendAll {
    fn descend(&self, _block: &Block) -> bool {
        true
    }
}

/// A block reached during the walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// The block
    pub block: &'a Block,

    /// Distance from the walk root (roots are at depth 0)
    pub depth: usize,
}

/// Lazy pre-order iterator over the blocks reachable from one or more roots.
///
/// - A child identifier that does not resolve stops the whole walk; the
///   identifier is available from [`BlockWalker::halted_at`].
/// - A block reached a second time yields [`Error::CyclicReference`] and
///   ends the walk.
pub struct BlockWalker<'a, P> {
    doc: &'a Document,
    policy: P,
    stack: Vec<(&'a str, usize)>,
    visited: HashSet<&'a str>,
    halted_at: Option<&'a str>,
    done: bool,
}

impl<'a, P: TraversalPolicy> BlockWalker<'a, P> {
    /// Walk from a single root.
    pub fn new(doc: &'a Document, root: &'a str, policy: P) -> Self {
        Self::with_roots(doc, [root], policy)
    }

    /// Walk from several roots, visited in the given order.
    pub fn with_roots<I>(doc: &'a Document, roots: I, policy: P) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stack: Vec<(&'a str, usize)> = roots.into_iter().map(|id| (id, 0)).collect();
        stack.reverse();
        Self {
            doc,
            policy,
            stack,
            visited: HashSet::new(),
            halted_at: None,
            done: false,
        }
    }

    /// Identifier that stopped the walk because it did not resolve.
    pub fn halted_at(&self) -> Option<&'a str> {
        self.halted_at
    }

    /// Number of blocks yielded so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    fn finish(&mut self) {
        self.done = true;
        self.stack.clear();
    }
}

impl<'a, P: TraversalPolicy> Iterator for BlockWalker<'a, P> {
    type Item = Result<Visit<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some((id, depth)) = self.stack.pop() else {
            self.done = true;
            return None;
        };

        let Some(block) = self.doc.get(id) else {
            log::warn!(
                "Block '{}' not found in document '{}', stopping walk",
                id,
                self.doc.id
            );
            self.halted_at = Some(id);
            self.finish();
            return None;
        };

        if !self.visited.insert(block.id.as_str()) {
            self.finish();
            return Some(Err(Error::CyclicReference {
                block_id: block.id.clone(),
            }));
        }

        if self.policy.descend(block) {
            self.stack
                .extend(block.children.iter().rev().map(|c| (c.as_str(), depth + 1)));
        }

        Some(Ok(Visit { block, depth }))
    }
}

impl<P: TraversalPolicy> FusedIterator for BlockWalker<'_, P> {}
