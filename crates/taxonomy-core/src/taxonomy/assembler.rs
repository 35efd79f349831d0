//! Tree assembly
//!
//! Materialises a parsed [`Forest`] into a [`TaxonomyTree`] under a synthetic
//! root. The tree is keyed by name, so a name seen a second time (in any
//! branch) is reused as the insertion target instead of being inserted again.

use tracing::debug;

use super::node::{Forest, ParserNode};
use super::parser::parse_nodes;
use super::tree::{NodeId, TaxonomyTree};
use crate::error::Result;

/// Root label used when none is given
pub const DEFAULT_ROOT_LABEL: &str = "Taxonomy";

/// Build a tree rooted at `root` from a parsed forest
pub fn build_taxonomy_tree(forest: &Forest, root: &str) -> TaxonomyTree {
    let mut tree = TaxonomyTree::new(root);
    let root_id = tree.root_id();
    attach(&mut tree, forest.roots(), root_id);
    tree
}

/// Insert `nodes` and their descendants in pre-order
fn attach(tree: &mut TaxonomyTree, nodes: &[ParserNode], parent: NodeId) {
    let mut pending: Vec<(&ParserNode, NodeId)> =
        nodes.iter().rev().map(|node| (node, parent)).collect();

    while let Some((node, parent)) = pending.pop() {
        let id = match tree.id_of(&node.name) {
            Some(existing) => {
                debug!(name = %node.name, "name already in tree, merging subtree");
                existing
            }
            None => tree.insert_under(parent, &node.name),
        };
        pending.extend(node.children.iter().rev().map(|child| (child, id)));
    }
}

/// Parse notation and assemble it under [`DEFAULT_ROOT_LABEL`]
pub fn parse_taxonomy(text: &str) -> Result<TaxonomyTree> {
    parse_taxonomy_with_root(text, DEFAULT_ROOT_LABEL)
}

pub fn parse_taxonomy_with_root(text: &str, root: &str) -> Result<TaxonomyTree> {
    let forest = parse_nodes(text)?;
    Ok(build_taxonomy_tree(&forest, root))
}
