//! Parsed taxonomy nodes
//!
//! Output of the grammar parser: a forest of named nodes, each owning its
//! children in source order.
//!
//! Nesting depth is bounded only by input length, so every walk over the
//! forest (including drop, clone and equality) uses an explicit stack.

use std::fmt;
use std::slice;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;
use crate::json::{ensure_json_depth, json_error};

/// Name rejected while deserializing a node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node name {0:?}: must be non-empty, trimmed and free of '{{', '}}' and ','")]
pub struct InvalidNodeName(pub String);

/// One named entry discovered while parsing
#[derive(Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct ParserNode {
    /// Trimmed label, never empty
    pub name: String,
    /// Children in insertion order (siblings may share a name)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParserNode>,
}

impl ParserNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<ParserNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find the first node named `name` in this subtree (pre-order)
    pub fn find(&self, name: &str) -> Option<&ParserNode> {
        find_in(slice::from_ref(self), name)
    }
}

impl Drop for ParserNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Clone for ParserNode {
    fn clone(&self) -> Self {
        // one root in, one root out
        from_shape(shape_of(slice::from_ref(self))).swap_remove(0)
    }
}

impl PartialEq for ParserNode {
    fn eq(&self, other: &Self) -> bool {
        same_shape(slice::from_ref(self), slice::from_ref(other))
    }
}

impl fmt::Debug for ParserNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParserNode")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl fmt::Display for ParserNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, slice::from_ref(self))
    }
}

/// Wire shape of a node before its names are checked
#[derive(Deserialize)]
struct RawNode {
    name: String,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl TryFrom<RawNode> for ParserNode {
    type Error = InvalidNodeName;

    fn try_from(raw: RawNode) -> std::result::Result<Self, Self::Error> {
        let mut shape = Vec::new();
        let mut pending = vec![raw];
        while let Some(mut node) = pending.pop() {
            check_name(&node.name)?;
            let children = std::mem::take(&mut node.children);
            shape.push((node.name, children.len()));
            pending.extend(children.into_iter().rev());
        }
        Ok(from_shape(shape).swap_remove(0))
    }
}

fn check_name(name: &str) -> std::result::Result<(), InvalidNodeName> {
    let valid = !name.is_empty()
        && name == name.trim()
        && !name.contains(|c| matches!(c, '{' | '}' | ','));
    if valid {
        Ok(())
    } else {
        Err(InvalidNodeName(name.to_string()))
    }
}

/// Ordered root nodes produced by a successful parse
///
/// An empty forest is a valid result (empty input); parse failures are
/// reported through `Err` and never as an empty forest.
#[derive(Debug, Default, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<ParserNode>,
}

impl Forest {
    pub fn new(roots: Vec<ParserNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[ParserNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<ParserNode> {
        self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, ParserNode> {
        self.roots.iter()
    }

    /// Depth-first pre-order walk yielding each node with its level (roots are 1)
    pub fn walk(&self) -> impl Iterator<Item = (&ParserNode, usize)> + '_ {
        walk(&self.roots)
    }

    /// All names in depth-first pre-order, duplicates included
    pub fn names(&self) -> Vec<&str> {
        self.walk().map(|(node, _)| node.name.as_str()).collect()
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Number of levels in the deepest branch (0 for an empty forest)
    pub fn depth(&self) -> usize {
        self.walk().map(|(_, level)| level).max().unwrap_or(0)
    }

    pub fn find(&self, name: &str) -> Option<&ParserNode> {
        find_in(&self.roots, name)
    }

    /// Forest as a JSON array of `{"name", "children"}` objects
    ///
    /// Fails when the forest is nested deeper than
    /// [`MAX_JSON_DEPTH`](crate::json::MAX_JSON_DEPTH).
    pub fn to_json(&self) -> Result<Value> {
        ensure_json_depth(self.depth())?;
        serde_json::to_value(self).map_err(json_error)
    }
}

impl Clone for Forest {
    fn clone(&self) -> Self {
        Self::new(from_shape(shape_of(&self.roots)))
    }
}

impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        same_shape(&self.roots, &other.roots)
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a ParserNode;
    type IntoIter = slice::Iter<'a, ParserNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter()
    }
}

/// Canonical notation: `A{B,C{D}},E`
impl fmt::Display for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.roots)
    }
}

struct Walk<'a> {
    stack: Vec<(&'a ParserNode, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a ParserNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, level) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (child, level + 1)));
        Some((node, level))
    }
}

fn walk(nodes: &[ParserNode]) -> Walk<'_> {
    Walk {
        stack: nodes.iter().rev().map(|node| (node, 1)).collect(),
    }
}

fn find_in<'a>(nodes: &'a [ParserNode], name: &str) -> Option<&'a ParserNode> {
    walk(nodes)
        .map(|(node, _)| node)
        .find(|node| node.name == name)
}

/// Pre-order `(name, child count)` listing; it determines an ordered forest
fn shape_of(nodes: &[ParserNode]) -> Vec<(String, usize)> {
    walk(nodes)
        .map(|(node, _)| (node.name.clone(), node.children.len()))
        .collect()
}

fn same_shape(a: &[ParserNode], b: &[ParserNode]) -> bool {
    fn key<'a>((node, _): (&'a ParserNode, usize)) -> (&'a str, usize) {
        (node.name.as_str(), node.children.len())
    }
    walk(a).map(key).eq(walk(b).map(key))
}

/// Rebuild nodes from a pre-order `(name, child count)` listing
fn from_shape(shape: Vec<(String, usize)>) -> Vec<ParserNode> {
    // Walking backwards, a node's children are the top `count` finished nodes
    let mut built: Vec<ParserNode> = Vec::new();
    for (name, count) in shape.into_iter().rev() {
        let at = built.len().saturating_sub(count);
        let mut children: Vec<ParserNode> = built.drain(at..).collect();
        children.reverse();
        built.push(ParserNode::with_children(name, children));
    }
    built.reverse();
    built
}

enum Token<'a> {
    Node { node: &'a ParserNode, first: bool },
    Close,
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[ParserNode]) -> fmt::Result {
    fn push_list<'a>(stack: &mut Vec<Token<'a>>, nodes: &'a [ParserNode]) {
        stack.extend(
            nodes
                .iter()
                .enumerate()
                .rev()
                .map(|(i, node)| Token::Node { node, first: i == 0 }),
        );
    }

    let mut stack = Vec::new();
    push_list(&mut stack, nodes);
    while let Some(token) = stack.pop() {
        match token {
            Token::Close => f.write_str("}")?,
            Token::Node { node, first } => {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(&node.name)?;
                if !node.children.is_empty() {
                    f.write_str("{")?;
                    stack.push(Token::Close);
                    push_list(&mut stack, &node.children);
                }
            }
        }
    }
    Ok(())
}
