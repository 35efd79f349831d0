//! Taxonomy Tree
//!
//! Rooted tree store that the assembler materialises a forest into.
//! Nodes are identified by their name: a name can appear at most once.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Result, TaxonomyError};
use crate::json::ensure_json_depth;

/// Index of a node in the arena
pub(crate) type NodeId = usize;

#[derive(Debug, Clone)]
struct TreeNode {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Single-rooted tree keyed by node name
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeId>,
}

impl TaxonomyTree {
    const ROOT: NodeId = 0;

    /// Create a tree holding only the root node
    pub fn new(root: &str) -> Self {
        let mut index = HashMap::new();
        index.insert(root.to_string(), Self::ROOT);
        Self {
            nodes: vec![TreeNode {
                tag: root.to_string(),
                parent: None,
                children: Vec::new(),
            }],
            index,
        }
    }

    pub fn root(&self) -> &str {
        &self.nodes[Self::ROOT].tag
    }

    /// Number of nodes, root included
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert `tag` as the last child of `parent`
    pub fn create_node(&mut self, tag: &str, parent: &str) -> Result<()> {
        if self.contains(tag) {
            return Err(TaxonomyError::DuplicateNode {
                name: tag.to_string(),
            });
        }
        let parent = self.id_of(parent).ok_or_else(|| TaxonomyError::NodeNotFound {
            name: parent.to_string(),
        })?;
        self.insert_under(parent, tag);
        Ok(())
    }

    pub(crate) fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub(crate) fn root_id(&self) -> NodeId {
        Self::ROOT
    }

    /// Caller guarantees `tag` is absent and `parent` is a valid id.
    pub(crate) fn insert_under(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            tag: tag.to_string(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        self.index.insert(tag.to_string(), id);
        id
    }

    /// Child names in insertion order, `None` if `name` is not in the tree
    pub fn children(&self, name: &str) -> Option<Vec<&str>> {
        let id = self.id_of(name)?;
        Some(
            self.nodes[id]
                .children
                .iter()
                .map(|&c| self.nodes[c].tag.as_str())
                .collect(),
        )
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        let id = self.id_of(name)?;
        self.nodes[id].parent.map(|p| self.nodes[p].tag.as_str())
    }

    /// Ancestors of `name`, nearest first, ending with the root
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.id_of(name).and_then(|id| self.nodes[id].parent);
        while let Some(id) = current {
            chain.push(self.nodes[id].tag.as_str());
            current = self.nodes[id].parent;
        }
        chain
    }

    /// Whether `ancestor` lies strictly above `descendant`
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.ancestors(descendant).contains(&ancestor)
    }

    pub fn is_descendant(&self, descendant: &str, ancestor: &str) -> bool {
        self.is_ancestor(ancestor, descendant)
    }

    /// Distance from the root (root is 0)
    pub fn depth(&self, name: &str) -> Option<usize> {
        self.contains(name).then(|| self.ancestors(name).len())
    }

    /// Leaf names in pre-order
    pub fn leaves(&self) -> Vec<&str> {
        self.pre_order()
            .into_iter()
            .filter(|&id| self.nodes[id].children.is_empty())
            .map(|id| self.nodes[id].tag.as_str())
            .collect()
    }

    fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// Levels below the root on the longest branch (0 for a lone root)
    pub fn height(&self) -> usize {
        // parents are always inserted before their children
        let mut depths = vec![0usize; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                depths[id] = depths[parent] + 1;
            }
        }
        depths.into_iter().max().unwrap_or(0)
    }

    /// `(child, is last sibling, level)` frames, reversed for a stack
    fn child_frames(
        &self,
        id: NodeId,
        level: usize,
    ) -> impl Iterator<Item = (NodeId, bool, usize)> + '_ {
        let children = &self.nodes[id].children;
        children
            .iter()
            .enumerate()
            .rev()
            .map(move |(i, &child)| (child, i + 1 == children.len(), level))
    }

    /// Box-drawing rendering, one node per line
    pub fn show(&self) -> String {
        let mut out = String::new();
        out.push_str(self.root());
        out.push('\n');

        let mut stack: Vec<_> = self.child_frames(Self::ROOT, 1).collect();
        // for each open level above the current line: has its branch ended
        let mut ended: Vec<bool> = Vec::new();
        while let Some((id, last, level)) = stack.pop() {
            ended.truncate(level - 1);
            for &done in &ended {
                out.push_str(if done { "    " } else { "│   " });
            }
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&self.nodes[id].tag);
            out.push('\n');
            ended.push(last);
            stack.extend(self.child_frames(id, level + 1));
        }
        out
    }

    /// Nested JSON document: `{tag: {"children": [...]}}`
    ///
    /// Children keep insertion order. Leaves are plain strings, except the
    /// root, which is always an object even when it has no children. Fails
    /// past [`MAX_JSON_DEPTH`](crate::json::MAX_JSON_DEPTH) levels.
    pub fn to_json(&self) -> Result<Value> {
        ensure_json_depth(self.height() + 1)?;

        // Reverse pre-order: every child is built before its parent
        let mut built: Vec<Value> = Vec::new();
        for id in self.pre_order().into_iter().rev() {
            let node = &self.nodes[id];
            if node.children.is_empty() && id != Self::ROOT {
                built.push(Value::String(node.tag.clone()));
                continue;
            }
            let at = built.len() - node.children.len();
            let mut children: Vec<Value> = built.drain(at..).collect();
            children.reverse();

            let mut body = Map::new();
            body.insert("children".to_string(), Value::Array(children));
            let mut wrapper = Map::new();
            wrapper.insert(node.tag.clone(), Value::Object(body));
            built.push(Value::Object(wrapper));
        }
        Ok(built.pop().unwrap_or(Value::Null))
    }
}

impl fmt::Display for TaxonomyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.show())
    }
}
