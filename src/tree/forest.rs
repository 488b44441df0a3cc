use std::fmt;

use crate::models::ConversationRecord;

/// Why a node sits at the top level of the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootReason {
    /// The conversation has no parent
    Original,
    /// The parent is not in the catalog, e.g. it lives in an unscanned project
    MissingParent,
    /// The parent link closed a cycle and was dropped
    CycleBroken,
}

impl fmt::Display for RootReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RootReason::Original => "original",
            RootReason::MissingParent => "missing parent",
            RootReason::CycleBroken => "cycle broken",
        };
        f.write_str(label)
    }
}

/// How a node is attached, by arena index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Root(RootReason),
    Child(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub index: usize,
    pub record: ConversationRecord,
    pub link: Link,
    pub(crate) children: Vec<usize>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn is_root(&self) -> bool {
        matches!(self.link, Link::Root(_))
    }

    pub fn child_indices(&self) -> &[usize] {
        &self.children
    }
}

/// Read-only forest of conversations linked by parent identifier
///
/// Nodes live in an arena ordered by identifier. Roots and each node's children
/// are ordered by creation time, then identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) roots: Vec<usize>,
}

impl Forest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// All nodes in identifier order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().map(|&i| &self.nodes[i])
    }

    pub fn children<'a>(&'a self, node: &'a TreeNode) -> impl Iterator<Item = &'a TreeNode> {
        node.children.iter().map(|&i| &self.nodes[i])
    }

    pub fn parent(&self, node: &TreeNode) -> Option<&TreeNode> {
        match node.link {
            Link::Child(parent) => self.nodes.get(parent),
            Link::Root(_) => None,
        }
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.binary_search_by(|node| node.record.id.as_str().cmp(id)).ok().map(|i| &self.nodes[i])
    }

    /// Pre-order walk over every tree with each node's depth
    pub fn depth_first(&self) -> Vec<(usize, &TreeNode)> {
        let mut visited = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (i, 0)).collect();

        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            visited.push((depth, node));
            stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }

        visited
    }

    /// Path from the tree root down to `id`, or empty if `id` is unknown
    pub fn ancestry(&self, id: &str) -> Vec<&TreeNode> {
        let mut chain: Vec<&TreeNode> = Vec::new();
        let mut current = self.find(id);

        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }

        chain.reverse();
        chain
    }

    /// Number of nodes in the subtree rooted at `node`, itself included
    pub fn subtree_size(&self, node: &TreeNode) -> usize {
        let mut count = 0;
        let mut stack = vec![node.index];
        while let Some(index) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.nodes[index].children);
        }
        count
    }
}
