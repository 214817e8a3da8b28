//! Prefab hierarchies
//!
//! A [`Prefab`] is an arena of [`Node`]s with parent-relative transforms.
//! Traversal uses an explicit stack that carries the accumulated world
//! transform, so pathological depths cannot overflow the call stack.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

#[derive(Debug, Clone)]
pub struct Prefab {
    pub name: String,
    nodes: SlotMap<NodeHandle, Node>,
    root: NodeHandle,
}

impl Prefab {
    /// Creates a prefab with an empty, non-renderable root.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(name.clone()));
        Self { name, nodes, root }
    }

    /// Creates a prefab whose root is `root`.
    #[must_use]
    pub fn with_root(name: impl Into<String>, mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(root);
        Self {
            name: name.into(),
            nodes,
            root,
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Inserts `node` under `parent`. Returns `None` if `parent` is not in
    /// this prefab.
    pub fn add_child(&mut self, parent: NodeHandle, mut node: Node) -> Option<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        node.parent = Some(parent);
        node.children.clear();
        let handle = self.nodes.insert(node);
        self.nodes[parent].children.push(handle);
        Some(handle)
    }

    #[inline]
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first, pre-order walk of the visible part of the hierarchy.
    ///
    /// `base` is the prefab entity's world matrix. Invisible nodes are
    /// skipped together with their entire subtree.
    #[must_use]
    pub fn walk(&self, base: Affine3A) -> PrefabWalk<'_> {
        PrefabWalk {
            prefab: self,
            stack: vec![(self.root, base)],
        }
    }
}

/// A node reached by [`Prefab::walk`], with its accumulated world matrix.
#[derive(Debug, Clone, Copy)]
pub struct WalkedNode<'a> {
    pub handle: NodeHandle,
    pub node: &'a Node,
    pub world: Affine3A,
}

pub struct PrefabWalk<'a> {
    prefab: &'a Prefab,
    stack: Vec<(NodeHandle, Affine3A)>,
}

impl<'a> Iterator for PrefabWalk<'a> {
    type Item = WalkedNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((handle, parent_world)) = self.stack.pop() {
            let Some(node) = self.prefab.nodes.get(handle) else {
                continue;
            };
            if !node.visible {
                continue;
            }

            let world = parent_world * node.transform.local_matrix();

            // Reverse so the first child is visited first.
            for &child in node.children.iter().rev() {
                self.stack.push((child, world));
            }

            return Some(WalkedNode {
                handle,
                node,
                world,
            });
        }
        None
    }
}
