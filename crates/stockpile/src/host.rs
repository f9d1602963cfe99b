//! # Host Container Hierarchy
//!
//! Pools ask the host for one named child container at setup and parent every
//! entity they construct under it. [`Hierarchy`] is a flat in-memory
//! implementation for headless use and tests.

use stockpile_core::ContainerId;

/// The host's container tree, as far as pools need it.
pub trait HostContainer {
    /// The top-level container.
    fn root(&self) -> ContainerId;

    /// Creates a named container under `parent`.
    fn create_child(&mut self, parent: ContainerId, name: &str) -> ContainerId;
}

/// One container node.
#[derive(Clone, Debug)]
struct Node {
    name: String,
    parent: Option<ContainerId>,
}

/// In-memory container tree.
///
/// Nodes are never removed; ids are indices into a flat array.
#[derive(Clone, Debug)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    /// Creates a hierarchy with a single root node.
    #[must_use]
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.to_string(),
                parent: None,
            }],
        }
    }

    /// Number of nodes, root included. Never zero.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Name of a node.
    #[must_use]
    pub fn name(&self, id: ContainerId) -> Option<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    /// Parent of a node. `None` for the root and unknown ids.
    #[must_use]
    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Direct children of a node, in creation order.
    pub fn children(&self, id: ContainerId) -> impl Iterator<Item = ContainerId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(id))
            .filter_map(|(index, _)| u32::try_from(index).ok().map(ContainerId::new))
    }

    /// Slash-separated path from the root, e.g. `World/BulletPool`.
    #[must_use]
    pub fn path(&self, id: ContainerId) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            parts.push(node.name.as_str());
            current = node.parent;
        }
        parts.reverse();
        Some(parts.join("/"))
    }

    fn node(&self, id: ContainerId) -> Option<&Node> {
        self.nodes.get(id.index() as usize)
    }
}

impl HostContainer for Hierarchy {
    fn root(&self) -> ContainerId {
        ContainerId::new(0)
    }

    /// # Panics
    ///
    /// Panics if the hierarchy outgrows `u32` ids.
    fn create_child(&mut self, parent: ContainerId, name: &str) -> ContainerId {
        debug_assert!(self.node(parent).is_some(), "unknown parent container {parent:?}");

        assert!(
            self.nodes.len() < u32::MAX as usize,
            "container hierarchy exhausted u32 ids"
        );

        #[allow(clippy::cast_possible_truncation)]
        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
        });
        ContainerId::new(index)
    }
}
