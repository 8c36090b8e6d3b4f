//! Canonical schema tree stored as an arena of nodes.
//!
//! Folders refer to their children by [`NodeId`] and children to their parent
//! the same way, so the tree has no ownership cycles and can be walked in
//! either direction.

use crate::{FolderSettings, Input, Path};

/// Index of a node within a [`SchemaTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The implicit root folder.
    pub const ROOT: Self = Self(0);

    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Folder with children in display order.
    Folder {
        /// Display settings.
        settings: FolderSettings,
        /// Children, sorted by their `order` setting then declaration order.
        children: Vec<NodeId>,
    },
    /// Leaf input.
    Input(Input),
}

/// One node of the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Authored name (empty for the root).
    pub name: String,
    /// Enclosing folder (`None` for the root).
    pub parent: Option<NodeId>,
    /// Full dotted path.
    pub path: Path,
    /// Folder or input payload.
    pub kind: NodeKind,
}

/// Normalized schema: an arena whose node 0 is the implicit root folder.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaTree {
    /// All nodes; parents always precede their children.
    nodes: Vec<Node>,
}

impl SchemaTree {
    /// A tree holding only a root folder with the given settings.
    pub(crate) fn with_root(settings: FolderSettings) -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                path: Path::root(),
                kind: NodeKind::Folder {
                    settings,
                    children: Vec::new(),
                },
            }],
        }
    }

    /// Attach a new node under `parent`, returning its id.
    pub(crate) fn attach(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let path = self.nodes[parent.index()].path.join(name);
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
            path,
            kind,
        });
        if let NodeKind::Folder { children, .. } = &mut self.nodes[parent.index()].kind {
            children.push(id);
        }
        id
    }

    /// The implicit root folder.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Access a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Children of a folder; empty for inputs.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::Input(_) => &[],
        }
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(NodeId::ROOT).is_empty()
    }

    /// Locate a node by its full path.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        let mut cur = NodeId::ROOT;
        for segment in path.segments() {
            cur = *self
                .children(cur)
                .iter()
                .find(|c| self.node(**c).name == segment)?;
        }
        Some(cur)
    }

    /// Depth-first pre-order walk, excluding the root.
    pub fn preorder(&self) -> Preorder<'_> {
        let mut stack: Vec<NodeId> = self.children(NodeId::ROOT).to_vec();
        stack.reverse();
        Preorder { tree: self, stack }
    }
}

/// Iterator returned by [`SchemaTree::preorder`].
pub struct Preorder<'a> {
    /// Tree being walked.
    tree: &'a SchemaTree,
    /// Pending nodes; the next node is on top.
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some((id, self.tree.node(id)))
    }
}
