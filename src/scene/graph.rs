//! Arena-backed scene tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. A child
//! stores its parent as a plain index, used only to walk up the ancestor chain;
//! ownership flows strictly downward through `children`.
//!
//! World transforms are never cached: [`Scene::world_transform`] and
//! [`Scene::flatten`] recompute them from the ancestor chain on every call.

use super::geometry::Geometry;
use crate::error::SceneError;
use crate::math::Mat4;
use crate::transform::Transform;

/// Index of a node inside its [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    name: Option<String>,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    geometries: Vec<Geometry>,
}

impl Node {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }
}

/// A strict tree of nodes with one root.
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a scene holding only an empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: Some("root".to_string()),
                ..Node::default()
            }],
            root: NodeId(0),
        }
    }

    /// Creates a scene whose root is named `name` and holds `geometries`.
    pub fn from_geometries(name: impl Into<String>, geometries: Vec<Geometry>) -> Self {
        Self {
            nodes: vec![Node {
                name: Some(name.into()),
                geometries,
                ..Node::default()
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    /// Creates a node that is not yet part of the tree.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: Some(name.into()),
            ..Node::default()
        });
        id
    }

    /// Creates a node and attaches it under `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let child = self.create_node(name);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Attaches a parentless node under `parent`.
    ///
    /// Rejects nodes that already have a parent, the root, and any attachment
    /// that would make a node its own ancestor.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        if self.node(child)?.parent.is_some() || child == self.root {
            return Err(SceneError::AlreadyAttached(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Removes `child` from its parent. The node stays in the arena.
    pub fn detach(&mut self, child: NodeId) -> Result<(), SceneError> {
        if let Some(parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(parent)?.children.retain(|&c| c != child);
        }
        Ok(())
    }

    pub fn add_geometry(&mut self, node: NodeId, geometry: Geometry) -> Result<(), SceneError> {
        self.node_mut(node)?.geometries.push(geometry);
        Ok(())
    }

    pub fn transform_mut(&mut self, node: NodeId) -> Result<&mut Transform, SceneError> {
        Ok(&mut self.node_mut(node)?.transform)
    }

    /// Iterates `id` and then each ancestor up to the root.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |n| self.nodes.get(n.0).and_then(|node| node.parent))
    }

    /// Concatenates local transforms from the root down to `node`.
    pub fn world_transform(&self, node: NodeId) -> Result<Mat4, SceneError> {
        self.node(node)?;
        Ok(self
            .ancestors(node)
            .fold(Mat4::IDENTITY, |acc, id| self.nodes[id.0].transform.to_matrix() * acc))
    }

    /// Moves every node of `other` into this scene and attaches its root under `parent`.
    ///
    /// Returns the id of the former root of `other`.
    pub fn graft(&mut self, parent: NodeId, other: Scene) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let offset = self.nodes.len();
        let grafted_root = NodeId(other.root.0 + offset);
        self.nodes.extend(other.nodes.into_iter().map(|mut node| {
            node.parent = node.parent.map(|p| NodeId(p.0 + offset));
            node.children.iter_mut().for_each(|c| c.0 += offset);
            node
        }));
        self.attach(parent, grafted_root)?;
        Ok(grafted_root)
    }

    /// Visits every node reachable from the root, parents before children.
    ///
    /// The callback receives the node id, the node, and its world matrix.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(NodeId, &'a Node, Mat4),
    {
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.to_matrix();
            visit(id, node, world);
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }

    /// Lists every reachable geometry with its resolved world matrix,
    /// in depth-first order.
    pub fn flatten(&self) -> Vec<(Mat4, &Geometry)> {
        let mut out = Vec::new();
        self.walk(|_, node, world| {
            out.extend(node.geometries.iter().map(|g| (world * g.transform(), g)));
        });
        out
    }

    /// Number of geometries reachable from the root.
    pub fn geometry_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, node, _| count += node.geometries.len());
        count
    }
}
