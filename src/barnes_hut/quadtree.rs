use nalgebra::Vector2;

use super::{Quadrant, Rect};
use crate::{
    body::{Body, BodyId},
    gravity::Gravity,
};

/// Bodies a leaf holds before it subdivides.
pub const CAPACITY: usize = 4;

/// Leaves this deep accept bodies beyond [`CAPACITY`] instead of subdividing,
/// so coincident bodies cannot recurse forever.
pub const MAX_DEPTH: u32 = 32;

/// Index of a node in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The physics a node needs from a body, copied at insertion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    pub id: BodyId,
    pub mass: f64,
    pub position: Vector2<f64>,
}

impl From<&Body> for Entry {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            mass: body.mass,
            position: body.position,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    boundary: Rect,
    depth: u32,
    entries: Vec<Entry>,
    children: Option<[NodeId; 4]>,
    mass: f64,
    center_of_mass: Vector2<f64>,
}

impl Node {
    fn new(boundary: Rect, depth: u32) -> Self {
        Self {
            boundary,
            depth,
            entries: Vec::with_capacity(CAPACITY),
            children: None,
            mass: 0.,
            center_of_mass: Vector2::zeros(),
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &Rect {
        &self.boundary
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Bodies held directly. Always empty for subdivided nodes.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    #[must_use]
    pub fn is_subdivided(&self) -> bool {
        self.children.is_some()
    }

    /// Total mass of the subtree.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Mass-weighted mean position of the subtree.
    #[must_use]
    pub fn center_of_mass(&self) -> &Vector2<f64> {
        &self.center_of_mass
    }

    /// Fold one more body into the aggregate without revisiting the subtree.
    fn accumulate(&mut self, entry: &Entry) {
        let previous = self.mass;
        self.mass += entry.mass;
        self.center_of_mass =
            (self.center_of_mass * previous + entry.position * entry.mass) / self.mass;
    }
}

/// A region quadtree stored in a flat arena.
///
/// The tree is rebuilt from scratch every tick; [`QuadTree::reset`] keeps the
/// arena's allocation so rebuilding does not churn memory.
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<Node>,
}

impl QuadTree {
    #[must_use]
    pub fn new(boundary: Rect) -> Self {
        Self {
            nodes: vec![Node::new(boundary, 0)],
        }
    }

    /// Build a tree over `boundary` holding `bodies`, inserted in order.
    ///
    /// Bodies outside the boundary are skipped.
    #[must_use]
    pub fn build(bodies: &[Body], boundary: Rect) -> Self {
        let mut tree = Self::new(boundary);
        tree.insert_all(bodies);
        tree
    }

    /// Drop all nodes but keep the arena for the next build.
    pub fn reset(&mut self, boundary: Rect) {
        self.nodes.clear();
        self.nodes.push(Node::new(boundary, 0));
    }

    pub fn insert_all(&mut self, bodies: &[Body]) {
        for body in bodies.iter().filter(|b| b.is_active()) {
            if !self.insert(body) {
                log::warn!(
                    "{} at ({}, {}) lies outside the index boundary and was skipped",
                    body.id,
                    body.position.x,
                    body.position.y
                );
            }
        }
    }

    /// Insert a body. Returns false, leaving the tree untouched, if the body
    /// lies outside the root boundary.
    pub fn insert(&mut self, body: &Body) -> bool {
        self.insert_at(NodeId(0), Entry::from(body))
    }

    fn insert_at(&mut self, id: NodeId, entry: Entry) -> bool {
        if !self.nodes[id.0].boundary.contains(&entry.position) {
            return false;
        }

        let node = &mut self.nodes[id.0];
        if node.children.is_none() {
            if node.entries.len() < CAPACITY || node.depth >= MAX_DEPTH {
                node.accumulate(&entry);
                node.entries.push(entry);
                return true;
            }
            self.subdivide(id);
        }

        if self.insert_into_children(id, entry) {
            self.nodes[id.0].accumulate(&entry);
            true
        } else {
            false
        }
    }

    /// Offer the entry to the children in NW, NE, SW, SE order.
    fn insert_into_children(&mut self, id: NodeId, entry: Entry) -> bool {
        let Some(children) = self.nodes[id.0].children else {
            return false;
        };
        children
            .into_iter()
            .any(|child| self.insert_at(child, entry))
    }

    /// Split a full leaf into four quadrants and push its bodies down.
    ///
    /// The node's aggregate already covers the moved bodies and stays as is.
    fn subdivide(&mut self, id: NodeId) {
        let boundary = self.nodes[id.0].boundary;
        let depth = self.nodes[id.0].depth + 1;

        let first = self.nodes.len();
        for quadrant in Quadrant::ALL {
            self.nodes.push(Node::new(boundary.quadrant(quadrant), depth));
        }
        let children = [
            NodeId(first),
            NodeId(first + 1),
            NodeId(first + 2),
            NodeId(first + 3),
        ];

        let node = &mut self.nodes[id.0];
        node.children = Some(children);
        let entries = std::mem::take(&mut node.entries);

        for entry in entries {
            if !self.insert_into_children(id, entry) {
                // unreachable for exact midpoint splits, keep the body rather than lose it
                self.nodes[id.0].entries.push(entry);
            }
        }
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    #[must_use]
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, leaves and internal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root().mass == 0.
    }

    /// The leaf whose boundary contains `position`, if any.
    #[must_use]
    pub fn leaf_containing(&self, position: &Vector2<f64>) -> Option<NodeId> {
        let mut id = self.root_id();
        if !self.node(id).boundary.contains(position) {
            return None;
        }
        while let Some(children) = self.node(id).children {
            id = children
                .into_iter()
                .find(|&child| self.node(child).boundary.contains(position))?;
        }
        Some(id)
    }

    /// Net force on `target` from every other body in the tree.
    ///
    /// Subdivided nodes whose width over distance falls below `theta` act as a
    /// single point mass at their center of mass. Nodes containing the target
    /// are always opened so it never attracts itself.
    #[must_use]
    pub fn calculate_force(&self, target: &Body, theta: f64, gravity: &Gravity) -> Vector2<f64> {
        self.calculate_force_at(NodeId(0), target, theta, gravity)
    }

    fn calculate_force_at(
        &self,
        id: NodeId,
        target: &Body,
        theta: f64,
        gravity: &Gravity,
    ) -> Vector2<f64> {
        let node = &self.nodes[id.0];
        if node.mass == 0. {
            return Vector2::zeros();
        }

        let mut force: Vector2<f64> = node
            .entries
            .iter()
            .filter(|entry| entry.id != target.id)
            .map(|entry| gravity.force(&target.position, target.mass, &entry.position, entry.mass))
            .sum();

        let Some(children) = node.children else {
            return force;
        };

        if !node.boundary.contains(&target.position) {
            let distance = gravity.distance(&target.position, &node.center_of_mass);
            if node.boundary.width() / distance < theta {
                // far field
                return force
                    + gravity.force(
                        &target.position,
                        target.mass,
                        &node.center_of_mass,
                        node.mass,
                    );
            }
        }

        for child in children {
            force += self.calculate_force_at(child, target, theta, gravity);
        }
        force
    }
}
