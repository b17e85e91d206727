// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::OsmNode;

/// A piece of an OSM way between two vertices.
///
/// `nodes` holds the OSM ids of all nodes along the edge, including
/// `source` as the first and `target` as the last element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub way_id: i64,
    pub source: i64,
    pub target: i64,
    pub nodes: Vec<i64>,
}

impl Edge {
    /// Number of interior shape points.
    pub fn shape_point_count(&self) -> usize {
        self.nodes.len().saturating_sub(2)
    }

    /// Length of the edge, following all of its shape points, in kilometers.
    /// Nodes missing from the table are skipped.
    pub fn length(&self, table: &NodeTable) -> f32 {
        let points: Vec<_> = self
            .nodes
            .iter()
            .filter_map(|&id| table.get(id))
            .map(|n| n.position())
            .collect();

        points.windows(2).map(|p| p[0].distance(&p[1])).sum()
    }
}

/// Set of [OsmNodes](OsmNode) keyed by OSM node id, together with the
/// [Edges](Edge) their edge indices refer to.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeTable {
    nodes: BTreeMap<i64, OsmNode>,
    edges: Vec<Edge>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the table.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&OsmNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut OsmNode> {
        self.nodes.get_mut(&id)
    }

    /// Returns the node with a given id, creating one without a position
    /// if it doesn't exist yet.
    pub fn get_or_insert_placeholder(&mut self, id: i64) -> &mut OsmNode {
        self.nodes.entry(id).or_default()
    }

    /// Creates or replaces a node.
    pub fn insert(&mut self, id: i64, node: OsmNode) {
        self.nodes.insert(id, node);
    }

    /// Deletes a node with a given id.
    ///
    /// [Edges](Edge) referring to the node are preserved.
    pub fn remove(&mut self, id: i64) -> Option<OsmNode> {
        self.nodes.remove(&id)
    }

    /// Keeps only the nodes for which the predicate returns true.
    pub fn retain<F: FnMut(i64, &mut OsmNode) -> bool>(&mut self, mut f: F) {
        self.nodes.retain(|&id, n| f(id, n));
    }

    /// Iterates over all nodes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &OsmNode)> {
        self.nodes.iter().map(|(&id, n)| (id, n))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i64, &mut OsmNode)> {
        self.nodes.iter_mut().map(|(&id, n)| (id, n))
    }

    /// Iterates over nodes which are going to become vertices of the graph.
    pub fn vertices(&self) -> impl Iterator<Item = (i64, &OsmNode)> {
        self.iter().filter(|(_, n)| n.is_intersection())
    }

    /// Iterates over interior points of ways, which can be removed by simplification.
    pub fn shape_points(&self) -> impl Iterator<Item = (i64, &OsmNode)> {
        self.iter().filter(|(_, n)| !n.is_intersection())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, index: u32) -> Option<&Edge> {
        self.edges.get(index as usize)
    }

    /// Appends an [Edge] to the table and records its index on both endpoints.
    /// Returns the index of the new edge.
    ///
    /// Endpoints are created as placeholders if they don't exist.
    /// A loop edge (`source == target`) is recorded twice on its only endpoint.
    pub fn add_edge(&mut self, edge: Edge) -> u32 {
        let index = u32::try_from(self.edges.len()).expect("edge table exceeds u32::MAX entries");
        self.get_or_insert_placeholder(edge.source).add_edge(index);
        self.get_or_insert_placeholder(edge.target).add_edge(index);
        self.edges.push(edge);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointLL;

    fn edge(way_id: i64, nodes: &[i64]) -> Edge {
        Edge {
            way_id,
            source: nodes[0],
            target: nodes[nodes.len() - 1],
            nodes: nodes.to_vec(),
        }
    }

    #[test]
    fn placeholder() {
        let mut t = NodeTable::new();
        assert!(t.is_empty());

        t.get_or_insert_placeholder(1).increment_uses();
        t.get_or_insert_placeholder(1).increment_uses();
        assert_eq!(t.len(), 1);

        let n = t.get(1).unwrap();
        assert!(!n.position().is_valid());
        assert_eq!(n.uses(), 2);

        t.get_mut(1)
            .unwrap()
            .set_position(PointLL::new(10.0, 20.0));
        assert_eq!(t.get(1).unwrap().position(), PointLL::new(10.0, 20.0));
        assert_eq!(t.get(1).unwrap().uses(), 2);
    }

    #[test]
    fn add_edge() {
        let mut t = NodeTable::new();
        t.insert(1, OsmNode::with_position(0.0, 0.0));
        t.insert(2, OsmNode::with_position(0.0, 0.01));
        t.insert(3, OsmNode::with_position(0.0, 0.02));

        assert_eq!(t.add_edge(edge(10, &[1, 2])), 0);
        assert_eq!(t.add_edge(edge(11, &[2, 3])), 1);
        assert_eq!(t.add_edge(edge(12, &[3, 3])), 2);

        assert_eq!(t.get(1).unwrap().edges(), &[0]);
        assert_eq!(t.get(2).unwrap().edges(), &[0, 1]);
        assert_eq!(t.get(3).unwrap().edges(), &[1, 2, 2]);
        assert_eq!(t.edge(1).unwrap().way_id, 11);
        assert_eq!(t.edge(3), None);
        assert_eq!(t.edges().len(), 3);
    }

    #[test]
    fn edge_length() {
        let mut t = NodeTable::new();
        t.insert(1, OsmNode::with_position(0.0, 0.0));
        t.insert(2, OsmNode::with_position(0.0, 0.01));
        t.insert(3, OsmNode::with_position(0.0, 0.02));

        let e = edge(10, &[1, 2, 3]);
        let direct = edge(11, &[1, 3]);
        assert_eq!(e.shape_point_count(), 1);
        assert_eq!(direct.shape_point_count(), 0);
        assert!((e.length(&t) - direct.length(&t)).abs() < 1e-4);
        assert!((e.length(&t) - 2.2239).abs() < 1e-3);
    }

    #[test]
    fn vertices_and_shape_points() {
        let mut t = NodeTable::new();
        for id in 1..=4 {
            t.insert(id, OsmNode::with_position(0.0, id as f32));
        }
        t.get_mut(1).unwrap().increment_uses();
        t.get_mut(1).unwrap().increment_uses();
        t.get_mut(2).unwrap().increment_uses();
        t.get_mut(4).unwrap().increment_uses();
        t.get_mut(4).unwrap().increment_uses();
        t.get_mut(4).unwrap().increment_uses();

        let vertices: Vec<i64> = t.vertices().map(|(id, _)| id).collect();
        let shape: Vec<i64> = t.shape_points().map(|(id, _)| id).collect();
        assert_eq!(vertices, [1, 4]);
        assert_eq!(shape, [2, 3]);
    }

    #[test]
    fn retain() {
        let mut t = NodeTable::new();
        for id in 1..=4 {
            t.insert(id, OsmNode::new());
        }
        t.retain(|id, _| id % 2 == 0);
        let ids: Vec<i64> = t.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, [2, 4]);
        assert!(t.remove(2).is_some());
        assert!(t.remove(2).is_none());
    }
}
