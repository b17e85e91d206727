// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{Edge, Modes, NodeTable, OsmNode, PointLL};

use super::{model, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [NodeTable].
///
/// Ways are only remembered while reading. Use counts and edges are computed by
/// [Discovery::finish], once all node positions are known.
pub(super) struct Discovery<'a> {
    table: NodeTable,
    options: &'a Options<'a>,
    ways: Vec<model::Way>,
    ignore_bbox: bool,
}

/// Counters describing dropped input, reported once discovery is finished.
#[derive(Debug, Default)]
struct DroppedInput {
    ways: usize,
    nodes: usize,
}

impl<'a> Discovery<'a> {
    /// Create a new, empty discovery pass.
    pub(super) fn new(options: &'a Options<'a>) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());
        if ignore_bbox && options.bbox.iter().any(|&x| x != 0.0) {
            log::warn!("ignoring invalid bounding box {:?}", options.bbox);
        }

        Self {
            table: NodeTable::default(),
            options,
            ways: Vec::default(),
            ignore_bbox,
        }
    }

    /// Add all features from the provided iterator, and compute the final [NodeTable].
    pub(super) fn run<I, E>(mut self, features: I) -> Result<NodeTable, E>
    where
        I: IntoIterator<Item = Result<model::Feature, E>>,
    {
        for f in features {
            self.add_feature(f?);
        }
        Ok(self.finish())
    }

    fn add_feature(&mut self, f: model::Feature) {
        match f {
            model::Feature::Node(n) => self.add_node(n),
            model::Feature::Way(w) => self.add_way(w),
        }
    }

    fn add_node(&mut self, n: model::Node) {
        if !self.is_in_bbox(n.lat, n.lon) {
            return;
        }

        let node = self.table.get_or_insert_placeholder(n.id);
        node.set_position(PointLL::new(n.lat, n.lon));
        apply_node_tags(node, &n.tags);
    }

    fn is_in_bbox(&self, lat: f32, lon: f32) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn add_way(&mut self, w: model::Way) {
        if !self.options.profile.is_routable(&w.tags) {
            return;
        }

        // Ways may precede their nodes - keep a record for each node,
        // to be populated with a position later.
        for &node_id in &w.nodes {
            self.table.get_or_insert_placeholder(node_id);
        }
        self.ways.push(w);
    }

    fn finish(mut self) -> NodeTable {
        let mut dropped = DroppedInput::default();
        let ways = std::mem::take(&mut self.ways);

        let mut runs: Vec<(i64, Vec<i64>)> = Vec::with_capacity(ways.len());
        for w in &ways {
            let before = runs.len();
            runs.extend(self.get_way_runs(w).into_iter().map(|nodes| (w.id, nodes)));
            if runs.len() == before {
                log::warn!(
                    "way {} has less than 2 consecutive nodes with known positions - skipping",
                    w.id
                );
                dropped.ways += 1;
            }
        }

        for (_, nodes) in &runs {
            self.count_uses(nodes);
        }

        self.table.retain(|id, n| {
            if n.uses() > 0 && n.position().is_valid() {
                true
            } else {
                if !n.position().is_valid() {
                    log::debug!("node {id} is referenced by a way, but has no position - removing");
                }
                dropped.nodes += 1;
                false
            }
        });

        for (way_id, nodes) in &runs {
            self.create_edges(*way_id, nodes);
        }

        log::info!(
            "discovered {} nodes ({} vertices) and {} edges from {} ways; dropped {} ways and {} nodes",
            self.table.len(),
            self.table.vertices().count(),
            self.table.edges().len(),
            ways.len() - dropped.ways,
            dropped.ways,
            dropped.nodes,
        );
        self.table
    }

    /// Splits a way into runs of consecutive nodes with a known position,
    /// removing consecutive duplicates. A node without a position (unknown or
    /// outside of the bbox) ends the current run. Runs shorter than 2 nodes are discarded.
    fn get_way_runs(&self, w: &model::Way) -> Vec<Vec<i64>> {
        let mut runs = Vec::default();
        let mut run: Vec<i64> = Vec::default();

        for &node_id in &w.nodes {
            let has_position = self
                .table
                .get(node_id)
                .map_or(false, |n| n.position().is_valid());

            if !has_position {
                if run.len() >= 2 {
                    runs.push(std::mem::take(&mut run));
                } else {
                    run.clear();
                }
            } else if run.last() != Some(&node_id) {
                run.push(node_id);
            }
        }

        if run.len() >= 2 {
            runs.push(run);
        }
        runs
    }

    /// Every reference to a node counts as one use.
    /// The first and last nodes get an additional use, so that
    /// ends of ways always become vertices.
    fn count_uses(&mut self, nodes: &[i64]) {
        debug_assert!(nodes.len() >= 2);

        for &node_id in nodes {
            self.increment_uses(node_id);
        }
        self.increment_uses(nodes[0]);
        self.increment_uses(nodes[nodes.len() - 1]);
    }

    fn increment_uses(&mut self, node_id: i64) {
        if let Some(n) = self.table.get_mut(node_id) {
            n.increment_uses();
        }
    }

    /// Splits a way into [Edges](Edge) at every vertex.
    fn create_edges(&mut self, way_id: i64, nodes: &[i64]) {
        debug_assert!(nodes.len() >= 2);

        let mut start = 0;
        for (idx, &node_id) in nodes.iter().enumerate().skip(1) {
            let is_last = idx == nodes.len() - 1;
            let is_vertex = self
                .table
                .get(node_id)
                .map_or(false, |n| n.is_intersection());

            if is_vertex || is_last {
                let edge_nodes = nodes[start..=idx].to_vec();
                self.table.add_edge(Edge {
                    way_id,
                    source: nodes[start],
                    target: node_id,
                    nodes: edge_nodes,
                });
                start = idx;
            }
        }
    }
}

/// Sets routing-relevant attributes of an [OsmNode] based on its OSM tags.
fn apply_node_tags(node: &mut OsmNode, tags: &HashMap<String, String>) {
    let tag = |k: &str| tags.get(k).map(|v| v.as_str());

    let barrier = tag("barrier");
    node.set_gate(barrier == Some("gate"));
    node.set_bollard(barrier == Some("bollard"));
    node.set_exit_to(tags.contains_key("exit_to"));
    node.set_ref(tag("highway") == Some("motorway_junction") && tags.contains_key("ref"));
    node.set_modes_mask(node_modes(tags));
}

/// Computes the travel modes permitted through a node from its
/// `barrier` and [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
fn node_modes(tags: &HashMap<String, String>) -> Modes {
    let tag = |k: &str| tags.get(k).map(|v| v.as_str());

    let mut modes = match tag("barrier") {
        Some("bollard") | Some("block") | Some("cycle_barrier") => {
            Modes::PEDESTRIAN | Modes::BICYCLE
        }
        Some("stile") | Some("turnstile") | Some("kissing_gate") => Modes::PEDESTRIAN,
        _ => Modes::ALL,
    };

    match tag("access") {
        Some("no") | Some("private") => modes = Modes::NONE,
        Some("yes") | Some("permissive") => modes = Modes::ALL,
        _ => {}
    }

    let overrides = [
        (tag("motor_vehicle").or(tag("motorcar")), Modes::MOTOR_VEHICLE),
        (tag("bicycle"), Modes::BICYCLE),
        (tag("foot"), Modes::PEDESTRIAN),
    ];
    for (value, mode) in overrides {
        match value {
            Some("yes") | Some("permissive") | Some("designated") => modes.insert(mode),
            Some("no") | Some("private") => modes.remove(mode),
            _ => {}
        }
    }

    modes
}
