// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{GraphId, Modes, PointLL};

/// Location of a single field within [NodeAttributes].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    offset: u32,
    width: u32,
}

impl Field {
    const fn new(offset: u32, width: u32) -> Self {
        assert!(width > 0 && offset + width <= u32::BITS);
        Self { offset, width }
    }

    /// Index of the lowest bit of the field.
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Number of bits occupied by the field.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.width)
    }

    const fn mask(&self) -> u32 {
        self.max() << self.offset
    }

    const fn end(&self) -> u32 {
        self.offset + self.width
    }
}

pub const USES: Field = Field::new(0, 8);
pub const GATE: Field = Field::new(USES.end(), 1);
pub const BOLLARD: Field = Field::new(GATE.end(), 1);
pub const EXIT_TO: Field = Field::new(BOLLARD.end(), 1);
pub const REF: Field = Field::new(EXIT_TO.end(), 1);
pub const MODES_MASK: Field = Field::new(REF.end(), 8);

/// Number of unused high bits of [NodeAttributes].
pub const SPARE_BITS: u32 = u32::BITS - MODES_MASK.end();

const _: () = assert!(MODES_MASK.end() <= u32::BITS);

/// Attributes of an [OsmNode] packed into a single 32-bit word.
///
/// | bits   | field      |
/// |--------|------------|
/// | 0..8   | uses       |
/// | 8      | gate       |
/// | 9      | bollard    |
/// | 10     | exit_to    |
/// | 11     | ref        |
/// | 12..20 | modes_mask |
/// | 20..32 | spare      |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeAttributes(u32);

impl NodeAttributes {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn get(&self, field: Field) -> u32 {
        (self.0 & field.mask()) >> field.offset
    }

    /// Stores a value in a field. Bits of `value` above the field's width are discarded.
    pub fn set(&mut self, field: Field, value: u32) {
        self.0 = (self.0 & !field.mask()) | ((value & field.max()) << field.offset);
    }

    fn get_flag(&self, field: Field) -> bool {
        self.get(field) != 0
    }

    fn set_flag(&mut self, field: Field, flag: bool) {
        self.set(field, flag as u32);
    }
}

/// A vertex candidate discovered while reading OSM data.
///
/// The record goes through three phases, which are not tracked internally:
/// 1. discovery - position, flags and modes are set, [OsmNode::increment_uses] is called
///    for every way referencing the node, and [OsmNode::add_edge] for every edge starting
///    or ending at it;
/// 2. tiling - [OsmNode::set_graph_id] is called exactly once;
/// 3. serialization - all fields are only read.
///
/// Nodes with [uses](OsmNode::uses) greater than one are intersections or ends of a way,
/// and become nodes in the graph. The remaining nodes are shape points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmNode {
    position: PointLL,
    graph_id: GraphId,
    edges: Vec<u32>,
    attributes: NodeAttributes,
}

impl OsmNode {
    /// Creates a node without a position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node at the provided position. The coordinates are not validated.
    pub fn with_position(lat: f32, lng: f32) -> Self {
        Self {
            position: PointLL::new(lat, lng),
            ..Self::default()
        }
    }

    pub fn position(&self) -> PointLL {
        self.position
    }

    pub fn set_position(&mut self, position: PointLL) {
        self.position = position;
    }

    /// Returns the identifier assigned by the tiling pass, or None if the node
    /// has not been tiled yet.
    pub fn graph_id(&self) -> Option<GraphId> {
        if self.graph_id.is_valid() {
            Some(self.graph_id)
        } else {
            None
        }
    }

    pub fn has_graph_id(&self) -> bool {
        self.graph_id.is_valid()
    }

    /// Sets the identifier of this node within the tiled graph.
    ///
    /// Must be called at most once, by the tiling pass. Subsequent calls are not
    /// detected and overwrite the previous value.
    pub fn set_graph_id(&mut self, graph_id: GraphId) {
        self.graph_id = graph_id;
    }

    /// Appends an index of an edge beginning or ending at this node.
    /// Duplicates are kept.
    pub fn add_edge(&mut self, edge_index: u32) {
        self.edges.push(edge_index);
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Indices of edges beginning or ending at this node, in the order of [OsmNode::add_edge] calls.
    pub fn edges(&self) -> &[u32] {
        &self.edges
    }

    /// Records one more way referencing this node.
    ///
    /// The counter saturates at 255: once reached, further calls have no effect.
    /// Any value above one already classifies the node as an intersection,
    /// so saturation never changes the outcome of graph simplification.
    pub fn increment_uses(&mut self) {
        let uses = self.attributes.get(USES);
        if uses < USES.max() {
            self.attributes.set(USES, uses + 1);
        }
    }

    /// Number of ways which include this node (with way endpoints counted twice
    /// by the discovery pass).
    pub fn uses(&self) -> u32 {
        self.attributes.get(USES)
    }

    /// Returns true if the node must be kept as a vertex in the graph.
    pub fn is_intersection(&self) -> bool {
        self.uses() > 1
    }

    pub fn gate(&self) -> bool {
        self.attributes.get_flag(GATE)
    }

    pub fn set_gate(&mut self, gate: bool) {
        self.attributes.set_flag(GATE, gate);
    }

    pub fn bollard(&self) -> bool {
        self.attributes.get_flag(BOLLARD)
    }

    pub fn set_bollard(&mut self, bollard: bool) {
        self.attributes.set_flag(BOLLARD, bollard);
    }

    pub fn exit_to(&self) -> bool {
        self.attributes.get_flag(EXIT_TO)
    }

    pub fn set_exit_to(&mut self, exit_to: bool) {
        self.attributes.set_flag(EXIT_TO, exit_to);
    }

    pub fn has_ref(&self) -> bool {
        self.attributes.get_flag(REF)
    }

    pub fn set_ref(&mut self, has_ref: bool) {
        self.attributes.set_flag(REF, has_ref);
    }

    pub fn modes_mask(&self) -> Modes {
        Modes::from_bits(self.attributes.get(MODES_MASK) as u8)
    }

    pub fn set_modes_mask(&mut self, modes: Modes) {
        self.attributes.set(MODES_MASK, modes.bits() as u32);
    }

    /// Returns the packed attribute word.
    pub fn attributes(&self) -> NodeAttributes {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn layout() {
        assert_eq!((USES.offset(), USES.width()), (0, 8));
        assert_eq!((GATE.offset(), GATE.width()), (8, 1));
        assert_eq!((BOLLARD.offset(), BOLLARD.width()), (9, 1));
        assert_eq!((EXIT_TO.offset(), EXIT_TO.width()), (10, 1));
        assert_eq!((REF.offset(), REF.width()), (11, 1));
        assert_eq!((MODES_MASK.offset(), MODES_MASK.width()), (12, 8));
        assert_eq!(SPARE_BITS, 12);
        assert_send_sync::<OsmNode>();
    }

    #[test]
    fn default_node() {
        let n = OsmNode::new();
        assert!(!n.position().is_valid());
        assert_eq!(n.graph_id(), None);
        assert!(!n.has_graph_id());
        assert_eq!(n.edge_count(), 0);
        assert!(n.edges().is_empty());
        assert_eq!(n.uses(), 0);
        assert!(!n.gate());
        assert!(!n.bollard());
        assert!(!n.exit_to());
        assert!(!n.has_ref());
        assert_eq!(n.modes_mask(), Modes::NONE);
        assert_eq!(n.attributes().bits(), 0);
    }

    #[test]
    fn intersection() {
        let mut n = OsmNode::with_position(47.6, -122.3);
        n.add_edge(5);
        n.add_edge(9);
        n.increment_uses();
        n.increment_uses();

        assert_eq!(n.position(), PointLL::new(47.6, -122.3));
        assert_eq!(n.edge_count(), 2);
        assert_eq!(n.edges(), &[5, 9]);
        assert_eq!(n.uses(), 2);
        assert!(n.is_intersection());
        assert_eq!(n.graph_id(), None);
    }

    #[test]
    fn shape_point() {
        let mut n = OsmNode::new();
        n.increment_uses();
        assert_eq!(n.uses(), 1);
        assert!(!n.is_intersection());
    }

    #[test]
    fn edges_keep_order_and_duplicates() {
        let mut n = OsmNode::new();
        let added = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3];
        for (i, &e) in added.iter().enumerate() {
            n.add_edge(e);
            assert_eq!(n.edge_count(), i + 1);
        }
        assert_eq!(n.edges(), &added);
    }

    #[test]
    fn uses_saturate() {
        let mut n = OsmNode::new();
        for i in 1..=255 {
            n.increment_uses();
            assert_eq!(n.uses(), i);
        }

        n.increment_uses();
        assert_eq!(n.uses(), 255);
        n.increment_uses();
        assert_eq!(n.uses(), 255);

        // Overflow does not leak into neighboring fields
        assert!(!n.gate());
        assert_eq!(n.modes_mask(), Modes::NONE);
    }

    #[test]
    fn flags_are_isolated() {
        let mut n = OsmNode::new();
        n.increment_uses();
        n.increment_uses();
        n.increment_uses();
        n.set_modes_mask(Modes::from_bits(0b1010_0101));

        n.set_gate(true);
        assert!(n.gate());
        assert!(!n.bollard() && !n.exit_to() && !n.has_ref());

        n.set_bollard(true);
        assert!(n.gate() && n.bollard());
        assert!(!n.exit_to() && !n.has_ref());

        n.set_exit_to(true);
        assert!(n.gate() && n.bollard() && n.exit_to());
        assert!(!n.has_ref());

        n.set_ref(true);
        assert!(n.gate() && n.bollard() && n.exit_to() && n.has_ref());

        n.set_gate(false);
        assert!(!n.gate());
        assert!(n.bollard() && n.exit_to() && n.has_ref());

        n.set_exit_to(false);
        assert!(!n.gate() && !n.exit_to());
        assert!(n.bollard() && n.has_ref());

        assert_eq!(n.uses(), 3);
        assert_eq!(n.modes_mask(), Modes::from_bits(0b1010_0101));
    }

    #[test]
    fn modes_mask_round_trip() {
        let mut n = OsmNode::new();
        n.set_gate(true);
        n.set_ref(true);
        n.increment_uses();

        for bits in 0..=u8::MAX {
            n.set_modes_mask(Modes::from_bits(bits));
            assert_eq!(n.modes_mask().bits(), bits);
            assert!(n.gate());
            assert!(!n.bollard());
            assert!(!n.exit_to());
            assert!(n.has_ref());
            assert_eq!(n.uses(), 1);
        }
    }

    #[test]
    fn graph_id_set_once() {
        let mut n = OsmNode::with_position(1.0, 2.0);
        assert_eq!(n.graph_id(), None);

        let id = GraphId::new(10, 2, 3).unwrap();
        n.set_graph_id(id);
        assert!(n.has_graph_id());
        assert_eq!(n.graph_id(), Some(id));
        assert_eq!(n.graph_id(), Some(id));
    }

    #[test]
    fn position_can_be_overwritten() {
        let mut n = OsmNode::new();
        n.set_position(PointLL::new(1.0, 2.0));
        n.set_position(PointLL::new(3.0, 4.0));
        assert_eq!(n.position(), PointLL::new(3.0, 4.0));
    }

    #[test]
    fn raw_field_writes_truncate() {
        let mut a = NodeAttributes::default();
        a.set(USES, 0x1FF);
        assert_eq!(a.get(USES), 0xFF);
        assert_eq!(a.get(GATE), 0);

        a.set(GATE, 2);
        assert_eq!(a.get(GATE), 0);

        a.set(MODES_MASK, 0xABC);
        assert_eq!(a.get(MODES_MASK), 0xBC);
        assert_eq!(a.get(USES), 0xFF);
        assert_eq!(a.bits() >> MODES_MASK.end(), 0);
    }

    #[test]
    fn field_max() {
        assert_eq!(USES.max(), 255);
        assert_eq!(GATE.max(), 1);
        assert_eq!(Field::new(0, 32).max(), u32::MAX);
        assert_eq!(Field::new(31, 1).max(), 1);

        let mut attrs = NodeAttributes::default();
        attrs.set(Field::new(0, 32), u32::MAX);
        assert_eq!(attrs.get(Field::new(0, 32)), u32::MAX);
        assert_eq!(attrs.get(MODES_MASK), 255);
    }
}
