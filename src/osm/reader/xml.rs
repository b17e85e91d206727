// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader streams OSM [Features](model::Feature) from an XML file.
///
/// Relations and their members are skipped. Malformed elements are logged and skipped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<model::Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&start) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }
                    // "way" can't be self-closing
                    b"tag" => {
                        if let Some(tags) = feature_tags(&mut f) {
                            if let Some((k, v)) = parse_tag(&start) {
                                tags.insert(k, v);
                            }
                        }
                    }
                    b"nd" => {
                        if let Some(nodes) = feature_nodes(&mut f) {
                            if let Some(ref_) = parse_nd(&start) {
                                nodes.push(ref_);
                            }
                        }
                    }
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(&start).map(model::Feature::Node),
                    b"way" => f = parse_way(&start).map(model::Feature::Way),
                    // "tag" and "nd" must be self-closing
                    _ => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Returns the value of an attribute parsed as `T`,
/// or None if the attribute is missing or malformed.
fn parse_attribute<T: std::str::FromStr>(start: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    let attr = start.try_get_attribute(key).ok()??;
    from_utf8(&attr.value).ok()?.parse().ok()
}

fn parse_node(start: &BytesStart<'_>) -> Option<model::Node> {
    let id: i64 = parse_attribute(start, b"id").unwrap_or(0);
    let lat: f32 = parse_attribute(start, b"lat").unwrap_or(f32::NAN);
    let lon: f32 = parse_attribute(start, b"lon").unwrap_or(f32::NAN);

    if id != 0 && lat.is_finite() && lon.is_finite() {
        Some(model::Node {
            id,
            lat,
            lon,
            tags: HashMap::default(),
        })
    } else {
        log::warn!("skipping malformed node (id={id}, lat={lat}, lon={lon})");
        None
    }
}

fn parse_way(start: &BytesStart<'_>) -> Option<model::Way> {
    let id: i64 = parse_attribute(start, b"id").unwrap_or(0);

    if id != 0 {
        Some(model::Way {
            id,
            nodes: Vec::default(),
            tags: HashMap::default(),
        })
    } else {
        log::warn!("skipping way without a valid id");
        None
    }
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    let k: String = parse_attribute(start, b"k")?;
    let v: String = parse_attribute(start, b"v").unwrap_or_default();
    Some((k, v))
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    match parse_attribute(start, b"ref") {
        Some(0) | None => {
            log::debug!("skipping way node reference without a valid ref");
            None
        }
        Some(ref_) => Some(ref_),
    }
}

fn feature_tags<'a>(f: &'a mut Option<model::Feature>) -> Option<&'a mut HashMap<String, String>> {
    match f {
        Some(model::Feature::Node(ref mut n)) => Some(&mut n.tags),
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.tags),
        None => None,
    }
}

fn feature_nodes<'a>(f: &'a mut Option<model::Feature>) -> Option<&'a mut Vec<i64>> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::model::{Feature, Node, Way};
    use super::*;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    const FIXTURE: &[u8] = include_bytes!("test_fixtures/crossroads.osm");

    fn node(id: i64, lat: f32, lon: f32, tags: HashMap<String, String>) -> Node {
        Node { id, lat, lon, tags }
    }

    fn way(id: i64, nodes: &[i64], tags: HashMap<String, String>) -> Way {
        Way {
            id,
            nodes: nodes.to_vec(),
            tags,
        }
    }

    fn collect_all<I: Iterator<Item = Result<Feature, quick_xml::Error>>>(
        features: I,
    ) -> Result<(Vec<Node>, Vec<Way>), quick_xml::Error> {
        let mut nodes = Vec::default();
        let mut ways = Vec::default();

        for f in features {
            match f? {
                Feature::Node(n) => nodes.push(n),
                Feature::Way(w) => ways.push(w),
            }
        }

        Ok((nodes, ways))
    }

    fn check_against_fixture<I: Iterator<Item = Result<Feature, quick_xml::Error>>>(
        features: I,
    ) -> Result<(), quick_xml::Error> {
        let (nodes, ways) = collect_all(features)?;

        let ids: Vec<i64> = nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 16]);

        assert_eq!(nodes[0], node(1, 50.0, 20.0, tags! {}));
        assert_eq!(
            nodes[1],
            node(2, 50.0, 20.001, tags! {"barrier": "bollard"}),
        );
        assert_eq!(
            nodes[4],
            node(
                5,
                50.0,
                20.003,
                tags! {"highway": "motorway_junction", "ref": "12", "exit_to": "Downtown"},
            ),
        );
        assert_eq!(
            nodes[6],
            node(
                7,
                49.999,
                20.003,
                tags! {"barrier": "gate", "access": "no", "foot": "yes"},
            ),
        );

        let way_ids: Vec<i64> = ways.iter().map(|w| w.id).collect();
        assert_eq!(way_ids, [100, 101, 102, 103, 104, 105, 106]);
        assert_eq!(
            ways[0],
            way(100, &[1, 2, 3, 5, 6], tags! {"highway": "residential", "name": "Main Street"}),
        );
        assert_eq!(
            ways[5],
            way(105, &[4, 13], tags! {"highway": "residential", "motor_vehicle": "no"}),
        );
        assert_eq!(ways[6], way(106, &[6, 99], tags! {"highway": "residential"}));

        Ok(())
    }

    #[test]
    fn parse_from_buf() -> Result<(), quick_xml::Error> {
        check_against_fixture(Reader::from_buffer(FIXTURE))
    }

    #[test]
    fn parse_from_io() -> Result<(), quick_xml::Error> {
        check_against_fixture(Reader::from_io(io::Cursor::new(FIXTURE)))
    }

    #[test]
    fn skips_malformed_elements() -> Result<(), quick_xml::Error> {
        const DATA: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="1.0" lon="2.0"/>
  <node id="2" lat="north" lon="2.0"/>
  <node id="3" lon="2.0"/>
  <way id="0">
    <nd ref="1"/>
    <tag k="highway" v="residential"/>
  </way>
  <way id="10">
    <nd ref="1"/>
    <nd ref="0"/>
    <nd ref="x"/>
    <nd ref="4"/>
    <tag k="highway"/>
  </way>
</osm>"#;

        let (nodes, ways) = collect_all(Reader::from_buffer(DATA))?;
        assert_eq!(nodes, [node(1, 1.0, 2.0, tags! {})]);
        assert_eq!(ways, [way(10, &[1, 4], tags! {"highway": ""})]);
        Ok(())
    }
}
