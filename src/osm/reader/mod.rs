// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io;
use std::path::Path;

use discovery::Discovery;

use crate::osm::Profile;
use crate::{NodeTable, TileLevel};

mod discovery;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format based on the extension of a file,
    /// defaulting to [FileFormat::Xml].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::XmlGz,
            Some("bz2") => Self::XmlBz2,
            _ => Self::Xml,
        }
    }
}

/// Additional controls for interpreting OSM data as a [NodeTable].
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// Which OSM ways should contribute nodes and edges.
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f32; 4],

    /// Hierarchy level used when [tiling](crate::assign_graph_ids) the discovered nodes.
    pub tile_level: TileLevel,
}

/// Error which can occur when reading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Parse OSM features from a reader into a [NodeTable] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn discover_from_io<'a, R: io::Read>(
    options: &'a Options<'a>,
    reader: R,
) -> Result<NodeTable, Error> {
    let table = match options.file_format {
        FileFormat::Xml => {
            let b = io::BufReader::new(reader);
            Discovery::new(options).run(xml::Reader::from_io(b))?
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            let b = io::BufReader::new(d);
            Discovery::new(options).run(xml::Reader::from_io(b))?
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            let b = io::BufReader::new(d);
            Discovery::new(options).run(xml::Reader::from_io(b))?
        }
    };
    Ok(table)
}

/// Parse OSM features from a file at the provided path into a [NodeTable] as per the provided [Options].
pub fn discover_from_file<'a, P: AsRef<Path>>(
    options: &'a Options<'a>,
    path: P,
) -> Result<NodeTable, Error> {
    let f = File::open(path)?;
    discover_from_io(options, f)
}

/// Parse OSM features from a static buffer into a [NodeTable] as per the provided [Options].
pub fn discover_from_buffer<'a>(options: &'a Options<'a>, data: &[u8]) -> Result<NodeTable, Error> {
    if options.file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        let table = Discovery::new(options).run(xml::Reader::from_buffer(data))?;
        Ok(table)
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        discover_from_io(options, cursor)
    }
}
