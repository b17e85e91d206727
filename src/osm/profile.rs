// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways take part in building a [NodeTable](crate::NodeTable).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the profile,
    /// customary the most specific [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    pub name: &'a str,

    /// Tags marking routable ways. A way is considered if any of its tags
    /// exactly matches any [WayFilter].
    pub ways: &'a [WayFilter<'a>],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    pub access: &'a [&'a str],

    /// Force skipping [motorroad=yes](https://wiki.openstreetmap.org/wiki/Key:motorroad) ways.
    pub disallow_motorroad: bool,
}

/// Key and value of a tag marking a routable way, e.g. `highway=residential`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WayFilter<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Profile<'a> {
    /// Returns true if a way with the given tags matches any [WayFilter]
    /// and is not prohibited (as determined by [Profile::is_allowed]).
    pub fn is_routable(&self, tags: &HashMap<String, String>) -> bool {
        self.matches_filter(tags) && self.is_allowed(tags)
    }

    fn matches_filter(&self, tags: &HashMap<String, String>) -> bool {
        self.ways
            .iter()
            .any(|f| tags.get(f.key).map(|v| v.as_str()) == Some(f.value))
    }

    /// Checks if the way is traversable, by considering motor roads ([Profile::disallow_motorroad])
    /// and access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        if self.disallow_motorroad && tags.get("motorroad").map(|v| v.as_str()) == Some("yes") {
            return false;
        }

        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }
}

macro_rules! way_filters {
    {$( $key:literal => [$( $value:literal ),+ $(,)?] ),+ $(,)?} => {
        &[ $( $( WayFilter { key: $key, value: $value } ),+ ),+ ]
    };
}

/// Profile for cars, with appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const CAR_PROFILE: Profile = Profile {
    name: "motorcar",
    ways: way_filters! {
        "highway" => [
            "motorway",
            "motorway_link",
            "trunk",
            "trunk_link",
            "primary",
            "primary_link",
            "secondary",
            "secondary_link",
            "tertiary",
            "tertiary_link",
            "unclassified",
            "residential",
            "living_street",
            "service",
        ],
    },
    access: &["access", "vehicle", "motor_vehicle", "motorcar"],
    disallow_motorroad: false,
};

/// Profile for bicycles, with appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const BICYCLE_PROFILE: Profile = Profile {
    name: "bicycle",
    ways: way_filters! {
        "highway" => [
            "trunk",
            "trunk_link",
            "primary",
            "primary_link",
            "secondary",
            "secondary_link",
            "tertiary",
            "tertiary_link",
            "unclassified",
            "residential",
            "living_street",
            "service",
            "track",
            "path",
            "cycleway",
        ],
    },
    access: &["access", "vehicle", "bicycle"],
    disallow_motorroad: true,
};

/// Profile for pedestrians, with appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const FOOT_PROFILE: Profile = Profile {
    name: "foot",
    ways: way_filters! {
        "highway" => [
            "trunk",
            "primary",
            "secondary",
            "tertiary",
            "unclassified",
            "residential",
            "living_street",
            "service",
            "pedestrian",
            "track",
            "footway",
            "path",
            "steps",
        ],
        "public_transport" => ["platform"],
        "railway" => ["platform"],
    },
    access: &["access", "foot"],
    disallow_motorroad: true,
};
