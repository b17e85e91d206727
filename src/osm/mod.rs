// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod profile;
mod reader;

pub use profile::{Profile, WayFilter, BICYCLE_PROFILE, CAR_PROFILE, FOOT_PROFILE};
pub use reader::{
    discover_from_buffer, discover_from_file, discover_from_io, Error, FileFormat, Options,
};
