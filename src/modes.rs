// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::ops::{BitAnd, BitOr};

/// Set of travel modes permitted through a node, stored as an 8-bit mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modes(u8);

impl Modes {
    pub const NONE: Self = Self(0);
    pub const AUTO: Self = Self(1 << 0);
    pub const PEDESTRIAN: Self = Self(1 << 1);
    pub const BICYCLE: Self = Self(1 << 2);
    pub const TRUCK: Self = Self(1 << 3);
    pub const EMERGENCY: Self = Self(1 << 4);
    pub const TAXI: Self = Self(1 << 5);
    pub const BUS: Self = Self(1 << 6);
    pub const HOV: Self = Self(1 << 7);
    pub const ALL: Self = Self(u8::MAX);

    /// All motorized modes.
    pub const MOTOR_VEHICLE: Self = Self(
        Self::AUTO.0 | Self::TRUCK.0 | Self::EMERGENCY.0 | Self::TAXI.0 | Self::BUS.0 | Self::HOV.0,
    );

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if all modes from `other` are present.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for Modes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Modes {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
