//! # Block Positions
//!
//! A block position is three signed integers packed into one 64-bit word. Two
//! layouts exist, chosen by protocol version:
//!
//! ```text
//! Layout A (version <  477): [x:26][y:12][z:26]
//! Layout B (version >= 477): [x:26][z:26][y:12]
//! ```
//!
//! x and z are 26-bit signed fields, y is a 12-bit signed field. Components outside
//! their field range are truncated to the field width when packing.

use crate::config::POSITION_LAYOUT_THRESHOLD;

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: u64 = (1 << XZ_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

/// A block coordinate triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Bit arrangement used to pack a [`Position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionLayout {
    /// x, y, z from the high bits down
    Xyz,
    /// x, z, y from the high bits down
    Xzy,
}

impl PositionLayout {
    /// Select the layout a given protocol version uses
    #[inline]
    pub fn for_version(protocol_version: i32) -> Self {
        if protocol_version < POSITION_LAYOUT_THRESHOLD {
            PositionLayout::Xyz
        } else {
            PositionLayout::Xzy
        }
    }
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Pack into a 64-bit word using `layout`
    pub fn pack(&self, layout: PositionLayout) -> u64 {
        let x = (self.x as u64) & XZ_MASK;
        let y = (self.y as u64) & Y_MASK;
        let z = (self.z as u64) & XZ_MASK;

        match layout {
            PositionLayout::Xyz => (x << 38) | (y << 26) | z,
            PositionLayout::Xzy => (x << 38) | (z << 12) | y,
        }
    }

    /// Unpack a 64-bit word produced by [`Position::pack`] with the same layout
    pub fn unpack(word: u64, layout: PositionLayout) -> Self {
        let (x, y, z) = match layout {
            PositionLayout::Xyz => (word >> 38, (word >> 26) & Y_MASK, word & XZ_MASK),
            PositionLayout::Xzy => (word >> 38, word & Y_MASK, (word >> 12) & XZ_MASK),
        };

        Self {
            x: sign_extend(x & XZ_MASK, XZ_BITS),
            y: sign_extend(y, Y_BITS),
            z: sign_extend(z, XZ_BITS),
        }
    }
}

impl From<(i32, i32, i32)> for Position {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

// Field values are already masked to `width` bits
#[inline]
fn sign_extend(field: u64, width: u32) -> i32 {
    let shift = 32 - width;
    ((field as i32) << shift) >> shift
}
