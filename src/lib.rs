/*
ENSnano, a 3d graphical application for DNA nanostructures.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Geometric storage of the virtual helices of a DNA nanostructure design.
//!
//! A `VirtualHelixGroup` holds, for every virtual helix of a part, the position, orientation
//! and phosphate positions of each of its virtual base pairs. All base pairs are packed in
//! shared tables, and each helix owns a contiguous range of rows in these tables. The group
//! answers proximity queries over base pairs and over helix origins, and stores a row of
//! attributes for every helix.
//!
//! The group is a single unit of mutable state: all its methods run to completion, and
//! modifying methods take `&mut self`. Sharing a group between threads requires wrapping it
//! in a lock.

#[macro_use]
extern crate serde_derive;
extern crate serde;

pub use ultraviolet;

mod error;
pub use error::VhGroupError;

mod parameters;
pub use parameters::GroupParameters;

pub mod geometry;

mod index_table;
pub use index_table::OffsetAndSize;
mod origin_table;
mod point_table;

mod properties;
pub use properties::*;

mod query_cache;
pub use query_cache::CacheStats;

mod group;
pub use group::{BasePoint, VirtualBase, VirtualHelixGroup};

#[cfg(test)]
mod tests;
