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
//! Errors returned by the operations of a `VirtualHelixGroup`.

use std::fmt;

/// An error that occured when trying to read or modify a `VirtualHelixGroup`.
///
/// A failed operation never leaves the group partially modified: every check is performed
/// before the first row is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum VhGroupError {
    /// The label has no entry in the index table.
    UnknownLabel(usize),
    /// The requested range `start..start + length` does not fit in a helix of size `size`.
    OutOfRange {
        start: usize,
        length: usize,
        size: usize,
    },
    /// The tables of the group disagree with each other. This is a logic error.
    InvariantViolation(String),
    /// The property does not exist in the property schema.
    UnknownProperty(String),
    /// The value given for a property does not have the type of that property.
    InvalidPropertyValue { property: String, value: String },
    /// The slice bounds could not be mapped to valid indices.
    InvalidSlice {
        start: isize,
        stop: isize,
        length: usize,
    },
}

impl fmt::Display for VhGroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLabel(label) => write!(f, "label {} not in VirtualHelixGroup", label),
            Self::OutOfRange {
                start,
                length,
                size,
            } => write!(
                f,
                "{} points out of range for start index {} given existing size {}",
                length, start, size
            ),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            Self::UnknownProperty(name) => write!(f, "unknown property {:?}", name),
            Self::InvalidPropertyValue { property, value } => {
                write!(f, "invalid value {:?} for property {}", value, property)
            }
            Self::InvalidSlice {
                start,
                stop,
                length,
            } => write!(
                f,
                "slice {}..{} is invalid for length {}",
                start, stop, length
            ),
        }
    }
}

impl std::error::Error for VhGroupError {}
