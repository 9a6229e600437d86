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
//! Geometric helpers on virtual helices.

use super::{GroupParameters, VhGroupError, VhProperties};
use std::ops::Range;
use ultraviolet::DVec3;

/// Squared distance between `point` and the ray starting at `origin` with unit direction
/// `direction`.
///
/// If the projection of `point` falls behind `origin`, this is the squared distance to
/// `origin`.
pub fn distance_to_point(origin: DVec3, direction: DVec3, point: DVec3) -> f64 {
    let direction_distance = (point - origin).dot(direction);
    if direction_distance < 0. {
        (origin - point).mag_sq()
    } else {
        let projection = origin + direction * direction_distance;
        (projection - point).mag_sq()
    }
}

/// Map `start..stop` to a range of `0..length`. Negative bounds are counted from `length`.
pub fn remap_slice(start: isize, stop: isize, length: usize) -> Result<Range<usize>, VhGroupError> {
    let err = || VhGroupError::InvalidSlice {
        start,
        stop,
        length,
    };
    let remap = |bound: isize| {
        let bound = if bound < 0 {
            length as isize + bound
        } else {
            bound
        };
        if bound < 0 || bound as usize > length {
            None
        } else {
            Some(bound as usize)
        }
    };
    let new_start = remap(start).ok_or_else(err)?;
    let new_stop = remap(stop).ok_or_else(err)?;
    if new_stop < new_start {
        Err(err())
    } else {
        Ok(new_start..new_stop)
    }
}

/// The angle in degrees, in `[0, 360)`, toward which the base `step_idx` of a helix is
/// facing.
///
/// The angle takes into account the rotation of the helix around its axis and the offset of
/// its first base. Bases of the reverse strand are rotated by the minor groove angle.
pub fn facing_angle(
    properties: &VhProperties,
    parameters: &GroupParameters,
    step_idx: usize,
    is_fwd: bool,
) -> f64 {
    let rise_offset = properties.z / parameters.rise_per_base;
    let mut angle = (step_idx as f64 + rise_offset) * properties.twist_per_base;
    if !is_fwd {
        angle += parameters.minor_groove_angle;
    }
    (properties.euler_z + angle).rem_euclid(360.)
}
