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
//! Constructor-time parameters of a `VirtualHelixGroup`.

/// Allocation, cache and helical geometry parameters of a `VirtualHelixGroup`.
///
/// These values are read once when the group is created. Missing fields in a serialized
/// description take their value from `GroupParameters::DEFAULT`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupParameters {
    /// Number of rows added to the per base tables each time they need to grow.
    pub point_block_size: usize,
    /// Number of rows added to the per helix tables each time they need to grow.
    pub label_block_size: usize,
    /// Maximum number of point queries remembered by the point query cache.
    pub point_cache_size: usize,
    /// Maximum number of origin queries remembered by the origin query cache.
    pub origin_cache_size: usize,
    /// Distance between two consecutive bases along the axis of a helix, in nanometers.
    pub rise_per_base: f64,
    /// Angle, in degrees, between a base of the forward strand and its paired base on the
    /// reverse strand.
    pub minor_groove_angle: f64,
}

impl GroupParameters {
    pub const DEFAULT_LABEL_BLOCK: usize = 256;

    pub const DEFAULT: GroupParameters = GroupParameters {
        point_block_size: Self::DEFAULT_LABEL_BLOCK * 48,
        label_block_size: Self::DEFAULT_LABEL_BLOCK,
        point_cache_size: 20,
        origin_cache_size: 20,
        // B-DNA rise, as used by cadnano.
        rise_per_base: 0.34,
        minor_groove_angle: 171.,
    };

    /// Read parameters from a json string. Fields that are not present keep their default
    /// value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(|p| p.sanitized())
    }

    /// Return a copy of self in which block and cache sizes are at least 1. A rise that is
    /// not a positive number is replaced by the default one.
    pub fn sanitized(self) -> Self {
        let rise_per_base = if self.rise_per_base.is_finite() && self.rise_per_base > 0. {
            self.rise_per_base
        } else {
            Self::DEFAULT.rise_per_base
        };
        Self {
            rise_per_base,
            point_block_size: self.point_block_size.max(1),
            label_block_size: self.label_block_size.max(1),
            point_cache_size: self.point_cache_size.max(1),
            origin_cache_size: self.origin_cache_size.max(1),
            ..self
        }
    }

    pub fn formated_string(&self) -> String {
        use std::fmt::Write;
        let mut ret = String::new();
        writeln!(&mut ret, "  Point block: {} rows", self.point_block_size).unwrap_or_default();
        writeln!(&mut ret, "  Label block: {} rows", self.label_block_size).unwrap_or_default();
        writeln!(
            &mut ret,
            "  Query caches: {} points, {} origins",
            self.point_cache_size, self.origin_cache_size
        )
        .unwrap_or_default();
        writeln!(&mut ret, "  Rise per base: {:.3} nm", self.rise_per_base).unwrap_or_default();
        writeln!(
            &mut ret,
            "  Minor groove angle: {:.1}°",
            self.minor_groove_angle
        )
        .unwrap_or_default();
        ret
    }
}

impl std::default::Default for GroupParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}
