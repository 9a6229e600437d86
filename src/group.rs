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
use super::index_table::IndexTable;
use super::origin_table::OriginTable;
use super::point_table::{PointTable, INFINITE_POSITION};
use super::properties::PropertyTable;
use super::query_cache::{CacheStats, QueryCache};
use super::*;
use ahash::RandomState;
use ordered_float::OrderedFloat;
use std::collections::HashSet;
use std::ops::Range;
use ultraviolet::{DVec2, DVec3};

/// The geometry of one virtual base pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasePoint {
    /// Position of the base pair on the helix axis.
    pub coordinate: DVec3,
    /// Unit vector giving the orientation of the base pair.
    pub direction: DVec3,
    pub fwd_phosphate: DVec3,
    pub rev_phosphate: DVec3,
}

impl BasePoint {
    /// A base pair with no known orientation nor phosphates.
    pub fn from_coordinate(coordinate: DVec3) -> Self {
        Self {
            coordinate,
            direction: DVec3::zero(),
            fwd_phosphate: INFINITE_POSITION,
            rev_phosphate: INFINITE_POSITION,
        }
    }
}

/// A virtual base pair, identified by the label of its helix and its index on that helix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VirtualBase {
    pub label: usize,
    pub idx: usize,
}

impl std::fmt::Display for VirtualBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(vh{}, {})", self.label, self.idx)
    }
}

type PointQuery = [OrderedFloat<f64>; 4];
type OriginQuery = [OrderedFloat<f64>; 3];

/// The geometry of all the virtual helices of a part.
///
/// The base pairs of all helices are stored in shared tables. The rows of a helix are always
/// contiguous and ordered by index, so that the coordinates of a helix can be read as a
/// slice. Helices can only grow or shrink at their ends.
///
/// Queries are memoized. Every operation that can change the answer of a query bumps the
/// generation of the corresponding cache, so a remembered answer is never returned after
/// such a modification.
pub struct VirtualHelixGroup {
    parameters: GroupParameters,
    points: PointTable,
    index: IndexTable,
    origins: OriginTable,
    properties: PropertyTable,
    point_generation: u64,
    origin_generation: u64,
    point_cache: QueryCache<PointQuery, Vec<VirtualBase>>,
    origin_cache: QueryCache<OriginQuery, Vec<usize>>,
}

impl Default for VirtualHelixGroup {
    fn default() -> Self {
        Self::new(GroupParameters::DEFAULT)
    }
}

impl VirtualHelixGroup {
    pub fn new(parameters: GroupParameters) -> Self {
        let parameters = parameters.sanitized();
        Self {
            points: PointTable::new(parameters.point_block_size),
            index: IndexTable::default(),
            origins: OriginTable::new(parameters.label_block_size),
            properties: PropertyTable::new(parameters.label_block_size),
            point_generation: 0,
            origin_generation: 0,
            point_cache: QueryCache::new(parameters.point_cache_size),
            origin_cache: QueryCache::new(parameters.origin_cache_size),
            parameters,
        }
    }

    pub fn parameters(&self) -> &GroupParameters {
        &self.parameters
    }

    pub fn total_points(&self) -> usize {
        self.points.total_points()
    }

    /// The number of helices in the group.
    pub fn total_labels(&self) -> usize {
        self.index.nb_labels()
    }

    /// The labels of the helices in the group, in increasing order.
    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.index.iter().map(|(label, _)| label)
    }

    pub fn contains_label(&self, label: usize) -> bool {
        self.index.contains(label)
    }

    pub fn get_offset_and_size(&self, label: usize) -> Option<OffsetAndSize> {
        self.index.get(label)
    }

    fn entry(&self, label: usize) -> Result<OffsetAndSize, VhGroupError> {
        self.index
            .get(label)
            .ok_or(VhGroupError::UnknownLabel(label))
    }

    /// The rows `start..start + length` of `label`.
    fn sub_rows(
        &self,
        label: usize,
        start: usize,
        length: usize,
    ) -> Result<Range<usize>, VhGroupError> {
        let entry = self.entry(label)?;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= entry.size)
            .ok_or(VhGroupError::OutOfRange {
                start,
                length,
                size: entry.size,
            })?;
        Ok((entry.offset + start)..(entry.offset + end))
    }

    // Modifications
    // ===========================================================================

    /// Add coordinates at the end (`at_end = true`) or at the start of a helix.
    ///
    /// If the helix does not exist, it is created after all other helices and its origin is
    /// set to the planar position of the first point.
    pub fn add_coordinates(
        &mut self,
        label: usize,
        points: &[DVec3],
        at_end: bool,
    ) -> Result<(), VhGroupError> {
        let points: Vec<BasePoint> = points
            .iter()
            .cloned()
            .map(BasePoint::from_coordinate)
            .collect();
        self.add_base_points(label, &points, at_end)
    }

    /// Same as `add_coordinates` but also sets the direction and phosphates of the new base
    /// pairs.
    pub fn add_base_points(
        &mut self,
        label: usize,
        points: &[BasePoint],
        at_end: bool,
    ) -> Result<(), VhGroupError> {
        let first_point = if let Some(point) = points.first() {
            point.coordinate
        } else {
            return Ok(());
        };
        self.check_total_points()?;
        let nb_points = points.len();
        self.point_generation += 1;

        if let Some(entry) = self.index.get(label) {
            let (insert_idx, first_index) = if at_end {
                (entry.offset + entry.size, entry.size)
            } else {
                (entry.offset, 0)
            };
            self.index.shift_right(insert_idx, nb_points, label);
            self.points.insert(insert_idx, label, points, first_index);
            if !at_end {
                let old_rows = (insert_idx + nb_points)..(insert_idx + nb_points + entry.size);
                self.points.increase_indices(old_rows, nb_points);
            }
            self.index.set(
                label,
                OffsetAndSize {
                    offset: entry.offset,
                    size: entry.size + nb_points,
                },
            );
        } else {
            let offset = self.points.total_points();
            self.points.insert(offset, label, points, 0);
            self.index.set(
                label,
                OffsetAndSize {
                    offset,
                    size: nb_points,
                },
            );
            self.origins
                .set(label, DVec2::new(first_point.x, first_point.y));
            self.properties.reset(label);
            self.origin_generation += 1;
            log::debug!("created virtual helix {} with {} points", label, nb_points);
        }
        Ok(())
    }

    /// Overwrite the coordinates of the base pairs `start..start + points.len()` of a helix.
    pub fn set_coordinates(
        &mut self,
        label: usize,
        points: &[DVec3],
        start: usize,
    ) -> Result<(), VhGroupError> {
        let rows = self.sub_rows(label, start, points.len())?;
        self.point_generation += 1;
        self.points.coords_mut(rows).copy_from_slice(points);
        Ok(())
    }

    /// Overwrite the z component of the coordinates of the base pairs
    /// `start..start + z_points.len()` of a helix.
    pub fn set_z_coordinates(
        &mut self,
        label: usize,
        z_points: &[f64],
        start: usize,
    ) -> Result<(), VhGroupError> {
        let rows = self.sub_rows(label, start, z_points.len())?;
        self.point_generation += 1;
        for (coord, z) in self.points.coords_mut(rows).iter_mut().zip(z_points) {
            coord.z = *z;
        }
        Ok(())
    }

    pub fn set_directions(
        &mut self,
        label: usize,
        directions: &[DVec3],
        start: usize,
    ) -> Result<(), VhGroupError> {
        let rows = self.sub_rows(label, start, directions.len())?;
        self.points.directions_mut(rows).copy_from_slice(directions);
        Ok(())
    }

    /// Overwrite the (forward, reverse) phosphate positions of the base pairs
    /// `start..start + phosphates.len()` of a helix.
    pub fn set_phosphates(
        &mut self,
        label: usize,
        phosphates: &[(DVec3, DVec3)],
        start: usize,
    ) -> Result<(), VhGroupError> {
        let rows = self.sub_rows(label, start, phosphates.len())?;
        let fwd = self.points.fwd_phosphates_mut(rows.clone());
        for (dest, (phos, _)) in fwd.iter_mut().zip(phosphates) {
            *dest = *phos;
        }
        let rev = self.points.rev_phosphates_mut(rows);
        for (dest, (_, phos)) in rev.iter_mut().zip(phosphates) {
            *dest = *phos;
        }
        Ok(())
    }

    /// Remove `length` base pairs at the start (`from_start = true`) or at the end of a
    /// helix. The remaining base pairs are re-indexed from 0.
    ///
    /// If all the base pairs of the helix are removed, the helix is removed from the group.
    pub fn remove_coordinates(
        &mut self,
        label: usize,
        length: usize,
        from_start: bool,
    ) -> Result<(), VhGroupError> {
        let entry = self.entry(label)?;
        if length > entry.size {
            return Err(VhGroupError::OutOfRange {
                start: 0,
                length,
                size: entry.size,
            });
        }
        if length == 0 {
            return Ok(());
        }
        self.check_total_points()?;
        self.point_generation += 1;

        let remove_start = if from_start {
            entry.offset
        } else {
            entry.offset + entry.size - length
        };
        self.points.remove(remove_start, length);
        self.index.shift_left(entry.offset, length);

        let new_size = entry.size - length;
        if new_size == 0 {
            self.index.remove(label);
            self.origins.reset(label);
            self.origin_generation += 1;
            log::debug!("removed virtual helix {}", label);
        } else {
            if from_start {
                self.points
                    .decrease_indices(entry.offset..(entry.offset + new_size), length);
            }
            self.index.set(
                label,
                OffsetAndSize {
                    offset: entry.offset,
                    size: new_size,
                },
            );
        }
        Ok(())
    }

    /// Translate the base pairs of several helices by `delta`, and their origins by the
    /// planar part of `delta`.
    ///
    /// Nothing is moved if one of the labels is unknown.
    pub fn translate_coordinates(
        &mut self,
        labels: &[usize],
        delta: DVec3,
    ) -> Result<(), VhGroupError> {
        let entries = labels
            .iter()
            .map(|label| self.entry(*label).map(|e| (*label, e)))
            .collect::<Result<Vec<_>, _>>()?;
        self.point_generation += 1;
        self.origin_generation += 1;
        let delta_origin = DVec2::new(delta.x, delta.y);
        for (label, entry) in entries {
            self.points.translate(entry.rows(), delta);
            self.origins.translate(label, delta_origin);
        }
        Ok(())
    }
    // ===========================================================================

    // Views
    // ===========================================================================
    pub fn get_coordinates(&self, label: usize) -> Result<&[DVec3], VhGroupError> {
        let entry = self.entry(label)?;
        Ok(self.points.coords(entry.rows()))
    }

    /// The coordinates `start..stop` of a helix. Negative bounds are counted from the end of
    /// the helix.
    pub fn get_coordinates_slice(
        &self,
        label: usize,
        start: isize,
        stop: isize,
    ) -> Result<&[DVec3], VhGroupError> {
        let entry = self.entry(label)?;
        let slice = geometry::remap_slice(start, stop, entry.size)?;
        let rows = (entry.offset + slice.start)..(entry.offset + slice.end);
        Ok(self.points.coords(rows))
    }

    pub fn get_coordinate(&self, label: usize, idx: usize) -> Result<DVec3, VhGroupError> {
        let rows = self.sub_rows(label, idx, 1)?;
        Ok(self.points.coords(rows)[0])
    }

    pub fn get_indices(&self, label: usize) -> Result<&[usize], VhGroupError> {
        let entry = self.entry(label)?;
        Ok(self.points.indices(entry.rows()))
    }

    pub fn get_directions(&self, label: usize) -> Result<&[DVec3], VhGroupError> {
        let entry = self.entry(label)?;
        Ok(self.points.directions(entry.rows()))
    }

    pub fn get_fwd_phosphates(&self, label: usize) -> Result<&[DVec3], VhGroupError> {
        let entry = self.entry(label)?;
        Ok(self.points.fwd_phosphates(entry.rows()))
    }

    pub fn get_rev_phosphates(&self, label: usize) -> Result<&[DVec3], VhGroupError> {
        let entry = self.entry(label)?;
        Ok(self.points.rev_phosphates(entry.rows()))
    }

    pub fn get_origin(&self, label: usize) -> Result<DVec2, VhGroupError> {
        self.entry(label)?;
        Ok(self.origins.get(label))
    }
    // ===========================================================================

    // Queries
    // ===========================================================================

    /// The base pairs at a distance strictly smaller than `radius` from `(x, y, z)`, in
    /// storage order.
    pub fn query_point(&mut self, radius: f64, x: f64, y: f64, z: f64) -> Vec<VirtualBase> {
        let key = [
            OrderedFloat(radius),
            OrderedFloat(x),
            OrderedFloat(y),
            OrderedFloat(z),
        ];
        let points = &self.points;
        self.point_cache
            .get_or_insert_with(self.point_generation, key, || {
                log::trace!("point query cache miss {:?}", key);
                points
                    .rows_within(DVec3::new(x, y, z), radius * radius)
                    .filter_map(|row| points.row_id(row))
                    .map(|(label, idx)| VirtualBase { label, idx })
                    .collect()
            })
    }

    /// The labels of the helices whose origin is at a distance strictly smaller than
    /// `radius` from `(x, y)`, in increasing order.
    pub fn query_origin(&mut self, radius: f64, x: f64, y: f64) -> Vec<usize> {
        let key = [OrderedFloat(radius), OrderedFloat(x), OrderedFloat(y)];
        let index = &self.index;
        let origins = &self.origins;
        self.origin_cache
            .get_or_insert_with(self.origin_generation, key, || {
                log::trace!("origin query cache miss {:?}", key);
                let center = DVec2::new(x, y);
                index
                    .iter()
                    .map(|(label, _)| label)
                    .filter(|label| origins.is_within(*label, center, radius * radius))
                    .collect()
            })
    }

    /// The base pairs of other helices that are closer than `radius` from the base pair
    /// `idx` of `label`.
    pub fn get_neighbors(
        &mut self,
        label: usize,
        radius: f64,
        idx: usize,
    ) -> Result<Vec<VirtualBase>, VhGroupError> {
        let coord = self.get_coordinate(label, idx)?;
        let mut neighbors = self.query_point(radius, coord.x, coord.y, coord.z);
        neighbors.retain(|base| base.label != label);
        Ok(neighbors)
    }

    /// The other helices whose origin is closer than `radius` from the origin of `label`.
    pub fn get_origin_neighbors(
        &mut self,
        label: usize,
        radius: f64,
    ) -> Result<HashSet<usize, RandomState>, VhGroupError> {
        let origin = self.get_origin(label)?;
        let mut neighbors: HashSet<usize, RandomState> = self
            .query_origin(radius, origin.x, origin.y)
            .into_iter()
            .collect();
        neighbors.remove(&label);
        Ok(neighbors)
    }

    pub fn point_cache_stats(&self) -> CacheStats {
        self.point_cache.stats()
    }

    pub fn origin_cache_stats(&self) -> CacheStats {
        self.origin_cache.stats()
    }
    // ===========================================================================

    // Properties
    // ===========================================================================
    pub fn get_properties(&self, label: usize) -> Result<&VhProperties, VhGroupError> {
        self.entry(label)?;
        self.properties
            .get(label)
            .ok_or(VhGroupError::UnknownLabel(label))
    }

    pub fn get_properties_mut(&mut self, label: usize) -> Result<&mut VhProperties, VhGroupError> {
        self.entry(label)?;
        self.properties
            .get_mut(label)
            .ok_or(VhGroupError::UnknownLabel(label))
    }

    pub fn get_property(
        &self,
        label: usize,
        key: VhPropertyKey,
    ) -> Result<PropertyValue, VhGroupError> {
        Ok(self.get_properties(label)?.get(key))
    }

    pub fn set_property(
        &mut self,
        label: usize,
        key: VhPropertyKey,
        value: PropertyValue,
    ) -> Result<(), VhGroupError> {
        self.get_properties_mut(label)?.set(key, value)
    }

    /// Read a property given the name of its column.
    pub fn get_property_by_name(
        &self,
        label: usize,
        name: &str,
    ) -> Result<PropertyValue, VhGroupError> {
        let key: VhPropertyKey = name.parse()?;
        self.get_property(label, key)
    }

    /// Set a property given the name of its column and the textual representation of its
    /// value.
    pub fn set_property_by_name(
        &mut self,
        label: usize,
        name: &str,
        value: &str,
    ) -> Result<(), VhGroupError> {
        let key: VhPropertyKey = name.parse()?;
        self.get_properties_mut(label)?.set_from_str(key, value)
    }

    /// The angle in degrees toward which the base pair `step_idx` of a helix is facing. See
    /// `geometry::facing_angle`.
    pub fn facing_angle(
        &self,
        label: usize,
        step_idx: usize,
        is_fwd: bool,
    ) -> Result<f64, VhGroupError> {
        let properties = self.get_properties(label)?;
        Ok(geometry::facing_angle(
            properties,
            &self.parameters,
            step_idx,
            is_fwd,
        ))
    }
    // ===========================================================================

    // Consistency
    // ===========================================================================
    fn check_total_points(&self) -> Result<(), VhGroupError> {
        let live_total = self.index.live_total();
        let total_points = self.points.total_points();
        if live_total != total_points {
            let msg = format!(
                "helices own {} points but the point table holds {}",
                live_total, total_points
            );
            log::error!("{}", msg);
            Err(VhGroupError::InvariantViolation(msg))
        } else {
            Ok(())
        }
    }

    /// Check that the ranges of the helices partition the point table and that every row
    /// knows its helix and index.
    pub fn check_invariants(&self) -> Result<(), VhGroupError> {
        self.check_total_points()?;
        let mut entries: Vec<(usize, OffsetAndSize)> = self.index.iter().collect();
        entries.sort_by_key(|(_, e)| e.offset);
        let mut next_offset = 0;
        for (label, entry) in entries {
            let violation = if entry.size == 0 {
                Some(format!("helix {} is empty", label))
            } else if entry.offset != next_offset {
                Some(format!(
                    "helix {} starts at {}, expected {}",
                    label, entry.offset, next_offset
                ))
            } else if self
                .points
                .labels(entry.rows())
                .iter()
                .any(|l| *l != Some(label))
            {
                Some(format!("rows of helix {} are attributed to another helix", label))
            } else if self
                .points
                .indices(entry.rows())
                .iter()
                .enumerate()
                .any(|(i, idx)| i != *idx)
            {
                Some(format!("indices of helix {} are not contiguous", label))
            } else {
                None
            };
            if let Some(msg) = violation {
                log::error!("{}", msg);
                return Err(VhGroupError::InvariantViolation(msg));
            }
            next_offset += entry.size;
        }
        Ok(())
    }
    // ===========================================================================
}
