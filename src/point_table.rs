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
//! Structure of arrays storage of the virtual base pairs of all the helices of a group.
//!
//! The table does not know which rows belong to which helix, this is the job of the
//! `IndexTable`. It only knows how many of its rows are in use: rows `0..total_points` are
//! live and the remaining rows are spare capacity.

use super::BasePoint;
use std::ops::Range;
use ultraviolet::DVec3;

pub(crate) const INFINITE_POSITION: DVec3 = DVec3 {
    x: f64::INFINITY,
    y: f64::INFINITY,
    z: f64::INFINITY,
};

const NO_DIRECTION: DVec3 = DVec3 {
    x: 0.,
    y: 0.,
    z: 0.,
};

pub(crate) struct PointTable {
    coords: Vec<DVec3>,
    directions: Vec<DVec3>,
    fwd_phosphates: Vec<DVec3>,
    rev_phosphates: Vec<DVec3>,
    labels: Vec<Option<usize>>,
    indices: Vec<usize>,
    total_points: usize,
    block_size: usize,
}

impl PointTable {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            coords: vec![INFINITE_POSITION; block_size],
            directions: vec![NO_DIRECTION; block_size],
            fwd_phosphates: vec![INFINITE_POSITION; block_size],
            rev_phosphates: vec![INFINITE_POSITION; block_size],
            labels: vec![None; block_size],
            indices: vec![0; block_size],
            total_points: 0,
            block_size,
        }
    }

    pub fn total_points(&self) -> usize {
        self.total_points
    }

    pub fn capacity(&self) -> usize {
        self.coords.len()
    }

    /// Make sure that `additional` rows can be inserted without reallocation. The table grows
    /// by a whole number of blocks.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.total_points + additional;
        let capacity = self.capacity();
        if needed > capacity {
            let nb_blocks = (needed - capacity + self.block_size - 1) / self.block_size;
            let new_capacity = capacity + nb_blocks * self.block_size;
            log::debug!("growing point table from {} to {} rows", capacity, new_capacity);
            self.coords.resize(new_capacity, INFINITE_POSITION);
            self.directions.resize(new_capacity, NO_DIRECTION);
            self.fwd_phosphates.resize(new_capacity, INFINITE_POSITION);
            self.rev_phosphates.resize(new_capacity, INFINITE_POSITION);
            self.labels.resize(new_capacity, None);
            self.indices.resize(new_capacity, 0);
        }
    }

    /// Insert `points` at row `at`, moving the rows `at..total_points` to the right.
    ///
    /// The inserted rows are attributed to `label` and numbered from `first_index`.
    pub fn insert(&mut self, at: usize, label: usize, points: &[BasePoint], first_index: usize) {
        let n = points.len();
        self.reserve(n);
        let end = self.total_points;
        if at < end {
            self.coords.copy_within(at..end, at + n);
            self.directions.copy_within(at..end, at + n);
            self.fwd_phosphates.copy_within(at..end, at + n);
            self.rev_phosphates.copy_within(at..end, at + n);
            self.labels.copy_within(at..end, at + n);
            self.indices.copy_within(at..end, at + n);
        }
        for (i, point) in points.iter().enumerate() {
            let row = at + i;
            self.coords[row] = point.coordinate;
            self.directions[row] = point.direction;
            self.fwd_phosphates[row] = point.fwd_phosphate;
            self.rev_phosphates[row] = point.rev_phosphate;
            self.labels[row] = Some(label);
            self.indices[row] = first_index + i;
        }
        self.total_points += n;
    }

    /// Remove the rows `start..start + length`, moving the following rows to the left and
    /// resetting the freed rows at the end of the table.
    pub fn remove(&mut self, start: usize, length: usize) {
        let end = self.total_points;
        let stop = start + length;
        if stop < end {
            self.coords.copy_within(stop..end, start);
            self.directions.copy_within(stop..end, start);
            self.fwd_phosphates.copy_within(stop..end, start);
            self.rev_phosphates.copy_within(stop..end, start);
            self.labels.copy_within(stop..end, start);
            self.indices.copy_within(stop..end, start);
        }
        let freed = (end - length)..end;
        self.coords[freed.clone()].fill(INFINITE_POSITION);
        self.directions[freed.clone()].fill(NO_DIRECTION);
        self.fwd_phosphates[freed.clone()].fill(INFINITE_POSITION);
        self.rev_phosphates[freed.clone()].fill(INFINITE_POSITION);
        self.labels[freed.clone()].fill(None);
        self.indices[freed].fill(0);
        self.total_points -= length;
    }

    pub fn increase_indices(&mut self, rows: Range<usize>, delta: usize) {
        for idx in self.indices[rows].iter_mut() {
            *idx += delta;
        }
    }

    pub fn decrease_indices(&mut self, rows: Range<usize>, delta: usize) {
        for idx in self.indices[rows].iter_mut() {
            *idx -= delta;
        }
    }

    pub fn translate(&mut self, rows: Range<usize>, delta: DVec3) {
        for coord in self.coords[rows.clone()].iter_mut() {
            *coord += delta;
        }
        for phos in self.fwd_phosphates[rows.clone()].iter_mut() {
            *phos += delta;
        }
        for phos in self.rev_phosphates[rows].iter_mut() {
            *phos += delta;
        }
    }

    // Views
    // ===========================================================================
    pub fn coords(&self, rows: Range<usize>) -> &[DVec3] {
        &self.coords[rows]
    }

    pub fn coords_mut(&mut self, rows: Range<usize>) -> &mut [DVec3] {
        &mut self.coords[rows]
    }

    pub fn directions(&self, rows: Range<usize>) -> &[DVec3] {
        &self.directions[rows]
    }

    pub fn directions_mut(&mut self, rows: Range<usize>) -> &mut [DVec3] {
        &mut self.directions[rows]
    }

    pub fn fwd_phosphates(&self, rows: Range<usize>) -> &[DVec3] {
        &self.fwd_phosphates[rows]
    }

    pub fn fwd_phosphates_mut(&mut self, rows: Range<usize>) -> &mut [DVec3] {
        &mut self.fwd_phosphates[rows]
    }

    pub fn rev_phosphates(&self, rows: Range<usize>) -> &[DVec3] {
        &self.rev_phosphates[rows]
    }

    pub fn rev_phosphates_mut(&mut self, rows: Range<usize>) -> &mut [DVec3] {
        &mut self.rev_phosphates[rows]
    }

    pub fn labels(&self, rows: Range<usize>) -> &[Option<usize>] {
        &self.labels[rows]
    }

    pub fn indices(&self, rows: Range<usize>) -> &[usize] {
        &self.indices[rows]
    }
    // ===========================================================================

    /// The rows in use whose coordinate is at a squared distance strictly smaller than
    /// `radius_sq` from `center`, in storage order.
    pub fn rows_within(&self, center: DVec3, radius_sq: f64) -> impl Iterator<Item = usize> + '_ {
        self.coords[..self.total_points]
            .iter()
            .enumerate()
            .filter(move |(_, c)| (**c - center).mag_sq() < radius_sq)
            .map(|(row, _)| row)
    }

    /// The label and local index stored in a row in use.
    pub fn row_id(&self, row: usize) -> Option<(usize, usize)> {
        self.labels[row].map(|label| (label, self.indices[row]))
    }
}
