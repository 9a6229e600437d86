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
//! Planar position of each helix of a group, used for coarse neighbour queries.

use ultraviolet::DVec2;

pub(crate) const INFINITE_ORIGIN: DVec2 = DVec2 {
    x: f64::INFINITY,
    y: f64::INFINITY,
};

pub(crate) struct OriginTable {
    origins: Vec<DVec2>,
    block_size: usize,
}

impl OriginTable {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            origins: vec![INFINITE_ORIGIN; block_size],
            block_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.origins.len()
    }

    /// Make sure that `label` has a row, growing the table by whole blocks if needed.
    pub fn reserve_label(&mut self, label: usize) {
        let capacity = self.capacity();
        if label >= capacity {
            let nb_blocks = (label + 1 - capacity + self.block_size - 1) / self.block_size;
            let new_capacity = capacity + nb_blocks * self.block_size;
            log::debug!("growing origin table from {} to {} rows", capacity, new_capacity);
            self.origins.resize(new_capacity, INFINITE_ORIGIN);
        }
    }

    pub fn get(&self, label: usize) -> DVec2 {
        self.origins.get(label).cloned().unwrap_or(INFINITE_ORIGIN)
    }

    pub fn set(&mut self, label: usize, origin: DVec2) {
        self.reserve_label(label);
        self.origins[label] = origin;
    }

    pub fn reset(&mut self, label: usize) {
        if let Some(origin) = self.origins.get_mut(label) {
            *origin = INFINITE_ORIGIN;
        }
    }

    pub fn translate(&mut self, label: usize, delta: DVec2) {
        if let Some(origin) = self.origins.get_mut(label) {
            *origin += delta;
        }
    }

    pub fn is_within(&self, label: usize, center: DVec2, radius_sq: f64) -> bool {
        (self.get(label) - center).mag_sq() < radius_sq
    }
}
