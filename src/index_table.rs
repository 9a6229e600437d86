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
//! Book keeping of the rows of the point table that belong to each helix.

use std::ops::Range;

/// The contiguous rows of the point table owned by a helix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetAndSize {
    pub offset: usize,
    pub size: usize,
}

impl OffsetAndSize {
    pub fn rows(&self) -> Range<usize> {
        self.offset..(self.offset + self.size)
    }
}

/// Map helix labels to their rows in the point table.
///
/// The length of the table is one more than the largest label in use, removed labels leave
/// `None` holes.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexTable(Vec<Option<OffsetAndSize>>);

impl IndexTable {
    pub fn get(&self, label: usize) -> Option<OffsetAndSize> {
        self.0.get(label).cloned().flatten()
    }

    pub fn contains(&self, label: usize) -> bool {
        self.get(label).is_some()
    }

    /// One more than the largest label in use.
    #[allow(dead_code)] //used in tests
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, OffsetAndSize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(label, entry)| entry.map(|e| (label, e)))
    }

    pub fn nb_labels(&self) -> usize {
        self.0.iter().filter(|e| e.is_some()).count()
    }

    pub fn live_total(&self) -> usize {
        self.iter().map(|(_, e)| e.size).sum()
    }

    pub fn set(&mut self, label: usize, entry: OffsetAndSize) {
        if label >= self.0.len() {
            self.0.resize(label + 1, None);
        }
        self.0[label] = Some(entry);
    }

    /// Increase the offset of every label other than `except` that starts at or after
    /// `from`.
    pub fn shift_right(&mut self, from: usize, delta: usize, except: usize) {
        for (label, entry) in self.0.iter_mut().enumerate() {
            if let Some(entry) = entry.as_mut().filter(|e| label != except && e.offset >= from) {
                entry.offset += delta;
            }
        }
    }

    /// Decrease the offset of every label that starts strictly after `after`.
    pub fn shift_left(&mut self, after: usize, delta: usize) {
        for entry in self.0.iter_mut().flatten() {
            if entry.offset > after {
                entry.offset -= delta;
            }
        }
    }

    /// Remove the entry of `label` and drop the `None` entries that end the table.
    pub fn remove(&mut self, label: usize) {
        if let Some(entry) = self.0.get_mut(label) {
            *entry = None;
        }
        while let Some(None) = self.0.last() {
            self.0.pop();
        }
    }
}
