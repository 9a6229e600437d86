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
//! Per helix attributes of a group.
//!
//! Each helix label has one row of `VhProperties`. Rows are created with default values when
//! the label is created and can be read and written either through the typed fields of
//! `VhProperties` or column by column with a `VhPropertyKey`.

use super::VhGroupError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COLOR: u32 = 0xFF_FF_FF_FF;
pub const DEFAULT_BASES_PER_REPEAT: usize = 21;
pub const DEFAULT_TURNS_PER_REPEAT: usize = 2;

/// The columns of the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VhPropertyKey {
    Name,
    Color,
    ActivePhos,
    EulerZ,
    ScamZ,
    Z,
    NeighborActiveAngle,
    Neighbors,
    BasesPerRepeat,
    TurnsPerRepeat,
    Repeats,
    BasesPerTurn,
    TwistPerBase,
}

impl VhPropertyKey {
    pub const ALL: [Self; 13] = [
        Self::Name,
        Self::Color,
        Self::ActivePhos,
        Self::EulerZ,
        Self::ScamZ,
        Self::Z,
        Self::NeighborActiveAngle,
        Self::Neighbors,
        Self::BasesPerRepeat,
        Self::TurnsPerRepeat,
        Self::Repeats,
        Self::BasesPerTurn,
        Self::TwistPerBase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Color => "color",
            Self::ActivePhos => "active_phos",
            Self::EulerZ => "eulerZ",
            Self::ScamZ => "scamZ",
            Self::Z => "z",
            Self::NeighborActiveAngle => "neighbor_active_angle",
            Self::Neighbors => "neighbors",
            Self::BasesPerRepeat => "bases_per_repeat",
            Self::TurnsPerRepeat => "turns_per_repeat",
            Self::Repeats => "repeats",
            Self::BasesPerTurn => "bases_per_turn",
            Self::TwistPerBase => "twist_per_base",
        }
    }
}

impl FromStr for VhPropertyKey {
    type Err = VhGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.name() == s)
            .cloned()
            .ok_or_else(|| VhGroupError::UnknownProperty(s.to_string()))
    }
}

impl fmt::Display for VhPropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The phosphate currently hovered by the user, written `<vh name>.<fwd|rev>.<idx>.<angle>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePhos {
    pub vh_name: String,
    pub is_fwd: bool,
    pub idx: usize,
    pub facing_angle: i32,
}

impl fmt::Display for ActivePhos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.vh_name,
            if self.is_fwd { "fwd" } else { "rev" },
            self.idx,
            self.facing_angle
        )
    }
}

impl FromStr for ActivePhos {
    type Err = VhGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VhGroupError::InvalidPropertyValue {
            property: VhPropertyKey::ActivePhos.name().to_string(),
            value: s.to_string(),
        };
        // The name may itself contain dots, so the fields are read from the end.
        let mut fields = s.rsplitn(4, '.');
        let facing_angle = fields.next().and_then(|a| a.parse().ok()).ok_or_else(err)?;
        let idx = fields.next().and_then(|i| i.parse().ok()).ok_or_else(err)?;
        let is_fwd = match fields.next() {
            Some("fwd") => true,
            Some("rev") => false,
            _ => return Err(err()),
        };
        let vh_name = fields.next().filter(|n| !n.is_empty()).ok_or_else(err)?;
        Ok(Self {
            vh_name: vh_name.to_string(),
            is_fwd,
            idx,
            facing_angle,
        })
    }
}

/// A neighbouring helix and the angle under which it is seen, written `<vh name>:<angle>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborAngle {
    pub vh_name: String,
    pub angle: i32,
}

impl fmt::Display for NeighborAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vh_name, self.angle)
    }
}

impl FromStr for NeighborAngle {
    type Err = VhGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VhGroupError::InvalidPropertyValue {
            property: VhPropertyKey::Neighbors.name().to_string(),
            value: s.to_string(),
        };
        let (vh_name, angle) = s.rsplit_once(':').ok_or_else(err)?;
        let angle = angle.parse().map_err(|_| err())?;
        Ok(Self {
            vh_name: vh_name.to_string(),
            angle,
        })
    }
}

/// A value read from or written to one column of the property table.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Color(u32),
    Float(f64),
    Int(usize),
    ActivePhos(Option<ActivePhos>),
    Neighbors(Vec<NeighborAngle>),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Color(c) => write!(f, "#{:08x}", c),
            Self::Float(x) => write!(f, "{}", x),
            Self::Int(n) => write!(f, "{}", n),
            Self::ActivePhos(None) => Ok(()),
            Self::ActivePhos(Some(phos)) => write!(f, "{}", phos),
            Self::Neighbors(neighbors) => {
                let words: Vec<String> = neighbors.iter().map(|n| n.to_string()).collect();
                write!(f, "{}", words.join(" "))
            }
        }
    }
}

/// Parse a `#aarrggbb` color. `#rrggbb` colors are opaque.
pub fn parse_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        8 => Some(value),
        6 => Some(0xFF << 24 | value),
        _ => None,
    }
}

/// The attributes of one virtual helix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VhProperties {
    pub name: String,
    /// ARGB color of the helix
    pub color: u32,
    pub active_phos: Option<ActivePhos>,
    /// Rotation of the helix around its axis, in degrees.
    pub euler_z: f64,
    pub scam_z: f64,
    /// Offset of the first base along the axis, in nanometers.
    pub z: f64,
    pub neighbor_active_angle: f64,
    pub neighbors: Vec<NeighborAngle>,
    pub bases_per_repeat: usize,
    pub turns_per_repeat: usize,
    pub repeats: usize,
    /// Recomputed as `bases_per_repeat / turns_per_repeat` when one of them is set.
    pub bases_per_turn: f64,
    /// Twist between two consecutive bases, in degrees. Recomputed when `bases_per_turn`
    /// changes.
    pub twist_per_base: f64,
}

impl VhProperties {
    pub fn new(label: usize) -> Self {
        let bases_per_turn = DEFAULT_BASES_PER_REPEAT as f64 / DEFAULT_TURNS_PER_REPEAT as f64;
        Self {
            name: format!("vh{}", label),
            color: DEFAULT_COLOR,
            active_phos: None,
            euler_z: 10.,
            scam_z: 10.,
            z: 0.,
            neighbor_active_angle: 0.,
            neighbors: Vec::new(),
            bases_per_repeat: DEFAULT_BASES_PER_REPEAT,
            turns_per_repeat: DEFAULT_TURNS_PER_REPEAT,
            repeats: 2,
            bases_per_turn,
            twist_per_base: 360. / bases_per_turn,
        }
    }

    pub fn get(&self, key: VhPropertyKey) -> PropertyValue {
        match key {
            VhPropertyKey::Name => PropertyValue::Text(self.name.clone()),
            VhPropertyKey::Color => PropertyValue::Color(self.color),
            VhPropertyKey::ActivePhos => PropertyValue::ActivePhos(self.active_phos.clone()),
            VhPropertyKey::EulerZ => PropertyValue::Float(self.euler_z),
            VhPropertyKey::ScamZ => PropertyValue::Float(self.scam_z),
            VhPropertyKey::Z => PropertyValue::Float(self.z),
            VhPropertyKey::NeighborActiveAngle => PropertyValue::Float(self.neighbor_active_angle),
            VhPropertyKey::Neighbors => PropertyValue::Neighbors(self.neighbors.clone()),
            VhPropertyKey::BasesPerRepeat => PropertyValue::Int(self.bases_per_repeat),
            VhPropertyKey::TurnsPerRepeat => PropertyValue::Int(self.turns_per_repeat),
            VhPropertyKey::Repeats => PropertyValue::Int(self.repeats),
            VhPropertyKey::BasesPerTurn => PropertyValue::Float(self.bases_per_turn),
            VhPropertyKey::TwistPerBase => PropertyValue::Float(self.twist_per_base),
        }
    }

    /// Set the value of a column. Nothing is modified if the value does not have the type of
    /// the column.
    pub fn set(&mut self, key: VhPropertyKey, value: PropertyValue) -> Result<(), VhGroupError> {
        let err = |value: &PropertyValue| VhGroupError::InvalidPropertyValue {
            property: key.name().to_string(),
            value: format!("{:?}", value),
        };
        match (key, value) {
            (VhPropertyKey::Name, PropertyValue::Text(name)) => self.name = name,
            (VhPropertyKey::Color, PropertyValue::Color(color)) => self.color = color,
            (VhPropertyKey::ActivePhos, PropertyValue::ActivePhos(phos)) => {
                self.active_phos = phos
            }
            (VhPropertyKey::Neighbors, PropertyValue::Neighbors(neighbors)) => {
                self.neighbors = neighbors
            }
            (VhPropertyKey::BasesPerRepeat, PropertyValue::Int(n)) if n > 0 => {
                self.bases_per_repeat = n;
                self.update_twist();
            }
            (VhPropertyKey::TurnsPerRepeat, PropertyValue::Int(n)) if n > 0 => {
                self.turns_per_repeat = n;
                self.update_twist();
            }
            (VhPropertyKey::Repeats, PropertyValue::Int(n)) if n > 0 => self.repeats = n,
            (key, PropertyValue::Int(n)) if key.accepts_float(n as f64) => {
                self.set_float(key, n as f64)
            }
            (key, PropertyValue::Float(x)) if key.accepts_float(x) => self.set_float(key, x),
            (_, value) => return Err(err(&value)),
        }
        Ok(())
    }

    /// Parse `text` according to the type of the column and set the column.
    pub fn set_from_str(&mut self, key: VhPropertyKey, text: &str) -> Result<(), VhGroupError> {
        let err = || VhGroupError::InvalidPropertyValue {
            property: key.name().to_string(),
            value: text.to_string(),
        };
        let value = match key {
            VhPropertyKey::Name => PropertyValue::Text(text.to_string()),
            VhPropertyKey::Color => PropertyValue::Color(parse_color(text).ok_or_else(err)?),
            VhPropertyKey::ActivePhos if text.is_empty() => PropertyValue::ActivePhos(None),
            VhPropertyKey::ActivePhos => PropertyValue::ActivePhos(Some(text.parse()?)),
            VhPropertyKey::Neighbors => PropertyValue::Neighbors(
                text.split_whitespace()
                    .map(|w| w.parse::<NeighborAngle>())
                    .collect::<Result<_, _>>()?,
            ),
            VhPropertyKey::BasesPerRepeat | VhPropertyKey::TurnsPerRepeat | VhPropertyKey::Repeats => {
                PropertyValue::Int(text.trim().parse().map_err(|_| err())?)
            }
            _ => PropertyValue::Float(text.trim().parse().map_err(|_| err())?),
        };
        self.set(key, value).map_err(|_| err())
    }

    fn set_float(&mut self, key: VhPropertyKey, x: f64) {
        match key {
            VhPropertyKey::EulerZ => self.euler_z = x,
            VhPropertyKey::ScamZ => self.scam_z = x,
            VhPropertyKey::Z => self.z = x,
            VhPropertyKey::NeighborActiveAngle => self.neighbor_active_angle = x,
            VhPropertyKey::BasesPerTurn => {
                self.bases_per_turn = x;
                self.twist_per_base = 360. / x;
            }
            VhPropertyKey::TwistPerBase => self.twist_per_base = x,
            _ => (),
        }
    }

    fn update_twist(&mut self) {
        self.bases_per_turn = self.bases_per_repeat as f64 / self.turns_per_repeat as f64;
        self.twist_per_base = 360. / self.bases_per_turn;
    }
}

impl VhPropertyKey {
    fn accepts_float(&self, x: f64) -> bool {
        match self {
            Self::EulerZ | Self::ScamZ | Self::Z | Self::NeighborActiveAngle | Self::TwistPerBase => {
                x.is_finite()
            }
            Self::BasesPerTurn => x.is_finite() && x > 0.,
            _ => false,
        }
    }
}

/// One row of properties per label, grown by blocks in step with the index table.
pub(crate) struct PropertyTable {
    rows: Vec<VhProperties>,
    block_size: usize,
}

impl PropertyTable {
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            rows: (0..block_size).map(VhProperties::new).collect(),
            block_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Give `label` a fresh row of default values.
    pub fn reset(&mut self, label: usize) {
        let capacity = self.capacity();
        if label >= capacity {
            let nb_blocks = (label + 1 - capacity + self.block_size - 1) / self.block_size;
            let new_capacity = capacity + nb_blocks * self.block_size;
            log::debug!("growing property table from {} to {} rows", capacity, new_capacity);
            self.rows.extend((capacity..new_capacity).map(VhProperties::new));
        }
        self.rows[label] = VhProperties::new(label);
    }

    pub fn get(&self, label: usize) -> Option<&VhProperties> {
        self.rows.get(label)
    }

    pub fn get_mut(&mut self, label: usize) -> Option<&mut VhProperties> {
        self.rows.get_mut(label)
    }
}
