//! Static asset tables bundled with the apps.
//!
//! The shirt, belt, and transform tables are compiled in from `data/*.json`,
//! parsed once on first use, and immutable afterwards. Belt rank progression
//! comes from each belt's explicit `order` field: level L is the L-th belt id
//! in that order, and -1 means no belt.

use crate::host::Vec3;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Shirt table entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShirtDescriptor {
    pub display_name: String,
    /// Empty resource means "none": selecting it only clears the current shirt.
    pub resource_name: String,
    pub transform: String,
}

/// Belt table entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeltDescriptor {
    pub order: u32,
    pub resource_name: String,
}

/// Named transform applied when binding an attachment to an avatar.
/// Rotation is in degrees; hosts convert at attach time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformDescriptor {
    pub attach_point: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

pub type ShirtsDb = HashMap<String, ShirtDescriptor>;
pub type TransformsDb = HashMap<String, TransformDescriptor>;

/// The belt table: the shared transform key plus the ranked belt entries.
#[derive(Debug, Clone, Deserialize)]
pub struct BeltsDb {
    pub transform: String,
    pub belts: HashMap<String, BeltDescriptor>,
}

impl BeltsDb {
    /// Belt ids in rank order (lowest `order` first).
    pub fn ordered_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.belts.keys().map(String::as_str).collect();
        keys.sort_by_key(|k| self.belts[*k].order);
        keys
    }

    /// The belt id for a level, or `None` for -1 and out-of-range levels.
    pub fn key_for_level(&self, level: i32) -> Option<&str> {
        if level < 0 {
            return None;
        }
        self.ordered_keys().get(level as usize).copied()
    }

    /// Number of ranks in the table.
    pub fn len(&self) -> usize {
        self.belts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.belts.is_empty()
    }
}

pub static SHIRTS: Lazy<ShirtsDb> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/shirts.json")).expect("bundled shirts.json is valid")
});

pub static BELTS: Lazy<BeltsDb> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/belts.json")).expect("bundled belts.json is valid")
});

pub static TRANSFORMS: Lazy<TransformsDb> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/transforms.json"))
        .expect("bundled transforms.json is valid")
});
