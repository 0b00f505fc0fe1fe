//! Feature Layout - Centralized Device Feature Definition
//!
//! This file is the single source of truth for the device feature schema.
//! The table columns, insert order, request validation and the model input
//! vector are all derived from `FEATURE_LAYOUT`.
//!
//! ## Rules:
//! 1. Add, remove or reorder a feature -> every model artifact must be re-exported
//! 2. `layout_hash()` changes with any such edit, so stale artifacts are rejected at load

use crc32fast::Hasher;

// ============================================================================
// FEATURE KINDS
// ============================================================================

/// Semantic type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Int,
    Float,
    Bool,
}

impl FeatureKind {
    /// SQLite column type. Booleans are stored as 0/1 integers.
    pub fn sql_type(self) -> &'static str {
        match self {
            FeatureKind::Int | FeatureKind::Bool => "INTEGER",
            FeatureKind::Float => "REAL",
        }
    }

    /// Human readable name used in validation messages
    pub fn describe(self) -> &'static str {
        match self {
            FeatureKind::Int => "an integer",
            FeatureKind::Float => "a number",
            FeatureKind::Bool => "a boolean",
        }
    }

    fn tag(self) -> u8 {
        match self {
            FeatureKind::Int => b'i',
            FeatureKind::Float => b'f',
            FeatureKind::Bool => b'b',
        }
    }
}

/// One entry of the layout
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
    /// Short column name from the training dataset, accepted on input
    pub alias: Option<&'static str>,
}

const fn feature(name: &'static str, kind: FeatureKind, alias: Option<&'static str>) -> FeatureSpec {
    FeatureSpec { name, kind, alias }
}

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Total number of features
pub const FEATURE_COUNT: usize = 20;

/// Features in the exact order they are stored and fed to the model
pub const FEATURE_LAYOUT: [FeatureSpec; FEATURE_COUNT] = [
    feature("battery_power", FeatureKind::Int, None),            // 0
    feature("bluetooth", FeatureKind::Bool, Some("blue")),       // 1
    feature("clock_speed", FeatureKind::Float, None),            // 2
    feature("dual_sim", FeatureKind::Bool, None),                // 3
    feature("front_camera_mp", FeatureKind::Int, Some("fc")),    // 4
    feature("supports_4g", FeatureKind::Bool, Some("four_g")),   // 5
    feature("internal_memory_gb", FeatureKind::Int, Some("int_memory")), // 6
    feature("mobile_depth_cm", FeatureKind::Float, Some("m_dep")), // 7
    feature("weight_g", FeatureKind::Int, Some("mobile_wt")),    // 8
    feature("core_count", FeatureKind::Int, Some("n_cores")),    // 9
    feature("primary_camera_mp", FeatureKind::Int, Some("pc")),  // 10
    feature("pixel_height", FeatureKind::Int, Some("px_height")), // 11
    feature("pixel_width", FeatureKind::Int, Some("px_width")),  // 12
    feature("ram_mb", FeatureKind::Int, Some("ram")),            // 13
    feature("screen_height_cm", FeatureKind::Int, Some("sc_h")), // 14
    feature("screen_width_cm", FeatureKind::Int, Some("sc_w")),  // 15
    feature("talk_time_hours", FeatureKind::Int, Some("talk_time")), // 16
    feature("supports_3g", FeatureKind::Bool, Some("three_g")),  // 17
    feature("touch_screen", FeatureKind::Bool, None),            // 18
    feature("wifi", FeatureKind::Bool, None),                    // 19
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the ordered feature names and kinds.
/// Model artifacts may embed it to prove they were fitted on this layout.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    for spec in &FEATURE_LAYOUT {
        hasher.update(spec.name.as_bytes());
        hasher.update(&[b':', spec.kind.tag(), 0]);
    }

    hasher.finalize()
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Index of a feature by its canonical name or its alias
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT
        .iter()
        .position(|spec| spec.name == name || spec.alias == Some(name))
}

/// Comma separated column list in layout order
pub fn column_list() -> String {
    FEATURE_LAYOUT
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================
