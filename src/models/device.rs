//! Device record model and store queries

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::layout::{column_list, FEATURE_COUNT};

/// The 20 device features, in layout order.
/// Field order here must follow `FEATURE_LAYOUT`. Dataset aliases are
/// resolved by `parse_features` before deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct DeviceFeatures {
    pub battery_power: i64,
    pub bluetooth: bool,
    pub clock_speed: f64,
    pub dual_sim: bool,
    pub front_camera_mp: i64,
    pub supports_4g: bool,
    pub internal_memory_gb: i64,
    pub mobile_depth_cm: f64,
    pub weight_g: i64,
    pub core_count: i64,
    pub primary_camera_mp: i64,
    pub pixel_height: i64,
    pub pixel_width: i64,
    pub ram_mb: i64,
    pub screen_height_cm: i64,
    pub screen_width_cm: i64,
    pub talk_time_hours: i64,
    pub supports_3g: bool,
    pub touch_screen: bool,
    pub wifi: bool,
}

/// A stored device: assigned id plus its features
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Device {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub features: DeviceFeatures,
}

/// A single typed feature value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Int(v) => v as f64,
            FeatureValue::Float(v) => v,
            FeatureValue::Bool(v) => if v { 1.0 } else { 0.0 },
        }
    }
}

impl DeviceFeatures {
    /// Feature values in layout order
    pub fn values(&self) -> [FeatureValue; FEATURE_COUNT] {
        use FeatureValue::{Bool, Float, Int};

        [
            Int(self.battery_power),
            Bool(self.bluetooth),
            Float(self.clock_speed),
            Bool(self.dual_sim),
            Int(self.front_camera_mp),
            Bool(self.supports_4g),
            Int(self.internal_memory_gb),
            Float(self.mobile_depth_cm),
            Int(self.weight_g),
            Int(self.core_count),
            Int(self.primary_camera_mp),
            Int(self.pixel_height),
            Int(self.pixel_width),
            Int(self.ram_mb),
            Int(self.screen_height_cm),
            Int(self.screen_width_cm),
            Int(self.talk_time_hours),
            Bool(self.supports_3g),
            Bool(self.touch_screen),
            Bool(self.wifi),
        ]
    }

    /// Numeric model input, booleans as 0.0 / 1.0
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        self.values().map(FeatureValue::as_f64)
    }
}

// ============================================================================
// QUERIES
// ============================================================================

static INSERT_SQL: Lazy<String> = Lazy::new(|| {
    let placeholders = vec!["?"; FEATURE_COUNT].join(", ");
    format!("INSERT INTO devices ({}) VALUES ({})", column_list(), placeholders)
});

static LIST_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT id, {} FROM devices ORDER BY id", column_list()));

static FIND_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT id, {} FROM devices WHERE id = ?", column_list()));

impl Device {
    /// Insert a new row and return the id assigned by the store
    pub async fn create(pool: &SqlitePool, features: &DeviceFeatures) -> Result<i64, sqlx::Error> {
        let mut query = sqlx::query(INSERT_SQL.as_str());

        for value in features.values() {
            query = match value {
                FeatureValue::Int(v) => query.bind(v),
                FeatureValue::Float(v) => query.bind(v),
                FeatureValue::Bool(v) => query.bind(v),
            };
        }

        let result = query.execute(pool).await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Device>(LIST_SQL.as_str())
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Device>(FIND_SQL.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices")
            .fetch_one(pool)
            .await
    }
}
