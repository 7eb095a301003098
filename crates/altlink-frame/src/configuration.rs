//! Device tuning document exchanged by `GET_CONFIG` / `SET_CONFIG:`.
//!
//! Values are held in local units. The only field whose local unit differs
//! from the wire is the movement threshold: centimeters here, meters on the
//! wire. [`Configuration::to_wire_json`] and [`Configuration::from_wire_json`]
//! are the single place each direction of that conversion happens.

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

pub const DEFAULT_SEA_LEVEL_PRESSURE: f64 = 1013.25;
pub const DEFAULT_MOVEMENT_THRESHOLD_CM: f64 = 10.0;
pub const DEFAULT_ACCEL_THRESHOLD: f64 = 0.15;
pub const DEFAULT_SOUNDER_TYPE: i64 = 2;
pub const DEFAULT_SOUNDER_BASE_FREQ: i64 = 800;
pub const DEFAULT_SOUNDER_DURATION: i64 = 100;

const CENTIMETERS_PER_METER: f64 = 100.0;
const CONVERSION_PRECISION: f64 = 1e6;

/// Device tuning parameters in local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    /// Reference sea-level pressure in hPa.
    pub sea_level_pressure: f64,
    /// Altitude change that counts as movement, in centimeters.
    pub movement_threshold_cm: f64,
    /// IMU acceleration threshold in G.
    pub accel_threshold: f64,
    /// Sounder pattern selector.
    pub sounder_type: i64,
    /// Sounder base frequency in Hz.
    pub sounder_base_freq: i64,
    /// Sounder tone duration in ms.
    pub sounder_duration: i64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sea_level_pressure: DEFAULT_SEA_LEVEL_PRESSURE,
            movement_threshold_cm: DEFAULT_MOVEMENT_THRESHOLD_CM,
            accel_threshold: DEFAULT_ACCEL_THRESHOLD,
            sounder_type: DEFAULT_SOUNDER_TYPE,
            sounder_base_freq: DEFAULT_SOUNDER_BASE_FREQ,
            sounder_duration: DEFAULT_SOUNDER_DURATION,
        }
    }
}

/// Outbound wire form. Field order here is the order on the wire.
#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct WireDocument {
    sea_level_pressure: f64,
    movement_threshold: f64,
    imu_accel_threshold: f64,
    sounder_type: i64,
    sounder_base_freq: i64,
    sounder_duration: i64,
}

/// Inbound wire form; absent or null keys take the documented defaults.
#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ReportDocument {
    #[serde(default)]
    sea_level_pressure: Option<f64>,
    #[serde(default)]
    movement_threshold: Option<f64>,
    #[serde(default)]
    imu_accel_threshold: Option<f64>,
    #[serde(default)]
    sounder_type: Option<i64>,
    #[serde(default)]
    sounder_base_freq: Option<i64>,
    #[serde(default)]
    sounder_duration: Option<i64>,
}

impl Configuration {
    /// Check that every float field is finite.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("SEA_LEVEL_PRESSURE", self.sea_level_pressure),
            ("MOVEMENT_THRESHOLD", self.movement_threshold_cm),
            ("IMU_ACCEL_THRESHOLD", self.accel_threshold),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(FrameError::InvalidConfiguration { field });
            }
        }
        Ok(())
    }

    /// Serialize to the compact wire document (movement threshold in meters).
    pub fn to_wire_json(&self) -> Result<String> {
        self.validate()?;
        let doc = WireDocument {
            sea_level_pressure: self.sea_level_pressure,
            movement_threshold: centimeters_to_meters(self.movement_threshold_cm),
            imu_accel_threshold: self.accel_threshold,
            sounder_type: self.sounder_type,
            sounder_base_freq: self.sounder_base_freq,
            sounder_duration: self.sounder_duration,
        };
        Ok(serde_json::to_string(&doc)?)
    }

    /// Parse a wire document reported by the device.
    ///
    /// Any key that is present must hold a number of the right kind, or the
    /// whole document is rejected.
    pub fn from_wire_json(json: &str) -> Result<Self> {
        let doc: ReportDocument = serde_json::from_str(json)?;
        let config = Self {
            sea_level_pressure: doc.sea_level_pressure.unwrap_or(DEFAULT_SEA_LEVEL_PRESSURE),
            movement_threshold_cm: doc
                .movement_threshold
                .map(meters_to_centimeters)
                .unwrap_or(DEFAULT_MOVEMENT_THRESHOLD_CM),
            accel_threshold: doc.imu_accel_threshold.unwrap_or(DEFAULT_ACCEL_THRESHOLD),
            sounder_type: doc.sounder_type.unwrap_or(DEFAULT_SOUNDER_TYPE),
            sounder_base_freq: doc.sounder_base_freq.unwrap_or(DEFAULT_SOUNDER_BASE_FREQ),
            sounder_duration: doc.sounder_duration.unwrap_or(DEFAULT_SOUNDER_DURATION),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Local centimeters to wire meters.
pub fn centimeters_to_meters(cm: f64) -> f64 {
    round_conversion(cm / CENTIMETERS_PER_METER)
}

/// Wire meters to local centimeters.
pub fn meters_to_centimeters(m: f64) -> f64 {
    round_conversion(m * CENTIMETERS_PER_METER)
}

// 0.1 * 100.0 is 10.000000000000002 in binary floating point. Values too
// large to scale are returned unrounded.
fn round_conversion(value: f64) -> f64 {
    let scaled = value * CONVERSION_PRECISION;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / CONVERSION_PRECISION
}
