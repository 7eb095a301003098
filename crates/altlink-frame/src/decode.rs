use std::fmt;

use crate::configuration::Configuration;
use crate::error::Result;
use crate::vocab::{
    LEGACY_ALTITUDE_MARKER, MOTION_DRIFT, PREFIX_ACCEL, PREFIX_ALTITUDE, PREFIX_CHANGE,
    PREFIX_CONFIG, PREFIX_MOTION,
};

/// Direction of the latest elevation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Neutral,
}

impl Trend {
    pub fn from_change(cm: f64) -> Self {
        if cm > 0.0 {
            Trend::Rising
        } else if cm < 0.0 {
            Trend::Falling
        } else {
            Trend::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Neutral => "neutral",
        }
    }
}

/// Motion classification reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionState {
    /// Barometer is drifting; readings are unstable.
    Drift,
    /// Any other token, passed through as-is (`STABLE`, `MOVING`, ...).
    Stable(String),
}

impl MotionState {
    pub fn from_token(token: &str) -> Self {
        if token == MOTION_DRIFT {
            MotionState::Drift
        } else {
            MotionState::Stable(token.to_string())
        }
    }

    pub fn is_unstable(&self) -> bool {
        matches!(self, MotionState::Drift)
    }

    pub fn token(&self) -> &str {
        match self {
            MotionState::Drift => MOTION_DRIFT,
            MotionState::Stable(token) => token,
        }
    }
}

/// One decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// Altitude in meters.
    Altitude(f64),
    /// Signed elevation change in centimeters.
    ElevationChange { cm: f64, trend: Trend },
    Motion(MotionState),
    /// Acceleration magnitude in G.
    Acceleration(f64),
    ConfigurationReport(Configuration),
    /// Nothing matched; kept for diagnostics only.
    Unrecognized(String),
}

impl TelemetryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryEvent::Altitude(_) => "altitude",
            TelemetryEvent::ElevationChange { .. } => "elevation_change",
            TelemetryEvent::Motion(_) => "motion",
            TelemetryEvent::Acceleration(_) => "acceleration",
            TelemetryEvent::ConfigurationReport(_) => "configuration",
            TelemetryEvent::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEvent::Altitude(m) => write!(f, "{m:.2} m"),
            TelemetryEvent::ElevationChange { cm, trend } => {
                write!(f, "{cm:.2} cm ({})", trend.as_str())
            }
            TelemetryEvent::Motion(state) => f.write_str(state.token()),
            TelemetryEvent::Acceleration(g) => write!(f, "{g} G"),
            TelemetryEvent::ConfigurationReport(config) => write!(
                f,
                "pressure={} hPa movement={} cm accel={} G sounder={}/{} Hz/{} ms",
                config.sea_level_pressure,
                config.movement_threshold_cm,
                config.accel_threshold,
                config.sounder_type,
                config.sounder_base_freq,
                config.sounder_duration
            ),
            TelemetryEvent::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Decode one inbound message.
///
/// - `Ok(Some(event))` for every recognized message and for unrecognized
///   text (as [`TelemetryEvent::Unrecognized`])
/// - `Ok(None)` when a numeric sample is corrupt and must be dropped
/// - `Err` when a `CFG:` document is malformed
pub fn decode_message(message: &str) -> Result<Option<TelemetryEvent>> {
    let message = message.trim_end_matches(['\r', '\n']);

    if let Some(document) = message.strip_prefix(PREFIX_CONFIG) {
        let config = Configuration::from_wire_json(document)?;
        return Ok(Some(TelemetryEvent::ConfigurationReport(config)));
    }

    if let Some(rest) = message.strip_prefix(PREFIX_ALTITUDE) {
        return Ok(parse_leading_float(rest).map(TelemetryEvent::Altitude));
    }

    if let Some(rest) = message.strip_prefix(PREFIX_CHANGE) {
        return Ok(parse_leading_float(rest).map(|cm| TelemetryEvent::ElevationChange {
            cm,
            trend: Trend::from_change(cm),
        }));
    }

    if let Some(token) = message.strip_prefix(PREFIX_MOTION) {
        return Ok(Some(TelemetryEvent::Motion(MotionState::from_token(token))));
    }

    if let Some(rest) = message.strip_prefix(PREFIX_ACCEL) {
        return Ok(parse_leading_float(rest).map(TelemetryEvent::Acceleration));
    }

    match legacy_altitude(message) {
        Some(altitude) => Ok(Some(TelemetryEvent::Altitude(altitude))),
        None => Ok(Some(TelemetryEvent::Unrecognized(message.to_string()))),
    }
}

/// Older firmware printed `Altitude: 123.45` inside free text.
fn legacy_altitude(message: &str) -> Option<f64> {
    message
        .match_indices(LEGACY_ALTITUDE_MARKER)
        .find_map(|(at, marker)| {
            let rest = &message[at + marker.len()..];
            let end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if end == 0 {
                return None;
            }
            parse_leading_float(&rest[..end])
        })
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace
/// and anything after the number (`" 12.5m"` is 12.5).
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0usize;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0usize;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
