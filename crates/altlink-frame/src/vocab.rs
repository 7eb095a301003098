//! Wire vocabulary shared by the encoder and the decoder.
//!
//! Outbound markers and inbound telemetry prefixes travel over the same
//! characteristic pair, so no outbound marker may be a prefix of an inbound
//! one or the other way around.

use std::time::Duration;

/// Maximum payload of one radio packet.
pub const MTU: usize = altlink_transport::DEFAULT_MTU;

/// Bytes of configuration document carried per indexed chunk packet.
pub const CHUNK_DATA_BUDGET: usize = 18;

/// Delay between consecutive packets of a chunked configuration frame.
pub const CHUNK_PACKET_DELAY: Duration = Duration::from_millis(50);

/// Delay between consecutive packets of a naively sliced command.
pub const SLICE_PACKET_DELAY: Duration = Duration::from_millis(20);

/// Start barometric calibration; keep the device still.
pub const CMD_CALIBRATE: &str = "CALIBRATE";
/// Play the configured sounder pattern once.
pub const CMD_SOUND: &str = "SOUND";
/// Ask the device to report its configuration with a `CFG:` message.
pub const CMD_GET_CONFIG: &str = "GET_CONFIG";
/// Tag of an unchunked configuration write.
pub const CMD_SET_CONFIG: &str = "SET_CONFIG:";

/// Tag carried by every packet of a chunked configuration write.
pub const CHUNK_TAG: &str = "SC:";
/// Sub-marker opening a chunked frame; followed by the document length.
pub const CHUNK_START: &str = "START:";
/// Sub-marker closing a chunked frame.
pub const CHUNK_END: &str = "END";

/// Configuration report.
pub const PREFIX_CONFIG: &str = "CFG:";
/// Altitude in meters.
pub const PREFIX_ALTITUDE: &str = "A:";
/// Elevation change in centimeters.
pub const PREFIX_CHANGE: &str = "C:";
/// Motion state token.
pub const PREFIX_MOTION: &str = "M:";
/// Acceleration in G.
pub const PREFIX_ACCEL: &str = "G:";

/// Unprefixed altitude text sent by older firmware.
pub const LEGACY_ALTITUDE_MARKER: &str = "Altitude: ";

/// Motion token the device sends while the barometer is drifting.
pub const MOTION_DRIFT: &str = "DRIFT";

/// Inbound prefixes in dispatch priority order.
pub const TELEMETRY_PREFIXES: [&str; 5] = [
    PREFIX_CONFIG,
    PREFIX_ALTITUDE,
    PREFIX_CHANGE,
    PREFIX_MOTION,
    PREFIX_ACCEL,
];

/// Outbound framing markers.
pub const FRAME_MARKERS: [&str; 3] = [CHUNK_TAG, CHUNK_START, CHUNK_END];

/// Returns a human-readable name for an inbound prefix.
pub fn prefix_name(prefix: &str) -> &'static str {
    match prefix {
        PREFIX_CONFIG => "CONFIG",
        PREFIX_ALTITUDE => "ALTITUDE",
        PREFIX_CHANGE => "CHANGE",
        PREFIX_MOTION => "MOTION",
        PREFIX_ACCEL => "ACCEL",
        _ => "UNKNOWN",
    }
}

/// Returns true if either marker is a prefix of the other.
pub fn prefixes_collide(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// Returns the telemetry prefix `message` starts with, if any.
pub fn telemetry_prefix(message: &str) -> Option<&'static str> {
    TELEMETRY_PREFIXES
        .iter()
        .copied()
        .find(|prefix| message.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_markers_never_collide_with_telemetry_prefixes() {
        for marker in FRAME_MARKERS {
            for prefix in TELEMETRY_PREFIXES {
                assert!(
                    !prefixes_collide(marker, prefix),
                    "{marker:?} collides with {prefix:?}"
                );
            }
        }
    }

    #[test]
    fn command_tokens_never_collide_with_telemetry_prefixes() {
        for token in [CMD_CALIBRATE, CMD_SOUND, CMD_GET_CONFIG, CMD_SET_CONFIG] {
            for prefix in TELEMETRY_PREFIXES {
                assert!(!prefixes_collide(token, prefix), "{token:?} vs {prefix:?}");
            }
        }
    }

    #[test]
    fn collision_is_symmetric() {
        assert!(prefixes_collide("C:", "CFG:") == prefixes_collide("CFG:", "C:"));
        assert!(prefixes_collide("SC:", "SC:START:"));
        assert!(prefixes_collide("SC:START:", "SC:"));
        assert!(!prefixes_collide("A:", "G:"));
    }

    #[test]
    fn chunk_budget_leaves_room_for_index_marker() {
        assert!(CHUNK_DATA_BUDGET < MTU);
        assert_eq!(MTU, 20);
    }

    #[test]
    fn telemetry_prefix_prefers_config() {
        assert_eq!(telemetry_prefix("CFG:{}"), Some(PREFIX_CONFIG));
        assert_eq!(telemetry_prefix("C:1.0"), Some(PREFIX_CHANGE));
        assert_eq!(telemetry_prefix("Altitude: 3"), None);
    }

    #[test]
    fn prefix_names() {
        assert_eq!(prefix_name(PREFIX_ALTITUDE), "ALTITUDE");
        assert_eq!(prefix_name("X:"), "UNKNOWN");
    }
}
