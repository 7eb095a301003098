//! Rolling view of recent telemetry for display.

use std::collections::VecDeque;
use std::time::SystemTime;

use altlink_frame::{Configuration, MotionState, TelemetryEvent, Trend};

pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// One timestamped reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: SystemTime,
    pub value: f64,
}

/// Bounded history of altitude and acceleration readings plus the latest
/// elevation change, motion state, and configuration report.
///
/// Series keep the most recent `capacity` samples; older ones are evicted
/// first.
#[derive(Debug, Clone)]
pub struct TelemetryWindow {
    capacity: usize,
    altitude: VecDeque<Sample>,
    acceleration: VecDeque<Sample>,
    elevation_change: Option<(f64, Trend)>,
    motion: Option<MotionState>,
    configuration: Option<Configuration>,
    unrecognized: u64,
}

impl Default for TelemetryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl TelemetryWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            altitude: VecDeque::with_capacity(capacity),
            acceleration: VecDeque::with_capacity(capacity),
            elevation_change: None,
            motion: None,
            configuration: None,
            unrecognized: 0,
        }
    }

    /// Fold one event into the window, stamped with the current time.
    pub fn record(&mut self, event: &TelemetryEvent) {
        self.record_at(event, SystemTime::now());
    }

    pub fn record_at(&mut self, event: &TelemetryEvent, at: SystemTime) {
        match event {
            TelemetryEvent::Altitude(meters) => {
                push_bounded(&mut self.altitude, self.capacity, Sample { at, value: *meters });
            }
            TelemetryEvent::Acceleration(g) => {
                push_bounded(&mut self.acceleration, self.capacity, Sample { at, value: *g });
            }
            TelemetryEvent::ElevationChange { cm, trend } => {
                self.elevation_change = Some((*cm, *trend));
            }
            TelemetryEvent::Motion(state) => self.motion = Some(state.clone()),
            TelemetryEvent::ConfigurationReport(config) => self.configuration = Some(*config),
            TelemetryEvent::Unrecognized(_) => self.unrecognized += 1,
        }
    }

    /// Forget everything; used when the link disconnects.
    pub fn clear(&mut self) {
        self.altitude.clear();
        self.acceleration.clear();
        self.elevation_change = None;
        self.motion = None;
        self.configuration = None;
        self.unrecognized = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn altitude(&self) -> impl Iterator<Item = &Sample> {
        self.altitude.iter()
    }

    pub fn acceleration(&self) -> impl Iterator<Item = &Sample> {
        self.acceleration.iter()
    }

    pub fn latest_altitude(&self) -> Option<f64> {
        self.altitude.back().map(|s| s.value)
    }

    pub fn latest_acceleration(&self) -> Option<f64> {
        self.acceleration.back().map(|s| s.value)
    }

    pub fn elevation_change(&self) -> Option<(f64, Trend)> {
        self.elevation_change
    }

    pub fn motion(&self) -> Option<&MotionState> {
        self.motion.as_ref()
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    /// Number of unrecognized messages seen since the last clear.
    pub fn unrecognized(&self) -> u64 {
        self.unrecognized
    }

    pub fn is_empty(&self) -> bool {
        self.altitude.is_empty()
            && self.acceleration.is_empty()
            && self.elevation_change.is_none()
            && self.motion.is_none()
            && self.configuration.is_none()
            && self.unrecognized == 0
    }
}

fn push_bounded(series: &mut VecDeque<Sample>, capacity: usize, sample: Sample) {
    if series.len() == capacity {
        series.pop_front();
    }
    series.push_back(sample);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn altitude_series_keeps_most_recent_samples() {
        let mut window = TelemetryWindow::new(3);
        for value in 1..=5 {
            window.record(&TelemetryEvent::Altitude(value as f64));
        }

        let values: Vec<f64> = window.altitude().map(|s| s.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
        assert_eq!(window.latest_altitude(), Some(5.0));
    }

    #[test]
    fn default_capacity_is_fifty() {
        let mut window = TelemetryWindow::default();
        for value in 0..80 {
            window.record(&TelemetryEvent::Acceleration(value as f64));
        }
        assert_eq!(window.acceleration().count(), 50);
        assert_eq!(window.acceleration().next().map(|s| s.value), Some(30.0));
    }

    #[test]
    fn samples_keep_their_timestamps() {
        let mut window = TelemetryWindow::new(4);
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let t1 = t0 + Duration::from_millis(250);
        window.record_at(&TelemetryEvent::Altitude(1.0), t0);
        window.record_at(&TelemetryEvent::Altitude(2.0), t1);

        let stamps: Vec<SystemTime> = window.altitude().map(|s| s.at).collect();
        assert_eq!(stamps, vec![t0, t1]);
    }

    #[test]
    fn latest_scalar_state_is_replaced() {
        let mut window = TelemetryWindow::default();
        window.record(&TelemetryEvent::ElevationChange {
            cm: 4.0,
            trend: Trend::Rising,
        });
        window.record(&TelemetryEvent::ElevationChange {
            cm: -2.0,
            trend: Trend::Falling,
        });
        window.record(&TelemetryEvent::Motion(MotionState::Drift));
        window.record(&TelemetryEvent::ConfigurationReport(Configuration::default()));

        assert_eq!(window.elevation_change(), Some((-2.0, Trend::Falling)));
        assert_eq!(window.motion(), Some(&MotionState::Drift));
        assert_eq!(window.configuration(), Some(&Configuration::default()));
    }

    #[test]
    fn clear_resets_everything() {
        let mut window = TelemetryWindow::default();
        window.record(&TelemetryEvent::Altitude(10.0));
        window.record(&TelemetryEvent::Motion(MotionState::Drift));
        window.record(&TelemetryEvent::Unrecognized("noise".into()));
        assert!(!window.is_empty());

        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.latest_altitude(), None);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut window = TelemetryWindow::new(0);
        window.record(&TelemetryEvent::Altitude(1.0));
        window.record(&TelemetryEvent::Altitude(2.0));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.latest_altitude(), Some(2.0));
    }
}
