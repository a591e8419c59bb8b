use chrono::{DateTime, Duration, Utc};

use crate::models::{PatientState, SymptomEvent, VitalEvent};

pub const DEFAULT_HORIZON_HOURS: i64 = 48;

pub fn default_horizon() -> Duration {
    Duration::hours(DEFAULT_HORIZON_HOURS)
}

/// Events of one patient that fall inside the trailing horizon, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowedEvents<'a> {
    pub symptoms: Vec<&'a SymptomEvent>,
    pub vitals: Vec<&'a VitalEvent>,
}

impl WindowedEvents<'_> {
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty() && self.vitals.is_empty()
    }
}

/// Saturates at the earliest representable instant instead of overflowing.
pub fn cutoff(last_seen: DateTime<Utc>, horizon: Duration) -> DateTime<Utc> {
    last_seen
        .checked_sub_signed(horizon)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Anchors the horizon on `last_seen`, so an out-of-order ingest moves the window too.
pub fn select_window(state: &PatientState, horizon: Duration) -> WindowedEvents<'_> {
    let Some(last_seen) = state.last_seen else {
        return WindowedEvents::default();
    };
    let cutoff = cutoff(last_seen, horizon);

    WindowedEvents {
        symptoms: state
            .symptoms
            .iter()
            .filter(|event| event.timestamp >= cutoff)
            .collect(),
        vitals: state
            .vitals
            .iter()
            .filter(|event| event.timestamp >= cutoff)
            .collect(),
    }
}

/// The last `count` items, order preserved.
pub fn last_n<T>(items: &[T], count: usize) -> &[T] {
    &items[items.len().saturating_sub(count)..]
}
