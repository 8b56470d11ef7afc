//! Dashboard snapshot: latest readings per source plus the alert state.
//!
//! Alerts compare the apparent temperature of the latest reading of each
//! source against the safe bound (strictly greater triggers). The internal
//! source is checked first and wins when both exceed.

use serde::Serialize;

use crate::error::Result;
use crate::models::{Reading, Source};
use crate::store::{ReadingStore, ThresholdStore};
use crate::thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    InternalAboveSafe,
    ExternalAboveSafe,
    NoAlert,
}

impl AlertState {
    pub fn message(&self) -> &'static str {
        match self {
            AlertState::InternalAboveSafe => "Internal apparent temperature is above safe threshold!",
            AlertState::ExternalAboveSafe => "External apparent temperature is above safe threshold!",
            AlertState::NoAlert => "No critical warning or alert at this point.",
        }
    }
}

pub fn evaluate_alert(
    internal: Option<&Reading>,
    external: Option<&Reading>,
    safe_bound: f64,
) -> AlertState {
    let exceeds = |r: Option<&Reading>| r.is_some_and(|r| r.apparent > safe_bound);

    if exceeds(internal) {
        AlertState::InternalAboveSafe
    } else if exceeds(external) {
        AlertState::ExternalAboveSafe
    } else {
        AlertState::NoAlert
    }
}

/// A reading annotated with the risk band of its apparent temperature.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingView {
    #[serde(flatten)]
    pub reading: Reading,
    pub risk: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub state: AlertState,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub internal: Option<ReadingView>,
    pub external: Option<ReadingView>,
    pub safe_threshold: f64,
    pub alert: Alert,
}

/// Assemble the dashboard from the stores. Missing readings show as `None`.
pub async fn snapshot(
    readings: &dyn ReadingStore,
    threshold_store: &dyn ThresholdStore,
) -> Result<Dashboard> {
    // ---
    let internal = readings.latest(Source::Internal).await?;
    let external = readings.latest(Source::External).await?;
    let ranges = threshold_store.current().await?;

    let safe_threshold = thresholds::safe_upper_bound(&ranges);
    let state = evaluate_alert(internal.as_ref(), external.as_ref(), safe_threshold);

    let view = |reading: Reading| ReadingView {
        risk: thresholds::label_for(&ranges, reading.apparent).to_string(),
        reading,
    };

    Ok(Dashboard {
        internal: internal.map(view),
        external: external.map(view),
        safe_threshold,
        alert: Alert {
            state,
            message: state.message(),
        },
    })
}
