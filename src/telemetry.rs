use crate::api;
use crate::coordinator::UpdateSource;
use crate::model::{LoggedInApi, PanelData, Parameter, SummaryData};
use crate::series::{self, ReduceMode};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;

/// UTC calendar-day bounds in the vendor's timestamp format.
pub fn day_window(day: NaiveDate) -> (String, String) {
    (
        format!("{}T00:00:00", day.format("%Y-%m-%d")),
        format!("{}T23:59:59", day.format("%Y-%m-%d")),
    )
}

pub fn merge_param(combined: &mut PanelData, param: Parameter, values: HashMap<String, f64>) {
    for (panel_id, value) in values {
        combined.entry(panel_id).or_default().insert(param, value);
    }
}

/// One poll cycle for per-panel telemetry: fetch today's minute aggregates
/// for each parameter in turn, keep the latest valid sample per panel, and
/// merge everything into a single panel -> parameter -> value map.
///
/// Fetches run sequentially. A failure on any parameter aborts the whole
/// cycle so consumers never observe a half-merged snapshot.
pub async fn panel_telemetry(api: &LoggedInApi, system_id: u64) -> Result<PanelData, api::Error> {
    let (start, end) = day_window(Utc::now().date_naive());
    let mut combined = PanelData::new();

    for param in Parameter::ALL {
        let body = api::aggregate_series(api, system_id, param, &start, &end).await?;
        let values = series::reduce_series(&body, ReduceMode::LatestValid);
        log::debug!("{}: {} panels with samples", param.as_str(), values.len());
        merge_param(&mut combined, param, values);
    }

    Ok(combined)
}

/// 60 s poller source: per-panel electrical telemetry.
pub struct PanelTelemetrySource {
    api: LoggedInApi,
    system_id: u64,
}

impl PanelTelemetrySource {
    pub fn new(api: LoggedInApi, system_id: u64) -> Self {
        PanelTelemetrySource { api, system_id }
    }
}

#[async_trait]
impl UpdateSource for PanelTelemetrySource {
    type Data = PanelData;

    fn name(&self) -> &'static str {
        "panel telemetry"
    }

    async fn fetch(&self) -> Result<PanelData, api::Error> {
        panel_telemetry(&self.api, self.system_id).await
    }
}

/// 300 s poller source: lifetime/daily energy and current power summary.
pub struct SummarySource {
    api: LoggedInApi,
    system_id: u64,
}

impl SummarySource {
    pub fn new(api: LoggedInApi, system_id: u64) -> Self {
        SummarySource { api, system_id }
    }
}

#[async_trait]
impl UpdateSource for SummarySource {
    type Data = SummaryData;

    fn name(&self) -> &'static str {
        "system summary"
    }

    async fn fetch(&self) -> Result<SummaryData, api::Error> {
        api::system_summary(&self.api, self.system_id).await
    }
}
