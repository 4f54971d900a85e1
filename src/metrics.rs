use crate::StateData;
use prometheus::{Encoder, GaugeVec, TextEncoder};
use tigo_rs::api::Error;
use tigo_rs::model::Parameter;

lazy_static! {
    static ref PANEL_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_panel_power_watts",
            "latest input power reported per panel (in W)",
        ),
        &["panel_id", "label"],
    )
    .unwrap();
    static ref PANEL_VOLTAGE_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_panel_voltage_volts",
            "latest input voltage reported per panel (in V)",
        ),
        &["panel_id", "label"],
    )
    .unwrap();
    static ref PANEL_CURRENT_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_panel_current_amperes",
            "latest input current reported per panel (in A)",
        ),
        &["panel_id", "label"],
    )
    .unwrap();
    static ref PANEL_RSSI_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_panel_rssi_dbm",
            "latest mesh signal strength reported per panel (in dBm)",
        ),
        &["panel_id", "label"],
    )
    .unwrap();
    static ref LIFETIME_ENERGY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_lifetime_energy_kwh",
            "total energy produced over the system lifetime (in kWh)",
        ),
        &["system_id"],
    )
    .unwrap();
    static ref YTD_ENERGY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_ytd_energy_kwh",
            "energy produced since the start of the year (in kWh)",
        ),
        &["system_id"],
    )
    .unwrap();
    static ref DAILY_ENERGY_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_daily_energy_kwh",
            "energy produced since midnight (in kWh)",
        ),
        &["system_id"],
    )
    .unwrap();
    static ref CURRENT_POWER_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_current_power_watts",
            "most recent DC power reading for the system (in W)",
        ),
        &["system_id"],
    )
    .unwrap();
    static ref UPDATE_OK_GAUGE: GaugeVec = register_gauge_vec!(
        opts!(
            "tigo_update_ok",
            "1 when the most recent poll of this source succeeded, 0 when it serves a stale snapshot",
        ),
        &["source"],
    )
    .unwrap();
}

fn panel_gauge(param: Parameter) -> &'static GaugeVec {
    match param {
        Parameter::Pin => &PANEL_POWER_GAUGE,
        Parameter::Vin => &PANEL_VOLTAGE_GAUGE,
        Parameter::Iin => &PANEL_CURRENT_GAUGE,
        Parameter::Rssi => &PANEL_RSSI_GAUGE,
    }
}

fn summary_gauge(key: &str) -> Option<&'static GaugeVec> {
    match key {
        "lifetime_energy_dc" => Some(&LIFETIME_ENERGY_GAUGE),
        "ytd_energy_dc" => Some(&YTD_ENERGY_GAUGE),
        "daily_energy_dc" => Some(&DAILY_ENERGY_GAUGE),
        "last_power_dc" => Some(&CURRENT_POWER_GAUGE),
        _ => None,
    }
}

/// Push the current state of every sensor entity into the Prometheus
/// registry. Entities without a value in the latest snapshot are left
/// untouched rather than zeroed.
pub fn project(state: &StateData) {
    for sensor in &state.panel_sensors {
        if let Some(value) = sensor.state() {
            panel_gauge(sensor.param())
                .with_label_values(&[sensor.info().id.as_str(), sensor.info().label.as_str()])
                .set(value);
        }
    }

    let system_id = state.system_id.to_string();
    for sensor in &state.system_sensors {
        if let (Some(gauge), Some(value)) = (summary_gauge(sensor.key()), sensor.state()) {
            gauge.with_label_values(&[&system_id]).set(value);
        }
    }

    let flag = |ok: bool| if ok { 1.0 } else { 0.0 };
    UPDATE_OK_GAUGE
        .with_label_values(&["panel telemetry"])
        .set(flag(state.panel_coordinator.last_update_ok()));
    UPDATE_OK_GAUGE
        .with_label_values(&["system summary"])
        .set(flag(state.summary_coordinator.last_update_ok()));
}

/// Read metrics from Prometheus exporter registry.
pub async fn read() -> Result<String, Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode(&metric_families, &mut buffer)
        .or(Err(Error::FormatError))?;
    String::from_utf8(buffer).or(Err(Error::FormatError))
}
