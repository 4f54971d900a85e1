#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use rocket::State;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tigo_rs::api;
use tigo_rs::coordinator::Coordinator;
use tigo_rs::entity::{self, PanelSensor, SystemSensor};
use tigo_rs::model::{PanelData, SummaryData};
use tigo_rs::telemetry::{PanelTelemetrySource, SummarySource};

mod metrics;

const API_URL: &str = "https://api2.tigoenergy.com/api/v3";

#[derive(Clone, serde::Deserialize)]
pub struct TigoConfig {
    api_url: String,
    email: String,
    password: String,
    telemetry_interval: u64,
    summary_interval: u64,
}

/// Structure containing state for API handlers.
pub struct StateData {
    pub system_id: u64,
    pub panel_sensors: Vec<PanelSensor>,
    pub system_sensors: Vec<SystemSensor>,
    pub panel_coordinator: Arc<Coordinator<PanelData>>,
    pub summary_coordinator: Arc<Coordinator<SummaryData>>,
}

pub fn read_settings() -> TigoConfig {
    let mut settings = config::Config::default();
    settings
        .merge(config::Environment::with_prefix("TIGO"))
        .unwrap()
        .set_default("api_url", API_URL)
        .unwrap()
        .set_default("telemetry_interval", 60_i64)
        .unwrap()
        .set_default("summary_interval", 300_i64)
        .unwrap();

    settings.try_into().expect("Configuration error")
}

/// Registration view of every sensor entity: name, unique id, unit, device
/// class and linkage, plus the current state.
fn sensor_registrations(state: &StateData) -> Vec<serde_json::Value> {
    let system_identifiers = json!(["tigo", state.system_id.to_string()]);
    let system_device = json!({
        "identifiers": system_identifiers,
        "name": format!("System {}", state.system_id),
        "manufacturer": "Tigo",
        "model": "System",
    });

    let mut registrations = Vec::new();

    for sensor in &state.panel_sensors {
        let info = sensor.info();
        let attributes: HashMap<&str, String> = sensor.attributes().into_iter().collect();

        registrations.push(json!({
            "name": sensor.name(),
            "unique_id": sensor.unique_id(),
            "unit_of_measurement": sensor.unit(),
            "device_class": sensor.device_class(),
            "state_class": sensor.state_class(),
            "state": sensor.state(),
            "attributes": attributes,
            "device": {
                "identifiers": ["tigo", info.id.as_str()],
                "name": format!("Panel {}", info.label),
                "manufacturer": "Tigo",
                "model": info.model.as_deref(),
                "via_device": ["tigo", state.system_id.to_string()],
            },
        }));
    }

    for sensor in &state.system_sensors {
        registrations.push(json!({
            "name": sensor.name(),
            "unique_id": sensor.unique_id(),
            "unit_of_measurement": sensor.unit(),
            "device_class": sensor.device_class(),
            "state_class": sensor.state_class(),
            "state": sensor.state(),
            "device": system_device.clone(),
        }));
    }

    registrations
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, api::Error> {
    metrics::project(state);
    metrics::read().await
}

#[get("/sensors")]
fn sensors_route(state: &State<StateData>) -> Result<String, api::Error> {
    serde_json::to_string_pretty(&sensor_registrations(state)).or(Err(api::Error::FormatError))
}

#[rocket::main]
async fn main() -> Result<(), api::Error> {
    env_logger::init();

    let settings = read_settings();
    let telemetry_interval = Duration::from_secs(settings.telemetry_interval);
    let summary_interval = Duration::from_secs(settings.summary_interval);
    let api = api::api(settings.api_url, settings.email, settings.password);

    let logged_in = api::login(&api).await?;
    let system = api::systems(&logged_in).await?;
    log::info!(
        "monitoring system {} ({})",
        system.system_id,
        system.name.as_deref().unwrap_or("unnamed")
    );

    let layout = api::system_layout(&logged_in, system.system_id).await?;

    /* Setup-time probe; nothing downstream consumes the result but a broken
    account aborts setup here rather than on the first poll. */
    let info = api::system_info(&logged_in, system.system_id).await?;
    log::debug!("system view name: {:?}", info.name);

    let panel_coordinator = Coordinator::start(
        PanelTelemetrySource::new(logged_in.clone(), system.system_id),
        telemetry_interval,
    )
    .await?;
    let summary_coordinator = Coordinator::start(
        SummarySource::new(logged_in.clone(), system.system_id),
        summary_interval,
    )
    .await?;

    let _telemetry_task = Arc::clone(&panel_coordinator).spawn();
    let _summary_task = Arc::clone(&summary_coordinator).spawn();

    let panel_sensors = entity::panel_sensors(&layout, &panel_coordinator);
    let system_sensors = entity::system_sensors(&summary_coordinator);
    log::info!(
        "serving {} sensor entities",
        panel_sensors.len() + system_sensors.len()
    );

    let state = StateData {
        system_id: system.system_id,
        panel_sensors,
        system_sensors,
        panel_coordinator,
        summary_coordinator,
    };

    rocket::build()
        .manage(state)
        .mount("/", routes![metrics_route, sensors_route])
        .launch()
        .await
        .map(|_| ())
        .or(Err(api::Error::InternalError))
}
