use crate::coordinator::Coordinator;
use crate::model::{self, PanelData, Parameter, SummaryData};
use std::sync::Arc;

/// One panel with the lineage labels collected while walking the layout
/// tree. Built once at setup; the layout is never refreshed.
#[derive(Debug, Clone)]
pub struct PanelInfo {
    pub id: String,
    pub label: String,
    pub serial: Option<String>,
    pub model: Option<String>,
    pub inverter: String,
    pub mppt: String,
    pub string: String,
}

impl PanelInfo {
    pub fn full_label(&self) -> String {
        format!(
            "{} / {} / {} / {}",
            self.inverter, self.mppt, self.string, self.label
        )
    }
}

pub fn flatten_layout(layout: &model::SystemLayout) -> Vec<PanelInfo> {
    let mut panels = Vec::new();

    for inverter in &layout.inverters {
        for mppt in &inverter.mppts {
            for string in &mppt.strings {
                for panel in &string.panels {
                    panels.push(PanelInfo {
                        id: panel.id.clone(),
                        label: panel.label.clone(),
                        serial: panel.serial.clone(),
                        model: panel.model.clone(),
                        inverter: inverter.label.clone(),
                        mppt: mppt.label.clone(),
                        string: string.label.clone(),
                    });
                }
            }
        }
    }

    panels
}

/// Value lookup for one panel/parameter pair, rounded to 2 decimals.
/// Missing panels or parameters read as `None`, never as an error.
pub fn panel_value(data: &PanelData, panel_id: &str, param: Parameter) -> Option<f64> {
    data.get(panel_id)
        .and_then(|values| values.get(&param))
        .map(|value| model::round2(*value))
}

/// Externally visible sensor for one panel x parameter combination.
pub struct PanelSensor {
    info: PanelInfo,
    param: Parameter,
    coordinator: Arc<Coordinator<PanelData>>,
}

/// Project every panel in the layout onto the four per-panel parameters.
pub fn panel_sensors(
    layout: &model::SystemLayout,
    coordinator: &Arc<Coordinator<PanelData>>,
) -> Vec<PanelSensor> {
    let mut sensors = Vec::new();

    for info in flatten_layout(layout) {
        for param in Parameter::ALL {
            sensors.push(PanelSensor {
                info: info.clone(),
                param,
                coordinator: Arc::clone(coordinator),
            });
        }
    }

    sensors
}

impl PanelSensor {
    pub fn name(&self) -> String {
        format!("Panel {} {}", self.info.label, self.param.display_name())
    }

    pub fn unique_id(&self) -> String {
        format!(
            "tigo_{}_{}",
            self.info.id,
            self.param.as_str().to_lowercase()
        )
    }

    pub fn unit(&self) -> &'static str {
        self.param.unit()
    }

    pub fn device_class(&self) -> Option<&'static str> {
        self.param.device_class()
    }

    pub fn state_class(&self) -> &'static str {
        "measurement"
    }

    pub fn param(&self) -> Parameter {
        self.param
    }

    pub fn info(&self) -> &PanelInfo {
        &self.info
    }

    pub fn state(&self) -> Option<f64> {
        panel_value(&self.coordinator.data(), &self.info.id, self.param)
    }

    /// Descriptive attributes carried alongside the value, mirroring the
    /// panel's position in the topology.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes = vec![
            ("full_label", self.info.full_label()),
            ("inverter", self.info.inverter.clone()),
            ("mppt", self.info.mppt.clone()),
            ("string", self.info.string.clone()),
            ("param", self.param.as_str().to_string()),
        ];

        if let Some(serial) = &self.info.serial {
            attributes.push(("serial", serial.clone()));
        }
        if let Some(model) = &self.info.model {
            attributes.push(("type", model.clone()));
        }

        attributes
    }
}

/// Fixed system-wide sensor reading one key of the summary snapshot.
pub struct SystemSensor {
    name: &'static str,
    key: &'static str,
    unit: &'static str,
    unique_id: &'static str,
    device_class: &'static str,
    state_class: &'static str,
    coordinator: Arc<Coordinator<SummaryData>>,
}

/// The four summary projections: energies in kWh, current power in W.
pub fn system_sensors(coordinator: &Arc<Coordinator<SummaryData>>) -> Vec<SystemSensor> {
    let descriptions = [
        (
            "Tigo Lifetime Energy",
            "lifetime_energy_dc",
            "kWh",
            "tigo_lifetime_energy",
            "energy",
            "total_increasing",
        ),
        (
            "Tigo YTD Energy",
            "ytd_energy_dc",
            "kWh",
            "tigo_ytd_energy",
            "energy",
            "total",
        ),
        (
            "Tigo Daily Energy",
            "daily_energy_dc",
            "kWh",
            "tigo_daily_energy",
            "energy",
            "total",
        ),
        (
            "Tigo Current Power",
            "last_power_dc",
            "W",
            "tigo_current_power",
            "power",
            "measurement",
        ),
    ];

    descriptions
        .iter()
        .map(
            |&(name, key, unit, unique_id, device_class, state_class)| SystemSensor {
                name,
                key,
                unit,
                unique_id,
                device_class,
                state_class,
                coordinator: Arc::clone(coordinator),
            },
        )
        .collect()
}

impl SystemSensor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    pub fn unique_id(&self) -> &'static str {
        self.unique_id
    }

    pub fn device_class(&self) -> &'static str {
        self.device_class
    }

    pub fn state_class(&self) -> &'static str {
        self.state_class
    }

    /// Summary values are rounded at fetch time, no re-rounding here.
    pub fn state(&self) -> Option<f64> {
        self.coordinator.data().get(self.key).copied()
    }
}
