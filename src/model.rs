use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoggedInApi {
    pub api_url: String,
    pub token: String,
    pub client: reqwest::Client,
}

#[derive(Debug, Clone)]
pub struct System {
    pub system_id: u64,
    pub name: Option<String>,
}

/// Result of the `/systems/view` probe. Fetched once during setup and only
/// surfaced in a debug log line.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub name: Option<String>,
}

/* Topology tree, fetched once at setup and held immutably. */

#[derive(Debug, Clone)]
pub struct SystemLayout {
    pub inverters: Vec<Inverter>,
}

#[derive(Debug, Clone)]
pub struct Inverter {
    pub label: String,
    pub mppts: Vec<Mppt>,
}

#[derive(Debug, Clone)]
pub struct Mppt {
    pub label: String,
    pub strings: Vec<PanelString>,
}

#[derive(Debug, Clone)]
pub struct PanelString {
    pub label: String,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub id: String,
    pub label: String,
    pub serial: Option<String>,
    pub model: Option<String>,
}

/// Electrical parameters reported per panel by the aggregate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Pin,
    Vin,
    Iin,
    Rssi,
}

impl Parameter {
    /// Poll order is fixed: one aggregate request per entry.
    pub const ALL: [Parameter; 4] = [
        Parameter::Pin,
        Parameter::Vin,
        Parameter::Iin,
        Parameter::Rssi,
    ];

    /// Name used in the vendor query string and as merge key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Pin => "Pin",
            Parameter::Vin => "Vin",
            Parameter::Iin => "Iin",
            Parameter::Rssi => "RSSI",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Pin => "Power",
            Parameter::Vin => "Voltage In",
            Parameter::Iin => "Current In",
            Parameter::Rssi => "Signal Strength",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Pin => "W",
            Parameter::Vin => "V",
            Parameter::Iin => "A",
            Parameter::Rssi => "dBm",
        }
    }

    pub fn device_class(&self) -> Option<&'static str> {
        match self {
            Parameter::Pin => Some("power"),
            Parameter::Vin => Some("voltage"),
            Parameter::Iin => Some("current"),
            Parameter::Rssi => None,
        }
    }
}

/// Latest per-panel sample, keyed by panel id then parameter. Rebuilt
/// wholesale on every poll.
pub type PanelData = HashMap<String, HashMap<Parameter, f64>>;

/// Normalized system summary, keyed by the vendor's summary field names.
pub type SummaryData = HashMap<String, f64>;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round2_half_up() {
        assert_eq!(123.46, round2(123.456));
        assert_eq!(4567.89, round2(4567.891));
        assert_eq!(-60.0, round2(-60.0));
    }

    #[test]
    fn parameter_wire_names() {
        let names: Vec<&str> = Parameter::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(vec!["Pin", "Vin", "Iin", "RSSI"], names);
    }
}
