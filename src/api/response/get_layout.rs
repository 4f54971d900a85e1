use serde::Deserialize;

/* Tree rooted at `system`: inverters -> mppts -> strings -> panels.
   Labels are optional in the payload, defaults are applied while mapping
   to the domain model. */

#[derive(Deserialize)]
pub struct Panel {
    pub object_id: u64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, rename = "type")]
    pub panel_type: Option<String>,
}

#[derive(Deserialize)]
pub struct PanelString {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

#[derive(Deserialize)]
pub struct Mppt {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub strings: Vec<PanelString>,
}

#[derive(Deserialize)]
pub struct Inverter {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mppts: Vec<Mppt>,
}

#[derive(Deserialize)]
pub struct System {
    #[serde(default)]
    pub inverters: Vec<Inverter>,
}

#[derive(Deserialize)]
pub struct GetLayout {
    pub system: System,
}
