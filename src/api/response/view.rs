use serde::Deserialize;

#[derive(Deserialize)]
pub struct System {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct GetView {
    pub system: System,
}
