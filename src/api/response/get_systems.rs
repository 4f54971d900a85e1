use serde::Deserialize;

#[derive(Deserialize)]
pub struct Data {
    pub system_id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct GetSystems {
    #[serde(default)]
    pub systems: Vec<Data>,
}
