use serde::Deserialize;
use serde_json::{Map, Value};

/* The summary map carries mixed field types (numbers, strings, nulls);
   filtering and unit normalization happen in the client. */
#[derive(Deserialize)]
pub struct GetSummary {
    #[serde(default)]
    pub summary: Map<String, Value>,
}
