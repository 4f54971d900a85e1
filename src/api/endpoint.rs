pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/users/login";
pub const SYSTEMS: &Endpoint = "/systems";
pub const LAYOUT: &Endpoint = "/systems/layout";
pub const VIEW: &Endpoint = "/systems/view";
pub const SUMMARY: &Endpoint = "/data/summary";
pub const AGGREGATE: &Endpoint = "/data/aggregate";
