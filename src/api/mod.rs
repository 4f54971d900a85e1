pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
pub use error::Error;
use response::get_layout::GetLayout;
use response::get_summary::GetSummary;
use response::get_systems::GetSystems;
use response::login::Login;
use response::view::GetView;
use serde_json::Value;

pub fn api(api_url: String, email: String, password: String) -> model::Api {
    model::Api {
        api_url,
        email,
        password,
    }
}

/// Map non-2xx API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        Some(http::StatusCode::UNAUTHORIZED) => Error::LoginError(error.to_string()),
        Some(http::StatusCode::FORBIDDEN) => Error::LoginError(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

/// Authenticate with basic auth and extract the bearer token from the
/// `user.auth` field of the login response.
pub async fn login(api: &model::Api) -> Result<model::LoggedInApi, Error> {
    let client = reqwest::ClientBuilder::new()
        .build()
        .or(Err(Error::InternalError))?;
    let url = format!("{}{}", api.api_url, endpoint::LOGIN);

    let body = client
        .get(url)
        .basic_auth(&api.email, Some(&api.password))
        .send()
        .await
        .map_err(map_api_err)?
        .error_for_status()
        .map_err(map_api_err)?
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    let login = serde_json::from_str::<Login>(&body)
        .map_err(|e| Error::InvalidResponse(body, e.to_string()))?;

    Ok(model::LoggedInApi {
        api_url: api.api_url.to_owned(),
        token: login.user.auth,
        client,
    })
}

async fn get_text(api: &model::LoggedInApi, path: &str) -> Result<String, Error> {
    let url = format!("{}{}", api.api_url, path);

    let body = api
        .client
        .get(url)
        .bearer_auth(&api.token)
        .send()
        .await
        .map_err(map_api_err)?
        .error_for_status()
        .map_err(map_api_err)?
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    log::trace!("path: {}, response: {}", path, body);
    Ok(body)
}

async fn get_json<T: serde::de::DeserializeOwned>(
    api: &model::LoggedInApi,
    path: &str,
) -> Result<T, Error> {
    let body = get_text(api, path).await?;
    serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(body, e.to_string()))
}

/// List systems visible to the account and deterministically take the first
/// one. Accounts are assumed singular; multi-system selection is not
/// implemented.
pub async fn systems(api: &model::LoggedInApi) -> Result<model::System, Error> {
    let response: GetSystems = get_json(api, endpoint::SYSTEMS).await?;

    response
        .systems
        .into_iter()
        .next()
        .map(|sys| model::System {
            system_id: sys.system_id,
            name: sys.name,
        })
        .ok_or(Error::NoSystems)
}

/// Fetch the inverter -> MPPT -> string -> panel tree for `system_id`.
pub async fn system_layout(
    api: &model::LoggedInApi,
    system_id: u64,
) -> Result<model::SystemLayout, Error> {
    let path = format!("{}?id={}", endpoint::LAYOUT, system_id);
    let response: GetLayout = get_json(api, &path).await?;

    let inverters = response
        .system
        .inverters
        .into_iter()
        .map(|inverter| model::Inverter {
            label: inverter.label.unwrap_or_else(|| String::from("Inverter")),
            mppts: inverter
                .mppts
                .into_iter()
                .map(|mppt| model::Mppt {
                    label: mppt.label.unwrap_or_else(|| String::from("MPPT")),
                    strings: mppt
                        .strings
                        .into_iter()
                        .map(|string| model::PanelString {
                            label: string.label.unwrap_or_else(|| String::from("String")),
                            panels: string
                                .panels
                                .into_iter()
                                .map(|panel| {
                                    let id = panel.object_id.to_string();
                                    model::Panel {
                                        label: panel.label.unwrap_or_else(|| id.clone()),
                                        id,
                                        serial: panel.serial,
                                        model: panel.panel_type,
                                    }
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(model::SystemLayout { inverters })
}

/// Read the `/systems/view` subtree. The result carries no data the
/// integration consumes; the call stays in the setup path so a broken
/// account still fails setup the same way the vendor portal would.
pub async fn system_info(
    api: &model::LoggedInApi,
    system_id: u64,
) -> Result<model::SystemInfo, Error> {
    let path = format!("{}?id={}", endpoint::VIEW, system_id);
    let response: GetView = get_json(api, &path).await?;

    Ok(model::SystemInfo {
        name: response.system.name,
    })
}

/// Read the raw numeric summary and normalize it: Wh -> kWh for energy
/// fields, everything rounded to 2 decimals.
pub async fn system_summary(
    api: &model::LoggedInApi,
    system_id: u64,
) -> Result<model::SummaryData, Error> {
    let path = format!("{}?system_id={}", endpoint::SUMMARY, system_id);
    let response: GetSummary = get_json(api, &path).await?;

    Ok(normalize_summary(response.summary))
}

fn normalize_summary(raw: serde_json::Map<String, Value>) -> model::SummaryData {
    let mut clean = model::SummaryData::new();

    for (key, value) in raw {
        match value.as_f64() {
            Some(number) => {
                /* Energy fields arrive in Wh, power fields stay in W */
                let number = if key.to_lowercase().contains("energy") {
                    number / 1000.0
                } else {
                    number
                };
                clean.insert(key, model::round2(number));
            }
            None => log::debug!("skipping non-numeric summary field {}: {}", key, value),
        }
    }

    clean
}

/// Fetch today's per-minute aggregate CSV for a single parameter. The body
/// is returned verbatim, reduction happens in `series`.
pub async fn aggregate_series(
    api: &model::LoggedInApi,
    system_id: u64,
    param: model::Parameter,
    start: &str,
    end: &str,
) -> Result<String, Error> {
    let path = format!(
        "{}?system_id={}&start={}&end={}&level=min&param={}&header=id&sensors=true",
        endpoint::AGGREGATE,
        system_id,
        start,
        end,
        param.as_str()
    );

    get_text(api, &path).await
}

#[cfg(test)]
mod test {
    use super::*;
    use mockito::Matcher;

    fn logged_in(server: &mockito::Server) -> model::LoggedInApi {
        model::LoggedInApi {
            api_url: server.url(),
            token: String::from("test-token"),
            client: reqwest::Client::new(),
        }
    }

    #[tokio::test]
    async fn login_extracts_token() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("GET", "/users/login")
            .with_status(200)
            .with_body(r#"{"user":{"auth":"ab34340a1b2c3d4e5f"}}"#)
            .create_async()
            .await;

        let api = api(
            server.url(),
            String::from("owner@example.com"),
            String::from("hunter2"),
        );
        let logged_in = login(&api).await.unwrap();
        assert_eq!("ab34340a1b2c3d4e5f", logged_in.token);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("GET", "/users/login")
            .with_status(401)
            .create_async()
            .await;

        let api = api(
            server.url(),
            String::from("owner@example.com"),
            String::from("wrong"),
        );
        match login(&api).await {
            Err(Error::LoginError(_)) => {}
            other => panic!("expected LoginError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn systems_takes_first_entry() {
        let mut server = mockito::Server::new_async().await;
        let _systems = server
            .mock("GET", "/systems")
            .with_status(200)
            .with_body(
                r#"{"systems":[{"system_id":4210,"name":"Rooftop East"},{"system_id":4211}]}"#,
            )
            .create_async()
            .await;

        let system = systems(&logged_in(&server)).await.unwrap();
        assert_eq!(4210, system.system_id);
        assert_eq!(Some("Rooftop East"), system.name.as_deref());
    }

    #[tokio::test]
    async fn systems_empty_list_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _systems = server
            .mock("GET", "/systems")
            .with_status(200)
            .with_body(r#"{"systems":[]}"#)
            .create_async()
            .await;

        match systems(&logged_in(&server)).await {
            Err(Error::NoSystems) => {}
            other => panic!("expected NoSystems, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn layout_applies_label_defaults() {
        let mut server = mockito::Server::new_async().await;
        let _layout = server
            .mock("GET", "/systems/layout")
            .match_query(Matcher::UrlEncoded("id".into(), "4210".into()))
            .with_status(200)
            .with_body(
                r#"{"system":{"inverters":[{"mppts":[{"strings":[{"panels":[{"object_id":9001}]}]}]}]}}"#,
            )
            .create_async()
            .await;

        let layout = system_layout(&logged_in(&server), 4210).await.unwrap();
        let inverter = &layout.inverters[0];
        assert_eq!("Inverter", inverter.label);
        assert_eq!("MPPT", inverter.mppts[0].label);
        assert_eq!("String", inverter.mppts[0].strings[0].label);
        let panel = &inverter.mppts[0].strings[0].panels[0];
        assert_eq!("9001", panel.id);
        /* unlabeled panels fall back to their id */
        assert_eq!("9001", panel.label);
    }

    #[tokio::test]
    async fn summary_normalizes_energy_fields() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/data/summary")
            .match_query(Matcher::UrlEncoded("system_id".into(), "4210".into()))
            .with_status(200)
            .with_body(
                r#"{"summary":{"lifetime_energy_dc":123456,"last_power_dc":4567.891,"source":"minute aggregates"}}"#,
            )
            .create_async()
            .await;

        let summary = system_summary(&logged_in(&server), 4210).await.unwrap();
        assert_eq!(Some(&123.46), summary.get("lifetime_energy_dc"));
        assert_eq!(Some(&4567.89), summary.get("last_power_dc"));
        assert_eq!(None, summary.get("source"));
    }

    #[tokio::test]
    async fn non_2xx_summary_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/data/summary")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        match system_summary(&logged_in(&server), 4210).await {
            Err(Error::ApiError(_)) => {}
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rate_limited_summary_is_rate_exceeded() {
        let mut server = mockito::Server::new_async().await;
        let _summary = server
            .mock("GET", "/data/summary")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        match system_summary(&logged_in(&server), 4210).await {
            Err(Error::RateExceeded(_)) => {}
            other => panic!("expected RateExceeded, got {:?}", other),
        }
    }
}
