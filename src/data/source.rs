//! Indicator Source Module
//! Fetches raw indicator observations from the World Bank API (v2).

use crate::config::SourceConfig;
use crate::data::Indicator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Indicator source returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Indicator source rejected {code}: {message}")]
    Api { code: String, message: String },
    #[error("Malformed response for {code}: {reason}")]
    Malformed { code: String, reason: String },
}

/// One value reported by the source for a (country, date) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub indicator: Indicator,
    pub country: String,
    pub date: String,
    pub value: Option<f64>,
}

/// Anything that can supply the raw series for an indicator.
pub trait IndicatorSource: Send + Sync {
    fn fetch(&self, indicator: Indicator) -> Result<Vec<RawObservation>, SourceError>;
}

/// A single decoded page of an indicator response.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPage {
    pub page: u32,
    pub pages: u32,
    pub observations: Vec<RawObservation>,
}

#[derive(Deserialize)]
struct WbRecord {
    country: WbRef,
    date: String,
    value: Option<f64>,
}

#[derive(Deserialize)]
struct WbRef {
    value: String,
}

/// Blocking client for `/country/all/indicator/{code}`.
pub struct WorldBankClient {
    client: reqwest::blocking::Client,
    base_url: String,
    per_page: u32,
}

impl WorldBankClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("global_trends/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.max(1),
        })
    }

    pub fn indicator_url(&self, indicator: Indicator) -> String {
        format!(
            "{}/country/all/indicator/{}",
            self.base_url,
            indicator.code()
        )
    }

    fn fetch_page(&self, indicator: Indicator, page: u32) -> Result<IndicatorPage, SourceError> {
        let url = self.indicator_url(indicator);
        debug!(code = indicator.code(), page, "requesting indicator page");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
                url,
            });
        }

        let body = response.text()?;
        parse_page(indicator, &body)
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch(&self, indicator: Indicator) -> Result<Vec<RawObservation>, SourceError> {
        let observations = collect_pages(indicator, |page| self.fetch_page(indicator, page))?;

        info!(
            code = indicator.code(),
            count = observations.len(),
            "fetched indicator series"
        );
        Ok(observations)
    }
}

/// Request pages starting at 1 until the reported last page has been read.
/// A response for a different page than the one requested is malformed.
fn collect_pages<F>(
    indicator: Indicator,
    mut fetch_page: F,
) -> Result<Vec<RawObservation>, SourceError>
where
    F: FnMut(u32) -> Result<IndicatorPage, SourceError>,
{
    let mut observations = Vec::new();
    let mut page = 1;

    loop {
        let decoded = fetch_page(page)?;
        if decoded.page != page {
            return Err(SourceError::Malformed {
                code: indicator.code().to_string(),
                reason: format!("requested page {} but received page {}", page, decoded.page),
            });
        }
        observations.extend(decoded.observations);
        if page >= decoded.pages {
            break;
        }
        page += 1;
    }

    Ok(observations)
}

/// Decode one response body: `[metadata, records]` or `[{"message": [...]}]`.
pub fn parse_page(indicator: Indicator, body: &str) -> Result<IndicatorPage, SourceError> {
    let malformed = |reason: &str| SourceError::Malformed {
        code: indicator.code().to_string(),
        reason: reason.to_string(),
    };

    let root: Value = serde_json::from_str(body).map_err(|e| malformed(&e.to_string()))?;
    let parts = root
        .as_array()
        .ok_or_else(|| malformed("top level is not an array"))?;
    let meta = parts.first().ok_or_else(|| malformed("empty array"))?;

    if let Some(messages) = meta.get("message").and_then(Value::as_array) {
        let message = messages
            .iter()
            .filter_map(|m| m.get("value").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SourceError::Api {
            code: indicator.code().to_string(),
            message,
        });
    }

    let page = meta_u32(meta, "page").ok_or_else(|| malformed("missing page"))?;
    let pages = meta_u32(meta, "pages").ok_or_else(|| malformed("missing pages"))?;

    let records: Vec<WbRecord> = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| malformed(&e.to_string()))?
        }
    };

    let observations = records
        .into_iter()
        .map(|r| RawObservation {
            indicator,
            country: r.country.value,
            date: r.date,
            value: r.value,
        })
        .collect();

    Ok(IndicatorPage {
        page,
        pages,
        observations,
    })
}

// The API reports paging fields as numbers or numeric strings depending on version.
fn meta_u32(meta: &Value, key: &str) -> Option<u32> {
    match meta.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"[
        {"page": 1, "pages": 2, "per_page": 2, "total": 3, "sourceid": "2"},
        [
            {"indicator": {"id": "SP.POP.TOTL", "value": "Population, total"},
             "country": {"id": "AF", "value": "Afghanistan"},
             "countryiso3code": "AFG", "date": "2023", "value": 42239854,
             "unit": "", "obs_status": "", "decimal": 0},
            {"indicator": {"id": "SP.POP.TOTL", "value": "Population, total"},
             "country": {"id": "AF", "value": "Afghanistan"},
             "countryiso3code": "AFG", "date": "2024", "value": null,
             "unit": "", "obs_status": "", "decimal": 0}
        ]
    ]"#;

    #[test]
    fn parses_records_and_paging() {
        let page = parse_page(Indicator::TotalPopulation, PAGE).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 2);
        assert_eq!(page.observations.len(), 2);

        let first = &page.observations[0];
        assert_eq!(first.indicator, Indicator::TotalPopulation);
        assert_eq!(first.country, "Afghanistan");
        assert_eq!(first.date, "2023");
        assert_eq!(first.value, Some(42_239_854.0));
        assert_eq!(page.observations[1].value, None);
    }

    #[test]
    fn string_paging_fields_are_accepted() {
        let body = r#"[{"page": "3", "pages": "3", "per_page": "50", "total": 0}, null]"#;
        let page = parse_page(Indicator::Gdp, body).unwrap();
        assert_eq!((page.page, page.pages), (3, 3));
        assert!(page.observations.is_empty());
    }

    #[test]
    fn api_message_is_an_error() {
        let body = r#"[{"message": [{"id": "120", "key": "Invalid value",
            "value": "The provided parameter value is not valid"}]}]"#;
        match parse_page(Indicator::NetMigration, body) {
            Err(SourceError::Api { code, message }) => {
                assert_eq!(code, "SM.POP.NETM");
                assert!(message.contains("not valid"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        for body in ["<html>down</html>", "{}", "[]", r#"[{"total": 1}, []]"#] {
            let err = parse_page(Indicator::Gdp, body).unwrap_err();
            assert!(
                matches!(err, SourceError::Malformed { .. }),
                "body {body:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn pagination_is_followed_to_the_last_page() {
        let mut requested = Vec::new();
        let observations = collect_pages(Indicator::Gdp, |page| {
            requested.push(page);
            Ok(IndicatorPage {
                page,
                pages: 3,
                observations: vec![RawObservation {
                    indicator: Indicator::Gdp,
                    country: format!("C{page}"),
                    date: "2000".to_string(),
                    value: Some(page as f64),
                }],
            })
        })
        .unwrap();

        assert_eq!(requested, vec![1, 2, 3]);
        let countries: Vec<&str> = observations.iter().map(|o| o.country.as_str()).collect();
        assert_eq!(countries, vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn page_that_does_not_advance_is_malformed() {
        let mut calls = 0;
        let result = collect_pages(Indicator::NetMigration, |_| {
            calls += 1;
            Ok(IndicatorPage {
                page: 1,
                pages: 3,
                observations: Vec::new(),
            })
        });

        match result {
            Err(SourceError::Malformed { code, reason }) => {
                assert_eq!(code, "SM.POP.NETM");
                assert!(reason.contains("requested page 2"), "{reason}");
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn failed_page_stops_paging() {
        let mut calls = 0;
        let result = collect_pages(Indicator::Gdp, |page| {
            calls += 1;
            if page == 2 {
                return Err(SourceError::Status {
                    status: 503,
                    url: "http://localhost".to_string(),
                });
            }
            Ok(IndicatorPage {
                page,
                pages: 5,
                observations: Vec::new(),
            })
        });

        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn url_uses_configured_base_without_trailing_slash() {
        let config = SourceConfig {
            base_url: "http://localhost:9/v2/".to_string(),
            ..SourceConfig::default()
        };
        let client = WorldBankClient::new(&config).unwrap();
        assert_eq!(
            client.indicator_url(Indicator::Gdp),
            "http://localhost:9/v2/country/all/indicator/NY.GDP.PCAP.CD"
        );
    }
}
