//! # NOAA Tide Prediction Fetching
//!
//! This module performs the single network round trip behind each widget fetch:
//! build the request URL (optionally wrapped by a CORS relay), GET it once, and
//! turn the CO-OPS JSON envelope into a list of [`RawPrediction`]s.
//!
//! ## Data Source
//!
//! ### NOAA CO-OPS datagetter
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Product**: `predictions`, MLLW datum, English units, local standard/daylight time
//! - **Success body**: `{"predictions": [{"t": "2025-07-24 00:00", "v": "3.412"}, ...]}`
//! - **Failure body**: `{"error": {"message": "No Predictions data was found..."}}`
//!
//! ## Error Handling
//!
//! Every failure mode maps to one [`TideError`] variant:
//! - **Transport**: connection refused, DNS, TLS, timeouts
//! - **Status**: the relay or upstream answered with a non-2xx code
//! - **Json**: the body is not a JSON document of the expected shape
//! - **Upstream**: CO-OPS answered 200 with an embedded error message
//! - **NoPredictions**: the list is missing or empty
//!
//! There is no retry and no partial data. The caller decides what to show.

use crate::config::Config;
use crate::query::PredictionQuery;
use crate::RawPrediction;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching and transforming tide predictions.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, TLS, or timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay or upstream returned a non-success status
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body could not be decoded as the CO-OPS envelope
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// CO-OPS reported a logical error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The envelope carried no predictions
    #[error("no predictions in response")]
    NoPredictions,

    /// A prediction value did not parse as a number
    #[error("invalid water level {value:?} at index {index}")]
    InvalidValue { index: usize, value: String },

    /// A prediction timestamp did not parse
    #[error("invalid timestamp {value:?} at index {index}")]
    InvalidTimestamp { index: usize, value: String },

    /// The configured endpoint or relay is not a valid URL
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// CO-OPS response envelope. Either field may be absent.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    predictions: Option<Vec<RawPrediction>>,
    #[serde(default)]
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    #[serde(default)]
    message: String,
}

/// Thin wrapper around a configured `reqwest::Client`.
///
/// One client is built per process and reused for every fetch; each call to
/// [`TideClient::fetch`] still issues exactly one request.
#[derive(Clone, Debug)]
pub struct TideClient {
    http: reqwest::Client,
    config: Config,
}

impl TideClient {
    pub fn new(config: Config) -> Result<Self, TideError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.station.timeout_secs))
            .user_agent(concat!("tide-widget/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch predictions for `query`.
    ///
    /// # Returns
    /// - `Ok(Vec<RawPrediction>)`: at least one prediction, in upstream order
    /// - `Err(TideError)`: any of the failure modes listed in the module docs
    ///
    /// # Example
    /// ```no_run
    /// use tide_widget_lib::{config::Config, query::PredictionQuery, tide_data::TideClient};
    ///
    /// # async fn demo() -> Result<(), tide_widget_lib::tide_data::TideError> {
    /// let config = Config::default();
    /// let query = PredictionQuery::new(&config.station, chrono::Local::now().naive_local());
    /// let client = TideClient::new(config)?;
    /// let predictions = client.fetch(&query).await?;
    /// println!("{} predictions", predictions.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, query: &PredictionQuery) -> Result<Vec<RawPrediction>, TideError> {
        let url = query.request_url(&self.config.station.api_url, &self.config.relay)?;
        debug!(%url, station = %query.station, begin = %query.begin_date, "requesting predictions");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        parse_response(status, &body)
    }
}

/// Decode a relay/upstream response into predictions.
///
/// Status is checked first, then JSON shape, then the embedded error, then the
/// list itself. A body carrying both `error` and `predictions` is treated as an
/// error.
pub fn parse_response(status: StatusCode, body: &[u8]) -> Result<Vec<RawPrediction>, TideError> {
    if !status.is_success() {
        return Err(TideError::Status(status.as_u16()));
    }

    let envelope: Envelope = serde_json::from_slice(body)?;

    if let Some(err) = envelope.error {
        return Err(TideError::Upstream(err.message));
    }

    match envelope.predictions {
        Some(predictions) if !predictions.is_empty() => Ok(predictions),
        _ => Err(TideError::NoPredictions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{"predictions":[
        {"t":"2025-07-24 00:00","v":"3.412"},
        {"t":"2025-07-24 00:06","v":"3.288"}
    ]}"#;

    #[test]
    fn parses_predictions_in_order() {
        let predictions = parse_response(StatusCode::OK, OK_BODY.as_bytes()).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].t, "2025-07-24 00:00");
        assert_eq!(predictions[1].v, "3.288");
    }

    #[test]
    fn non_success_status_is_an_error() {
        let err = parse_response(StatusCode::BAD_GATEWAY, OK_BODY.as_bytes()).unwrap_err();
        assert!(matches!(err, TideError::Status(502)));
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = parse_response(StatusCode::OK, b"<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, TideError::Json(_)));
    }

    #[test]
    fn embedded_error_carries_message() {
        let body = br#"{"error":{"message":"No Predictions data was found."}}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        match err {
            TideError::Upstream(message) => assert_eq!(message, "No Predictions data was found."),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn embedded_error_wins_over_predictions() {
        let body = br#"{"error":{"message":"X"},"predictions":[{"t":"2025-07-24 00:00","v":"1"}]}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(TideError::Upstream(_))
        ));
    }

    #[test]
    fn empty_or_missing_predictions_are_errors() {
        assert!(matches!(
            parse_response(StatusCode::OK, br#"{"predictions":[]}"#),
            Err(TideError::NoPredictions)
        ));
        assert!(matches!(
            parse_response(StatusCode::OK, b"{}"),
            Err(TideError::NoPredictions)
        ));
        assert!(matches!(
            parse_response(StatusCode::OK, br#"{"predictions":null}"#),
            Err(TideError::NoPredictions)
        ));
    }

    #[test]
    fn error_messages_are_readable() {
        assert_eq!(TideError::Status(404).to_string(), "unexpected HTTP status 404");
        assert_eq!(
            TideError::Upstream("X".into()).to_string(),
            "upstream error: X"
        );
    }
}
