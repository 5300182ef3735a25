//! # Prediction Query Builder
//!
//! Derives the CO-OPS datagetter request from the local wall clock. The begin
//! timestamp is always taken at fetch time; a [`PredictionQuery`] is built fresh
//! for every fetch and never reused.
//!
//! ```text
//! https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//!   ?begin_date=20250724+06%3A05&range=120&station=8418150
//!   &product=predictions&datum=MLLW&units=english&time_zone=lst_ldt
//!   &format=json&application=tide_widget
//! ```

use crate::config::{RelayConfig, StationConfig};
use chrono::NaiveDateTime;
use reqwest::Url;

/// `begin_date` layout expected by the datagetter API
pub const BEGIN_DATE_FORMAT: &str = "%Y%m%d %H:%M";

/// Request descriptor for one prediction fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictionQuery {
    pub station: String,
    /// Local time, `YYYYMMDD HH:MM`
    pub begin_date: String,
    /// Forward window in hours
    pub range_hours: u32,
    pub application: String,
}

impl PredictionQuery {
    /// Build the query for `now`, a local wall-clock time.
    pub fn new(station: &StationConfig, now: NaiveDateTime) -> Self {
        Self {
            station: station.id.clone(),
            begin_date: now.format(BEGIN_DATE_FORMAT).to_string(),
            range_hours: station.range_hours,
            application: station.application.clone(),
        }
    }

    /// Query parameters in the order the upstream documents them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("begin_date", self.begin_date.clone()),
            ("range", self.range_hours.to_string()),
            ("station", self.station.clone()),
            ("product", "predictions".to_string()),
            ("datum", "MLLW".to_string()),
            ("units", "english".to_string()),
            ("time_zone", "lst_ldt".to_string()),
            ("format", "json".to_string()),
            ("application", self.application.clone()),
        ]
    }

    /// Direct upstream URL.
    pub fn upstream_url(&self, api_url: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(api_url, self.params())
    }

    /// URL actually requested: the upstream URL, wrapped by the relay when enabled.
    pub fn request_url(&self, api_url: &str, relay: &RelayConfig) -> Result<Url, url::ParseError> {
        let upstream = self.upstream_url(api_url)?;
        if !relay.enabled {
            return Ok(upstream);
        }
        Url::parse_with_params(&relay.url, &[(relay.param.as_str(), upstream.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn begin_date_is_zero_padded() {
        let config = Config::default();
        let query = PredictionQuery::new(&config.station, at(2025, 3, 4, 5, 6));
        assert_eq!(query.begin_date, "20250304 05:06");

        let query = PredictionQuery::new(&config.station, at(2025, 12, 31, 23, 59));
        assert_eq!(query.begin_date, "20251231 23:59");
    }

    #[test]
    fn params_cover_the_fixed_product() {
        let config = Config::default();
        let query = PredictionQuery::new(&config.station, at(2025, 7, 24, 6, 0));
        let params = query.params();

        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("station"), "8418150");
        assert_eq!(get("range"), "120");
        assert_eq!(get("product"), "predictions");
        assert_eq!(get("datum"), "MLLW");
        assert_eq!(get("units"), "english");
        assert_eq!(get("time_zone"), "lst_ldt");
        assert_eq!(get("format"), "json");
        assert_eq!(get("application"), "tide_widget");
    }

    #[test]
    fn direct_request_hits_upstream() {
        let mut config = Config::default();
        config.relay.enabled = false;
        let query = PredictionQuery::new(&config.station, at(2025, 7, 24, 6, 0));

        let url = query
            .request_url(&config.station.api_url, &config.relay)
            .unwrap();
        assert_eq!(url.host_str(), Some("api.tidesandcurrents.noaa.gov"));

        let begin = url
            .query_pairs()
            .find(|(k, _)| k == "begin_date")
            .map(|(_, v)| v.into_owned());
        assert_eq!(begin.as_deref(), Some("20250724 06:00"));
    }

    #[test]
    fn relay_wraps_encoded_upstream_url() {
        let config = Config::default();
        let query = PredictionQuery::new(&config.station, at(2025, 7, 24, 6, 0));

        let upstream = query.upstream_url(&config.station.api_url).unwrap();
        let relayed = query
            .request_url(&config.station.api_url, &config.relay)
            .unwrap();

        assert_eq!(relayed.host_str(), Some("api.allorigins.win"));
        let pairs: Vec<_> = relayed.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "url");
        assert_eq!(pairs[0].1, upstream.as_str());
        // The inner URL must not leak its own parameters into the relay's query
        assert!(!relayed.as_str().contains("&station="));
    }
}
