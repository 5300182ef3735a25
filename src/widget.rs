//! # Tide Widget State Machine
//!
//! The widget owns exactly one [`FetchState`] and moves it through
//! `Loading → Ready | Error`. A manual refresh from either terminal state goes
//! back to `Loading`; refresh while `Loading` is refused, so at most one fetch is
//! ever in flight.
//!
//! Fetching itself happens outside the widget. [`TideWidget::mount`] and
//! [`TideWidget::refresh`] hand out a [`FetchTicket`] carrying a freshly built
//! query and a sequence number; the caller performs the request and passes the
//! outcome back to [`TideWidget::complete`]. Only the ticket with the latest
//! sequence number may commit, which keeps the newest fetch authoritative even
//! if a caller bypasses the refresh guard.

use crate::config::Config;
use crate::query::PredictionQuery;
use crate::tide_data::{TideClient, TideError};
use crate::transform::transform;
use crate::{ChartData, RawPrediction};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info};

/// Current presentation state. Replaced wholesale on every transition.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchState {
    Loading,
    Error,
    Ready(ChartData),
}

/// Permission to run one fetch. Not `Clone`: each ticket commits at most once.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    query: PredictionQuery,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &PredictionQuery {
        &self.query
    }

    /// Run the request this ticket describes.
    pub async fn run(&self, client: &TideClient) -> Result<Vec<RawPrediction>, TideError> {
        client.fetch(&self.query).await
    }
}

/// The single indicator a view shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Indicator<'a> {
    Loading,
    Error,
    Chart(&'a ChartData),
}

/// What the rendering surface should draw right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View<'a> {
    pub indicator: Indicator<'a>,
    pub refresh_enabled: bool,
}

pub struct TideWidget {
    config: Config,
    state: FetchState,
    latest_seq: u64,
}

impl TideWidget {
    /// Create the widget in `Loading` along with the ticket for its one
    /// automatic fetch.
    pub fn mount(config: Config) -> (Self, FetchTicket) {
        Self::mount_at(config, Local::now().naive_local())
    }

    /// [`TideWidget::mount`] with an explicit local wall-clock time.
    pub fn mount_at(config: Config, now: NaiveDateTime) -> (Self, FetchTicket) {
        let mut widget = Self {
            config,
            state: FetchState::Loading,
            latest_seq: 0,
        };
        let ticket = widget.issue(now);
        info!(station = %widget.config.station.id, "widget mounted");
        (widget, ticket)
    }

    /// Request a manual refresh. Returns `None` while a fetch is in flight.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.refresh_at(Local::now().naive_local())
    }

    /// [`TideWidget::refresh`] with an explicit local wall-clock time.
    pub fn refresh_at(&mut self, now: NaiveDateTime) -> Option<FetchTicket> {
        if !self.can_refresh() {
            debug!(seq = self.latest_seq, "refresh ignored while loading");
            return None;
        }
        Some(self.issue(now))
    }

    fn issue(&mut self, now: NaiveDateTime) -> FetchTicket {
        self.latest_seq += 1;
        self.state = FetchState::Loading;
        let query = PredictionQuery::new(&self.config.station, now);
        debug!(seq = self.latest_seq, begin = %query.begin_date, "fetch issued");
        FetchTicket {
            seq: self.latest_seq,
            query,
        }
    }

    /// Commit the outcome of a fetch.
    ///
    /// Returns `false` and leaves the state untouched when the ticket has been
    /// superseded by a newer one.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawPrediction>, TideError>,
    ) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding superseded fetch result"
            );
            return false;
        }

        let outcome = result.and_then(|predictions| transform(&predictions, self.config.chart.sign));
        self.state = match outcome {
            Ok(chart) => {
                info!(
                    seq = ticket.seq,
                    samples = chart.series.len(),
                    "tide predictions ready"
                );
                FetchState::Ready(chart)
            }
            Err(e) => {
                error!(
                    seq = ticket.seq,
                    station = %ticket.query.station,
                    error = %e,
                    "tide fetch failed"
                );
                FetchState::Error
            }
        };
        true
    }

    /// Run a ticket to completion against `client` and commit the result.
    pub async fn fetch_with(&mut self, client: &TideClient, ticket: FetchTicket) -> bool {
        let result = ticket.run(client).await;
        self.complete(ticket, result)
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.state == FetchState::Loading
    }

    /// The refresh control is enabled only outside `Loading`.
    pub fn can_refresh(&self) -> bool {
        !self.is_loading()
    }

    pub fn view(&self) -> View<'_> {
        let indicator = match &self.state {
            FetchState::Loading => Indicator::Loading,
            FetchState::Error => Indicator::Error,
            FetchState::Ready(chart) => Indicator::Chart(chart),
        };
        View {
            indicator,
            refresh_enabled: self.can_refresh(),
        }
    }
}
