//! Map-tap lookup model.
//!
//! Owns everything the map screen renders for a lookup: the marker, the
//! current phase, the weather reading or error, and the heat index warning.
//! Network work is delegated to `services::lookup_service`; results come back
//! over a channel and are applied by `poll_channel`.
//!
//! Every tap starts a new attempt with a higher number. Results tagged with
//! an older attempt are dropped, so the last tap always wins.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use misty_core::LookupPhase;
use misty_weather::{classify, Coordinate, HazardInfo, HazardTier, LookupError, WeatherReading};
use tokio::runtime::Handle;

use crate::bridge;
use crate::error_mapping;
use crate::services::{
    request_lookup_resolve, request_lookup_weather, LookupServiceMessage, LookupServices,
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Heat index warning shown over the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningState {
    /// Set by each successful lookup, cleared when the user dismisses it
    pub visible: bool,
    /// Session preference; off means never show the warning
    pub enabled: bool,
    /// Tier of the most recent successful lookup
    pub tier: Option<HazardTier>,
}

impl WarningState {
    fn new(enabled: bool) -> Self {
        Self {
            visible: false,
            enabled,
            tier: None,
        }
    }

    /// The warning is rendered only when enabled, not dismissed, and classified
    pub fn should_show(&self) -> bool {
        self.enabled && self.visible && self.tier.is_some()
    }
}

/// What the current attempt has produced so far
#[derive(Debug, Clone, PartialEq)]
enum LookupOutcome {
    Pending,
    Weather(WeatherReading),
    Failed(LookupError),
}

/// State behind the map screen for one sequence of taps
pub struct LookupModel {
    phase: LookupPhase,
    attempt: u64,
    marker: Option<Coordinate>,
    city: Option<String>,
    outcome: LookupOutcome,
    warning: WarningState,
    services: Arc<LookupServices>,
    runtime: Handle,
    tx: Sender<LookupServiceMessage>,
    rx: Receiver<LookupServiceMessage>,
}

impl LookupModel {
    pub fn new(services: Arc<LookupServices>, runtime: Handle, warning_enabled: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            phase: LookupPhase::Idle,
            attempt: 0,
            marker: None,
            city: None,
            outcome: LookupOutcome::Pending,
            warning: WarningState::new(warning_enabled),
            services,
            runtime,
            tx,
            rx,
        }
    }

    /// Build a model from the globally initialized services.
    /// Returns `None` until `bridge::initialize_lookup_services` has succeeded.
    pub fn from_bridge(warning_enabled: bool) -> Option<Self> {
        match bridge::get_lookup_services_and_runtime() {
            Some((services, runtime)) => Some(Self::new(services, runtime, warning_enabled)),
            None => {
                tracing::error!("Cannot create LookupModel - lookup services not ready");
                None
            }
        }
    }

    /// Start a lookup for a tapped coordinate. Returns the attempt number.
    ///
    /// Clears the previous reading, error and warning tier before anything
    /// is reported for the new attempt.
    pub fn tap(&mut self, coordinate: Coordinate) -> u64 {
        self.attempt += 1;
        self.phase = self.phase.on_tap();
        self.marker = Some(coordinate);
        self.city = None;
        self.outcome = LookupOutcome::Pending;
        self.warning.visible = false;
        self.warning.tier = None;

        tracing::info!("Lookup #{} started at {}", self.attempt, coordinate);
        request_lookup_resolve(
            &self.tx,
            &self.runtime,
            &self.services,
            self.attempt,
            coordinate,
        );
        self.attempt
    }

    /// Apply every result waiting on the channel.
    /// Returns true if any of them changed what the screen shows.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(msg) => changed |= self.handle_message(msg),
                Err(TryRecvError::Empty) => return changed,
                // The model holds a sender itself, so this is unreachable in practice
                Err(TryRecvError::Disconnected) => return changed,
            }
        }
    }

    /// Poll until the current attempt settles or `timeout` elapses.
    /// Returns false on timeout.
    pub async fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            self.poll_channel();
            if !self.phase.is_busy() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Apply one service result. Results for superseded attempts are dropped.
    pub fn handle_message(&mut self, msg: LookupServiceMessage) -> bool {
        if msg.attempt() != self.attempt {
            tracing::debug!(
                "Discarding result for lookup #{} (current is #{})",
                msg.attempt(),
                self.attempt
            );
            return false;
        }

        match msg {
            LookupServiceMessage::CityResolved { result, .. } => {
                if self.phase != LookupPhase::Resolving {
                    return false;
                }
                self.phase = self.phase.on_resolved(result.is_ok());
                match result {
                    Ok(city) => {
                        tracing::info!("Lookup #{} resolved city {}", self.attempt, city);
                        request_lookup_weather(
                            &self.tx,
                            &self.runtime,
                            &self.services,
                            self.attempt,
                            city.clone(),
                        );
                        self.city = Some(city);
                    }
                    Err(e) => self.fail(e),
                }
                true
            }
            LookupServiceMessage::WeatherFetched { result, .. } => {
                if self.phase != LookupPhase::FetchingWeather {
                    return false;
                }
                self.phase = self.phase.on_fetched(result.is_ok());
                match result {
                    Ok(reading) => {
                        let tier = classify(reading.feels_like_c);
                        tracing::info!(
                            "Lookup #{} classified {} at {:.1}°C as {:?}",
                            self.attempt,
                            reading.city_name,
                            reading.feels_like_c,
                            tier
                        );
                        self.outcome = LookupOutcome::Weather(reading);
                        self.warning.tier = Some(tier);
                        self.warning.visible = true;
                    }
                    Err(e) => self.fail(e),
                }
                true
            }
        }
    }

    fn fail(&mut self, error: LookupError) {
        tracing::warn!("Lookup #{} failed: {}", self.attempt, error);
        self.outcome = LookupOutcome::Failed(error);
        self.warning.visible = false;
        self.warning.tier = None;
    }

    /// Flip the session warning preference. Never triggers a lookup.
    pub fn set_warning_enabled(&mut self, enabled: bool) {
        self.warning.enabled = enabled;
    }

    pub fn toggle_warning_enabled(&mut self) {
        self.warning.enabled = !self.warning.enabled;
    }

    /// Hide the current warning; the reading and tier stay on screen
    pub fn dismiss_warning(&mut self) {
        self.warning.visible = false;
    }

    pub fn phase(&self) -> LookupPhase {
        self.phase
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Map marker position (the last tap)
    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    /// City resolved for the current attempt, once known
    pub fn resolved_city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match &self.outcome {
            LookupOutcome::Weather(reading) => Some(reading),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match &self.outcome {
            LookupOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Short message for the error line under the map
    pub fn error_message(&self) -> Option<&'static str> {
        self.error().map(error_mapping::user_message)
    }

    pub fn warning(&self) -> WarningState {
        self.warning
    }

    pub fn should_show_warning(&self) -> bool {
        self.warning.should_show()
    }

    /// Title, explanation and colour for the warning, if there is a tier
    pub fn hazard_info(&self) -> Option<&'static HazardInfo> {
        self.warning.tier.map(HazardTier::info)
    }
}
