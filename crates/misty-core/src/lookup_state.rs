//! Lookup pipeline state machine (resolve city, fetch weather, classify).
//!
//! Tracks where the current map-tap attempt is. Used by LookupModel.

/// Phase of the most recently started lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPhase {
    #[default]
    Idle,
    Resolving,
    FetchingWeather,
    Classified,
    Error,
}

impl LookupPhase {
    /// State after a map tap. Always allowed: a tap supersedes any attempt in flight.
    #[must_use]
    pub fn on_tap(self) -> Self {
        LookupPhase::Resolving
    }

    /// State after the reverse geocode result arrives.
    /// Results arriving outside `Resolving` leave the phase unchanged.
    #[must_use]
    pub fn on_resolved(self, succeeded: bool) -> Self {
        match self {
            LookupPhase::Resolving if succeeded => LookupPhase::FetchingWeather,
            LookupPhase::Resolving => LookupPhase::Error,
            other => other,
        }
    }

    /// State after the weather result arrives.
    /// Results arriving outside `FetchingWeather` leave the phase unchanged.
    #[must_use]
    pub fn on_fetched(self, succeeded: bool) -> Self {
        match self {
            LookupPhase::FetchingWeather if succeeded => LookupPhase::Classified,
            LookupPhase::FetchingWeather => LookupPhase::Error,
            other => other,
        }
    }

    /// True while a network call for the current attempt is outstanding.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, LookupPhase::Resolving | LookupPhase::FetchingWeather)
    }

    /// True once the current attempt has produced its outcome.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, LookupPhase::Classified | LookupPhase::Error)
    }
}
