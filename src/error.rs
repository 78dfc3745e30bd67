use thiserror::Error;

/// Validation and precondition failures. All of these are raised before any
/// search work begins; once a [`crate::schedule::Schedule`] is built and a
/// query has passed validation, nothing in the driver can fail — every
/// lookup it performs is bounded by data the schedule already validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("station query '{0}' matched no known station")]
    NoStationMatch(String),
    #[error("stop '{0}' does not belong to station '{1}'")]
    StartPlatformMismatch(String, String),
    #[error("station '{0}' has no platforms to depart from")]
    NoDeparturePlatform(String),
    #[error("no stop within the initial walk radius of the given address")]
    NoStationsNearAddress,
    #[error("at least 2 participants are required for a meeting search, got {0}")]
    TooFewParticipants(usize),
    #[error("at most {max} participants are supported, got {got}")]
    TooManyParticipants { got: usize, max: usize },
    #[error("empty station query")]
    EmptyQuery,
    #[error("malformed start time '{0}'")]
    MalformedTime(String),
}
