use thiserror::Error;

/// Failures surfaced by the TimeZoneDB client.
///
/// Every failure mode gets its own variant so callers can match on the kind
/// instead of inspecting message text. Parse failures carry the offending
/// field name.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad constructor arguments, e.g. a blank API key. Never reaches the
    /// network.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A request model was constructed from out-of-range or blank inputs.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure or non-success HTTP status. Not retried here.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be parsed as a TimeZoneDB payload at all.
    #[error("empty or unreadable response body: {0}")]
    EmptyResponse(String),

    /// The `status` field was absent or neither `OK` nor `FAILED`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// `zoneName` is not a recognized IANA time zone identifier.
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    /// A field was present but its value could not be parsed into the
    /// target type.
    #[error("malformed field `{field}`: cannot parse {value:?}")]
    MalformedField {
        field: &'static str,
        value: String,
    },

    /// The caller's cancellation signal fired before the call completed.
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn malformed_field(field: &'static str, value: &str) -> Self {
        Error::MalformedField {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_field_names_the_field() {
        let err = Error::malformed_field("gmtOffset", "garbage");
        assert_eq!(
            err.to_string(),
            "malformed field `gmtOffset`: cannot parse \"garbage\""
        );
    }

    #[test]
    fn variants_are_discriminable() {
        let err = Error::UnknownTimeZone("Not/AZone".to_string());
        assert!(matches!(err, Error::UnknownTimeZone(name) if name == "Not/AZone"));
    }
}
