use crate::models::EventType;
use thiserror::Error;

/// Errors surfaced by the `GameApi` port.
#[derive(Debug, Error)]
pub enum GameApiError {
    #[error("remote returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("agent token already set")]
    TokenAlreadySet,
}

/// Errors surfaced by the `Store` port.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Errors an action handler can return. A `HandlerError` bubbling out of a
/// handler is treated identically to an explicit `Fail` outcome: logged
/// with its source chain, completion subscribers are not invoked.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Api(#[from] GameApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no ship named {0}")]
    MissingShip(String),

    #[error("no contract with id {0}")]
    MissingContract(String),

    #[error("no handler registered for {event_type}.{event_name}")]
    NoHandler {
        event_type: EventType,
        event_name: &'static str,
    },

    #[error("invalid request: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_handler_message() {
        let err = HandlerError::NoHandler {
            event_type: EventType::Ship,
            event_name: "teleport",
        };
        assert_eq!(
            err.to_string(),
            "no handler registered for ship.teleport"
        );
    }

    #[test]
    fn test_api_error_wraps_transparently() {
        let remote = GameApiError::Remote {
            status: 429,
            body: "rate limited".to_string(),
        };
        let handler_err: HandlerError = remote.into();
        assert!(handler_err.to_string().contains("429"));
    }
}
