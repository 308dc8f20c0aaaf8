use std::fmt;

#[derive(Debug)]
pub enum PongError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    Publish(rumqttc::ClientError),
    /// The peer link is not open; the message was not sent.
    LinkClosed,
}

impl fmt::Display for PongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "failed to encode message: {e}"),
            Self::Decode(e) => write!(f, "failed to decode message: {e}"),
            Self::Publish(e) => write!(f, "failed to publish to broker: {e}"),
            Self::LinkClosed => write!(f, "peer link is not open"),
        }
    }
}

impl std::error::Error for PongError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(e) | Self::Decode(e) => Some(e),
            Self::Publish(e) => Some(e),
            Self::LinkClosed => None,
        }
    }
}

impl From<rumqttc::ClientError> for PongError {
    fn from(e: rumqttc::ClientError) -> Self {
        Self::Publish(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn decode_failure_keeps_the_json_error_as_source() {
        let json_error = serde_json::from_slice::<u32>(b"{").unwrap_err();
        let error = PongError::Decode(json_error);
        assert!(error.to_string().starts_with("failed to decode message"));
        assert!(error.source().is_some());
    }

    #[test]
    fn closed_link_has_no_source() {
        assert_eq!(PongError::LinkClosed.to_string(), "peer link is not open");
        assert!(PongError::LinkClosed.source().is_none());
    }
}
