use crate::ControllerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounds on every wait of a transaction execution.
///
/// Deserializes from millisecond values, missing fields keep their defaults:
///
/// ```
/// use tron_middleware::ControllerOptions;
/// use std::time::Duration;
///
/// let opts: ControllerOptions =
///     serde_json::from_str(r#"{ "poll_timeout_ms": 30000 }"#).unwrap();
/// assert_eq!(opts.poll_timeout, Duration::from_secs(30));
/// assert_eq!(opts.poll_interval, ControllerOptions::default().poll_interval);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Upper bound for producing one signature, user confirmation on a device included.
    ///
    /// Expiry is reported as [`SignerError::DeviceTimeout`] whatever the signer is, a
    /// keystore or an in-memory wallet included.
    ///
    /// [`SignerError::DeviceTimeout`]: tron_signers::SignerError::DeviceTimeout
    #[serde(rename = "sign_timeout_ms", with = "millis")]
    pub sign_timeout: Duration,
    /// Upper bound for a single gateway request (broadcast and each receipt fetch)
    #[serde(rename = "broadcast_timeout_ms", with = "millis")]
    pub broadcast_timeout: Duration,
    /// How long to wait for the receipt after the broadcast was accepted
    #[serde(rename = "poll_timeout_ms", with = "millis")]
    pub poll_timeout: Duration,
    /// Pause between two receipt fetches
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            sign_timeout: Duration::from_secs(120),
            broadcast_timeout: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(60),
            // one block
            poll_interval: Duration::from_secs(3),
        }
    }
}

impl ControllerOptions {
    #[must_use]
    pub fn sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = timeout;
        self
    }

    #[must_use]
    pub fn broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.broadcast_timeout = timeout;
        self
    }

    #[must_use]
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// All bounds must be positive.
    pub fn validate(&self) -> Result<(), ControllerError> {
        let bounds = [
            ("sign_timeout", self.sign_timeout),
            ("broadcast_timeout", self.broadcast_timeout),
            ("poll_timeout", self.poll_timeout),
            ("poll_interval", self.poll_interval),
        ];
        match bounds.iter().find(|(_, value)| value.is_zero()) {
            Some((name, _)) => Err(ControllerError::InvalidOptions(format!("{name} must be positive"))),
            None => Ok(()),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(ControllerOptions::default().validate().is_ok());

        let err = ControllerOptions::default().poll_interval(Duration::ZERO).validate().unwrap_err();
        assert!(matches!(err, ControllerError::InvalidOptions(msg) if msg.starts_with("poll_interval")));
    }
}
