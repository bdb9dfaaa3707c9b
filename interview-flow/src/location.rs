//! Location acquisition.
//!
//! Strategies are tried in order and the first success wins. The
//! conventional order is network geolocation, high-accuracy GPS, a maps
//! geolocation service, and finally manual entry by the interviewer. Each
//! strategy runs under its own timeout; failures are logged and the chain
//! moves on. Only when every strategy failed does the caller get
//! `LocationError::Unavailable`, typically answered with a remediation
//! dialog and an option to continue without location.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{LocationConfig, LocationFix, LocationSource};

/// Why a single strategy produced no fix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("not supported on this device")]
    Unsupported,

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The interviewer dismissed the manual entry prompt.
    #[error("declined by interviewer")]
    Declined,

    #[error("{0}")]
    Failed(String),
}

/// A failed strategy, kept for the terminal error.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationAttempt {
    pub source: LocationSource,
    pub error: StrategyError,
}

/// Error type for location acquisition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location unavailable after {} attempt(s)", attempts.len())]
    Unavailable { attempts: Vec<LocationAttempt> },
}

/// One way of obtaining the device position.
#[async_trait]
pub trait LocationStrategy: Send + Sync {
    /// Where fixes from this strategy come from. Also selects the timeout.
    fn source(&self) -> LocationSource;

    async fn locate(&self) -> Result<LocationFix, StrategyError>;
}

/// Prompt shown to the interviewer when automatic strategies failed.
#[async_trait]
pub trait ManualPrompt: Send + Sync {
    /// Returns `(latitude, longitude)`, or `None` if the interviewer dismissed the prompt.
    async fn request_coordinates(&self) -> Option<(f64, f64)>;
}

/// Manual entry as the last strategy of a chain.
pub struct ManualEntry<P> {
    prompt: P,
}

impl<P: ManualPrompt> ManualEntry<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }
}

#[async_trait]
impl<P: ManualPrompt> LocationStrategy for ManualEntry<P> {
    fn source(&self) -> LocationSource {
        LocationSource::Manual
    }

    async fn locate(&self) -> Result<LocationFix, StrategyError> {
        let (latitude, longitude) = self
            .prompt
            .request_coordinates()
            .await
            .ok_or(StrategyError::Declined)?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(StrategyError::Failed(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(LocationFix {
            latitude,
            longitude,
            accuracy: None,
            source: LocationSource::Manual,
        })
    }
}

/// Ordered list of strategies with per-source timeouts.
pub struct LocationChain {
    strategies: Vec<Box<dyn LocationStrategy>>,
    config: LocationConfig,
}

impl LocationChain {
    pub fn new(config: LocationConfig) -> Self {
        Self {
            strategies: Vec::new(),
            config,
        }
    }

    /// Append a strategy; strategies run in insertion order.
    pub fn with_strategy(mut self, strategy: impl LocationStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run the chain; see `acquire_location`.
    pub async fn acquire(&self) -> Result<LocationFix, LocationError> {
        acquire_location(&self.strategies, &self.config).await
    }
}

/// Try each strategy in order under its configured timeout; first success wins.
pub async fn acquire_location(
    strategies: &[Box<dyn LocationStrategy>],
    config: &LocationConfig,
) -> Result<LocationFix, LocationError> {
    let mut attempts = Vec::new();

    for strategy in strategies {
        let source = strategy.source();
        let limit = config.timeout(source);
        let error = match tokio::time::timeout(limit, strategy.locate()).await {
            Ok(Ok(fix)) => {
                info!(%source, accuracy = ?fix.accuracy, "location acquired");
                return Ok(fix);
            }
            Ok(Err(error)) => error,
            Err(_) => StrategyError::TimedOut(limit),
        };
        warn!(%source, %error, "location strategy failed, trying next");
        attempts.push(LocationAttempt { source, error });
    }

    Err(LocationError::Unavailable { attempts })
}

/// Location state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LocationState {
    /// Not acquired yet.
    #[default]
    Missing,

    Acquired(LocationFix),

    /// The interviewer chose to continue without a location.
    Waived,
}

impl LocationState {
    pub fn fix(&self) -> Option<LocationFix> {
        match self {
            Self::Acquired(fix) => Some(*fix),
            _ => None,
        }
    }

    /// Check if the interview may proceed.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Fails(LocationSource, StrategyError, Arc<AtomicUsize>);

    #[async_trait]
    impl LocationStrategy for Fails {
        fn source(&self) -> LocationSource {
            self.0
        }

        async fn locate(&self) -> Result<LocationFix, StrategyError> {
            self.2.fetch_add(1, Ordering::SeqCst);
            Err(self.1.clone())
        }
    }

    struct Hangs(LocationSource);

    #[async_trait]
    impl LocationStrategy for Hangs {
        fn source(&self) -> LocationSource {
            self.0
        }

        async fn locate(&self) -> Result<LocationFix, StrategyError> {
            std::future::pending().await
        }
    }

    struct Succeeds(LocationSource, Arc<AtomicUsize>);

    #[async_trait]
    impl LocationStrategy for Succeeds {
        fn source(&self) -> LocationSource {
            self.0
        }

        async fn locate(&self) -> Result<LocationFix, StrategyError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            Ok(LocationFix {
                latitude: 22.57,
                longitude: 88.36,
                accuracy: Some(35.0),
                source: self.0,
            })
        }
    }

    struct Prompt(Option<(f64, f64)>);

    #[async_trait]
    impl ManualPrompt for Prompt {
        async fn request_coordinates(&self) -> Option<(f64, f64)> {
            self.0
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_wins_and_later_strategies_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = LocationChain::new(LocationConfig::default())
            .with_strategy(Fails(LocationSource::Network, StrategyError::PermissionDenied, calls.clone()))
            .with_strategy(Hangs(LocationSource::Gps))
            .with_strategy(Succeeds(LocationSource::MapsService, calls.clone()))
            .with_strategy(Succeeds(LocationSource::Manual, calls.clone()));

        let fix = chain.acquire().await.unwrap();
        assert_eq!(fix.source, LocationSource::MapsService);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_lists_every_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = LocationChain::new(LocationConfig::default())
            .with_strategy(Fails(LocationSource::Network, StrategyError::Unsupported, calls.clone()))
            .with_strategy(Hangs(LocationSource::Gps))
            .with_strategy(ManualEntry::new(Prompt(None)));

        let LocationError::Unavailable { attempts } = chain.acquire().await.unwrap_err();
        let sources: Vec<_> = attempts.iter().map(|a| a.source).collect();
        assert_eq!(
            sources,
            [LocationSource::Network, LocationSource::Gps, LocationSource::Manual]
        );
        assert_eq!(attempts[1].error, StrategyError::TimedOut(Duration::from_secs(15)));
        assert_eq!(attempts[2].error, StrategyError::Declined);
    }

    #[tokio::test]
    async fn manual_entry_validates_range() {
        let fix = ManualEntry::new(Prompt(Some((22.5, 88.3)))).locate().await.unwrap();
        assert_eq!(fix.source, LocationSource::Manual);

        let bad = ManualEntry::new(Prompt(Some((122.5, 88.3)))).locate().await;
        assert!(matches!(bad, Err(StrategyError::Failed(_))));
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let chain = LocationChain::new(LocationConfig::default());
        assert!(chain.is_empty());
        assert_eq!(
            chain.acquire().await,
            Err(LocationError::Unavailable { attempts: vec![] })
        );
    }

    #[test]
    fn waived_location_is_resolved_without_fix() {
        assert!(LocationState::Waived.is_resolved());
        assert!(LocationState::Waived.fix().is_none());
        assert!(!LocationState::Missing.is_resolved());
    }
}
