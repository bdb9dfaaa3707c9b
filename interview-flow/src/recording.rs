//! Exclusive microphone ownership for interview audio recording.
//!
//! One recording session at a time holds the device. The holder releases
//! it by stopping the guard or by dropping it (interview completion,
//! teardown).

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::RecordingError;

/// A recording device shared between interview sessions.
#[derive(Debug)]
pub struct AudioDevice {
    name: String,
    holder: Mutex<Option<String>>,
}

impl AudioDevice {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            holder: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session currently recording, if any.
    pub fn holder(&self) -> Option<String> {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take exclusive access for `session_id`.
    pub fn acquire(self: &Arc<Self>, session_id: &str) -> Result<RecordingGuard, RecordingError> {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = holder.as_ref() {
            return Err(RecordingError::DeviceBusy {
                device: self.name.clone(),
                holder: current.clone(),
            });
        }
        *holder = Some(session_id.to_string());
        info!(device = %self.name, session = session_id, "recording started");

        Ok(RecordingGuard {
            device: Arc::clone(self),
            session_id: session_id.to_string(),
            started_at: Utc::now(),
        })
    }

    fn release(&self, session_id: &str) {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        if holder.as_deref() == Some(session_id) {
            *holder = None;
            debug!(device = %self.name, session = session_id, "device released");
        }
    }
}

/// Exclusive access to an `AudioDevice`. Releases the device on drop.
#[derive(Debug)]
pub struct RecordingGuard {
    device: Arc<AudioDevice>,
    session_id: String,
    started_at: DateTime<Utc>,
}

impl RecordingGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Stop recording and release the device. Returns the recording length.
    pub fn stop(self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

impl Drop for RecordingGuard {
    fn drop(&mut self) {
        self.device.release(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_session_is_refused_while_recording() {
        let mic = AudioDevice::new("mic0");
        let guard = mic.acquire("s1").unwrap();
        assert_eq!(
            mic.acquire("s2").unwrap_err(),
            RecordingError::DeviceBusy {
                device: "mic0".into(),
                holder: "s1".into()
            }
        );
        assert_eq!(guard.session_id(), "s1");
    }

    #[test]
    fn stop_releases_device() {
        let mic = AudioDevice::new("mic0");
        let guard = mic.acquire("s1").unwrap();
        assert!(guard.stop() >= chrono::Duration::zero());
        assert!(mic.holder().is_none());
        assert!(mic.acquire("s2").is_ok());
    }

    #[test]
    fn drop_releases_device() {
        let mic = AudioDevice::new("mic0");
        {
            let _guard = mic.acquire("s1").unwrap();
            assert_eq!(mic.holder().as_deref(), Some("s1"));
        }
        assert!(mic.holder().is_none());
    }
}
