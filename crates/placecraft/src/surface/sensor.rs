//! Contract with the surface-reconstruction sensor service

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::AnchorEvent;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Allowed,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Initialized,
    Running,
    Paused,
    Stopped,
}

/// Session lifecycle notifications, delivered separately from anchor updates
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AuthorizationChanged(AuthorizationStatus),
    DataProviderStateChanged {
        state: ProviderState,
        error: Option<String>,
    },
}

/// Streams handed out by a running sensor session
pub struct SensorStreams {
    pub anchors: BoxStream<'static, AnchorEvent>,
    pub session_events: BoxStream<'static, SessionEvent>,
}

/// Surface-reconstruction service
#[async_trait]
pub trait SurfaceSensor: Send + Sync {
    /// Capability check; an unsupported sensor is never started
    fn is_supported(&self) -> bool;

    /// Resolves once the session is running or has failed
    async fn start(&self) -> Result<SensorStreams, SensorError>;

    /// Resolves once the session has fully stopped
    async fn stop(&self) -> Result<(), SensorError>;
}

/// Sensor whose events are pushed in by hand through a [`ReplayHandle`].
///
/// Supports a single session; starting a second time reports
/// [`SensorError::ResourceBusy`].
pub struct ReplaySensor {
    supported: bool,
    start_error: Option<SensorError>,
    receivers: Mutex<Option<(UnboundedReceiver<AnchorEvent>, UnboundedReceiver<SessionEvent>)>>,
    running: AtomicBool,
}

/// Producer side of a [`ReplaySensor`]
#[derive(Clone)]
pub struct ReplayHandle {
    anchors: UnboundedSender<AnchorEvent>,
    session_events: UnboundedSender<SessionEvent>,
}

impl ReplayHandle {
    /// Queue an anchor event; returns false once the session is gone
    pub fn push(&self, event: AnchorEvent) -> bool {
        self.anchors.send(event).is_ok()
    }

    pub fn push_session_event(&self, event: SessionEvent) -> bool {
        self.session_events.send(event).is_ok()
    }
}

impl ReplaySensor {
    pub fn new() -> (Self, ReplayHandle) {
        let (anchor_tx, anchor_rx) = unbounded_channel();
        let (session_tx, session_rx) = unbounded_channel();
        let sensor = Self {
            supported: true,
            start_error: None,
            receivers: Mutex::new(Some((anchor_rx, session_rx))),
            running: AtomicBool::new(false),
        };
        let handle = ReplayHandle {
            anchors: anchor_tx,
            session_events: session_tx,
        };
        (sensor, handle)
    }

    /// A sensor whose capability check reports unsupported
    pub fn unsupported() -> Self {
        let (mut sensor, _) = Self::new();
        sensor.supported = false;
        sensor
    }

    /// Make `start` fail with `error`
    pub fn failing_with(mut self, error: SensorError) -> Self {
        self.start_error = Some(error);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn receiver_stream<T: Send + 'static>(rx: UnboundedReceiver<T>) -> BoxStream<'static, T> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
}

#[async_trait]
impl SurfaceSensor for ReplaySensor {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn start(&self) -> Result<SensorStreams, SensorError> {
        if !self.supported {
            return Err(SensorError::Unsupported);
        }
        if let Some(error) = &self.start_error {
            return Err(error.clone());
        }

        let taken = self
            .receivers
            .lock()
            .map_err(|_| SensorError::Session("replay state poisoned".to_string()))?
            .take();
        let (anchors, session_events) = taken.ok_or(SensorError::ResourceBusy)?;
        self.running.store(true, Ordering::SeqCst);

        Ok(SensorStreams {
            anchors: receiver_stream(anchors),
            session_events: receiver_stream(session_events),
        })
    }

    async fn stop(&self) -> Result<(), SensorError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Transform;
    use crate::surface::{AnchorSnapshot, PatchGeometry, SurfaceLabel};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_replay_streams_deliver_in_order() {
        let (sensor, handle) = ReplaySensor::new();
        let mut streams = sensor.start().await.unwrap();
        assert!(sensor.is_running());

        let first = AnchorSnapshot::new(
            Uuid::new_v4(),
            Transform::IDENTITY,
            PatchGeometry::rectangle(1.0, 1.0, SurfaceLabel::Floor),
        );
        let second = AnchorSnapshot { id: Uuid::new_v4(), ..first.clone() };
        assert!(handle.push(AnchorEvent::added(first.clone())));
        assert!(handle.push(AnchorEvent::added(second.clone())));

        assert_eq!(streams.anchors.next().await.unwrap().id(), first.id);
        assert_eq!(streams.anchors.next().await.unwrap().id(), second.id);

        handle.push_session_event(SessionEvent::AuthorizationChanged(AuthorizationStatus::Denied));
        assert_eq!(
            streams.session_events.next().await,
            Some(SessionEvent::AuthorizationChanged(AuthorizationStatus::Denied))
        );

        sensor.stop().await.unwrap();
        assert!(!sensor.is_running());
    }

    #[tokio::test]
    async fn test_second_session_is_busy() {
        let (sensor, _handle) = ReplaySensor::new();
        let _streams = sensor.start().await.unwrap();
        assert!(matches!(sensor.start().await, Err(SensorError::ResourceBusy)));
    }

    #[tokio::test]
    async fn test_unsupported_and_failing() {
        let sensor = ReplaySensor::unsupported();
        assert!(!sensor.is_supported());
        assert!(matches!(sensor.start().await, Err(SensorError::Unsupported)));

        let (sensor, _) = ReplaySensor::new();
        let sensor = sensor.failing_with(SensorError::PermissionDenied);
        assert!(matches!(sensor.start().await, Err(SensorError::PermissionDenied)));
    }
}
