//! Notification contract for gesture consumers

use tokio::sync::mpsc::UnboundedSender;

use super::GestureEvent;
use crate::spatial::{Point3D, Transform};

/// Fire-and-forget callbacks. Every method defaults to a no-op so observers
/// implement only what they need.
pub trait InteractionObserver: Send {
    /// Fires on every applied sample, whatever the gesture kind
    fn on_transform_changed(&self, _entity: &str, _transform: &Transform) {}

    fn on_gesture_event(&self, _event: &GestureEvent) {}

    /// Fires on every drag sample whose downward raycast hit something
    fn on_placement_status_changed(&self, _entity: &str, _allowed: bool, _position: Point3D) {}
}

/// Channel form of the observer callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    TransformChanged {
        entity: String,
        transform: Transform,
    },
    Gesture(GestureEvent),
    PlacementStatus {
        entity: String,
        allowed: bool,
        position: Point3D,
    },
}

impl InteractionObserver for UnboundedSender<Notification> {
    fn on_transform_changed(&self, entity: &str, transform: &Transform) {
        let _ = self.send(Notification::TransformChanged {
            entity: entity.to_string(),
            transform: *transform,
        });
    }

    fn on_gesture_event(&self, event: &GestureEvent) {
        let _ = self.send(Notification::Gesture(event.clone()));
    }

    fn on_placement_status_changed(&self, entity: &str, allowed: bool, position: Point3D) {
        let _ = self.send(Notification::PlacementStatus {
            entity: entity.to_string(),
            allowed,
            position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureEventKind, GestureKind};
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_channel_observer_forwards_everything() {
        let (tx, mut rx) = unbounded_channel();
        tx.on_transform_changed("cube", &Transform::IDENTITY);
        tx.on_gesture_event(&GestureEvent::new(
            GestureEventKind::Ended,
            GestureKind::Drag,
            "cube",
            Transform::IDENTITY,
        ));
        tx.on_placement_status_changed("cube", false, Point3D::ORIGIN);

        assert!(matches!(rx.try_recv(), Ok(Notification::TransformChanged { .. })));
        assert!(matches!(rx.try_recv(), Ok(Notification::Gesture(_))));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::PlacementStatus {
                entity: "cube".to_string(),
                allowed: false,
                position: Point3D::ORIGIN,
            }
        );
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = unbounded_channel::<Notification>();
        drop(rx);
        tx.on_transform_changed("cube", &Transform::IDENTITY);
    }
}
