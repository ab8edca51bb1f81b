//! Gesture handling: sessions, the state machine and its outward events

mod event;
mod machine;
mod observer;
mod session;

pub use event::{GestureChange, GestureEvent, GestureEventKind, GestureKind};
pub use machine::GestureStateMachine;
pub use observer::{InteractionObserver, Notification};
pub use session::{DragStart, InteractionSession, RotateStart, ScaleStart, Sessions};
