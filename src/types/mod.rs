//! Core types for Maneki

mod action;
mod detection;
mod error;
mod message;
mod person;
mod sink;
mod update;

pub use action::{ActionId, ActionRequest};
pub use detection::{DetectionBox, FrameSize, HandFrame, Landmark};
pub use error::FacialError;
pub use message::MessageCatalog;
pub use person::{PersonId, PersonState};
pub use sink::{
    AnimationSink, ExpressionSink, LookAtSink, MessageSink, NullAnimationSink, NullExpressionSink,
    NullLookAtSink, NullMessageSink,
};
pub use update::BehaviorUpdate;
