//! Core modules for Maneki

pub mod api;
pub mod arbiter;
pub mod blink;
pub mod controller;
pub mod gaze;
pub mod lipsync;
pub mod registry;
pub mod strategy;
pub mod wave;

pub use api::{create_router, run_server};
pub use arbiter::ActionArbiter;
pub use blink::BlinkSynthesizer;
pub use controller::{BehaviorController, ControllerConfig};
pub use gaze::{GazeSmoother, GazeTargetSelector};
pub use lipsync::{LipSyncSynthesizer, Viseme};
pub use registry::IdentityRegistry;
pub use strategy::{BehaviorStrategyEngine, Strategy};
pub use wave::{GestureTracker, WaveDetector};
