//! Auris Engine - frame-synchronous orchestration of the analyzer suite
//!
//! The engine owns one session's analyzer state, dispatches each incoming
//! [`AnalysisFrame`] to the enabled modules, and merges their outputs into
//! one [`AnalysisResult`] per frame. Threshold crossings (clip, onset,
//! feedback risk) are queued as [`EngineEvent`]s.
//!
//! - [`config`] - validated configuration with TOML round-trip
//! - [`engine`] - the orchestrator itself
//! - [`frame`] - the per-frame input record
//! - [`module`] - the closed 19-analyzer catalog and active-module set
//! - [`event`] - discrete threshold-crossing events
//! - [`result`] - the merged per-frame output record
//! - [`session`] - thin end-of-session aggregation
//! - [`error`] - configuration and frame-contract errors
//!
//! # Example
//!
//! ```rust
//! use auris_engine::{AnalysisFrame, Engine, EngineConfig};
//!
//! let config = EngineConfig {
//!     fft_size: 1024,
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(config, 48000).unwrap();
//!
//! let frame = AnalysisFrame::new(
//!     vec![0.0; 1024],       // time samples from the capture subsystem
//!     vec![-100.0; 512],     // magnitude spectrum in dBFS
//!     48000,
//!     1024,
//!     0,
//!     0.0,
//! );
//! let result = engine.process(&frame).unwrap();
//! assert_eq!(
//!     result.loudness.unwrap().momentary_lufs,
//!     f32::NEG_INFINITY
//! );
//! for event in engine.drain_events() {
//!     println!("{event:?}");
//! }
//! ```
//!
//! # Concurrency
//!
//! Processing is single-threaded and frame-synchronous: one frame is fully
//! analyzed before the next begins, and no analyzer state ever crosses a
//! thread boundary. A realtime capture thread should hand complete frames
//! to the analysis thread over a single-producer/single-consumer channel.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod frame;
pub mod module;
pub mod result;
pub mod session;

pub use config::{EngineConfig, WindowKind};
pub use engine::Engine;
pub use error::{ConfigError, EngineError};
pub use event::EngineEvent;
pub use frame::AnalysisFrame;
pub use module::{ModuleKind, ModuleSet, UnknownModule};
pub use result::AnalysisResult;
pub use session::SessionAggregate;
