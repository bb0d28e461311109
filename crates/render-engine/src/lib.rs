//! Cutframe Render Engine
//!
//! Real-time preview pipeline that composites timed tracks onto a 2D
//! canvas, driven by a virtual master clock.
//!
//! # Data Flow
//!
//! ```text
//! transport ──▶ state store ◀── clock ticks (frame scheduler)
//!                   │
//!                   ├──▶ media resources (slaved to the clock)
//!                   │          │
//!                   ▼          ▼
//!               compositor ──▶ Frame ──▶ Canvas
//! ```
//!
//! Host primitives are traits ([`TimeSource`](cutframe_common::clock::TimeSource),
//! [`FrameScheduler`], [`MediaBackend`], [`Canvas`]) with deterministic
//! in-memory implementations for headless use and tests.

pub mod canvas;
pub mod clock;
pub mod compositor;
pub mod editor;
pub mod media;
pub mod overlay;
pub mod scheduler;
pub mod transport;

pub use canvas::{Canvas, DrawOp, Frame, RecordingCanvas};
pub use clock::{PlaybackClock, Tick};
pub use compositor::{Compositor, CompositorSettings};
pub use editor::{EditorHost, PrimaryMediaEvent, VideoEditor};
pub use media::{
    MediaBackend, MediaElement, MediaError, MediaHandle, MediaResourceManager, ReadyState,
    SimulatedMedia, SimulatedMediaBackend,
};
pub use overlay::DebugOverlay;
pub use scheduler::{FrameQueue, FrameScheduler};
pub use transport::format_timecode;
