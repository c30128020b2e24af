//! Sync adapter module.
//!
//! This module provides the persistence entry point and the machinery that
//! keeps it working while the connection is missing or still opening.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SyncAdapter`] | Persistence entry point |
//! | [`SyncBuilder`] | Fluent configuration builder |
//! | [`SyncOptions`] | Slots, timings and mode |
//! | [`RequestQueue`] | Calls waiting for the connection |
//! | [`ReadyPoller`] | Drains the queue once the connection opens |
//! | [`AcquisitionRetryLoop`] | Bounded startup locate schedule |
//!
//! # Control Flow
//!
//! ```text
//! sync(method, target, options)
//!   ├─ not located ─────────────► Err(TransportUnavailable)
//!   ├─ closed, Strict ──────────► Err(NotConnected)
//!   ├─ closed or backlog, Queue ► RequestQueue ─► ReadyPoller ─┐
//!   └─ open ────────────────────► translate ─► Connection::request
//!                                    ▲                          │
//!                                    └──────── replay ──────────┘
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder.
pub mod builder;

/// Core adapter implementation.
pub mod core;

/// Adapter configuration.
pub mod options;

/// Readiness poller.
pub mod poller;

/// Pending call queue.
pub mod queue;

/// Startup acquisition loop.
pub mod retry;

/// Call translation helpers.
pub mod translate;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SyncBuilder;
pub use core::{SyncAdapter, SyncOutcome};
pub use options::{SLOT_ADAPTER, SLOT_GLOBAL, SyncMode, SyncOptions};
pub use poller::ReadyPoller;
pub use queue::{PendingCall, RequestQueue};
pub use retry::AcquisitionRetryLoop;
pub use translate::{build_payload, resolve_url};
