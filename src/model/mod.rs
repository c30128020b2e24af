//! Models, collections and call options.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SyncTarget`] | Trait a model or collection implements |
//! | [`Resource`] | Built-in model/collection |
//! | [`CallOptions`] | Per-call URL, body and callbacks |
//! | [`UrlSource`] | Fixed or computed endpoint |

// ============================================================================
// Submodules
// ============================================================================

/// Per-call options.
pub mod options;

/// Built-in model/collection.
pub mod resource;

/// Model/collection trait.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use options::{CallOptions, ErrorCallback, SuccessCallback, UrlSource};
pub use resource::{Resource, ResourceKind};
pub use target::{SyncTarget, TargetRef};
