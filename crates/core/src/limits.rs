//! Size and length limits for tracked events.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so field limits are duplicated there. Keep both in sync when modifying.

// === Batch Limits ===

/// Maximum ingest payload size in bytes (1MB).
pub const MAX_BATCH_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum events per ingest batch.
pub const MAX_BATCH_EVENTS: usize = 1000;

// === Property Limits ===

/// Maximum serialized `properties` size in bytes (16KB).
pub const MAX_PROPERTIES_BYTES: usize = 16 * 1024;

// === String Field Limits (chars) ===

/// Event name max length (`Disappear_{page}_{element}` stays well under this).
pub const MAX_EVENT_NAME_LEN: usize = 256;

/// Canonical page name / component name max length.
pub const MAX_NAME_LEN: usize = 128;

/// User ID and company ID max length.
pub const MAX_USER_ID_LEN: usize = 128;

/// Session ID max length.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Page URL max length.
pub const MAX_URL_LEN: usize = 2048;

/// Page title max length.
pub const MAX_TITLE_LEN: usize = 500;
