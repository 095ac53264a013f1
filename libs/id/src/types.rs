//! Typed ID definitions for all platform resources.
//!
//! Each ID type has a unique prefix that identifies the resource type.
//! IDs are ULID-based for sortability and uniqueness.

use crate::define_id;

// =============================================================================
// Topology
// =============================================================================

define_id!(SiteId, "site");

// =============================================================================
// Storage
// =============================================================================

define_id!(BucketId, "bkt");
define_id!(ObjectId, "obj");

// =============================================================================
// Background Work
// =============================================================================

define_id!(TaskId, "task");

// =============================================================================
// Tests
// =============================================================================
