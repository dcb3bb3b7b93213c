//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! LocalCache::write(doc)
//!      │
//!      ▼
//! CacheSlotRepository::put("posData", doc)
//!      │  INSERT ... ON CONFLICT(key) DO UPDATE
//!      ▼
//! cache_slots table
//! ```
//!
//! ## Available Repositories
//!
//! - [`cache_slot::CacheSlotRepository`] - key/value slots holding JSON documents

pub mod cache_slot;
