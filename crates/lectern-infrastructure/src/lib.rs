//! Infrastructure implementations for Lectern.
//!
//! Currently provides [`MemoryPlatform`], an in-memory implementation of the
//! [`Platform`](lectern_core::platform::Platform) collaborator with live
//! snapshot fan-out and fault injection for tests.

pub mod memory_platform;

pub use crate::memory_platform::MemoryPlatform;
