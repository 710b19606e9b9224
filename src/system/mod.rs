//! System utilities for embedded devices.
//!
//! This module provides the platform-facing pieces the driver relies on
//! besides the serial link itself.
//!
//! # Available Utilities
//!
//! - **[`clock`]**: Millisecond time source and deadlines
//! - **[`console`]**: Diagnostic output sink
//!
//! # Design Principles
//!
//! - **Embedded-First**: All utilities are designed for resource-constrained environments
//! - **Zero-Allocation**: Fixed-size buffers and stack-based operations
//! - **Portable**: Works across different embedded platforms and architectures

/// Millisecond time source.
///
/// Provides the [`Clock`](clock::Clock) trait every wait is measured
/// against and the [`Deadline`](clock::Deadline) helper.
pub mod clock;

/// Diagnostic console output.
pub mod console;
