//! Utilities for building IR.

pub mod builder;
