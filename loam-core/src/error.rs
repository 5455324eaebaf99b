//! Error handling module for the Loam framework
//!
//! This module provides comprehensive error types for component and container operations,
//! enabling consistent error handling across the entire framework.

pub mod component;
pub mod condition;
pub mod container;
pub mod lifecycle;
pub mod resolution;
pub mod scope;
pub mod weave;
