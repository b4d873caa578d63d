//! Configuration defaults
//!
//! Values used when neither the caller nor the active context sets one.

pub mod defaults;
