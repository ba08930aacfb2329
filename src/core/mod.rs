//! Core Module
//!
//! Infraestrutura independente de hardware usada pelos drivers.

pub mod logging;
pub mod time;
