//! Tempo
//!
//! O driver só precisa de duas coisas do tempo: carimbar o vsync e
//! garantir que nenhuma espera em contexto de chamada seja infinita.

pub mod source;

pub use source::{millis_to_us, Deadline, TimeSource};
