//! Eventos assíncronos IRQ → contexto de chamada

pub mod completion;
pub mod event;

pub use completion::{FlipCompletion, FlipSlot, FlipStatus};
pub use event::{EventCounter, WaitTimeout};
