//! # Display Driver Module
//!
//! Núcleo do driver do DSS (Display SubSystem): sequência de energia, mode
//! set, demultiplexação de IRQ/vsync e admissão de frames.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  Crtc (pipeline)                      │
//! ├────────────┬────────────┬────────────┬────────────────┤
//! │   Power    │    Mode    │  IRQ/VSync │  Plane         │
//! │ Sequencer  │ Programmer │   Engine   │  Validator     │
//! ├────────────┴────────────┴────────────┴────────────────┤
//! │         HardwareContext (regs, clocks, contadores)    │
//! └───────────────────────────────────────────────────────┘
//!        ▲             ▲              ▲              ▲
//!   RegisterSpace  ClockControl    IrqLine   ScanoutProgrammer
//!                                              VblankListener
//! ```
//!
//! Tudo o que é do host entra por trait: o driver não mapeia memória, não
//! registra IRQ e não conhece o device tree.

pub mod buffer;
pub mod clock;
pub mod config;
pub mod context;
pub mod crtc;
pub mod error;
pub mod format;
pub mod irq;
pub mod mmio;
pub mod mode;
pub mod plane;
pub mod power;
pub mod regs;
pub mod traits;

#[cfg(test)]
mod test;

pub use buffer::FrameBuffer;
pub use clock::{ClockControl, ClockDomain, ClockDomains, ClockError, ClockSet};
pub use config::DssConfig;
pub use context::{DssResources, HardwareContext};
pub use crtc::{Crtc, PipeEvent, PipeState};
pub use error::{DssError, DssResult, HwFaults, InitError, ValidationError};
pub use format::{dss_format_of, HwFormat};
pub use irq::{InterruptEvent, IrqHandler, IrqLine, IrqReturn, IrqStatus};
pub use mmio::{MmioRegion, RegisterSpace};
pub use mode::DisplayMode;
pub use plane::{FrameSubmission, OutputChannel, Rect};
pub use traits::{ScanoutProgrammer, VblankListener};
