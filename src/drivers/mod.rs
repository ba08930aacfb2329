//! # Driver Layer
//!
//! ## Drivers Implementados
//!
//! | Driver   | Diretório    | Status |
//! |----------|--------------|--------|
//! | Display  | `display/`   | DSS: energia, mode set, IRQ/vsync, planes |
//!
//! O acesso ao hardware real (MMIO mapeado, clocks, linha de IRQ) é
//! fornecido pelo kernel hospedeiro através dos traits de `display`.

pub mod display; // DSS
