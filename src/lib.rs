//! DSS Display Engine Core.
//!
//! Ponto central de exportação dos módulos do driver.
//! Sem std fora dos testes: roda dentro do kernel hospedeiro.

#![cfg_attr(not(test), no_std)]

// Arc para tokens de flip e colaboradores compartilhados
extern crate alloc;

// --- Infraestrutura ---
pub mod core; // Logging, Tempo
pub mod sync; // Contadores de evento, Tokens de flip

// --- Drivers ---
pub mod drivers; // DSS (display)

pub use crate::drivers::display::{Crtc, DssConfig, DssError, DssResources, DssResult};
