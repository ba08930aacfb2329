//! # Synchronization Primitives
//!
//! Primitivas usadas entre os dois contextos do driver.
//!
//! ## Hierarquia de Uso
//!
//! ```text
//! spin::Mutex    → Seções críticas curtas (read-modify-write de registrador,
//!                  estado do pipeline). Nunca segurado durante espera.
//! EventCounter   → IRQ incrementa + notifica, chamador espera com prazo
//! FlipCompletion → Token one-shot resolvido no vsync
//! FlipSlot       → Flip pendente por canal, lock-free (arma / retira)
//! ```
//!
//! ## Regras
//!
//! - **IRQ**: nunca espera, nunca aloca, só pega spin locks curtos
//! - **Chamador**: toda espera tem prazo (`TimeSource`)
//! - **Lock**: nunca segurar um lock enquanto espera um evento da IRQ

pub mod event;

pub use event::{EventCounter, FlipCompletion, FlipSlot, FlipStatus, WaitTimeout};
