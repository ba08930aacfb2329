//! Arquivo: core/time/source.rs
//!
//! Propósito: Fonte de tempo monotônico consumida pelo driver.
//! O DSS não tem timer próprio: o host fornece um relógio em microssegundos
//! (TSC, arch timer, jiffies convertidos...). Usado para timestamps de vsync
//! e para limitar toda espera em contexto de chamada.

/// Relógio monotônico em microssegundos.
///
/// Pode ser lido de contexto de interrupção: NÃO pode dormir nem alocar.
pub trait TimeSource: Send + Sync {
    /// Microssegundos desde um ponto arbitrário fixo (boot).
    fn now_us(&self) -> u64;
}

/// Prazo absoluto para uma espera limitada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_us: u64,
}

impl Deadline {
    /// Prazo `timeout_us` à frente do instante atual.
    pub fn after(clock: &dyn TimeSource, timeout_us: u64) -> Self {
        Self {
            expires_us: clock.now_us().saturating_add(timeout_us),
        }
    }

    /// Verifica se o prazo já passou.
    #[inline]
    pub fn is_expired(&self, clock: &dyn TimeSource) -> bool {
        clock.now_us() >= self.expires_us
    }
}

/// Converte milissegundos para microssegundos.
#[inline]
pub const fn millis_to_us(millis: u64) -> u64 {
    millis * 1000
}
