//! Contador de eventos com notificação
//!
//! Equivalente ao par `contador + wait queue` de um driver: o handler de IRQ
//! incrementa e acorda todos; quem espera compara com o valor que viu antes.
//!
//! Não existe scheduler aqui: a espera é spin-then-timeout contra um
//! `TimeSource`, sempre com prazo.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::core::time::{Deadline, TimeSource};

/// Espera limitada expirou sem o evento chegar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeout;

/// Contador monotônico de eventos.
pub struct EventCounter {
    count: AtomicU64,
}

impl EventCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// Valor atual do contador.
    #[inline]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Incrementa e "acorda" todos os que esperam.
    ///
    /// Seguro em contexto de IRQ (lock-free). Retorna o novo valor.
    #[inline]
    pub fn signal_all(&self) -> u64 {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Espera até o contador passar de `seen`.
    ///
    /// Retorna o valor observado ou `WaitTimeout` se o prazo expirar.
    pub fn wait_past(
        &self,
        seen: u64,
        clock: &dyn TimeSource,
        timeout_us: u64,
    ) -> Result<u64, WaitTimeout> {
        let deadline = Deadline::after(clock, timeout_us);
        loop {
            let now = self.get();
            if now > seen {
                return Ok(now);
            }
            if deadline.is_expired(clock) {
                return Err(WaitTimeout);
            }
            core::hint::spin_loop();
        }
    }

    /// Atalho: espera o próximo evento a partir de agora.
    pub fn wait_next(&self, clock: &dyn TimeSource, timeout_us: u64) -> Result<u64, WaitTimeout> {
        let seen = self.get();
        self.wait_past(seen, clock, timeout_us)
    }
}

impl Default for EventCounter {
    fn default() -> Self {
        Self::new()
    }
}
