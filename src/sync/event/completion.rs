//! Token de conclusão de page flip
//!
//! Criado pelo compositor, entregue junto com o frame, resolvido uma única
//! vez: no próximo vsync, imediatamente (vsync indisponível) ou como
//! cancelado (plane desabilitado).

use alloc::sync::Arc;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU64, AtomicU8, Ordering};

use super::event::WaitTimeout;
use crate::core::time::{Deadline, TimeSource};

const STATE_PENDING: u8 = 0;
const STATE_PRESENTED: u8 = 1;
const STATE_CANCELLED: u8 = 2;

/// Estado observável de um flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipStatus {
    /// Ainda aguardando vsync.
    Pending,
    /// Frame visível. `vblank_seq` é o número do vsync que o apresentou
    /// (0 quando resolvido sem vsync).
    Presented { vblank_seq: u64, timestamp_us: u64 },
    /// Flip descartado antes de aparecer.
    Cancelled,
}

/// Token de conclusão compartilhado entre compositor e driver.
pub struct FlipCompletion {
    state: AtomicU8,
    vblank_seq: AtomicU64,
    timestamp_us: AtomicU64,
}

impl FlipCompletion {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_PENDING),
            vblank_seq: AtomicU64::new(0),
            timestamp_us: AtomicU64::new(0),
        }
    }

    /// Marca como apresentado. Chamado no máximo uma vez por quem
    /// retirou o token do slot pendente.
    pub(crate) fn present(&self, vblank_seq: u64, timestamp_us: u64) {
        self.vblank_seq.store(vblank_seq, Ordering::Relaxed);
        self.timestamp_us.store(timestamp_us, Ordering::Relaxed);
        self.state.store(STATE_PRESENTED, Ordering::Release);
    }

    pub(crate) fn cancel(&self) {
        self.state.store(STATE_CANCELLED, Ordering::Release);
    }

    pub fn status(&self) -> FlipStatus {
        match self.state.load(Ordering::Acquire) {
            STATE_PRESENTED => FlipStatus::Presented {
                vblank_seq: self.vblank_seq.load(Ordering::Relaxed),
                timestamp_us: self.timestamp_us.load(Ordering::Relaxed),
            },
            STATE_CANCELLED => FlipStatus::Cancelled,
            _ => FlipStatus::Pending,
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) != STATE_PENDING
    }

    /// Espera a resolução do flip, com prazo.
    pub fn wait(&self, clock: &dyn TimeSource, timeout_us: u64) -> Result<FlipStatus, WaitTimeout> {
        let deadline = Deadline::after(clock, timeout_us);
        loop {
            let status = self.status();
            if status != FlipStatus::Pending {
                return Ok(status);
            }
            if deadline.is_expired(clock) {
                return Err(WaitTimeout);
            }
            core::hint::spin_loop();
        }
    }
}

impl Default for FlipCompletion {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SLOT DE FLIP PENDENTE
// =============================================================================

/// Slot de um único flip pendente por canal.
///
/// Lock-free: o handler de IRQ retira o token com `take` sem disputar lock
/// com o contexto de chamada. Guarda uma referência forte (`Arc`) como
/// ponteiro cru.
pub struct FlipSlot {
    ptr: AtomicPtr<FlipCompletion>,
}

impl FlipSlot {
    pub const fn new() -> Self {
        Self {
            ptr: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Arma o slot com `token`. Devolve o token se o slot já estiver ocupado.
    pub fn try_arm(&self, token: Arc<FlipCompletion>) -> Result<(), Arc<FlipCompletion>> {
        let raw = Arc::into_raw(token) as *mut FlipCompletion;
        match self
            .ptr
            .compare_exchange(ptr::null_mut(), raw, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            // SAFETY: `raw` acabou de sair de `Arc::into_raw` e não foi publicado
            Err(_) => Err(unsafe { Arc::from_raw(raw) }),
        }
    }

    /// Esvazia o slot, devolvendo o token armado (se havia).
    pub fn take(&self) -> Option<Arc<FlipCompletion>> {
        let raw = self.ptr.swap(ptr::null_mut(), Ordering::AcqRel);
        if raw.is_null() {
            None
        } else {
            // SAFETY: todo ponteiro não nulo no slot veio de `Arc::into_raw`
            // em `try_arm`, e o swap garante um único dono
            Some(unsafe { Arc::from_raw(raw) })
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        !self.ptr.load(Ordering::Acquire).is_null()
    }
}

impl Default for FlipSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlipSlot {
    fn drop(&mut self) {
        drop(self.take());
    }
}
