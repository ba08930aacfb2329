//! # Hardware Context
//!
//! Estado de hardware de uma instância do DSS. Criado no attach, destruído
//! no detach, possuído exclusivamente pelo `Crtc`.
//!
//! ## Estado compartilhado com a IRQ
//!
//! | Campo              | Escritor     | Leitor               |
//! |--------------------|--------------|----------------------|
//! | `frame_end`        | IRQ          | `wait_frame_end`     |
//! | `vblank`           | IRQ          | `wait_vblank`        |
//! | `power_on`         | chamador     | IRQ / chamador       |
//! | `clocks_on`        | chamador     | chamador             |
//! | `faults`           | IRQ / mode   | `take_faults`        |
//!
//! Tudo atômico. O único lock (`reg_lock`) cobre read-modify-write de
//! registrador e nunca é segurado durante uma espera.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use spin::Mutex;

use super::clock::{ClockDomain, ClockDomains, ClockSet};
use super::error::{HwFaults, InitError};
use super::irq::{IrqLine, IrqSave};
use super::mmio::RegisterSpace;
use super::regs::DSS_REG_WINDOW_SIZE;
use crate::core::time::TimeSource;
use crate::sync::EventCounter;

/// Recursos externos entregues no attach.
#[derive(Clone)]
pub struct DssResources {
    pub regs: Arc<dyn RegisterSpace>,
    pub clocks: ClockSet,
    pub irq_line: Arc<dyn IrqLine>,
    pub time: Arc<dyn TimeSource>,
}

pub struct HardwareContext {
    regs: Arc<dyn RegisterSpace>,
    clocks: ClockSet,
    irq_line: Arc<dyn IrqLine>,
    time: Arc<dyn TimeSource>,
    power_on: AtomicBool,
    /// Domínios de clock que habilitamos e ainda não liberamos.
    clocks_on: AtomicU8,
    /// Contador de VACTIVE0_END.
    pub(crate) frame_end: EventCounter,
    /// Contador de VSYNC (número de sequência do vblank).
    pub(crate) vblank: EventCounter,
    vsync_timestamp_us: AtomicU64,
    reg_lock: Mutex<()>,
    faults: AtomicU32,
    underflow_count: AtomicU64,
}

impl HardwareContext {
    pub fn new(res: DssResources) -> Result<Self, InitError> {
        if res.regs.len() < DSS_REG_WINDOW_SIZE {
            crate::kerror!("(DSS) Janela MMIO pequena demais: ", res.regs.len());
            return Err(InitError::RegisterWindowTooSmall);
        }

        Ok(Self {
            regs: res.regs,
            clocks: res.clocks,
            irq_line: res.irq_line,
            time: res.time,
            power_on: AtomicBool::new(false),
            clocks_on: AtomicU8::new(0),
            frame_end: EventCounter::new(),
            vblank: EventCounter::new(),
            vsync_timestamp_us: AtomicU64::new(0),
            reg_lock: Mutex::new(()),
            faults: AtomicU32::new(0),
            underflow_count: AtomicU64::new(0),
        })
    }

    // =========================================================================
    // COLABORADORES
    // =========================================================================

    #[inline]
    pub fn regs(&self) -> &dyn RegisterSpace {
        &*self.regs
    }

    #[inline]
    pub fn clocks(&self) -> &ClockSet {
        &self.clocks
    }

    #[inline]
    pub fn irq_line(&self) -> &dyn IrqLine {
        &*self.irq_line
    }

    #[inline]
    pub fn time(&self) -> &dyn TimeSource {
        &*self.time
    }

    // =========================================================================
    // REGISTRADORES
    // =========================================================================

    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        self.regs.read32(offset)
    }

    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        self.regs.write32(offset, value)
    }

    /// Read-modify-write a partir do handler de IRQ.
    pub(crate) fn modify32(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let _guard = self.reg_lock.lock();
        let value = self.regs.read32(offset);
        self.regs.write32(offset, f(value));
    }

    /// Read-modify-write a partir do contexto de chamada.
    ///
    /// Desliga a linha de IRQ enquanto segura o lock, senão o handler
    /// poderia girar para sempre no mesmo core.
    pub(crate) fn modify32_irqsave(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let _irq = IrqSave::new(self.irq_line());
        self.modify32(offset, f);
    }

    // =========================================================================
    // ESTADO
    // =========================================================================

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.power_on.load(Ordering::Acquire)
    }

    pub(crate) fn set_powered(&self, on: bool) {
        self.power_on.store(on, Ordering::Release);
    }

    /// Domínios de clock habilitados por este driver.
    pub fn enabled_clocks(&self) -> ClockDomains {
        ClockDomains::from_bits_truncate(self.clocks_on.load(Ordering::Acquire))
    }

    pub(crate) fn mark_clock(&self, domain: ClockDomain, on: bool) {
        if on {
            self.clocks_on.fetch_or(domain.bit().bits(), Ordering::AcqRel);
        } else {
            self.clocks_on.fetch_and(!domain.bit().bits(), Ordering::AcqRel);
        }
    }

    pub fn frame_end_count(&self) -> u64 {
        self.frame_end.get()
    }

    pub fn vblank_count(&self) -> u64 {
        self.vblank.get()
    }

    pub fn last_vsync_timestamp_us(&self) -> u64 {
        self.vsync_timestamp_us.load(Ordering::Acquire)
    }

    pub(crate) fn set_vsync_timestamp(&self, ts_us: u64) {
        self.vsync_timestamp_us.store(ts_us, Ordering::Release);
    }

    pub(crate) fn record_fault(&self, fault: HwFaults) {
        self.faults.fetch_or(fault.bits(), Ordering::AcqRel);
    }

    /// Retorna e limpa as falhas acumuladas.
    pub fn take_faults(&self) -> HwFaults {
        HwFaults::from_bits_truncate(self.faults.swap(0, Ordering::AcqRel))
    }

    /// Falhas acumuladas, sem limpar.
    pub fn faults(&self) -> HwFaults {
        HwFaults::from_bits_truncate(self.faults.load(Ordering::Acquire))
    }

    pub(crate) fn note_underflow(&self) -> u64 {
        self.underflow_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn underflow_count(&self) -> u64 {
        self.underflow_count.load(Ordering::Acquire)
    }
}
