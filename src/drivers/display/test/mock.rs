//! Dublês dos colaboradores do DSS
//!
//! - `MockRegs`     - arquivo de registradores com status write-to-clear
//! - `MockClock`    - clock com contagem de referências e `set_rate` programável
//! - `MockTime`     - relógio manual, auto-incremental ou de parede
//! - `MockIrqLine`  - linha de IRQ que só registra enable/disable
//! - `MockScanout`  - grava timings e pans programados
//! - `MockListener` - grava callbacks de vblank

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use std::vec::Vec;

use crate::core::time::TimeSource;
use crate::drivers::display::clock::{ClockControl, ClockDomain, ClockError, ClockSet};
use crate::drivers::display::config::DssConfig;
use crate::drivers::display::context::{DssResources, HardwareContext};
use crate::drivers::display::crtc::Crtc;
use crate::drivers::display::format::HwFormat;
use crate::drivers::display::irq::{IrqHandler, IrqLine, IrqReturn};
use crate::drivers::display::mmio::RegisterSpace;
use crate::drivers::display::mode::DisplayMode;
use crate::drivers::display::plane::{FrameSubmission, OutputChannel};
use crate::drivers::display::regs::{
    IrqGroupRegs, LdiIrq, PdpIrq, DSS_REG_WINDOW_SIZE, IRQ_ACK_ORDER, LDI_IRQ_REGS, PDP_IRQ_REGS,
};
use crate::drivers::display::traits::{ScanoutProgrammer, VblankListener};

// ============================================================================
// REGISTRADORES
// ============================================================================

/// Janela de registradores simulada.
///
/// Escrever no registrador de clear de um grupo de IRQ zera os bits
/// correspondentes no status (write-to-clear). Todo o resto é memória.
pub struct MockRegs {
    words: Mutex<Vec<u32>>,
    len: usize,
    writes: Mutex<Vec<(usize, u32)>>,
}

impl MockRegs {
    pub fn new() -> Self {
        Self::with_len(DSS_REG_WINDOW_SIZE)
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            words: Mutex::new(vec![0; len / 4]),
            len,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Hardware levanta `bits` no status do grupo.
    pub fn raise(&self, group: IrqGroupRegs, bits: u32) {
        let mut words = self.words.lock().unwrap();
        words[group.status / 4] |= bits;
    }

    /// Lê sem passar pelo driver.
    pub fn peek(&self, offset: usize) -> u32 {
        self.words.lock().unwrap()[offset / 4]
    }

    /// Escreve sem semântica de clear e sem registrar.
    pub fn poke(&self, offset: usize, value: u32) {
        self.words.lock().unwrap()[offset / 4] = value;
    }

    /// Escritas feitas pelo driver, em ordem.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }
}

impl RegisterSpace for MockRegs {
    fn read32(&self, offset: usize) -> u32 {
        self.words
            .lock()
            .unwrap()
            .get(offset / 4)
            .copied()
            .unwrap_or(0)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.writes.lock().unwrap().push((offset, value));
        let mut words = self.words.lock().unwrap();
        if offset / 4 >= words.len() {
            return;
        }
        match IRQ_ACK_ORDER.iter().find(|group| group.clear == offset) {
            Some(group) => words[group.status / 4] &= !value,
            None => words[offset / 4] = value,
        }
    }

    fn len(&self) -> usize {
        self.len
    }
}

// ============================================================================
// CLOCKS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOp {
    Enable(&'static str),
    Disable(&'static str),
}

/// Log compartilhado de enable/disable de todos os clocks.
pub type ClockLog = Arc<Mutex<Vec<ClockOp>>>;

/// Como o clock reage a `set_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBehavior {
    /// Programa exatamente a taxa pedida.
    Exact,
    /// Recusa e mantém a taxa anterior.
    Reject,
    /// Arredonda para baixo num múltiplo de `step` Hz.
    Round(u64),
    /// Programa a taxa dada, mas reporta erro.
    FailAfterSetting(u64),
}

pub struct MockClock {
    name: &'static str,
    log: ClockLog,
    rate: AtomicU64,
    /// Referências abertas por `prepare_enable`, como no framework do host.
    refs: AtomicUsize,
    fail_enable: AtomicBool,
    behavior: Mutex<RateBehavior>,
    requests: Mutex<Vec<u64>>,
}

impl MockClock {
    pub fn new(name: &'static str, log: ClockLog) -> Self {
        Self {
            name,
            log,
            rate: AtomicU64::new(0),
            refs: AtomicUsize::new(0),
            fail_enable: AtomicBool::new(false),
            behavior: Mutex::new(RateBehavior::Exact),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, behavior: RateBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn fail_enable(&self, fail: bool) {
        self.fail_enable.store(fail, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.refcount() > 0
    }

    pub fn refcount(&self) -> usize {
        self.refs.load(Ordering::SeqCst)
    }

    /// Taxas pedidas via `set_rate`, em ordem.
    pub fn requests(&self) -> Vec<u64> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<u64> {
        self.requests.lock().unwrap().last().copied()
    }
}

impl ClockControl for MockClock {
    fn prepare_enable(&self) -> Result<(), ClockError> {
        if self.fail_enable.load(Ordering::SeqCst) {
            return Err(ClockError::EnableFailed);
        }
        self.refs.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(ClockOp::Enable(self.name));
        Ok(())
    }

    fn disable_unprepare(&self) {
        let released = self
            .refs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        assert!(released.is_ok(), "{}: disable sem enable", self.name);
        self.log.lock().unwrap().push(ClockOp::Disable(self.name));
    }

    fn rate(&self) -> u64 {
        self.rate.load(Ordering::SeqCst)
    }

    fn set_rate(&self, hz: u64) -> Result<(), ClockError> {
        self.requests.lock().unwrap().push(hz);
        match *self.behavior.lock().unwrap() {
            RateBehavior::Exact => {
                self.rate.store(hz, Ordering::SeqCst);
                Ok(())
            }
            RateBehavior::Reject => Err(ClockError::RateRejected),
            RateBehavior::Round(step) => {
                self.rate.store(hz / step * step, Ordering::SeqCst);
                Ok(())
            }
            RateBehavior::FailAfterSetting(rate) => {
                self.rate.store(rate, Ordering::SeqCst);
                Err(ClockError::RateRejected)
            }
        }
    }

    fn round_rate(&self, hz: u64) -> u64 {
        match *self.behavior.lock().unwrap() {
            RateBehavior::Round(step) => hz / step * step,
            _ => hz,
        }
    }
}

/// Os cinco clocks do DSS com um log comum.
pub struct MockClocks {
    pub pixel: Arc<MockClock>,
    pub mmbuf: Arc<MockClock>,
    pub core: Arc<MockClock>,
    pub peripheral: Arc<MockClock>,
    pub bus: Arc<MockClock>,
    pub log: ClockLog,
}

impl MockClocks {
    pub fn new() -> Self {
        let log: ClockLog = Arc::new(Mutex::new(Vec::new()));
        let make = |domain: ClockDomain| Arc::new(MockClock::new(domain.name(), log.clone()));
        Self {
            pixel: make(ClockDomain::Pixel),
            mmbuf: make(ClockDomain::MemoryBuffer),
            core: make(ClockDomain::Core),
            peripheral: make(ClockDomain::Peripheral),
            bus: make(ClockDomain::Bus),
            log,
        }
    }

    pub fn get(&self, domain: ClockDomain) -> &Arc<MockClock> {
        match domain {
            ClockDomain::Pixel => &self.pixel,
            ClockDomain::MemoryBuffer => &self.mmbuf,
            ClockDomain::Core => &self.core,
            ClockDomain::Peripheral => &self.peripheral,
            ClockDomain::Bus => &self.bus,
        }
    }

    pub fn set(&self) -> ClockSet {
        ClockSet {
            pixel: self.pixel.clone(),
            mmbuf: self.mmbuf.clone(),
            core: self.core.clone(),
            peripheral: self.peripheral.clone(),
            bus: self.bus.clone(),
        }
    }

    pub fn ops(&self) -> Vec<ClockOp> {
        self.log.lock().unwrap().clone()
    }
}

// ============================================================================
// TEMPO
// ============================================================================

/// Relógio de teste.
///
/// Manual (`step == 0`), auto-incremental (cada leitura avança `step` µs)
/// ou de parede (`Instant`), para testes com threads.
pub struct MockTime {
    now: AtomicU64,
    step: u64,
    wall: Option<Instant>,
}

impl MockTime {
    pub fn manual() -> Self {
        Self::auto(0)
    }

    pub fn auto(step_us: u64) -> Self {
        Self {
            now: AtomicU64::new(0),
            step: step_us,
            wall: None,
        }
    }

    pub fn wall() -> Self {
        Self {
            now: AtomicU64::new(0),
            step: 0,
            wall: Some(Instant::now()),
        }
    }

    pub fn advance(&self, us: u64) {
        self.now.fetch_add(us, Ordering::SeqCst);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        match self.wall {
            Some(start) => start.elapsed().as_micros() as u64,
            None => self.now.fetch_add(self.step, Ordering::SeqCst),
        }
    }
}

// ============================================================================
// IRQ LINE
// ============================================================================

pub struct MockIrqLine {
    enabled: AtomicBool,
    enables: AtomicUsize,
    disables: AtomicUsize,
}

impl MockIrqLine {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            enables: AtomicUsize::new(0),
            disables: AtomicUsize::new(0),
        }
    }

    pub fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

impl IrqLine for MockIrqLine {
    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        self.enables.fetch_add(1, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.disables.fetch_add(1, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SCANOUT / LISTENER
// ============================================================================

#[derive(Default)]
pub struct MockScanout {
    pub timings: Mutex<Vec<DisplayMode>>,
    pub pans: Mutex<Vec<(OutputChannel, FrameSubmission, HwFormat)>>,
    pub disabled: Mutex<Vec<OutputChannel>>,
}

impl MockScanout {
    pub fn pan_count(&self) -> usize {
        self.pans.lock().unwrap().len()
    }
}

impl ScanoutProgrammer for MockScanout {
    fn init_timing(&self, mode: &DisplayMode) {
        self.timings.lock().unwrap().push(*mode);
    }

    fn pan_display(&self, channel: OutputChannel, submission: &FrameSubmission, format: HwFormat) {
        self.pans.lock().unwrap().push((channel, *submission, format));
    }

    fn disable_plane(&self, channel: OutputChannel) {
        self.disabled.lock().unwrap().push(channel);
    }
}

#[derive(Default)]
pub struct MockListener {
    pub calls: Mutex<Vec<(u64, u64)>>,
}

impl MockListener {
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl VblankListener for MockListener {
    fn on_vblank(&self, vblank_seq: u64, timestamp_us: u64) {
        self.calls.lock().unwrap().push((vblank_seq, timestamp_us));
    }
}

// ============================================================================
// MONTAGEM
// ============================================================================

/// Todos os dublês de uma instância do DSS.
pub struct Parts {
    pub regs: Arc<MockRegs>,
    pub clocks: MockClocks,
    pub irq: Arc<MockIrqLine>,
    pub time: Arc<MockTime>,
    pub scanout: Arc<MockScanout>,
}

impl Parts {
    pub fn new() -> Self {
        Self::with_time(MockTime::auto(10))
    }

    pub fn with_time(time: MockTime) -> Self {
        Self {
            regs: Arc::new(MockRegs::new()),
            clocks: MockClocks::new(),
            irq: Arc::new(MockIrqLine::new()),
            time: Arc::new(time),
            scanout: Arc::new(MockScanout::default()),
        }
    }

    pub fn resources(&self) -> DssResources {
        DssResources {
            regs: self.regs.clone(),
            clocks: self.clocks.set(),
            irq_line: self.irq.clone(),
            time: self.time.clone(),
        }
    }

    pub fn context(&self) -> HardwareContext {
        HardwareContext::new(self.resources()).unwrap()
    }

    pub fn attach(&self, config: DssConfig) -> Crtc {
        Crtc::attach(self.resources(), self.scanout.clone(), config).unwrap()
    }
}

/// Levanta bits do LDI (e o sumário no grupo 1) e chama o handler.
pub fn fire(handler: &dyn IrqHandler, regs: &MockRegs, ldi: LdiIrq) -> IrqReturn {
    regs.raise(LDI_IRQ_REGS, ldi.bits());
    regs.raise(PDP_IRQ_REGS, PdpIrq::ITF0_INTS.bits());
    handler.handle()
}

/// 1920×1080 a 74.25 MHz.
pub const MODE_1080P: DisplayMode = DisplayMode::new(74_250, 1920, 1080);
