//! # CRTC - Pipeline Controller
//!
//! Máquina de estados do pipeline de display do DSS.
//!
//! ## Estados
//!
//! ```text
//!              Enable              PowerUpDone
//!  Disabled ──────────► PoweringUp ───────────► Enabled
//!     ▲                     │ PowerUpFailed     │  │  │
//!     └─────────────────────┘                   │  │  │
//!     ▲                Disable                  │  │  │
//!     └─────────────────────────────────────────┘  │  │
//!                    BeginModeSet / ModeSetDone    │  │
//!               Enabled ◄──────► ModeChanging ◄────┘  │
//!                    BeginFlush / FlushDone           │
//!               Enabled ◄──────► Flushing ◄───────────┘
//! ```
//!
//! ## Contextos
//!
//! O estado do pipeline (`state`) só é tocado pelo contexto de chamada.
//! A IRQ enxerga apenas atômicos: `vblank_armed`, os slots de flip pendente
//! e o listener (RwLock escrito com a linha de IRQ desligada).
//!
//! ## Flip pendente
//!
//! No máximo um token por canal. Uma segunda submissão com token antes do
//! primeiro resolver falha com `DssError::FlipPending`; nada é programado.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use spin::{Mutex, RwLock};

use super::config::DssConfig;
use super::context::{DssResources, HardwareContext};
use super::clock::ClockDomain;
use super::error::{DssError, DssResult, HwFaults, InitError, ValidationError};
use super::irq::{self, IrqHandler, IrqReturn, IrqSave};
use super::mode::{self, DisplayMode};
use super::plane::{self, FrameSubmission, OutputChannel, CHANNEL_COUNT};
use super::power;
use super::traits::{ScanoutProgrammer, VblankListener};
use crate::sync::{FlipCompletion, FlipSlot, FlipStatus};

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Estado do pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    Disabled,
    PoweringUp,
    Enabled,
    ModeChanging,
    Flushing,
}

/// Eventos que movem a máquina de estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeEvent {
    Enable,
    PowerUpDone,
    PowerUpFailed,
    Disable,
    BeginModeSet,
    ModeSetDone,
    BeginFlush,
    FlushDone,
}

/// Tabela de transições `(de, evento, para)`.
pub const TRANSITIONS: [(PipeState, PipeEvent, PipeState); 8] = [
    (PipeState::Disabled, PipeEvent::Enable, PipeState::PoweringUp),
    (PipeState::PoweringUp, PipeEvent::PowerUpDone, PipeState::Enabled),
    (PipeState::PoweringUp, PipeEvent::PowerUpFailed, PipeState::Disabled),
    (PipeState::Enabled, PipeEvent::Disable, PipeState::Disabled),
    (PipeState::Enabled, PipeEvent::BeginModeSet, PipeState::ModeChanging),
    (PipeState::ModeChanging, PipeEvent::ModeSetDone, PipeState::Enabled),
    (PipeState::Enabled, PipeEvent::BeginFlush, PipeState::Flushing),
    (PipeState::Flushing, PipeEvent::FlushDone, PipeState::Enabled),
];

/// Próximo estado, ou `None` se o evento não vale em `from`.
pub fn next_state(from: PipeState, event: PipeEvent) -> Option<PipeState> {
    TRANSITIONS
        .iter()
        .find(|(state, ev, _)| *state == from && *ev == event)
        .map(|(_, _, to)| *to)
}

struct CrtcState {
    pipe: PipeState,
    /// Último modo programado (clock ajustado preenchido).
    mode: Option<DisplayMode>,
}

impl CrtcState {
    fn step(&mut self, event: PipeEvent) -> DssResult<()> {
        match next_state(self.pipe, event) {
            Some(next) => {
                self.pipe = next;
                Ok(())
            }
            None => Err(DssError::InvalidState(self.pipe)),
        }
    }
}

// ============================================================================
// CRTC
// ============================================================================

/// Controlador do pipeline de display (um por DSS).
pub struct Crtc {
    ctx: HardwareContext,
    config: DssConfig,
    scanout: Arc<dyn ScanoutProgrammer>,
    state: Mutex<CrtcState>,
    /// Entrega de vsync armada (listener + resolução de flips).
    vblank_armed: AtomicBool,
    pending: [FlipSlot; CHANNEL_COUNT],
    listener: RwLock<Option<Arc<dyn VblankListener>>>,
    /// Frames programados desde o attach.
    frame_count: AtomicU64,
}

impl Crtc {
    /// Cria o pipeline sobre os recursos do host.
    ///
    /// Programa as taxas iniciais de core e pixel clock. A linha de IRQ fica
    /// desligada e o hardware desligado até o primeiro `enable`.
    pub fn attach(
        resources: DssResources,
        scanout: Arc<dyn ScanoutProgrammer>,
        config: DssConfig,
    ) -> DssResult<Self> {
        let ctx = HardwareContext::new(resources)?;
        ctx.irq_line().disable();

        for (domain, hz) in [
            (ClockDomain::Core, config.core_clk_hz),
            (ClockDomain::Pixel, config.pixel_clk_max_hz),
        ] {
            let clk = ctx.clocks().get(domain);
            if let Err(error) = clk.set_rate(hz) {
                crate::kerror!("(DSS) Falha ao configurar clock:");
                crate::kerror!(domain.name());
                return Err(InitError::ClockSetup(domain, error).into());
            }
            crate::kinfo!(domain.name());
            crate::kinfo!("(DSS)   taxa (Hz)=", clk.rate());
        }

        crate::kok!("(DSS) Attach concluído");

        Ok(Self {
            ctx,
            config,
            scanout,
            state: Mutex::new(CrtcState {
                pipe: PipeState::Disabled,
                mode: None,
            }),
            vblank_armed: AtomicBool::new(false),
            pending: [FlipSlot::new(), FlipSlot::new(), FlipSlot::new()],
            listener: RwLock::new(None),
            frame_count: AtomicU64::new(0),
        })
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Liga o pipeline. No-op se já habilitado.
    pub fn enable(&self) -> DssResult<()> {
        let mut st = self.state.lock();
        if st.pipe == PipeState::Enabled {
            return Ok(());
        }

        st.step(PipeEvent::Enable)?;

        if let Err(e) = power::power_up(&self.ctx) {
            st.step(PipeEvent::PowerUpFailed)?;
            return Err(e);
        }

        st.step(PipeEvent::PowerUpDone)?;
        self.vblank_armed.store(true, Ordering::Release);
        crate::kinfo!("(DSS) Pipeline habilitado");
        Ok(())
    }

    /// Desliga o pipeline. No-op se já desabilitado.
    ///
    /// Desarma o vsync e resolve os flips pendentes na hora. O hardware só
    /// é desligado com `DssConfig::power_down_on_disable`.
    pub fn disable(&self) -> DssResult<()> {
        let mut st = self.state.lock();
        if st.pipe == PipeState::Disabled {
            return Ok(());
        }

        self.shut_pipe(&mut st)?;

        if self.config.power_down_on_disable {
            self.power_off(&mut st);
        }

        crate::kinfo!("(DSS) Pipeline desabilitado");
        Ok(())
    }

    /// Desliga clocks e IRQ.
    ///
    /// Um pipeline habilitado passa por `Disable` antes: vsync desarmado e
    /// flips pendentes resolvidos. O modo programado se perde com o
    /// hardware; o próximo `enable` precisa de um novo `commit_mode`.
    pub fn power_down(&self) -> DssResult<()> {
        let mut st = self.state.lock();
        if st.pipe != PipeState::Disabled {
            self.shut_pipe(&mut st)?;
        }
        self.flush_pending();
        self.power_off(&mut st);
        Ok(())
    }

    // ========================================================================
    // MODE
    // ========================================================================

    /// Valida e programa um modo. Retorna o pixel clock obtido (kHz).
    ///
    /// Só vale com o pipeline habilitado.
    pub fn commit_mode(&self, mode: DisplayMode) -> DssResult<u32> {
        let mut st = self.state.lock();
        if st.pipe != PipeState::Enabled {
            return Err(DssError::InvalidState(st.pipe));
        }

        mode::mode_valid(&self.config, &mode)?;
        st.step(PipeEvent::BeginModeSet)?;

        if let Err(e) = power::power_up(&self.ctx) {
            st.step(PipeEvent::ModeSetDone)?;
            return Err(e);
        }

        let mut mode = mode;
        let achieved = mode::set_mode(&self.ctx, &*self.scanout, &mut mode);

        if self.config.rearm_underflow_on_modeset {
            irq::rearm_underflow(&self.ctx);
        }

        st.mode = Some(mode);
        st.step(PipeEvent::ModeSetDone)?;
        Ok(achieved)
    }

    /// Modo com o clock que o hardware realmente atinge. Não programa nada.
    pub fn mode_fixup(&self, mode: &DisplayMode) -> DisplayMode {
        mode::mode_fixup(&self.ctx, mode)
    }

    pub fn mode_valid(&self, mode: &DisplayMode) -> Result<(), ValidationError> {
        mode::mode_valid(&self.config, mode)
    }

    // ========================================================================
    // FRAMES
    // ========================================================================

    /// Valida e programa um frame no canal.
    ///
    /// Com `completion`, o token é resolvido no próximo VSYNC; ou na hora,
    /// se o vsync não estiver armado.
    pub fn submit_frame(
        &self,
        channel: OutputChannel,
        submission: &FrameSubmission,
        completion: Option<Arc<FlipCompletion>>,
    ) -> DssResult<()> {
        let mut st = self.state.lock();
        if st.pipe != PipeState::Enabled {
            return Err(DssError::InvalidState(st.pipe));
        }
        let mode = st.mode.ok_or(DssError::InvalidState(st.pipe))?;

        let format = match plane::validate(channel, submission, mode.hdisplay, mode.vdisplay) {
            Ok(format) => format,
            Err(e) => {
                crate::kdebug!("(DSS/Plane) Frame rejeitado:");
                crate::kdebug!(e.as_str());
                return Err(e.into());
            }
        };

        let slot = &self.pending[channel.index()];
        if completion.is_some() && slot.is_armed() {
            return Err(DssError::FlipPending);
        }

        st.step(PipeEvent::BeginFlush)?;

        self.scanout.pan_display(channel, submission, format);
        self.frame_count.fetch_add(1, Ordering::Relaxed);

        if let Some(token) = completion {
            if self.vsync_armable() {
                if let Err(token) = slot.try_arm(token) {
                    self.resolve_now(&token);
                }
            } else {
                self.resolve_now(&token);
            }
        }

        st.step(PipeEvent::FlushDone)?;
        Ok(())
    }

    /// Para o scan-out do canal. Um flip pendente nele é cancelado.
    pub fn disable_plane(&self, channel: OutputChannel) {
        if let Some(token) = self.pending[channel.index()].take() {
            token.cancel();
        }
        self.scanout.disable_plane(channel);
        crate::ktrace!(channel.name());
    }

    /// Espera a resolução de um token (prazo de vblank da config).
    pub fn wait_flip(&self, token: &FlipCompletion) -> DssResult<FlipStatus> {
        Ok(token.wait(self.ctx.time(), self.config.vblank_timeout_us)?)
    }

    // ========================================================================
    // VBLANK
    // ========================================================================

    /// Arma a entrega de vsync. Liga o hardware se preciso.
    pub fn enable_vblank(&self) -> DssResult<()> {
        if !self.ctx.is_powered() {
            power::power_up(&self.ctx)?;
        }
        self.vblank_armed.store(true, Ordering::Release);
        Ok(())
    }

    pub fn disable_vblank(&self) {
        if !self.ctx.is_powered() {
            crate::kerror!("(DSS) disable_vblank com o DSS desligado");
        }
        self.vblank_armed.store(false, Ordering::Release);
    }

    /// Instala (ou remove) o callback de vblank do compositor.
    pub fn set_vblank_listener(&self, listener: Option<Arc<dyn VblankListener>>) {
        let _irq = IrqSave::new(self.ctx.irq_line());
        *self.listener.write() = listener;
    }

    /// Espera o próximo VSYNC. Retorna o número de sequência.
    pub fn wait_vblank(&self) -> DssResult<u64> {
        Ok(self
            .ctx
            .vblank
            .wait_next(self.ctx.time(), self.config.vblank_timeout_us)?)
    }

    /// Espera o próximo fim de frame ativo. Retorna o contador.
    pub fn wait_frame_end(&self) -> DssResult<u64> {
        Ok(self
            .ctx
            .frame_end
            .wait_next(self.ctx.time(), self.config.frame_end_timeout_us)?)
    }

    // ========================================================================
    // HARDWARE FAULTS
    // ========================================================================

    /// Volta a aceitar a interrupção de underflow.
    pub fn rearm_underflow(&self) {
        irq::rearm_underflow(&self.ctx);
    }

    /// Retorna e limpa as falhas de hardware acumuladas.
    pub fn take_faults(&self) -> HwFaults {
        self.ctx.take_faults()
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> PipeState {
        self.state.lock().pipe
    }

    pub fn mode(&self) -> Option<DisplayMode> {
        self.state.lock().mode
    }

    pub fn config(&self) -> &DssConfig {
        &self.config
    }

    pub fn context(&self) -> &HardwareContext {
        &self.ctx
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.ctx.is_powered()
    }

    #[inline]
    pub fn is_vblank_armed(&self) -> bool {
        self.vblank_armed.load(Ordering::Acquire)
    }

    pub fn has_pending_flip(&self, channel: OutputChannel) -> bool {
        self.pending[channel.index()].is_armed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    pub fn vblank_count(&self) -> u64 {
        self.ctx.vblank_count()
    }

    pub fn frame_end_count(&self) -> u64 {
        self.ctx.frame_end_count()
    }

    pub fn underflow_count(&self) -> u64 {
        self.ctx.underflow_count()
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    fn shut_pipe(&self, st: &mut CrtcState) -> DssResult<()> {
        st.step(PipeEvent::Disable)?;
        self.vblank_armed.store(false, Ordering::Release);
        self.flush_pending();
        Ok(())
    }

    fn power_off(&self, st: &mut CrtcState) {
        self.vblank_armed.store(false, Ordering::Release);
        power::power_down(&self.ctx);
        st.mode = None;
    }

    fn vsync_armable(&self) -> bool {
        self.is_vblank_armed() && self.ctx.is_powered()
    }

    fn resolve_now(&self, token: &FlipCompletion) {
        token.present(self.ctx.vblank_count(), self.ctx.time().now_us());
    }

    /// Resolve todos os flips pendentes sem esperar vsync.
    fn flush_pending(&self) {
        for slot in &self.pending {
            if let Some(token) = slot.take() {
                self.resolve_now(&token);
            }
        }
    }

    /// Executado no VSYNC, dentro do handler.
    fn on_vsync(&self, seq: u64, timestamp_us: u64) {
        for slot in &self.pending {
            if let Some(token) = slot.take() {
                token.present(seq, timestamp_us);
            }
        }

        if self.is_vblank_armed() {
            if let Some(listener) = self.listener.read().as_ref() {
                listener.on_vblank(seq, timestamp_us);
            }
        }
    }
}

impl IrqHandler for Crtc {
    fn handle(&self) -> IrqReturn {
        irq::dispatch(&self.ctx, |seq, ts| self.on_vsync(seq, ts))
    }
}
