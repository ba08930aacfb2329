//! # Interrupt / VSync Engine
//!
//! Handler da linha de IRQ compartilhada do DSS.
//!
//! ## Sequência (a ordem importa)
//!
//! ```text
//! 1. snapshot   lê status dos 4 grupos (leitura não destrutiva)
//! 2. ack        escreve cada snapshot no seu registrador de clear,
//!               TODOS os grupos, antes de qualquer despacho
//! 3. máscara    status & !máscara = eventos ativos e habilitados
//! 4. despacho   VACTIVE0_END → contador de fim de frame + wake all
//!               VSYNC        → timestamp + callback de vblank (resolve flips)
//!               LDI_UNFLOW   → mascara o próprio bit (one-shot) + aviso
//! ```
//!
//! A decodificação (`decode`) é pura: snapshot e máscaras entram, lista de
//! eventos sai. `dispatch` só aplica os efeitos.
//!
//! Nada aqui espera, aloca ou retorna erro: falhas viram `HwFaults`.

use super::context::HardwareContext;
use super::error::HwFaults;
use super::mmio::RegisterSpace;
use super::regs::{
    IrqGroupRegs, LdiIrq, DPP_IRQ_REGS, IRQ_ACK_ORDER, IRQ_MASK_ALL, LDI_CPU_ITF_INT_MSK,
    LDI_INT_UNMASK, LDI_IRQ_REGS, PDP_INT_UNMASK, PDP_IRQ_REGS, SMMU_IRQ_REGS,
};

// =============================================================================
// INTERFACE COM O HOST
// =============================================================================

/// Valor de retorno de um handler de IRQ.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Nenhuma fonte deste dispositivo estava ativa.
    None = 0,
    /// A interrupção foi tratada por este dispositivo.
    Handled = 1,
}

/// Handler chamado pelo host quando a linha compartilhada dispara.
///
/// Executa em contexto de interrupção.
pub trait IrqHandler: Sync {
    fn handle(&self) -> IrqReturn;
}

/// Controle da linha de IRQ do DSS (enable_irq/disable_irq do host).
pub trait IrqLine: Send + Sync {
    fn enable(&self);
    fn disable(&self);
    fn is_enabled(&self) -> bool;
}

/// Guard que desliga a linha de IRQ e restaura o estado anterior no drop.
///
/// Usado pelo contexto de chamada em volta de locks que o handler também pega.
pub struct IrqSave<'a> {
    line: &'a dyn IrqLine,
    was_enabled: bool,
}

impl<'a> IrqSave<'a> {
    pub fn new(line: &'a dyn IrqLine) -> Self {
        let was_enabled = line.is_enabled();
        if was_enabled {
            line.disable();
        }
        Self { line, was_enabled }
    }
}

impl Drop for IrqSave<'_> {
    fn drop(&mut self) {
        if self.was_enabled {
            self.line.enable();
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Valores dos quatro grupos de interrupção (status ou máscara).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqStatus {
    /// Grupo 1: GLB CPU_PDP.
    pub pdp: u32,
    /// Grupo 2: LDI0 CPU_ITF.
    pub ldi: u32,
    /// Grupo 2: DPP.
    pub dpp: u32,
    /// Grupo 2: SMMU.
    pub smmu: u32,
}

impl IrqStatus {
    fn read_group(regs: &dyn RegisterSpace, pick: impl Fn(&IrqGroupRegs) -> usize) -> Self {
        Self {
            pdp: regs.read32(pick(&PDP_IRQ_REGS)),
            ldi: regs.read32(pick(&LDI_IRQ_REGS)),
            dpp: regs.read32(pick(&DPP_IRQ_REGS)),
            smmu: regs.read32(pick(&SMMU_IRQ_REGS)),
        }
    }

    /// Lê os quatro registradores de status.
    pub fn read_status(regs: &dyn RegisterSpace) -> Self {
        Self::read_group(regs, |g| g.status)
    }

    /// Lê os quatro registradores de máscara.
    pub fn read_masks(regs: &dyn RegisterSpace) -> Self {
        Self::read_group(regs, |g| g.mask)
    }

    pub fn is_empty(&self) -> bool {
        self.pdp == 0 && self.ldi == 0 && self.dpp == 0 && self.smmu == 0
    }

    /// Escritas de acknowledge (offset, valor) na ordem em que são feitas.
    pub fn ack_writes(&self) -> [(usize, u32); 4] {
        [
            (SMMU_IRQ_REGS.clear, self.smmu),
            (DPP_IRQ_REGS.clear, self.dpp),
            (LDI_IRQ_REGS.clear, self.ldi),
            (PDP_IRQ_REGS.clear, self.pdp),
        ]
    }

    /// Write-to-clear de todos os grupos, incondicional.
    pub fn acknowledge(&self, regs: &dyn RegisterSpace) {
        for (offset, value) in self.ack_writes() {
            regs.write32(offset, value);
        }
    }

    /// Bits ativos e não mascarados.
    pub fn unmasked(&self, masks: &IrqStatus) -> IrqStatus {
        IrqStatus {
            pdp: self.pdp & !masks.pdp,
            ldi: self.ldi & !masks.ldi,
            dpp: self.dpp & !masks.dpp,
            smmu: self.smmu & !masks.smmu,
        }
    }
}

// =============================================================================
// EVENTOS
// =============================================================================

/// Evento despachado por uma IRQ. Carrega o snapshot bruto do status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptEvent {
    FrameActiveEnd(IrqStatus),
    VerticalSync(IrqStatus),
    UnderflowError(IrqStatus),
}

/// Lista fixa de eventos de uma IRQ (sem alocação).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqEvents {
    slots: [Option<InterruptEvent>; 3],
    len: usize,
}

impl IrqEvents {
    fn push(&mut self, event: InterruptEvent) {
        self.slots[self.len] = Some(event);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterruptEvent> + '_ {
        self.slots[..self.len].iter().flatten()
    }
}

/// Decodifica um snapshot em eventos, na ordem de despacho.
///
/// `raw` é o status lido antes do ack; `masks` as máscaras lidas depois.
pub fn decode(raw: &IrqStatus, masks: &IrqStatus) -> IrqEvents {
    let active = LdiIrq::from_bits_truncate(raw.unmasked(masks).ldi);
    let mut events = IrqEvents::default();

    if active.contains(LdiIrq::VACTIVE0_END) {
        events.push(InterruptEvent::FrameActiveEnd(*raw));
    }
    if active.contains(LdiIrq::VSYNC) {
        events.push(InterruptEvent::VerticalSync(*raw));
    }
    if active.contains(LdiIrq::LDI_UNFLOW) {
        events.push(InterruptEvent::UnderflowError(*raw));
    }

    events
}

// =============================================================================
// PROGRAMAÇÃO DE MÁSCARAS
// =============================================================================

/// Mascara todas as fontes dos quatro grupos.
pub fn interrupt_mask_all(ctx: &HardwareContext) {
    for group in IRQ_ACK_ORDER {
        ctx.write32(group.mask, IRQ_MASK_ALL);
    }
}

/// Limpa qualquer status latched dos quatro grupos.
pub fn interrupt_clear_all(ctx: &HardwareContext) {
    for group in IRQ_ACK_ORDER {
        ctx.write32(group.clear, IRQ_MASK_ALL);
    }
}

/// Desmascara as fontes usadas pelo driver (grupo 1 + LDI).
pub fn interrupt_unmask(ctx: &HardwareContext) {
    ctx.write32(PDP_IRQ_REGS.mask, PDP_INT_UNMASK);
    ctx.write32(LDI_IRQ_REGS.mask, LDI_INT_UNMASK);
}

/// Supressão one-shot do underflow (contexto de IRQ).
fn mask_underflow(ctx: &HardwareContext) {
    ctx.modify32(LDI_CPU_ITF_INT_MSK, |mask| mask | LdiIrq::LDI_UNFLOW.bits());
}

/// Volta a aceitar underflow (contexto de chamada).
pub fn rearm_underflow(ctx: &HardwareContext) {
    ctx.modify32_irqsave(LDI_CPU_ITF_INT_MSK, |mask| {
        mask & !LdiIrq::LDI_UNFLOW.bits()
    });
    crate::kdebug!("(DSS/IRQ) Underflow re-armado");
}

// =============================================================================
// DESPACHO
// =============================================================================

/// Trata uma IRQ do DSS.
///
/// `on_vsync(seq, timestamp_us)` roda dentro do handler para cada VSYNC;
/// é onde o `Crtc` resolve flips pendentes e avisa o compositor.
pub fn dispatch(ctx: &HardwareContext, mut on_vsync: impl FnMut(u64, u64)) -> IrqReturn {
    let regs = ctx.regs();

    let raw = IrqStatus::read_status(regs);
    raw.acknowledge(regs);
    let masks = IrqStatus::read_masks(regs);

    for event in decode(&raw, &masks).iter() {
        match *event {
            InterruptEvent::FrameActiveEnd(_) => {
                let count = ctx.frame_end.signal_all();
                crate::ktrace!("(DSS/IRQ) vactive0_end #", count);
            }
            InterruptEvent::VerticalSync(_) => {
                let ts = ctx.time().now_us();
                ctx.set_vsync_timestamp(ts);
                let seq = ctx.vblank.signal_all();
                on_vsync(seq, ts);
            }
            InterruptEvent::UnderflowError(status) => {
                mask_underflow(ctx);
                ctx.record_fault(HwFaults::UNDERFLOW);
                let count = ctx.note_underflow();
                crate::kwarn!("(DSS/IRQ) LDI underflow! status=", status.ldi);
                crate::kwarn!("(DSS/IRQ) underflows desde o attach=", count);
            }
        }
    }

    if raw.is_empty() {
        IrqReturn::None
    } else {
        IrqReturn::Handled
    }
}
