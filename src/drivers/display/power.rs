//! # Power Sequencer
//!
//! Liga e desliga o DSS.
//!
//! ## Power up
//!
//! ```text
//! clocks (ordem fixa, falha rápida, sem rollback)
//!   pixel → mmbuf → core → peripheral → bus
//! clock gating interno (PDP, depois common)
//! mask all → clear all → enable IRQ line → unmask
//! power_on = true
//! ```
//!
//! Um clock que falha deixa os anteriores ligados: desligar um clock que
//! o host pode compartilhar com outros consumidores não é seguro aqui.
//! Os domínios já habilitados ficam marcados no contexto; uma nova tentativa
//! só habilita os que faltam.
//!
//! `power_down` é o inverso real do power up (ordem reversa) e libera
//! exatamente os domínios marcados, inclusive os de uma tentativa que falhou.

use super::clock::ClockDomain;
use super::context::HardwareContext;
use super::error::{DssError, DssResult};
use super::irq::{interrupt_clear_all, interrupt_mask_all, interrupt_unmask};
use super::regs::{
    DBUF_MEM_CTRL, DPP_MEM_CTRL, DSC_MEM_CTRL, GLB_MODULE_CLK_EN, IFBC_MEM_CTRL, INNER_CLK_COMMON,
    INNER_CLK_PDP, LDI_MEM_CTRL, MEM_CTRL_SHUTDOWN,
};

/// Liga clocks, gating interno e interrupções. No-op se já ligado.
pub fn power_up(ctx: &HardwareContext) -> DssResult<()> {
    if ctx.is_powered() {
        crate::ktrace!("(DSS/Power) Já ligado, nada a fazer");
        return Ok(());
    }

    for domain in ClockDomain::POWER_UP_ORDER {
        if ctx.enabled_clocks().contains(domain.bit()) {
            continue;
        }
        if let Err(error) = ctx.clocks().get(domain).prepare_enable() {
            crate::kerror!("(DSS/Power) Falha ao habilitar clock:");
            crate::kerror!(domain.name());
            return Err(DssError::Clock { domain, error });
        }
        ctx.mark_clock(domain, true);
        crate::ktrace!(domain.name());
    }

    inner_clk_enable(ctx);

    interrupt_mask_all(ctx);
    interrupt_clear_all(ctx);
    ctx.irq_line().enable();
    interrupt_unmask(ctx);

    ctx.set_powered(true);
    crate::kok!("(DSS/Power) DSS ligado");
    Ok(())
}

/// Desliga interrupções, gating interno e clocks. No-op se já desligado.
///
/// Depois de um power up que falhou no meio, só os clocks que ficaram
/// ligados são liberados: registradores não são tocados.
pub fn power_down(ctx: &HardwareContext) {
    if ctx.is_powered() {
        interrupt_mask_all(ctx);
        ctx.irq_line().disable();
        inner_clk_disable(ctx);
    } else if ctx.enabled_clocks().is_empty() {
        return;
    }

    for domain in ClockDomain::POWER_UP_ORDER.iter().rev() {
        if ctx.enabled_clocks().contains(domain.bit()) {
            ctx.clocks().get(*domain).disable_unprepare();
            ctx.mark_clock(*domain, false);
        }
    }

    ctx.set_powered(false);
    crate::kinfo!("(DSS/Power) DSS desligado");
}

fn inner_clk_enable(ctx: &HardwareContext) {
    for (offset, value) in INNER_CLK_PDP.iter().chain(INNER_CLK_COMMON.iter()) {
        ctx.write32(*offset, *value);
    }
}

fn inner_clk_disable(ctx: &HardwareContext) {
    ctx.write32(GLB_MODULE_CLK_EN, 0);
    for offset in [
        DPP_MEM_CTRL,
        DBUF_MEM_CTRL,
        LDI_MEM_CTRL,
        IFBC_MEM_CTRL,
        DSC_MEM_CTRL,
    ] {
        ctx.write32(offset, MEM_CTRL_SHUTDOWN);
    }
}
