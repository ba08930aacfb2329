//! Testes do Power Sequencer

#![cfg(test)]

use std::vec::Vec;

use crate::drivers::display::clock::{ClockDomain, ClockDomains, ClockError};
use crate::drivers::display::error::DssError;
use crate::drivers::display::irq::IrqLine;
use crate::drivers::display::power::{power_down, power_up};
use crate::drivers::display::regs::{
    DBUF_MEM_CTRL, DPP_MEM_CTRL, DSC_MEM_CTRL, GLB_MODULE_CLK_EN, IFBC_MEM_CTRL, INNER_CLK_COMMON,
    INNER_CLK_PDP, IRQ_ACK_ORDER, IRQ_MASK_ALL, LDI_INT_UNMASK, LDI_IRQ_REGS, LDI_MEM_CTRL,
    MEM_CTRL_SHUTDOWN, PDP_INT_UNMASK, PDP_IRQ_REGS,
};

use super::mock::{ClockOp, Parts};

fn enables(domains: &[ClockDomain]) -> Vec<ClockOp> {
    domains.iter().map(|d| ClockOp::Enable(d.name())).collect()
}

#[test]
fn test_power_up_enables_clocks_in_fixed_order() {
    let parts = Parts::new();
    let ctx = parts.context();

    power_up(&ctx).unwrap();

    assert_eq!(parts.clocks.ops(), enables(&ClockDomain::POWER_UP_ORDER));
    assert_eq!(
        parts.clocks.ops(),
        vec![
            ClockOp::Enable("clk_ldi0"),
            ClockOp::Enable("clk_dss_axi_mm"),
            ClockOp::Enable("clk_edc0"),
            ClockOp::Enable("pclk_dss"),
            ClockOp::Enable("aclk_dss"),
        ]
    );
    assert!(ctx.is_powered());
    assert!(parts.irq.is_enabled());
}

#[test]
fn test_power_up_register_sequence() {
    let parts = Parts::new();
    let ctx = parts.context();

    power_up(&ctx).unwrap();

    let mut expected: Vec<(usize, u32)> = Vec::new();
    expected.extend(INNER_CLK_PDP);
    expected.extend(INNER_CLK_COMMON);
    expected.extend(IRQ_ACK_ORDER.iter().map(|g| (g.mask, IRQ_MASK_ALL)));
    expected.extend(IRQ_ACK_ORDER.iter().map(|g| (g.clear, IRQ_MASK_ALL)));
    expected.push((PDP_IRQ_REGS.mask, PDP_INT_UNMASK));
    expected.push((LDI_IRQ_REGS.mask, LDI_INT_UNMASK));

    assert_eq!(parts.regs.writes(), expected);
    assert_eq!(parts.irq.enables(), 1);
}

#[test]
fn test_power_up_fails_fast_without_rollback() {
    let parts = Parts::new();
    let ctx = parts.context();
    parts.clocks.core.fail_enable(true);

    let err = power_up(&ctx).unwrap_err();

    assert_eq!(
        err,
        DssError::Clock {
            domain: ClockDomain::Core,
            error: ClockError::EnableFailed,
        }
    );
    assert!(parts.clocks.pixel.is_enabled());
    assert!(parts.clocks.mmbuf.is_enabled());
    assert!(!parts.clocks.peripheral.is_enabled());
    assert!(!parts.clocks.bus.is_enabled());
    assert!(!parts
        .clocks
        .ops()
        .iter()
        .any(|op| matches!(op, ClockOp::Disable(_))));
    assert!(!ctx.is_powered());
    assert!(!parts.irq.is_enabled());
    assert!(parts.regs.writes().is_empty());
}

#[test]
fn test_retry_after_partial_power_up_enables_each_clock_once() {
    let parts = Parts::new();
    let ctx = parts.context();
    parts.clocks.bus.fail_enable(true);

    assert!(power_up(&ctx).is_err());
    assert_eq!(
        ctx.enabled_clocks(),
        ClockDomains::PIXEL
            | ClockDomains::MEMORY_BUFFER
            | ClockDomains::CORE
            | ClockDomains::PERIPHERAL
    );

    // segunda falha não empilha referências
    assert!(power_up(&ctx).is_err());
    parts.clocks.bus.fail_enable(false);
    power_up(&ctx).unwrap();

    for domain in ClockDomain::POWER_UP_ORDER {
        assert_eq!(parts.clocks.get(domain).refcount(), 1, "{}", domain.name());
    }
    assert_eq!(ctx.enabled_clocks(), ClockDomains::all());

    power_down(&ctx);

    for domain in ClockDomain::POWER_UP_ORDER {
        assert_eq!(parts.clocks.get(domain).refcount(), 0, "{}", domain.name());
    }
    assert!(ctx.enabled_clocks().is_empty());
}

#[test]
fn test_power_down_after_failed_power_up_releases_held_clocks() {
    let parts = Parts::new();
    let ctx = parts.context();
    parts.clocks.core.fail_enable(true);

    assert!(power_up(&ctx).is_err());
    power_down(&ctx);

    assert_eq!(
        parts.clocks.ops(),
        vec![
            ClockOp::Enable("clk_ldi0"),
            ClockOp::Enable("clk_dss_axi_mm"),
            ClockOp::Disable("clk_dss_axi_mm"),
            ClockOp::Disable("clk_ldi0"),
        ]
    );
    // registradores intocados: o barramento nunca foi ligado
    assert!(parts.regs.writes().is_empty());
    assert_eq!(parts.irq.disables(), 0);
    assert!(ctx.enabled_clocks().is_empty());
}

#[test]
fn test_power_up_is_idempotent() {
    let parts = Parts::new();
    let ctx = parts.context();

    power_up(&ctx).unwrap();
    let writes = parts.regs.writes().len();
    power_up(&ctx).unwrap();

    assert_eq!(parts.clocks.ops().len(), 5);
    assert_eq!(parts.regs.writes().len(), writes);
    assert_eq!(parts.irq.enables(), 1);
}

#[test]
fn test_power_down_is_the_inverse_of_power_up() {
    let parts = Parts::new();
    let ctx = parts.context();
    power_up(&ctx).unwrap();

    power_down(&ctx);

    let reverse: Vec<ClockOp> = ClockDomain::POWER_UP_ORDER
        .iter()
        .rev()
        .map(|d| ClockOp::Disable(d.name()))
        .collect();
    assert_eq!(parts.clocks.ops()[5..], reverse[..]);

    assert!(!ctx.is_powered());
    assert!(!parts.irq.is_enabled());
    for group in IRQ_ACK_ORDER {
        assert_eq!(parts.regs.peek(group.mask), IRQ_MASK_ALL);
    }
    assert_eq!(parts.regs.peek(GLB_MODULE_CLK_EN), 0);
    for offset in [DPP_MEM_CTRL, DBUF_MEM_CTRL, LDI_MEM_CTRL, IFBC_MEM_CTRL, DSC_MEM_CTRL] {
        assert_eq!(parts.regs.peek(offset), MEM_CTRL_SHUTDOWN);
    }
}

#[test]
fn test_power_down_when_off_is_a_noop() {
    let parts = Parts::new();
    let ctx = parts.context();

    power_down(&ctx);

    assert!(parts.clocks.ops().is_empty());
    assert!(parts.regs.writes().is_empty());
    assert_eq!(parts.irq.disables(), 0);
}

#[test]
fn test_power_cycle() {
    let parts = Parts::new();
    let ctx = parts.context();

    power_up(&ctx).unwrap();
    power_down(&ctx);
    power_up(&ctx).unwrap();

    assert!(ctx.is_powered());
    assert_eq!(parts.clocks.bus.refcount(), 1);
    assert!(parts.irq.is_enabled());
    assert!(parts.clocks.bus.is_enabled());
    assert_eq!(parts.regs.peek(LDI_IRQ_REGS.mask), LDI_INT_UNMASK);
}
