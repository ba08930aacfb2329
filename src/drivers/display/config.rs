//! # Configuração do DSS
//!
//! Taxas de clock iniciais, prazos de espera e políticas que o código-fonte
//! do hardware deixa em aberto.

use crate::core::time::millis_to_us;

/// Taxa do core clock (clk_edc0) programada no attach.
pub const DEFAULT_DSS_CORE_CLK_RATE: u64 = 400_000_000;

/// Teto do pixel clock (clk_ldi0), programado no attach.
pub const DSS_MAX_PXL0_CLK_144M: u64 = 144_000_000;

/// Prazo padrão de espera por vsync.
pub const DEFAULT_VBLANK_TIMEOUT_US: u64 = millis_to_us(100);

/// Prazo padrão de espera por fim de frame ativo.
pub const DEFAULT_FRAME_END_TIMEOUT_US: u64 = millis_to_us(300);

/// Maior resolução aceita em qualquer eixo.
pub const DSS_MAX_DIMENSION: u32 = 4096;

/// Configuração de uma instância do DSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DssConfig {
    pub core_clk_hz: u64,
    pub pixel_clk_max_hz: u64,
    pub vblank_timeout_us: u64,
    pub frame_end_timeout_us: u64,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// `disable()` também desliga clocks e IRQ.
    ///
    /// Desligado por padrão: os clocks podem ser compartilhados com outros
    /// consumidores.
    pub power_down_on_disable: bool,
    /// Cada `commit_mode` limpa a máscara de underflow.
    pub rearm_underflow_on_modeset: bool,
}

impl DssConfig {
    pub const fn new() -> Self {
        Self {
            core_clk_hz: DEFAULT_DSS_CORE_CLK_RATE,
            pixel_clk_max_hz: DSS_MAX_PXL0_CLK_144M,
            vblank_timeout_us: DEFAULT_VBLANK_TIMEOUT_US,
            frame_end_timeout_us: DEFAULT_FRAME_END_TIMEOUT_US,
            min_width: 1,
            min_height: 1,
            max_width: DSS_MAX_DIMENSION,
            max_height: DSS_MAX_DIMENSION,
            power_down_on_disable: false,
            rearm_underflow_on_modeset: true,
        }
    }
}

impl Default for DssConfig {
    fn default() -> Self {
        Self::new()
    }
}
