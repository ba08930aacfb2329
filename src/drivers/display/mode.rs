//! # Mode Programmer
//!
//! Calcula e programa o pixel clock de um modo.
//!
//! ## Fluxo de `set_mode`
//!
//! ```text
//! clock_khz ──► override (4 taxas conhecidas) ──► set_rate(Hz)
//!                                                     │ falha: log + HwFaults
//!                                                     ▼
//!                          adjusted_clock_khz ◄── rate() / 1000
//!                                                     │
//!                                                     ▼
//!                                        ScanoutProgrammer::init_timing
//! ```
//!
//! O clock ajustado vem SEMPRE da leitura de volta; nunca do pedido.

use super::config::DssConfig;
use super::context::HardwareContext;
use super::error::{HwFaults, ValidationError};
use super::traits::ScanoutProgrammer;

/// Taxas que o PLL do pixel clock não atinge, e a taxa limpa usada no lugar.
///
/// `(pedido kHz, programado kHz)`.
pub const PIXEL_CLOCK_OVERRIDES: [(u32, u32); 4] = [
    (148_500, 144_000),
    (83_496, 80_000),
    (74_440, 72_000),
    (74_250, 72_000),
];

/// Modo de display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayMode {
    /// Pixel clock pedido (kHz).
    pub clock_khz: u32,
    /// Largura ativa.
    pub hdisplay: u32,
    /// Altura ativa.
    pub vdisplay: u32,
    /// Pixel clock efetivamente programado (kHz). Zero até o mode set.
    pub adjusted_clock_khz: u32,
}

impl DisplayMode {
    pub const fn new(clock_khz: u32, hdisplay: u32, vdisplay: u32) -> Self {
        Self {
            clock_khz,
            hdisplay,
            vdisplay,
            adjusted_clock_khz: 0,
        }
    }
}

/// Taxa em Hz realmente pedida ao clock para `clock_khz`.
pub fn pixel_clock_override_hz(clock_khz: u32) -> u64 {
    let khz = PIXEL_CLOCK_OVERRIDES
        .iter()
        .find(|(requested, _)| *requested == clock_khz)
        .map_or(clock_khz, |(_, programmed)| *programmed);
    khz as u64 * 1000
}

/// Programa o pixel clock e o timing do modo.
///
/// Falha de `set_rate` não aborta: o modo já passou por `mode_valid`, então
/// isso é uma violação de invariante. Fica registrada em `HwFaults` e o
/// modo segue com a taxa que o clock reportar.
///
/// Retorna o clock ajustado em kHz (também gravado em `mode`).
pub fn set_mode(
    ctx: &HardwareContext,
    scanout: &dyn ScanoutProgrammer,
    mode: &mut DisplayMode,
) -> u32 {
    let pixel = &ctx.clocks().pixel;
    let hz = pixel_clock_override_hz(mode.clock_khz);

    crate::kdebug!("(DSS/Mode) clock pedido (kHz)=", mode.clock_khz);

    if let Err(error) = pixel.set_rate(hz) {
        crate::kerror!("(DSS/Mode) Falha ao programar pixel clock Hz=", hz);
        crate::kerror!(error.as_str());
        ctx.record_fault(HwFaults::PIXEL_CLOCK_RATE);
    }

    mode.adjusted_clock_khz = (pixel.rate() / 1000) as u32;
    crate::kinfo!("(DSS/Mode) pxl0_clk (kHz)=", mode.adjusted_clock_khz);

    scanout.init_timing(mode);
    mode.adjusted_clock_khz
}

/// Ajusta o clock do modo para o que o hardware consegue, sem programar nada.
pub fn mode_fixup(ctx: &HardwareContext, mode: &DisplayMode) -> DisplayMode {
    let rounded = ctx.clocks().pixel.round_rate(mode.clock_khz as u64 * 1000);
    DisplayMode {
        adjusted_clock_khz: (rounded / 1000) as u32,
        ..*mode
    }
}

/// Admissão de um modo antes de qualquer escrita.
pub fn mode_valid(config: &DssConfig, mode: &DisplayMode) -> Result<(), ValidationError> {
    let width_ok = (config.min_width..=config.max_width).contains(&mode.hdisplay);
    let height_ok = (config.min_height..=config.max_height).contains(&mode.vdisplay);

    if mode.clock_khz == 0 || !width_ok || !height_ok {
        return Err(ValidationError::ModeOutOfRange);
    }

    if pixel_clock_override_hz(mode.clock_khz) > config.pixel_clk_max_hz {
        return Err(ValidationError::ModeOutOfRange);
    }

    Ok(())
}
