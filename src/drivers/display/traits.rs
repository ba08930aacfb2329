//! Traits de integração do DSS com o host

use super::format::HwFormat;
use super::mode::DisplayMode;
use super::plane::{FrameSubmission, OutputChannel};

/// Programação de timing e de planes (registradores de LDI/DPP/DMA).
///
/// É a rotina de inicialização de hardware do host: este núcleo só decide
/// quando chamar e com quais valores já validados.
pub trait ScanoutProgrammer: Send + Sync {
    /// Programa o timing para o modo com o clock já ajustado.
    fn init_timing(&self, mode: &DisplayMode);

    /// Aponta o canal para o buffer da submissão (já validada).
    fn pan_display(&self, channel: OutputChannel, submission: &FrameSubmission, format: HwFormat);

    /// Para o scan-out do canal.
    fn disable_plane(&self, _channel: OutputChannel) {}
}

/// Callback de vblank do compositor.
///
/// Chamado de contexto de IRQ, uma vez por VSYNC: não pode dormir nem
/// alocar.
pub trait VblankListener: Send + Sync {
    fn on_vblank(&self, vblank_seq: u64, timestamp_us: u64);
}
