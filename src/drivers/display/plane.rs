//! # Plane / Output Validator
//!
//! Admissão de um frame antes de qualquer escrita em hardware.
//!
//! ## Regras (na ordem em que são checadas)
//!
//! ```text
//! 1. formato    fourcc na lista do canal
//! 2. escala     src.w == dst.w && src.h == dst.h
//! 3. origem     src dentro do framebuffer
//! 4. destino    dst.x >= 0 && dst.y >= 0
//! 5. destino    dst dentro da área ativa do modo
//! ```
//!
//! Toda a aritmética de borda é feita em `i64`: `x + width` nunca estoura.

use super::buffer::FrameBuffer;
use super::error::ValidationError;
use super::format::{HwFormat, OVERLAY_FORMATS, PRIMARY_FORMATS};

/// Canais de hardware (planes) do DSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Primary,
    Overlay1,
    Overlay2,
}

/// Número de canais.
pub const CHANNEL_COUNT: usize = 3;

impl OutputChannel {
    pub const ALL: [OutputChannel; CHANNEL_COUNT] = [
        OutputChannel::Primary,
        OutputChannel::Overlay1,
        OutputChannel::Overlay2,
    ];

    /// Índice do canal no hardware.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Overlay1 => 1,
            Self::Overlay2 => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Overlay1 => "overlay1",
            Self::Overlay2 => "overlay2",
        }
    }

    /// Formatos aceitos, em ordem de preferência.
    pub fn formats(&self) -> &'static [u32] {
        match self {
            Self::Primary => &PRIMARY_FORMATS,
            Self::Overlay1 | Self::Overlay2 => &OVERLAY_FORMATS,
        }
    }

    #[inline]
    pub fn supports(&self, pixel_format: u32) -> bool {
        self.formats().contains(&pixel_format)
    }
}

/// Retângulo em pixels. Offsets com sinal, tamanho sem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Retângulo cabe em `[0, w) × [0, h)`.
    fn fits_in(&self, w: u32, h: u32) -> bool {
        let x = self.x as i64;
        let y = self.y as i64;
        x >= 0
            && y >= 0
            && x + self.width as i64 <= w as i64
            && y + self.height as i64 <= h as i64
    }
}

/// Um frame para um canal: buffer + recorte de origem + posição na tela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSubmission {
    pub fb: FrameBuffer,
    pub src: Rect,
    pub dst: Rect,
}

impl FrameSubmission {
    /// Buffer inteiro na posição (x, y), sem recorte.
    pub fn full(fb: FrameBuffer, x: i32, y: i32) -> Self {
        Self {
            fb,
            src: Rect::new(0, 0, fb.width, fb.height),
            dst: Rect::new(x, y, fb.width, fb.height),
        }
    }
}

/// Valida um frame contra o canal e a área ativa do modo.
///
/// Não toca hardware. Retorna o formato de hardware a programar.
pub fn validate(
    channel: OutputChannel,
    submission: &FrameSubmission,
    active_width: u32,
    active_height: u32,
) -> Result<HwFormat, ValidationError> {
    let FrameSubmission { fb, src, dst } = submission;

    let format = fb
        .hw_format()
        .filter(|_| channel.supports(fb.pixel_format))
        .ok_or(ValidationError::UnsupportedFormat)?;

    if !src.same_size(dst) {
        return Err(ValidationError::ScalingNotSupported);
    }

    if !src.fits_in(fb.width, fb.height) {
        return Err(ValidationError::SourceOutOfBounds);
    }

    if dst.x < 0 || dst.y < 0 {
        return Err(ValidationError::NegativeDestination);
    }

    if !dst.fits_in(active_width, active_height) {
        return Err(ValidationError::DestinationOutOfBounds);
    }

    Ok(format)
}
