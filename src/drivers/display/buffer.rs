//! # Frame Buffer Descriptor
//!
//! Descrição de um buffer entregue pelo compositor a cada submissão.
//! O driver nunca lê nem escreve a memória do buffer: só repassa o endereço
//! para o `ScanoutProgrammer`.

use super::format::{dss_format_of, HwFormat};

/// Buffer de scan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Largura em pixels.
    pub width: u32,
    /// Altura em pixels.
    pub height: u32,
    /// Código fourcc DRM.
    pub pixel_format: u32,
    /// Bytes por linha.
    pub pitch: u32,
    /// Endereço de DMA do primeiro pixel.
    pub addr: u64,
}

impl FrameBuffer {
    /// Buffer compacto (pitch = largura × bpp). Para formatos desconhecidos
    /// assume 4 bytes por pixel; a validação rejeita o formato depois.
    pub fn new(width: u32, height: u32, pixel_format: u32, addr: u64) -> Self {
        let bpp = dss_format_of(pixel_format)
            .map(|hw| hw.bytes_per_pixel())
            .unwrap_or(4);
        Self {
            width,
            height,
            pixel_format,
            pitch: width.saturating_mul(bpp),
            addr,
        }
    }

    /// Formato de hardware, se suportado.
    #[inline]
    pub fn hw_format(&self) -> Option<HwFormat> {
        dss_format_of(self.pixel_format)
    }

    /// Tamanho total em bytes.
    pub fn size(&self) -> u64 {
        self.pitch as u64 * self.height as u64
    }
}
