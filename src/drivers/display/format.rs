//! # Pixel Formats
//!
//! Tabela fixa fourcc (DRM) → formato de hardware do DSS, e a lista de
//! formatos aceitos por canal. Nenhuma conversão de pixel acontece aqui.

/// Monta um código fourcc little-endian.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    (code[0] as u32) | ((code[1] as u32) << 8) | ((code[2] as u32) << 16) | ((code[3] as u32) << 24)
}

// 16bpp RGB
pub const DRM_FORMAT_RGB565: u32 = fourcc(b"RG16");
pub const DRM_FORMAT_BGR565: u32 = fourcc(b"BG16");
// 32bpp [A]RGB
pub const DRM_FORMAT_XRGB8888: u32 = fourcc(b"XR24");
pub const DRM_FORMAT_XBGR8888: u32 = fourcc(b"XB24");
pub const DRM_FORMAT_RGBA8888: u32 = fourcc(b"RA24");
pub const DRM_FORMAT_BGRA8888: u32 = fourcc(b"BA24");
pub const DRM_FORMAT_ARGB8888: u32 = fourcc(b"AR24");
pub const DRM_FORMAT_ABGR8888: u32 = fourcc(b"AB24");

/// Formatos de pixel do hardware.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwFormat {
    Rgb565 = 0,
    Rgbx8888 = 5,
    Rgba8888 = 6,
    Bgr565 = 7,
    Bgrx8888 = 12,
    Bgra8888 = 13,
}

impl HwFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::Rgb565 | Self::Bgr565 => 2,
            _ => 4,
        }
    }
}

/// fourcc → formato de hardware.
///
/// ARGB/ABGR caem nos formatos com alpha invertido de ordem (BGRA/RGBA):
/// o DSS lê a palavra na ordem oposta à do fourcc.
pub const DSS_FORMATS: [(u32, HwFormat); 8] = [
    (DRM_FORMAT_RGB565, HwFormat::Rgb565),
    (DRM_FORMAT_BGR565, HwFormat::Bgr565),
    (DRM_FORMAT_XRGB8888, HwFormat::Rgbx8888),
    (DRM_FORMAT_XBGR8888, HwFormat::Bgrx8888),
    (DRM_FORMAT_RGBA8888, HwFormat::Rgba8888),
    (DRM_FORMAT_BGRA8888, HwFormat::Bgra8888),
    (DRM_FORMAT_ARGB8888, HwFormat::Bgra8888),
    (DRM_FORMAT_ABGR8888, HwFormat::Rgba8888),
];

/// Converte fourcc para formato do DSS. `None` se não suportado.
pub fn dss_format_of(pixel_format: u32) -> Option<HwFormat> {
    DSS_FORMATS
        .iter()
        .find(|(drm, _)| *drm == pixel_format)
        .map(|(_, hw)| *hw)
}

/// Formatos do canal primário (todos os da tabela).
pub const PRIMARY_FORMATS: [u32; 8] = [
    DRM_FORMAT_RGB565,
    DRM_FORMAT_BGR565,
    DRM_FORMAT_XRGB8888,
    DRM_FORMAT_XBGR8888,
    DRM_FORMAT_RGBA8888,
    DRM_FORMAT_BGRA8888,
    DRM_FORMAT_ARGB8888,
    DRM_FORMAT_ABGR8888,
];

/// Formatos dos overlays: só 32bpp.
pub const OVERLAY_FORMATS: [u32; 6] = [
    DRM_FORMAT_XRGB8888,
    DRM_FORMAT_XBGR8888,
    DRM_FORMAT_RGBA8888,
    DRM_FORMAT_BGRA8888,
    DRM_FORMAT_ARGB8888,
    DRM_FORMAT_ABGR8888,
];
