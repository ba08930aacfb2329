//! # Register Access Layer
//!
//! Leitura/escrita de 32 bits sobre a janela MMIO do DSS.
//!
//! O attach valida a janela uma vez; depois disso nenhum acesso retorna
//! erro. Um offset fora da janela é bug do driver: é logado e ignorado
//! (leitura devolve 0) em vez de tocar memória arbitrária.

use core::ptr::NonNull;

use volatile::VolatilePtr;

use super::error::InitError;

/// Espaço de registradores de 32 bits endereçado por byte.
///
/// Implementado por `MmioRegion` em hardware real e por dublês nos testes.
pub trait RegisterSpace: Send + Sync {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);

    /// Tamanho da janela em bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Janela MMIO mapeada pelo host.
pub struct MmioRegion {
    base: NonNull<u32>,
    len: usize,
}

// SAFETY: a janela é memória de dispositivo; todo acesso é volatile de
// 32 bits e read-modify-write é serializado por HardwareContext.
unsafe impl Send for MmioRegion {}
unsafe impl Sync for MmioRegion {}

impl MmioRegion {
    /// Envolve uma janela já mapeada.
    ///
    /// # Safety
    ///
    /// - `base` deve apontar para `len` bytes de MMIO mapeados e válidos
    ///   durante toda a vida do `MmioRegion`.
    /// - Ninguém mais pode escrever na janela sem passar por este driver.
    pub unsafe fn new(base: *mut u8, len: usize) -> Result<Self, InitError> {
        let base = NonNull::new(base).ok_or(InitError::NullMapping)?;
        if (base.as_ptr() as usize) % 4 != 0 {
            return Err(InitError::MisalignedMapping);
        }

        crate::ktrace!("(DSS) MMIO base=", base.as_ptr() as usize);
        crate::ktrace!("(DSS) MMIO size=", len);

        Ok(Self {
            base: base.cast::<u32>(),
            len,
        })
    }

    /// Ponteiro volatile para o registrador, se o offset for válido.
    #[inline]
    fn reg(&self, offset: usize) -> Option<VolatilePtr<'_, u32>> {
        if offset % 4 != 0 || offset.checked_add(4).map_or(true, |end| end > self.len) {
            return None;
        }
        // SAFETY: offset alinhado e dentro da janela validada em `new`
        unsafe {
            let ptr = NonNull::new_unchecked(self.base.as_ptr().add(offset / 4));
            Some(VolatilePtr::new(ptr))
        }
    }
}

impl RegisterSpace for MmioRegion {
    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        match self.reg(offset) {
            Some(reg) => reg.read(),
            None => {
                crate::kerror!("(DSS) read32 fora da janela MMIO: ", offset);
                0
            }
        }
    }

    #[inline]
    fn write32(&self, offset: usize, value: u32) {
        match self.reg(offset) {
            Some(reg) => reg.write(value),
            None => crate::kerror!("(DSS) write32 fora da janela MMIO: ", offset),
        }
    }

    fn len(&self) -> usize {
        self.len
    }
}
