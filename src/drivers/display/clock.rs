//! # Clock Domains
//!
//! O DSS consome cinco clocks do framework de clock do host. Este módulo só
//! define a interface e o conjunto nomeado; quem decide divisores e PLLs é
//! o provedor de clock.

use alloc::sync::Arc;

/// Falha reportada pelo provedor de clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// `prepare_enable` recusado.
    EnableFailed,
    /// Taxa pedida não pode ser programada.
    RateRejected,
    /// Provedor ocupado (outra transição em andamento).
    Busy,
}

impl ClockError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnableFailed => "enable recusado",
            Self::RateRejected => "taxa recusada",
            Self::Busy => "provedor ocupado",
        }
    }
}

/// Handle de um clock do host.
///
/// Todas as taxas em Hz.
pub trait ClockControl: Send + Sync {
    fn prepare_enable(&self) -> Result<(), ClockError>;
    fn disable_unprepare(&self);
    /// Taxa efetivamente programada agora.
    fn rate(&self) -> u64;
    fn set_rate(&self, hz: u64) -> Result<(), ClockError>;
    /// Taxa que `set_rate(hz)` produziria, sem programar nada.
    fn round_rate(&self, hz: u64) -> u64;
}

/// Domínios de clock do DSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDomain {
    /// clk_ldi0: pixel clock do LDI.
    Pixel,
    /// clk_dss_axi_mm: buffer de memória (MMBUF).
    MemoryBuffer,
    /// clk_edc0: core clock.
    Core,
    /// pclk_dss: barramento de periféricos (APB).
    Peripheral,
    /// aclk_dss: barramento AXI.
    Bus,
}

impl ClockDomain {
    /// Ordem de habilitação no power up. `power_down` usa a ordem inversa.
    pub const POWER_UP_ORDER: [ClockDomain; 5] = [
        ClockDomain::Pixel,
        ClockDomain::MemoryBuffer,
        ClockDomain::Core,
        ClockDomain::Peripheral,
        ClockDomain::Bus,
    ];

    /// Nome do clock no device tree.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pixel => "clk_ldi0",
            Self::MemoryBuffer => "clk_dss_axi_mm",
            Self::Core => "clk_edc0",
            Self::Peripheral => "pclk_dss",
            Self::Bus => "aclk_dss",
        }
    }

    /// Bit do domínio em `ClockDomains`.
    pub fn bit(&self) -> ClockDomains {
        match self {
            Self::Pixel => ClockDomains::PIXEL,
            Self::MemoryBuffer => ClockDomains::MEMORY_BUFFER,
            Self::Core => ClockDomains::CORE,
            Self::Peripheral => ClockDomains::PERIPHERAL,
            Self::Bus => ClockDomains::BUS,
        }
    }
}

bitflags::bitflags! {
    /// Conjunto de domínios com um `prepare_enable` nosso em aberto.
    ///
    /// Cada bit equivale a exatamente uma referência no framework de clock
    /// do host: nunca habilitamos duas vezes nem liberamos o que não pegamos.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockDomains: u8 {
        const PIXEL         = 1 << 0;
        const MEMORY_BUFFER = 1 << 1;
        const CORE          = 1 << 2;
        const PERIPHERAL    = 1 << 3;
        const BUS           = 1 << 4;
    }
}

/// Conjunto de clocks do DSS, um por domínio.
#[derive(Clone)]
pub struct ClockSet {
    pub pixel: Arc<dyn ClockControl>,
    pub mmbuf: Arc<dyn ClockControl>,
    pub core: Arc<dyn ClockControl>,
    pub peripheral: Arc<dyn ClockControl>,
    pub bus: Arc<dyn ClockControl>,
}

impl ClockSet {
    pub fn get(&self, domain: ClockDomain) -> &dyn ClockControl {
        match domain {
            ClockDomain::Pixel => &*self.pixel,
            ClockDomain::MemoryBuffer => &*self.mmbuf,
            ClockDomain::Core => &*self.core,
            ClockDomain::Peripheral => &*self.peripheral,
            ClockDomain::Bus => &*self.bus,
        }
    }
}
