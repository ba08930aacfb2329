//! Tipos de Erro do DSS
//!
//! Erros estruturados para cada fronteira semântica do driver (attach,
//! energia, modo, submissão, espera). Registradores nunca falham: escrita é
//! fire-and-forget, então nada aqui vem de um acesso MMIO individual.

use core::fmt;

use super::clock::{ClockDomain, ClockError};
use super::crtc::PipeState;

bitflags::bitflags! {
    /// Falhas de hardware observadas em contexto de IRQ.
    ///
    /// Não são erros retornados: ficam acumuladas no contexto e são lidas
    /// por `Crtc::take_faults()`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HwFaults: u32 {
        /// LDI underflow: pipeline de pixels ficou sem dados.
        const UNDERFLOW        = 1 << 0;
        /// `set_rate` do pixel clock falhou durante um mode set.
        const PIXEL_CLOCK_RATE = 1 << 1;
    }
}

/// Falhas fatais no attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// Ponteiro base da janela MMIO nulo.
    NullMapping,
    /// Base da janela MMIO não alinhada a 4 bytes.
    MisalignedMapping,
    /// Janela menor que o bloco de registradores do DSS.
    RegisterWindowTooSmall,
    /// Falha ao programar a taxa inicial de um clock.
    ClockSetup(ClockDomain, ClockError),
}

impl InitError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NullMapping => "janela MMIO nula",
            Self::MisalignedMapping => "janela MMIO desalinhada",
            Self::RegisterWindowTooSmall => "janela MMIO menor que o bloco DSS",
            Self::ClockSetup(..) => "falha ao configurar clock inicial",
        }
    }
}

/// Motivos de rejeição antes de qualquer escrita em hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Formato de pixel fora da lista do canal.
    UnsupportedFormat,
    /// Tamanho de origem != destino. Este hardware não escala.
    ScalingNotSupported,
    /// Retângulo de origem sai do framebuffer.
    SourceOutOfBounds,
    /// Destino com offset negativo.
    NegativeDestination,
    /// Destino sai da área ativa do modo.
    DestinationOutOfBounds,
    /// Modo com clock zero ou dimensões fora dos limites.
    ModeOutOfRange,
}

impl ValidationError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "formato de pixel não suportado pelo canal",
            Self::ScalingNotSupported => "escala não suportada",
            Self::SourceOutOfBounds => "origem fora do framebuffer",
            Self::NegativeDestination => "destino com offset negativo",
            Self::DestinationOutOfBounds => "destino fora da área ativa",
            Self::ModeOutOfRange => "modo fora dos limites",
        }
    }
}

/// Erros do driver DSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DssError {
    /// Falha de attach (fatal, sem retry).
    Init(InitError),
    /// Falha de clock bloqueando a transição pedida.
    Clock {
        domain: ClockDomain,
        error: ClockError,
    },
    /// Submissão/modo rejeitado, hardware intocado.
    Validation(ValidationError),
    /// Espera por vsync/fim de frame expirou. Estado não muda.
    SyncTimeout,
    /// Já existe um flip pendente neste canal.
    FlipPending,
    /// Operação inválida no estado atual do pipeline.
    InvalidState(PipeState),
}

impl DssError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init(e) => e.as_str(),
            Self::Clock { .. } => "falha de clock",
            Self::Validation(e) => e.as_str(),
            Self::SyncTimeout => "timeout de sincronização",
            Self::FlipPending => "page flip pendente",
            Self::InvalidState(_) => "estado inválido do pipeline",
        }
    }
}

impl fmt::Display for DssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock { domain, error } => {
                write!(f, "{}: {} ({})", self.as_str(), domain.name(), error.as_str())
            }
            Self::InvalidState(state) => write!(f, "{}: {:?}", self.as_str(), state),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl From<InitError> for DssError {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<ValidationError> for DssError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<crate::sync::WaitTimeout> for DssError {
    fn from(_: crate::sync::WaitTimeout) -> Self {
        Self::SyncTimeout
    }
}

/// Tipo Result específico do DSS
pub type DssResult<T> = Result<T, DssError>;
