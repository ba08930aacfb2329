//! # Mapa de Registradores do DSS
//!
//! Offsets relativos à base da janela MMIO principal do DSS e os bits de
//! interrupção de cada grupo.
//!
//! ## Grupos de interrupção
//!
//! ```text
//! Grupo 1: GLB  CPU_PDP   (status de frame/energia, sumário dos demais)
//! Grupo 2: LDI0 CPU_ITF   (interface de timing: vsync, vactive, underflow)
//!          DPP            (pós-processamento)
//!          SMMU           (MMU de memória, clear em registrador próprio)
//! ```
//!
//! Máscara: bit em 1 = fonte mascarada (não dispara evento).

// =============================================================================
// BASES DOS BLOCOS
// =============================================================================

pub const DSS_GLB0_OFFSET: usize = 0x12000;
pub const DSS_DBUF0_OFFSET: usize = 0x6D000;
pub const DSS_DPP_OFFSET: usize = 0x70000;
pub const DSS_IFBC_OFFSET: usize = 0x7D800;
pub const DSS_DSC_OFFSET: usize = 0x7DC00;
pub const DSS_LDI0_OFFSET: usize = 0x7D000;
pub const DSS_SMMU_OFFSET: usize = 0x80000;

/// Tamanho mínimo da janela MMIO que cobre todos os blocos acima.
pub const DSS_REG_WINDOW_SIZE: usize = DSS_SMMU_OFFSET + 0x1000;

// =============================================================================
// REGISTRADORES DE INTERRUPÇÃO
// =============================================================================

pub const GLB_CPU_PDP_INTS: usize = DSS_GLB0_OFFSET + 0x224;
pub const GLB_CPU_PDP_INT_MSK: usize = DSS_GLB0_OFFSET + 0x228;

pub const LDI_CPU_ITF_INTS: usize = DSS_LDI0_OFFSET + 0x248;
pub const LDI_CPU_ITF_INT_MSK: usize = DSS_LDI0_OFFSET + 0x24C;

pub const DPP_INTS: usize = DSS_DPP_OFFSET + 0x40;
pub const DPP_INT_MSK: usize = DSS_DPP_OFFSET + 0x44;

pub const SMMU_INTMASK_NS: usize = DSS_SMMU_OFFSET + 0x10;
pub const SMMU_INTSTAT_NS: usize = DSS_SMMU_OFFSET + 0x18;
pub const SMMU_INTCLR_NS: usize = DSS_SMMU_OFFSET + 0x1C;

/// Offsets de status/clear/máscara de um grupo de interrupção.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqGroupRegs {
    pub status: usize,
    pub clear: usize,
    pub mask: usize,
}

pub const PDP_IRQ_REGS: IrqGroupRegs = IrqGroupRegs {
    status: GLB_CPU_PDP_INTS,
    clear: GLB_CPU_PDP_INTS,
    mask: GLB_CPU_PDP_INT_MSK,
};

pub const LDI_IRQ_REGS: IrqGroupRegs = IrqGroupRegs {
    status: LDI_CPU_ITF_INTS,
    clear: LDI_CPU_ITF_INTS,
    mask: LDI_CPU_ITF_INT_MSK,
};

pub const DPP_IRQ_REGS: IrqGroupRegs = IrqGroupRegs {
    status: DPP_INTS,
    clear: DPP_INTS,
    mask: DPP_INT_MSK,
};

pub const SMMU_IRQ_REGS: IrqGroupRegs = IrqGroupRegs {
    status: SMMU_INTSTAT_NS,
    clear: SMMU_INTCLR_NS,
    mask: SMMU_INTMASK_NS,
};

/// Ordem de acknowledge: SMMU, DPP, LDI, PDP (folhas antes do sumário).
pub const IRQ_ACK_ORDER: [IrqGroupRegs; 4] =
    [SMMU_IRQ_REGS, DPP_IRQ_REGS, LDI_IRQ_REGS, PDP_IRQ_REGS];

/// Valor de máscara com todas as fontes desligadas.
pub const IRQ_MASK_ALL: u32 = 0xFFFF_FFFF;

bitflags::bitflags! {
    /// Bits do grupo 1 (GLB CPU_PDP).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PdpIrq: u32 {
        const MMU_IRPT_NS = 1 << 0;
        const ITF0_INTS   = 1 << 3;
        const DPP_INTS    = 1 << 4;
    }
}

bitflags::bitflags! {
    /// Bits do grupo 2, interface de timing (LDI0 CPU_ITF).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LdiIrq: u32 {
        const VACTIVE0_START = 1 << 0;
        const VACTIVE0_END   = 1 << 1;
        const LDI_UNFLOW     = 1 << 2;
        const VFRONTPORCH    = 1 << 3;
        const VSYNC          = 1 << 4;
        const VBACKPORCH     = 1 << 5;
    }
}

/// Máscara do grupo 1 após power up: só os sumários que nos interessam.
pub const PDP_INT_UNMASK: u32 =
    !(PdpIrq::ITF0_INTS.bits() | PdpIrq::DPP_INTS.bits() | PdpIrq::MMU_IRPT_NS.bits());

/// Máscara do LDI após power up: vsync, fim de vactive e underflow.
pub const LDI_INT_UNMASK: u32 = !(LdiIrq::VSYNC.bits()
    | LdiIrq::VACTIVE0_END.bits()
    | LdiIrq::LDI_UNFLOW.bits());

// =============================================================================
// CLOCK GATING INTERNO
// =============================================================================

pub const DPP_MEM_CTRL: usize = DSS_DPP_OFFSET + 0x600;
pub const DBUF_MEM_CTRL: usize = DSS_DBUF0_OFFSET + 0x160;
pub const LDI_MEM_CTRL: usize = DSS_LDI0_OFFSET + 0x368;
pub const IFBC_MEM_CTRL: usize = DSS_IFBC_OFFSET + 0x100;
pub const DSC_MEM_CTRL: usize = DSS_DSC_OFFSET + 0x134;
pub const GLB_MODULE_CLK_SEL: usize = DSS_GLB0_OFFSET + 0x300;
pub const GLB_MODULE_CLK_EN: usize = DSS_GLB0_OFFSET + 0x304;

/// Valor de MEM_CTRL que desliga a RAM interna do bloco.
pub const MEM_CTRL_SHUTDOWN: u32 = 0x0000_0004;

/// Caminho de clock do PDP (escrito antes do common).
pub const INNER_CLK_PDP: [(usize, u32); 3] = [
    (IFBC_MEM_CTRL, 0x0000_0088),
    (DSC_MEM_CTRL, 0x0000_0888),
    (LDI_MEM_CTRL, 0x0000_0008),
];

/// Caminho de clock comum a todos os canais.
pub const INNER_CLK_COMMON: [(usize, u32); 4] = [
    (DPP_MEM_CTRL, 0x0000_0008),
    (DBUF_MEM_CTRL, 0x0000_0008),
    (GLB_MODULE_CLK_SEL, 0x0000_0000),
    (GLB_MODULE_CLK_EN, 0xFFFF_FFFF),
];
