//! Testes do driver DSS
//!
//! # Como Executar os Testes
//!
//! ```bash
//! # Todos os testes do DSS
//! cargo test --lib drivers::display::test
//!
//! # Um módulo específico
//! cargo test --lib drivers::display::test::irq_test
//! ```
//!
//! # Estrutura dos Testes
//!
//! - `mock.rs` - Dublês de registradores, clocks, tempo, IRQ e scanout
//! - `mode_test.rs` - Mode Programmer (overrides, leitura de volta)
//! - `plane_test.rs` - Validator e tabela de formatos
//! - `irq_test.rs` - Demultiplexação, ack e underflow
//! - `power_test.rs` - Sequência de energia
//! - `crtc_test.rs` - Máquina de estados, flips, esperas, ponta a ponta
//!
//! # Convenções
//!
//! - Prefixo `test_` para testes unitários
//! - Prefixo `integration_` para cenários que passam por todo o pipeline

pub mod mock;

mod power_test;
