//! ISA I/O space translation.
//!
//! The Q40 has no port I/O instructions; the ISA bus is mapped into the 68k
//! address space with every port spread over four bytes. Byte accesses go
//! through the odd lane, word accesses through the even one.

pub trait BusWindow {
    fn byte_register(&self, port: u16) -> usize;
    fn word_register(&self, port: u16) -> usize;
}

const Q40_ISA_IO_BASE: usize = 0xff40_0000;

#[derive(Debug, Clone, Copy, Default)]
pub struct Q40Isa;

impl BusWindow for Q40Isa {
    fn byte_register(&self, port: u16) -> usize {
        Q40_ISA_IO_BASE + 1 + 4 * port as usize
    }

    fn word_register(&self, port: u16) -> usize {
        Q40_ISA_IO_BASE + 4 * port as usize
    }
}
