//! PIO data phase for a single sector.
//!
//! The data port presents each word with its bytes in the opposite order to
//! the 68k, so every word is swapped on the way through. Buffers always hold
//! the on-disk byte order.

use super::regs::RegisterBank;
use crate::block::SECTOR_SIZE;

pub const SECTOR_WORDS: usize = SECTOR_SIZE / 2;

/// Fills the first `SECTOR_SIZE` bytes of `sector` from the data port.
pub fn read_sector_data<R: RegisterBank + ?Sized>(regs: &mut R, sector: &mut [u8]) {
    for word in sector[..SECTOR_SIZE].chunks_exact_mut(2) {
        let value = regs.read_data().swap_bytes();
        word.copy_from_slice(&value.to_be_bytes());
    }
}

/// Sends the first `SECTOR_SIZE` bytes of `sector` to the data port.
pub fn write_sector_data<R: RegisterBank + ?Sized>(regs: &mut R, sector: &[u8]) {
    for word in sector[..SECTOR_SIZE].chunks_exact(2) {
        regs.write_data(u16::from_be_bytes([word[0], word[1]]).swap_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ata::regs::Register;

    #[derive(Default)]
    struct DataPort {
        words: Vec<u16>,
        cursor: usize,
    }

    impl RegisterBank for DataPort {
        fn read(&mut self, reg: Register) -> u8 {
            panic!("unexpected read of {:?}", reg);
        }

        fn write(&mut self, reg: Register, _value: u8) {
            panic!("unexpected write of {:?}", reg);
        }

        fn read_data(&mut self) -> u16 {
            let word = self.words[self.cursor];
            self.cursor += 1;
            word
        }

        fn write_data(&mut self, value: u16) {
            self.words.push(value);
        }
    }

    #[test]
    fn read_moves_exactly_one_sector() {
        let mut port = DataPort {
            words: (0..SECTOR_WORDS + 4)
                .map(|i| (((i & 0xff) as u16) << 8) | 0x30)
                .collect(),
            cursor: 0,
        };
        let mut sector = [0u8; SECTOR_SIZE + 8];
        read_sector_data(&mut port, &mut sector);

        assert_eq!(port.cursor, SECTOR_WORDS);
        // first byte on the wire is the low half of the port word
        assert_eq!(&sector[..4], &[0x30, 0x00, 0x30, 0x01]);
        assert_eq!(&sector[SECTOR_SIZE..], &[0u8; 8]);
    }

    #[test]
    fn write_swaps_each_word() {
        let mut port = DataPort::default();
        let mut sector = [0u8; SECTOR_SIZE];
        sector[0] = 0x12;
        sector[1] = 0x34;
        write_sector_data(&mut port, &sector);

        assert_eq!(port.words.len(), SECTOR_WORDS);
        assert_eq!(port.words[0], 0x3412);
        assert!(port.words[1..].iter().all(|&w| w == 0));
    }

    #[test]
    fn double_swap_is_identity() {
        let pattern: Vec<u8> = (0..SECTOR_SIZE).map(|i| (i * 7 + 3) as u8).collect();

        let mut port = DataPort::default();
        write_sector_data(&mut port, &pattern);

        let mut back = [0u8; SECTOR_SIZE];
        read_sector_data(&mut port, &mut back);
        assert_eq!(&back[..], &pattern[..]);
    }
}
