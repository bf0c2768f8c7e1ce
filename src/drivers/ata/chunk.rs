//! Splitting a sector range into commands the device accepts.

/// An LBA28 command moves at most 256 sectors; 256 is sent as 0.
pub const MAX_SECTORS_PER_COMMAND: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub lba: u32,
    pub sectors: u32,
}

impl Chunk {
    pub const fn count_register(self) -> u8 {
        (self.sectors % MAX_SECTORS_PER_COMMAND) as u8
    }
}

#[derive(Debug, Clone)]
pub struct Chunks {
    next: u32,
    remaining: u32,
}

pub fn chunks(start: u32, count: u32) -> Chunks {
    Chunks {
        next: start,
        remaining: count,
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.remaining == 0 {
            return None;
        }
        let sectors = self.remaining.min(MAX_SECTORS_PER_COMMAND);
        let chunk = Chunk {
            lba: self.next,
            sectors,
        };
        self.remaining -= sectors;
        self.next = self.next.wrapping_add(sectors);
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.div_ceil(MAX_SECTORS_PER_COMMAND) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn count_register_encodes_256_as_zero() {
        assert_eq!(Chunk { lba: 0, sectors: 256 }.count_register(), 0);
        assert_eq!(Chunk { lba: 0, sectors: 255 }.count_register(), 255);
        assert_eq!(Chunk { lba: 0, sectors: 1 }.count_register(), 1);
    }

    #[test]
    fn six_hundred_sectors() {
        let got: Vec<Chunk> = chunks(10, 600).collect();
        assert_eq!(
            got,
            [
                Chunk { lba: 10, sectors: 256 },
                Chunk { lba: 266, sectors: 256 },
                Chunk { lba: 522, sectors: 88 },
            ]
        );
    }

    #[test]
    fn empty_request() {
        assert_eq!(chunks(5, 0).count(), 0);
    }

    proptest! {
        #[test]
        fn chunks_cover_the_range_exactly(start in 0u32..0x0fff_0000, count in 0u32..5000) {
            let all: Vec<Chunk> = chunks(start, count).collect();
            prop_assert_eq!(all.len(), chunks(start, count).len());
            prop_assert_eq!(all.iter().map(|c| c.sectors).sum::<u32>(), count);

            let mut expected = start;
            for chunk in &all {
                prop_assert!(chunk.sectors >= 1 && chunk.sectors <= MAX_SECTORS_PER_COMMAND);
                prop_assert_eq!(chunk.lba, expected);
                expected += chunk.sectors;
            }
            prop_assert_eq!(expected, start + count);

            // only the last chunk may be short
            if let Some((_, full)) = all.split_last() {
                prop_assert!(full.iter().all(|c| c.sectors == MAX_SECTORS_PER_COMMAND));
            }
        }
    }
}
