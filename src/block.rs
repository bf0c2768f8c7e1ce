use crate::drivers::ata::VolumeLabel;

pub const SECTOR_SIZE: usize = 512;

/// Sector-addressed storage as seen by filesystem code.
pub trait BlockDevice {
    type Error;

    /// Reads `buf.len() / block_size()` consecutive blocks starting at `lba`.
    fn read_blocks(&mut self, lba: u32, buf: &mut [u8]) -> Result<(), Self::Error>;
    fn write_blocks(&mut self, lba: u32, buf: &[u8]) -> Result<(), Self::Error>;

    fn num_blocks(&self) -> u64;

    fn block_size(&self) -> usize {
        SECTOR_SIZE
    }
}

/// Filesystem side of disk discovery.
pub trait VolumeMounter {
    /// Called once per registered disk. Mounting is lazy: implementations must
    /// not touch the disk here and cannot fail.
    fn mount(&mut self, index: usize, label: VolumeLabel);
}
