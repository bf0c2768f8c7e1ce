use core::fmt;

use super::AtaError;
use super::identify::{
    ATA_ID_FW_REV_LEN, ATA_ID_PROD_LEN, ATA_ID_SERNO_LEN, IdString, IdentifyPage,
};
use super::regs::DriveSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStatus {
    Uninitialized,
    Mounted,
    Error,
}

/// Filesystem path prefix of a volume, `"0:"`, `"1:"`, ...
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VolumeLabel([u8; 2]);

impl VolumeLabel {
    pub const fn for_index(index: usize) -> Self {
        Self([b'0' + index as u8, b':'])
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("?:")
    }
}

impl fmt::Display for VolumeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for VolumeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// What IDENTIFY told us about a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveInfo {
    pub sectors: u32,
    pub model: IdString<ATA_ID_PROD_LEN>,
    pub serial: IdString<ATA_ID_SERNO_LEN>,
    pub firmware: IdString<ATA_ID_FW_REV_LEN>,
}

impl DriveInfo {
    pub fn from_page(page: &IdentifyPage) -> Self {
        Self {
            sectors: page.lba_capacity(),
            model: page.model(),
            serial: page.serial(),
            firmware: page.firmware(),
        }
    }

    pub const fn size_mb(&self) -> u32 {
        self.sectors >> 11
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disk {
    pub index: usize,
    /// Index of the owning controller in the `Ide` context.
    pub controller: usize,
    pub slot: DriveSlot,
    pub info: DriveInfo,
    pub status: MountStatus,
}

impl Disk {
    pub const fn sectors(&self) -> u32 {
        self.info.sectors
    }

    pub const fn label(&self) -> VolumeLabel {
        VolumeLabel::for_index(self.index)
    }
}

/// Append-only table of discovered disks; a disk's index is its handle.
pub struct DiskTable<const N: usize> {
    disks: [Option<Disk>; N],
    used: usize,
}

impl<const N: usize> DiskTable<N> {
    pub const fn new() -> Self {
        Self {
            disks: [None; N],
            used: 0,
        }
    }

    pub const fn len(&self) -> usize {
        self.used
    }

    pub const fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub const fn is_full(&self) -> bool {
        self.used >= N
    }

    pub fn get(&self, index: usize) -> Option<&Disk> {
        self.disks.get(index)?.as_ref()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Disk> {
        self.disks.get_mut(index)?.as_mut()
    }

    pub fn register(
        &mut self,
        controller: usize,
        slot: DriveSlot,
        info: DriveInfo,
    ) -> Result<&Disk, AtaError> {
        if self.is_full() {
            return Err(AtaError::RegistryFull);
        }
        let index = self.used;
        self.used += 1;
        Ok(&*self.disks[index].insert(Disk {
            index,
            controller,
            slot,
            info,
            status: MountStatus::Uninitialized,
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Disk> {
        self.disks[..self.used].iter().flatten()
    }
}

impl<const N: usize> Default for DiskTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
