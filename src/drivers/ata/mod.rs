//! PIO ATA driver for the IDE interface on the ISA bus.
//!
//! Every operation is synchronous and polled. Controllers are reset and
//! probed once by [`Ide::init`]; the disks found there are addressed by their
//! index in the disk table from then on.

pub mod chunk;
pub mod identify;
pub mod regs;
pub mod registry;
pub mod sector;
pub mod wait;

#[cfg(test)]
mod mock;

use core::fmt;

use log::{debug, info, warn};

use crate::block::{BlockDevice, SECTOR_SIZE, VolumeMounter};
use crate::config::IdeConfig;
use crate::time::Clock;

pub use identify::{IdString, IdentifyPage};
pub use regs::{DriveSlot, IsaRegisters, Register, RegisterBank};
pub use registry::{Disk, DiskTable, DriveInfo, MountStatus, VolumeLabel};

use chunk::chunks;
use regs::{
    ATA_CMD_IDENTIFY, ATA_CMD_READ_SECTORS, ATA_CMD_WRITE_SECTORS, ATA_CTL_NIEN, ATA_CTL_SRST,
    ATA_SR_DRDY, ATA_SR_DRQ,
};
use sector::{read_sector_data, write_sector_data};
use wait::wait_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtaError {
    /// Nothing answered the device select.
    NoDevice,
    /// The device accepted a command but never asked for data.
    NotResponding,
    Timeout { status: u8 },
    /// The device raised ERR.
    Protocol { status: u8 },
    /// IDENTIFY worked but the device cannot do LBA addressing.
    UnsupportedDevice,
    BadIndex(usize),
    RegistryFull,
    BadBuffer { len: usize, needed: usize },
}

impl fmt::Display for AtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDevice => f.write_str("no disk found"),
            Self::NotResponding => f.write_str("disk not responding"),
            Self::Timeout { status } => write!(f, "timeout, status={:#04x}", status),
            Self::Protocol { status } => write!(f, "device error, status={:#04x}", status),
            Self::UnsupportedDevice => f.write_str("LBA not supported"),
            Self::BadIndex(index) => write!(f, "bad disk {}", index),
            Self::RegistryFull => f.write_str("max disks reached"),
            Self::BadBuffer { len, needed } => {
                write!(f, "buffer of {} bytes, need {}", len, needed)
            }
        }
    }
}

pub struct Controller<R> {
    base_io: u16,
    regs: R,
}

impl<R: RegisterBank> Controller<R> {
    pub const fn new(base_io: u16, regs: R) -> Self {
        Self { base_io, regs }
    }

    pub const fn base_io(&self) -> u16 {
        self.base_io
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Pulses SRST on the channel. Missing devices are only noticed later,
    /// when probing.
    pub fn reset<C: Clock + ?Sized>(&mut self, clock: &C, config: &IdeConfig) {
        info!("IDE reset controller at {:#x}", self.base_io);
        self.regs
            .write(Register::Device, DriveSlot::Master.select_base());
        self.regs
            .write(Register::Control, ATA_CTL_SRST | ATA_CTL_NIEN);
        clock.delay_ms(config.reset_hold_ms);
        self.regs.write(Register::Control, ATA_CTL_NIEN);
        clock.delay_ms(config.reset_settle_ms);
    }

    pub fn identify<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        slot: DriveSlot,
        timeout_ms: u32,
    ) -> Result<IdentifyPage, AtaError> {
        self.regs.write(Register::Device, slot.select_base());
        wait_for(&mut self.regs, clock, ATA_SR_DRDY, timeout_ms)
            .map_err(|_| AtaError::NoDevice)?;

        self.regs.write(Register::COMMAND, ATA_CMD_IDENTIFY);
        wait_for(&mut self.regs, clock, ATA_SR_DRQ, timeout_ms)
            .map_err(|_| AtaError::NotResponding)?;

        let mut raw = [0u8; SECTOR_SIZE];
        read_sector_data(&mut self.regs, &mut raw);

        let page = IdentifyPage::new(raw);
        if !page.supports_lba() {
            return Err(AtaError::UnsupportedDevice);
        }
        Ok(page)
    }
}

enum Payload<'a> {
    Read(&'a mut [u8]),
    Write(&'a [u8]),
}

impl Payload<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Read(buf) => buf.len(),
            Self::Write(buf) => buf.len(),
        }
    }

    fn command(&self) -> u8 {
        match self {
            Self::Read(_) => ATA_CMD_READ_SECTORS,
            Self::Write(_) => ATA_CMD_WRITE_SECTORS,
        }
    }

    fn move_sector<R: RegisterBank>(&mut self, regs: &mut R, offset: usize) {
        match self {
            Self::Read(buf) => read_sector_data(regs, &mut buf[offset..]),
            Self::Write(buf) => write_sector_data(regs, &buf[offset..]),
        }
    }
}

/// Owns the controllers, the disk table and the clock used for timeouts.
pub struct Ide<R, C, const CONTROLLERS: usize, const DISKS: usize> {
    controllers: [Controller<R>; CONTROLLERS],
    disks: DiskTable<DISKS>,
    clock: C,
    config: IdeConfig,
    initialised: bool,
}

impl<R, C, const CONTROLLERS: usize, const DISKS: usize> Ide<R, C, CONTROLLERS, DISKS>
where
    R: RegisterBank,
    C: Clock,
{
    pub const fn new(controllers: [Controller<R>; CONTROLLERS], clock: C, config: IdeConfig) -> Self {
        Self {
            controllers,
            disks: DiskTable::new(),
            clock,
            config,
            initialised: false,
        }
    }

    /// Resets every controller and probes both device slots on each. Runs
    /// once; later calls do nothing.
    pub fn init<M: VolumeMounter + ?Sized>(&mut self, mounter: &mut M) {
        if self.initialised {
            warn!("IDE init: already done");
            return;
        }
        self.initialised = true;

        for ctrl in 0..CONTROLLERS {
            self.controllers[ctrl].reset(&self.clock, &self.config);
            for slot in DriveSlot::BOTH {
                // a failed probe just leaves the slot out of the table
                let _ = self.probe(ctrl, slot, mounter);
            }
        }
    }

    /// Identifies the device in `slot` and registers it. Returns its index.
    pub fn probe<M: VolumeMounter + ?Sized>(
        &mut self,
        ctrl: usize,
        slot: DriveSlot,
        mounter: &mut M,
    ) -> Result<usize, AtaError> {
        let controller = self
            .controllers
            .get_mut(ctrl)
            .ok_or(AtaError::BadIndex(ctrl))?;
        let base_io = controller.base_io;
        let page = controller
            .identify(&self.clock, slot, self.config.command_timeout_ms)
            .inspect_err(|err| match err {
                AtaError::NoDevice => info!("IDE probe {:#x} disk {}: {}", base_io, slot as u8, err),
                _ => warn!("IDE probe {:#x} disk {}: {}", base_io, slot as u8, err),
            })?;

        if self.config.dump_identify {
            page.dump();
        }

        let info = DriveInfo::from_page(&page);
        info!(
            "IDE probe {:#x} disk {}: {} ({} sectors, {} MB)",
            base_io,
            slot as u8,
            info.model,
            info.sectors,
            info.size_mb()
        );

        let disk = self
            .disks
            .register(ctrl, slot, info)
            .inspect_err(|err| warn!("{}", err))?;
        let (index, label) = (disk.index, disk.label());

        debug!("requesting lazy mount of {}", label);
        mounter.mount(index, label);
        Ok(index)
    }

    pub fn disk_count(&self) -> usize {
        self.disks.len()
    }

    pub fn disk_info(&self, index: usize) -> Option<&Disk> {
        self.disks.get(index)
    }

    pub fn disks(&self) -> impl Iterator<Item = &Disk> {
        self.disks.iter()
    }

    pub fn set_mount_status(&mut self, index: usize, status: MountStatus) -> Result<(), AtaError> {
        let disk = self.disks.get_mut(index).ok_or(AtaError::BadIndex(index))?;
        disk.status = status;
        Ok(())
    }

    pub fn controller(&self, index: usize) -> Option<&Controller<R>> {
        self.controllers.get(index)
    }

    pub fn controller_mut(&mut self, index: usize) -> Option<&mut Controller<R>> {
        self.controllers.get_mut(index)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Reads `count` sectors starting at `lba` into the front of `buf`.
    /// Commands are LBA28: bits 31-28 of `lba` are not sent to the device.
    pub fn read_sectors(
        &mut self,
        index: usize,
        buf: &mut [u8],
        lba: u32,
        count: u32,
    ) -> Result<(), AtaError> {
        self.transfer(index, lba, count, Payload::Read(buf))
    }

    /// Writes `count` sectors from the front of `buf` starting at `lba`.
    /// Commands are LBA28: bits 31-28 of `lba` are not sent to the device.
    pub fn write_sectors(
        &mut self,
        index: usize,
        buf: &[u8],
        lba: u32,
        count: u32,
    ) -> Result<(), AtaError> {
        self.transfer(index, lba, count, Payload::Write(buf))
    }

    pub fn volume(&mut self, index: usize) -> Option<Volume<'_, R, C, CONTROLLERS, DISKS>> {
        self.disks.get(index)?;
        Some(Volume { ide: self, index })
    }

    // Any failed wait abandons the whole request. Sectors already moved are
    // not reported.
    fn transfer(
        &mut self,
        index: usize,
        lba: u32,
        count: u32,
        mut payload: Payload<'_>,
    ) -> Result<(), AtaError> {
        let Some(disk) = self.disks.get(index).copied() else {
            warn!("bad disk {}", index);
            return Err(AtaError::BadIndex(index));
        };

        // usize is 32 bits on target
        let needed = (count as usize).checked_mul(SECTOR_SIZE).unwrap_or(usize::MAX);
        if payload.len() < needed {
            return Err(AtaError::BadBuffer {
                len: payload.len(),
                needed,
            });
        }

        let timeout = self.config.command_timeout_ms;
        let clock = &self.clock;
        let regs = &mut self.controllers[disk.controller].regs;
        let mut offset = 0;

        for chunk in chunks(lba, count) {
            regs.write(Register::Device, disk.slot.device_select(chunk.lba));
            regs.write(Register::LbaHigh, (chunk.lba >> 16) as u8);
            regs.write(Register::LbaMid, (chunk.lba >> 8) as u8);
            regs.write(Register::LbaLow, chunk.lba as u8);
            regs.write(Register::SectorCount, chunk.count_register());

            wait_for(regs, clock, ATA_SR_DRDY, timeout)?;
            regs.write(Register::COMMAND, payload.command());

            for _ in 0..chunk.sectors {
                wait_for(regs, clock, ATA_SR_DRQ, timeout)?;
                payload.move_sector(regs, offset);
                offset += SECTOR_SIZE;
            }
        }

        Ok(())
    }
}

/// A registered disk borrowed as a [`BlockDevice`].
pub struct Volume<'a, R, C, const CONTROLLERS: usize, const DISKS: usize> {
    ide: &'a mut Ide<R, C, CONTROLLERS, DISKS>,
    index: usize,
}

impl<R, C, const CONTROLLERS: usize, const DISKS: usize> Volume<'_, R, C, CONTROLLERS, DISKS>
where
    R: RegisterBank,
    C: Clock,
{
    pub fn index(&self) -> usize {
        self.index
    }

    fn sectors_in(buf_len: usize) -> Result<u32, AtaError> {
        if buf_len % SECTOR_SIZE != 0 {
            return Err(AtaError::BadBuffer {
                len: buf_len,
                needed: buf_len.next_multiple_of(SECTOR_SIZE),
            });
        }
        Ok((buf_len / SECTOR_SIZE) as u32)
    }
}

impl<R, C, const CONTROLLERS: usize, const DISKS: usize> BlockDevice
    for Volume<'_, R, C, CONTROLLERS, DISKS>
where
    R: RegisterBank,
    C: Clock,
{
    type Error = AtaError;

    fn read_blocks(&mut self, lba: u32, buf: &mut [u8]) -> Result<(), AtaError> {
        let count = Self::sectors_in(buf.len())?;
        self.ide.read_sectors(self.index, buf, lba, count)
    }

    fn write_blocks(&mut self, lba: u32, buf: &[u8]) -> Result<(), AtaError> {
        let count = Self::sectors_in(buf.len())?;
        self.ide.write_sectors(self.index, buf, lba, count)
    }

    fn num_blocks(&self) -> u64 {
        self.ide
            .disk_info(self.index)
            .map_or(0, |disk| disk.sectors() as u64)
    }
}
