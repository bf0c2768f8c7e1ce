use volatile::Volatile;

use crate::isa::BusWindow;

pub const ATA_SR_BSY: u8 = 0x80;
pub const ATA_SR_DRDY: u8 = 0x40;
pub const ATA_SR_DF: u8 = 0x20;
pub const ATA_SR_DRQ: u8 = 0x08;
pub const ATA_SR_ERR: u8 = 0x01;

pub const ATA_CMD_READ_SECTORS: u8 = 0x20;
pub const ATA_CMD_WRITE_SECTORS: u8 = 0x30;
pub const ATA_CMD_FLUSH_CACHE: u8 = 0xE7;
pub const ATA_CMD_IDENTIFY: u8 = 0xEC;
pub const ATA_CMD_SET_FEATURES: u8 = 0xEF;

pub const ATA_CTL_SRST: u8 = 0x04;
pub const ATA_CTL_NIEN: u8 = 0x02;

pub const ATA_REG_DATA: u16 = 0x00;

/// Byte-wide task file registers. Several are shared between a read and a
/// write meaning; the aliases below name the write side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    Error = 0,
    SectorCount,
    LbaLow,
    LbaMid,
    LbaHigh,
    Device,
    Status,
    Control,
}

impl Register {
    pub const FEATURE: Self = Self::Error;
    pub const COMMAND: Self = Self::Status;
    pub const ALT_STATUS: Self = Self::Control;

    pub const ALL: [Self; 8] = [
        Self::Error,
        Self::SectorCount,
        Self::LbaLow,
        Self::LbaMid,
        Self::LbaHigh,
        Self::Device,
        Self::Status,
        Self::Control,
    ];

    /// Offset from the controller's base I/O port.
    pub const fn offset(self) -> u16 {
        match self {
            Self::Error => 0x01,
            Self::SectorCount => 0x02,
            Self::LbaLow => 0x03,
            Self::LbaMid => 0x04,
            Self::LbaHigh => 0x05,
            Self::Device => 0x06,
            Self::Status => 0x07,
            Self::Control => 0x206,
        }
    }
}

/// Device position on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveSlot {
    Master = 0,
    Slave = 1,
}

impl DriveSlot {
    pub const BOTH: [Self; 2] = [Self::Master, Self::Slave];

    pub const fn select_base(self) -> u8 {
        match self {
            Self::Master => 0xE0,
            Self::Slave => 0xF0,
        }
    }

    /// Device register value for an LBA28 command: LBA mode, slot, LBA bits 27-24.
    pub const fn device_select(self, lba: u32) -> u8 {
        self.select_base() | ((lba >> 24) & 0x0F) as u8
    }
}

/// Access to one controller's registers. Every call is an observable bus
/// cycle; implementations must not cache or reorder them.
pub trait RegisterBank {
    fn read(&mut self, reg: Register) -> u8;
    fn write(&mut self, reg: Register, value: u8);
    fn read_data(&mut self) -> u16;
    fn write_data(&mut self, value: u16);
}

/// Registers of a controller sitting on the ISA bus.
pub struct IsaRegisters {
    data: *mut Volatile<u16>,
    ports: [*mut Volatile<u8>; Register::ALL.len()],
}

unsafe impl Send for IsaRegisters {}

impl IsaRegisters {
    /// # Safety
    ///
    /// `base_io` must be the base port of an ATA controller reachable through
    /// `bus`, and nothing else may drive those registers.
    pub unsafe fn new<B: BusWindow>(bus: &B, base_io: u16) -> Self {
        Self {
            data: bus.word_register(base_io + ATA_REG_DATA) as *mut Volatile<u16>,
            ports: Register::ALL
                .map(|reg| bus.byte_register(base_io + reg.offset()) as *mut Volatile<u8>),
        }
    }

    fn port(&self, reg: Register) -> *mut Volatile<u8> {
        self.ports[reg as usize]
    }
}

impl RegisterBank for IsaRegisters {
    fn read(&mut self, reg: Register) -> u8 {
        unsafe { (*self.port(reg)).read() }
    }

    fn write(&mut self, reg: Register, value: u8) {
        unsafe { (*self.port(reg)).write(value) }
    }

    fn read_data(&mut self) -> u16 {
        unsafe { (*self.data).read() }
    }

    fn write_data(&mut self, value: u16) {
        unsafe { (*self.data).write(value) }
    }
}
