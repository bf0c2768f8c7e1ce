//! In-memory ATA channel for exercising the driver off target.

use super::regs::*;
use crate::block::SECTOR_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(Register),
    Write(Register, u8),
    ReadData,
    WriteData(u16),
}

pub struct MockDrive {
    pub identify: [u8; SECTOR_SIZE],
    pub image: Vec<u8>,
}

impl MockDrive {
    pub fn new(model: &str, sectors: u32) -> Self {
        Self {
            identify: identify_page(model, sectors, true),
            image: vec![0; sectors as usize * SECTOR_SIZE],
        }
    }

    pub fn without_lba(mut self) -> Self {
        self.identify[99] &= !0x02;
        self
    }

    pub fn sector(&self, lba: usize) -> &[u8] {
        &self.image[lba * SECTOR_SIZE..(lba + 1) * SECTOR_SIZE]
    }
}

/// Builds an IDENTIFY page laid out as a drive would send it.
pub fn identify_page(model: &str, sectors: u32, lba: bool) -> [u8; SECTOR_SIZE] {
    let mut page = [0u8; SECTOR_SIZE];
    put_string(&mut page, 20, 20, "MOCK0001");
    put_string(&mut page, 46, 8, "1.0");
    put_string(&mut page, 54, 40, model);
    if lba {
        page[99] |= 0x02;
    }
    page[120..124].copy_from_slice(&sectors.to_le_bytes());
    page
}

fn put_string(page: &mut [u8], offset: usize, len: usize, text: &str) {
    let mut field = vec![b' '; len];
    field[..text.len()].copy_from_slice(text.as_bytes());
    for (i, pair) in field.chunks(2).enumerate() {
        page[offset + 2 * i] = pair[1];
        page[offset + 2 * i + 1] = pair[0];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    DataIn,
    DataOut { lba: usize },
    Failed,
}

pub struct MockBank {
    pub drives: [Option<MockDrive>; 2],
    pub accesses: Vec<Access>,
    pub commands: Vec<u8>,
    /// Status reported regardless of device state.
    pub status_override: Option<u8>,
    /// Keep DRQ low during data phases.
    pub withhold_drq: bool,
    /// Every command ends with ERR set.
    pub fail_commands: bool,
    taskfile: [u8; Register::ALL.len()],
    selected: usize,
    phase: Phase,
    buffer: Vec<u8>,
    cursor: usize,
}

impl MockBank {
    pub fn new(master: Option<MockDrive>, slave: Option<MockDrive>) -> Self {
        Self {
            drives: [master, slave],
            accesses: Vec::new(),
            commands: Vec::new(),
            status_override: None,
            withhold_drq: false,
            fail_commands: false,
            taskfile: [0; Register::ALL.len()],
            selected: 0,
            phase: Phase::Idle,
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    pub fn clear_log(&mut self) {
        self.accesses.clear();
        self.commands.clear();
    }

    pub fn writes_to(&self, reg: Register) -> Vec<u8> {
        self.accesses
            .iter()
            .filter_map(|a| match *a {
                Access::Write(r, v) if r == reg => Some(v),
                _ => None,
            })
            .collect()
    }

    fn status(&self) -> u8 {
        if let Some(status) = self.status_override {
            return status;
        }
        if self.drives[self.selected].is_none() {
            return 0x00;
        }
        match self.phase {
            Phase::Idle => ATA_SR_DRDY,
            Phase::Failed => ATA_SR_DRDY | ATA_SR_ERR,
            Phase::DataIn | Phase::DataOut { .. } if self.withhold_drq => ATA_SR_DRDY,
            Phase::DataIn | Phase::DataOut { .. } => ATA_SR_DRDY | ATA_SR_DRQ,
        }
    }

    fn lba(&self) -> usize {
        let t = &self.taskfile;
        (((t[Register::Device as usize] & 0x0F) as usize) << 24)
            | ((t[Register::LbaHigh as usize] as usize) << 16)
            | ((t[Register::LbaMid as usize] as usize) << 8)
            | t[Register::LbaLow as usize] as usize
    }

    fn sector_count(&self) -> usize {
        match self.taskfile[Register::SectorCount as usize] {
            0 => 256,
            n => n as usize,
        }
    }

    fn command(&mut self, cmd: u8) {
        self.commands.push(cmd);
        let Some(drive) = self.drives[self.selected].as_ref() else {
            return;
        };
        if self.fail_commands {
            self.phase = Phase::Failed;
            return;
        }
        self.cursor = 0;
        let lba = self.lba();
        let len = self.sector_count() * SECTOR_SIZE;
        let start = lba * SECTOR_SIZE;
        let in_range = start + len <= drive.image.len();

        self.phase = match cmd {
            ATA_CMD_IDENTIFY => {
                self.buffer = drive.identify.to_vec();
                Phase::DataIn
            }
            ATA_CMD_READ_SECTORS if in_range => {
                self.buffer = drive.image[start..start + len].to_vec();
                Phase::DataIn
            }
            ATA_CMD_WRITE_SECTORS if in_range => {
                self.buffer = vec![0; len];
                Phase::DataOut { lba }
            }
            _ => Phase::Failed,
        };
    }
}

impl RegisterBank for MockBank {
    fn read(&mut self, reg: Register) -> u8 {
        self.accesses.push(Access::Read(reg));
        match reg {
            Register::Status | Register::Control => self.status(),
            _ => self.taskfile[reg as usize],
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        self.accesses.push(Access::Write(reg, value));
        match reg {
            Register::COMMAND => self.command(value),
            Register::Device => {
                self.selected = ((value >> 4) & 1) as usize;
                self.taskfile[reg as usize] = value;
            }
            Register::Control => {
                if value & ATA_CTL_SRST != 0 {
                    self.phase = Phase::Idle;
                }
                self.taskfile[reg as usize] = value;
            }
            _ => self.taskfile[reg as usize] = value,
        }
    }

    fn read_data(&mut self) -> u16 {
        self.accesses.push(Access::ReadData);
        if self.phase != Phase::DataIn {
            return 0xFFFF;
        }
        let word = u16::from_le_bytes([self.buffer[self.cursor], self.buffer[self.cursor + 1]]);
        self.cursor += 2;
        if self.cursor == self.buffer.len() {
            self.phase = Phase::Idle;
        }
        word
    }

    fn write_data(&mut self, value: u16) {
        self.accesses.push(Access::WriteData(value));
        let Phase::DataOut { lba } = self.phase else {
            return;
        };
        self.buffer[self.cursor..self.cursor + 2].copy_from_slice(&value.to_le_bytes());
        self.cursor += 2;
        if self.cursor == self.buffer.len() {
            let start = lba * SECTOR_SIZE;
            if let Some(drive) = self.drives[self.selected].as_mut() {
                drive.image[start..start + self.buffer.len()].copy_from_slice(&self.buffer);
            }
            self.phase = Phase::Idle;
        }
    }
}
