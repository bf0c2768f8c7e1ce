use log::warn;

use super::AtaError;
use super::regs::{ATA_SR_BSY, ATA_SR_ERR, Register, RegisterBank};
use crate::time::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCheck {
    Done,
    Pending,
    Failed(AtaError),
}

/// Classifies one status register sample while waiting for `bits`.
pub fn check_status(status: u8, bits: u8) -> StatusCheck {
    if status & (ATA_SR_BSY | ATA_SR_ERR | bits) == bits {
        StatusCheck::Done
    } else if status & (ATA_SR_BSY | ATA_SR_ERR) == ATA_SR_ERR {
        StatusCheck::Failed(AtaError::Protocol { status })
    } else if status == 0x00 || status == 0xFF {
        // nothing is driving the bus
        StatusCheck::Failed(AtaError::NoDevice)
    } else {
        StatusCheck::Pending
    }
}

/// Polls the status register until `bits` are set with BSY and ERR clear.
/// Returns the final status on success.
pub fn wait_for<R, C>(regs: &mut R, clock: &C, bits: u8, timeout_ms: u32) -> Result<u8, AtaError>
where
    R: RegisterBank + ?Sized,
    C: Clock + ?Sized,
{
    // one alt status read covers the command-to-status settle time
    regs.read(Register::ALT_STATUS);
    let deadline = clock.deadline_ms(timeout_ms);

    let mut status;

    loop {
        status = regs.read(Register::Status);
        match check_status(status, bits) {
            StatusCheck::Done => return Ok(status),
            StatusCheck::Failed(err) => return Err(err),
            StatusCheck::Pending => {}
        }
        if clock.expired(deadline) {
            break;
        }
    }

    warn!("IDE timeout, status={:#04x}", status);
    Err(AtaError::Timeout { status })
}
