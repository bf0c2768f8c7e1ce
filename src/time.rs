use core::sync::atomic::{AtomicU32, Ordering};

use log::warn;

use crate::config::TIMER_HZ;

static TICKS: AtomicU32 = AtomicU32::new(0);

/// Longest duration a deadline can express without wraparound ambiguity.
pub const MAX_DURATION: u32 = 0x7fff_ffff;

const SIGN_BIT: u32 = 0x8000_0000;

/// Advances the tick counter. Only the frame interrupt calls this.
pub fn tick() {
    // single writer, so load + store is enough and needs no CAS
    TICKS.store(TICKS.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
}

pub fn ticks() -> u32 {
    TICKS.load(Ordering::Relaxed)
}

pub const fn ms_to_ticks(ms: u32) -> u32 {
    let ticks = (ms as u64 * TIMER_HZ as u64).div_ceil(1000);
    if ticks > MAX_DURATION as u64 {
        MAX_DURATION
    } else {
        ticks as u32
    }
}

/// A point on the tick counter, compared with wraparound-safe arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(u32);

impl Deadline {
    pub const fn tick(self) -> u32 {
        self.0
    }
}

pub trait Clock {
    fn now(&self) -> u32;

    fn deadline(&self, ticks: u32) -> Deadline {
        let ticks = if ticks == 0 {
            1
        } else if ticks & SIGN_BIT != 0 {
            warn!("bad timer duration {}", ticks);
            MAX_DURATION
        } else {
            ticks
        };
        Deadline(self.now().wrapping_add(ticks))
    }

    fn deadline_ms(&self, ms: u32) -> Deadline {
        self.deadline(ms_to_ticks(ms))
    }

    fn expired(&self, deadline: Deadline) -> bool {
        deadline.0.wrapping_sub(self.now()) & SIGN_BIT != 0
    }

    fn wait(&self, deadline: Deadline) {
        while !self.expired(deadline) {
            core::hint::spin_loop();
        }
    }

    fn delay_ms(&self, ms: u32) {
        self.wait(self.deadline_ms(ms));
    }
}

/// Clock driven by the frame interrupt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickClock;

impl Clock for TickClock {
    fn now(&self) -> u32 {
        ticks()
    }
}

#[cfg(test)]
pub(crate) use sim::SimClock;
