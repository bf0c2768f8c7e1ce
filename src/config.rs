use log::LevelFilter;

/// Frame interrupt rate. The Q40 master chip can only do 50 Hz or 200 Hz.
pub const TIMER_HZ: u32 = if cfg!(feature = "timer-50hz") { 50 } else { 200 };

pub const NUM_CONTROLLERS: usize = 1;
pub const CONTROLLER_PORTS: [u16; NUM_CONTROLLERS] = [0x1f0];

/// Number of volumes the filesystem layer can mount.
pub const MAX_DISKS: usize = 4;

// volume labels are a single digit followed by ':'
const _: () = assert!(MAX_DISKS <= 10);

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeConfig {
    pub command_timeout_ms: u32,
    pub reset_hold_ms: u32,
    pub reset_settle_ms: u32,
    pub dump_identify: bool,
}

impl IdeConfig {
    pub const fn new() -> Self {
        Self {
            command_timeout_ms: 3000,
            reset_hold_ms: 100,
            reset_settle_ms: 50,
            dump_identify: false,
        }
    }
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self::new()
    }
}
