use volatile::Volatile;

use q40boot::config::TIMER_HZ;
use q40boot::time;

const Q40_MASTER_BASE: usize = 0xff00_0000;

const KEY_IRQ_ENABLE_REG: usize = 0x08;
const SAMPLE_ENABLE_REG: usize = 0x14;
const FRAME_CLEAR_REG: usize = 0x24;
const SAMPLE_CLEAR_REG: usize = 0x28;
const SAMPLE_RATE_REG: usize = 0x2c;
const FRAME_RATE_REG: usize = 0x38;

unsafe extern "C" {
    /// Provided by the board startup object; sets the interrupt priority mask in SR.
    fn cpu_set_ipl(level: u32);
}

fn master_write(reg: usize, value: u8) {
    let port = (Q40_MASTER_BASE + reg) as *mut Volatile<u8>;
    unsafe { (*port).write(value) }
}

pub fn init() {
    master_write(KEY_IRQ_ENABLE_REG, 0);
    master_write(SAMPLE_ENABLE_REG, 0);
    master_write(FRAME_CLEAR_REG, 0xff);
    master_write(SAMPLE_CLEAR_REG, 0xff);
    master_write(SAMPLE_RATE_REG, 0);
    master_write(FRAME_RATE_REG, if TIMER_HZ == 200 { 1 } else { 0 });

    // level 2 and above, which includes the frame interrupt
    unsafe { cpu_set_ipl(1) };
}

/// Frame interrupt, called from the level 2 autovector stub.
#[unsafe(no_mangle)]
pub extern "C" fn frame_interrupt() {
    master_write(FRAME_CLEAR_REG, 0xff);
    time::tick();
}
