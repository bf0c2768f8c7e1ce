#![no_std]
#![no_main]

mod interrupts;
mod serial;

use core::panic::PanicInfo;

use lazy_static::lazy_static;
use log::{error, info};
use spin::Mutex;

use q40boot::block::VolumeMounter;
use q40boot::config::{self, IdeConfig, MAX_DISKS, NUM_CONTROLLERS};
use q40boot::drivers::ata::{Controller, Ide, IsaRegisters, VolumeLabel};
use q40boot::isa::Q40Isa;
use q40boot::logger;
use q40boot::time::TickClock;

pub type Disks = Ide<IsaRegisters, TickClock, NUM_CONTROLLERS, MAX_DISKS>;

lazy_static! {
    pub static ref DISKS: Mutex<Disks> = Mutex::new(Ide::new(
        config::CONTROLLER_PORTS.map(|base| {
            Controller::new(base, unsafe { IsaRegisters::new(&Q40Isa, base) })
        }),
        TickClock,
        IdeConfig::new(),
    ));
}

/// Volumes waiting for the FAT layer to attach on first access.
struct DeferredMounts {
    pending: [Option<VolumeLabel>; MAX_DISKS],
}

impl VolumeMounter for DeferredMounts {
    fn mount(&mut self, index: usize, label: VolumeLabel) {
        if let Some(slot) = self.pending.get_mut(index) {
            *slot = Some(label);
        }
    }
}

static MOUNTS: Mutex<DeferredMounts> = Mutex::new(DeferredMounts {
    pending: [None; MAX_DISKS],
});

/// Entered from the board startup object (vector table, stack, `.bss`
/// clear) linked in alongside this image.
#[unsafe(no_mangle)]
pub extern "C" fn boot_main() -> ! {
    serial::init();
    let _ = logger::init(config::LOG_LEVEL, serial::write_fmt);

    info!("Setup interrupts");
    interrupts::init();

    DISKS.lock().init(&mut *MOUNTS.lock());

    let disks = DISKS.lock();
    info!("{} disk(s) found", disks.disk_count());
    for disk in disks.disks() {
        info!(
            "  {} {} ({} MB)",
            disk.label(),
            disk.info.model,
            disk.info.size_mb()
        );
    }
    drop(disks);

    halt()
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("{}", info.message());
    if let Some(location) = info.location() {
        error!("at {}", location);
    }
    halt()
}

fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
