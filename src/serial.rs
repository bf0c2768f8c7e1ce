use core::fmt::{self, Write};

use spin::Mutex;
use volatile::Volatile;

use q40boot::isa::{BusWindow, Q40Isa};

const COM1: u16 = 0x3f8;

const UART_THR: u16 = 0;
const UART_IER: u16 = 1;
const UART_FCR: u16 = 2;
const UART_LCR: u16 = 3;
const UART_MCR: u16 = 4;
const UART_LSR: u16 = 5;

const LSR_THRE: u8 = 0x20;
const LCR_DLAB: u8 = 0x80;
const LCR_8N1: u8 = 0x03;

// 115200 baud from the 1.8432 MHz clock
const DIVISOR: u16 = 1;

struct Uart {
    base: u16,
}

impl Uart {
    fn reg(&self, offset: u16) -> *mut Volatile<u8> {
        Q40Isa.byte_register(self.base + offset) as *mut Volatile<u8>
    }

    fn read(&self, offset: u16) -> u8 {
        unsafe { (*self.reg(offset)).read() }
    }

    fn write(&mut self, offset: u16, value: u8) {
        unsafe { (*self.reg(offset)).write(value) }
    }

    fn init(&mut self) {
        self.write(UART_IER, 0);
        self.write(UART_LCR, LCR_DLAB);
        self.write(UART_THR, DIVISOR as u8);
        self.write(UART_IER, (DIVISOR >> 8) as u8);
        self.write(UART_LCR, LCR_8N1);
        self.write(UART_FCR, 0x07);
        self.write(UART_MCR, 0x03);
    }

    fn put(&mut self, byte: u8) {
        while self.read(UART_LSR) & LSR_THRE == 0 {
            core::hint::spin_loop();
        }
        self.write(UART_THR, byte);
    }
}

impl Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.put(b'\r');
            }
            self.put(byte);
        }
        Ok(())
    }
}

static UART: Mutex<Uart> = Mutex::new(Uart { base: COM1 });

pub fn init() {
    UART.lock().init();
}

pub fn write_fmt(args: fmt::Arguments) {
    let _ = UART.lock().write_fmt(args);
}
