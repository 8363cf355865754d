//! QEMU Virt board

use core::fmt::Write;
use core::{fmt, ptr};

use uart_16550::MmioSerialPort;

use super::Platform;

// —————————————————————————— Platform Parameters ——————————————————————————— //

const SERIAL_PORT_BASE_ADDRESS: usize = 0x10000000;
const TEST_MMIO_ADDRESS: usize = 0x100000;

// ———————————————————————————— Platform Devices ———————————————————————————— //

/// The console.
///
/// The harness runs on a single hart with interrupts disabled, accesses are never concurrent.
static mut SERIAL_PORT: Option<MmioSerialPort> = None;

// ———————————————————————————————— Platform ———————————————————————————————— //

pub struct VirtPlatform {}

impl Platform for VirtPlatform {
    fn name() -> &'static str {
        "QEMU virt"
    }

    fn init() {
        // SAFETY: the UART is only accessed through this port.
        let mut mmio = unsafe { MmioSerialPort::new(SERIAL_PORT_BASE_ADDRESS) };
        mmio.init();
        // SAFETY: single hart, and no other reference to the port is alive.
        unsafe { *ptr::addr_of_mut!(SERIAL_PORT) = Some(mmio) };
    }

    fn debug_print(args: fmt::Arguments) {
        // SAFETY: single hart, and the reference does not outlive this call.
        let serial_port = unsafe { &mut *ptr::addr_of_mut!(SERIAL_PORT) };
        if let Some(serial_port) = serial_port.as_mut() {
            // Nowhere to report a console failure.
            let _ = serial_port.write_fmt(args);
        }
    }

    fn exit_success() -> ! {
        exit_qemu(true)
    }

    fn exit_failure() -> ! {
        exit_qemu(false)
    }
}

fn exit_qemu(success: bool) -> ! {
    let code = if success { 0x5555 } else { (1 << 16) | 0x3333 };

    unsafe {
        let mmio_addr = TEST_MMIO_ADDRESS as *mut i32;
        ptr::write_volatile(mmio_addr, code);
    }

    // Loop forever if shutdown failed
    loop {
        core::hint::spin_loop();
    }
}
