//! Harness entry point
//!
//! `_start` sets up the stack and clears `.bss`, then jumps into [main]. The harness runs once,
//! publishes its signature and parks.

// Mark the crate as no_std and no_main, but only when not running tests.
#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

use tpu_harness::platform::{Plat, Platform};

extern "C" fn main() -> ! {
    tpu_harness::init();

    // SAFETY: this is the only run, and the addresses come from the build configuration.
    let verdict = unsafe { tpu_harness::run_on_hardware() };

    if verdict.is_success() {
        log::info!("Success!");
        Plat::exit_success();
    } else {
        log::error!("Failure: {:?}", verdict);
        Plat::exit_failure();
    }
}

// —————————————————————————————— Entry Point ——————————————————————————————— //

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
core::arch::global_asm!(
r#"
.section .text._start
.global _start
_start:
    la sp, _stack_top

    // Zero the .bss, the signature included when it is placed there
    la t0, _bss_start
    la t1, _bss_end
clear_bss:
    bgeu t0, t1, bss_cleared
    sw zero, 0(t0)
    addi t0, t0, 4
    j clear_bss
bss_cleared:

    call {main}
park:
    j park
"#,
    main = sym main,
);

#[panic_handler]
#[cfg(not(test))]
fn panic(info: &core::panic::PanicInfo) -> ! {
    log::error!("Panicked at {:#?} ", info);
    Plat::exit_failure();
}
