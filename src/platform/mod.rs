//! Platform abstraction
//!
//! The platform provides the debug console and the way the harness stops once the verdict has
//! been published. It is selected at build time.

use core::fmt;

use config_select::select_env;

use crate::logger;

mod sim;
mod virt;

/// Export the current platform.
pub type Plat = select_env!["TPU_PLATFORM_NAME":
    "qemu_virt" => virt::VirtPlatform
    _           => sim::SimPlatform
];

pub trait Platform {
    fn name() -> &'static str;
    fn init();
    fn debug_print(args: fmt::Arguments);
    fn exit_success() -> !;
    fn exit_failure() -> !;
}

pub fn init() {
    Plat::init();
    logger::init();
}
