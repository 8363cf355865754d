//! Configuration constants
//!
//! The constants in this file are parsed from the harness configuration file (passed through
//! environment variables by the runner during the firmware build).

use config_helpers::{
    is_enabled, is_enabled_default_false, parse_str_list, parse_str_or, parse_usize,
    parse_usize_or, str_list_len,
};
use tpu_core::regs;

use crate::driver::DriverConfig;
use crate::signature::{SignatureLayout, SignatureLocation};

// ———————————————————————————————— Logging ————————————————————————————————— //

/// The desired log level.
pub const LOG_LEVEL: Option<&'static str> = option_env!("TPU_LOG_LEVEL");

/// If colors in logs are enabled.
pub const LOG_COLOR: bool = is_enabled!("TPU_LOG_COLOR");

/// Log error
pub const LOG_ERROR: &[&str; str_list_len(option_env!("TPU_LOG_ERROR"))] =
    &parse_str_list(option_env!("TPU_LOG_ERROR"));

/// Log warn
pub const LOG_WARN: &[&str; str_list_len(option_env!("TPU_LOG_WARN"))] =
    &parse_str_list(option_env!("TPU_LOG_WARN"));

/// Log info
pub const LOG_INFO: &[&str; str_list_len(option_env!("TPU_LOG_INFO"))] =
    &parse_str_list(option_env!("TPU_LOG_INFO"));

/// Log debug
pub const LOG_DEBUG: &[&str; str_list_len(option_env!("TPU_LOG_DEBUG"))] =
    &parse_str_list(option_env!("TPU_LOG_DEBUG"));

/// Log trace
pub const LOG_TRACE: &[&str; str_list_len(option_env!("TPU_LOG_TRACE"))] =
    &parse_str_list(option_env!("TPU_LOG_TRACE"));

// ———————————————————————————————— Platform ———————————————————————————————— //

/// The target platform.
pub const PLATFORM_NAME: &str = parse_str_or(option_env!("TPU_PLATFORM_NAME"), "sim");

// —————————————————————————————— Accelerator ——————————————————————————————— //

/// Base address of the accelerator register block.
pub const ACCEL_BASE: usize = parse_usize_or(option_env!("TPU_ACCEL_BASE"), regs::DEFAULT_BASE);

/// Whether the accelerator exposes the identification and version registers.
pub const ACCEL_ID_REGISTERS: bool = is_enabled_default_false!("TPU_ACCEL_ID_REGISTERS");

// ————————————————————————————————— Driver ————————————————————————————————— //

/// Whether the status register exposes a busy bit.
pub const DRIVER_BUSY_BIT: bool = is_enabled!("TPU_DRIVER_BUSY_BIT");

/// Whether a clear-done command must precede the start command.
pub const DRIVER_CLEAR_DONE: bool = is_enabled!("TPU_DRIVER_CLEAR_DONE");

/// Maximum number of status polls, wait forever if None.
pub const DRIVER_POLL_LIMIT: Option<usize> = parse_usize(option_env!("TPU_DRIVER_POLL_LIMIT"));

/// The driver configuration assembled from the values above.
pub const DRIVER: DriverConfig = DriverConfig {
    has_busy_bit: DRIVER_BUSY_BIT,
    clear_done_before_start: DRIVER_CLEAR_DONE,
    poll_limit: match DRIVER_POLL_LIMIT {
        Some(limit) => {
            assert!(limit > 0 && limit <= u32::MAX as usize, "Invalid poll limit");
            Some(limit as u32)
        }
        None => None,
    },
};

// ——————————————————————————————— Signature ———————————————————————————————— //

/// Layout of the signature written for the external rig.
pub const SIGNATURE_LAYOUT: SignatureLayout = match option_env!("TPU_SIGNATURE_LAYOUT") {
    Some(layout) => match layout.as_bytes() {
        b"record" => SignatureLayout::Record,
        b"word" => SignatureLayout::Word,
        _ => panic!("Invalid signature layout, expected 'record' or 'word'"),
    },
    None => SignatureLayout::Record,
};

/// Where the signature is written: a fixed address if configured, the `.sig` section otherwise.
pub const SIGNATURE_LOCATION: SignatureLocation =
    match parse_usize(option_env!("TPU_SIGNATURE_ADDRESS")) {
        Some(address) => SignatureLocation::Fixed(address),
        None => SignatureLocation::Section,
    };
