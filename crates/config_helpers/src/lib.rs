//! Build-time configuration helpers
//!
//! The harness is configured through environment variables captured at compile time with
//! `option_env!`. The helpers in this crate parse those values in const contexts, so that a bad
//! configuration fails the build rather than the run.

#![no_std]

// ———————————————————————————————— Booleans ———————————————————————————————— //

/// Helper macro to check if a boolean choice is enabled by the configuration, defaulting to yes.
///
/// The current implementation works around the limitation of const functions in rust at the
/// time of writing.
#[macro_export]
macro_rules! is_enabled {
    ($env_var: tt) => {
        match option_env!($env_var) {
            Some(env_var) => match env_var.as_bytes() {
                b"false" => false,
                _ => true,
            },
            None => true,
        }
    };
}

/// Same as [is_enabled], but defaulting to no.
#[macro_export]
macro_rules! is_enabled_default_false {
    ($env_var: tt) => {
        match option_env!($env_var) {
            Some(env_var) => match env_var.as_bytes() {
                b"true" => true,
                _ => false,
            },
            None => false,
        }
    };
}

// ——————————————————————————————— Integers ————————————————————————————————— //

/// Parse an unsigned integer, either decimal or hexadecimal with a `0x` prefix.
pub const fn parse_usize(env_var: Option<&str>) -> Option<usize> {
    let value = match env_var {
        Some(value) => value,
        None => return None,
    };

    let bytes = value.as_bytes();
    let is_hex = bytes.len() > 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X');
    let (digits, radix) = if is_hex {
        (bytes.split_at(2).1, 16)
    } else {
        (bytes, 10)
    };

    let digits = match core::str::from_utf8(digits) {
        Ok(digits) => digits,
        Err(_) => panic!("Invalid integer in configuration"),
    };
    match usize::from_str_radix(digits, radix) {
        Ok(value) => Some(value),
        Err(_) => panic!("Failed to parse integer from configuration"),
    }
}

pub const fn parse_usize_or(env_var: Option<&str>, default: usize) -> usize {
    match parse_usize(env_var) {
        Some(value) => value,
        None => default,
    }
}

// ————————————————————————————— String Parsing ————————————————————————————— //

/// Split a string of comma (",") separated values into a list of strings slices.
pub const fn parse_str_list<const LEN: usize>(env_var: Option<&str>) -> [&str; LEN] {
    let env_var = match env_var {
        Some(var) => var,
        None => return [""; LEN],
    };

    let bytes = env_var.as_bytes();
    let mut res: [&str; LEN] = [""; LEN];
    let mut idx_start = 0;
    let mut idx_curr = 0;
    let mut i = 0;

    while i < LEN {
        while idx_curr < bytes.len() && bytes[idx_curr] != b',' {
            idx_curr += 1;
        }

        // Range indexing is not available in const contexts, but splitting is, so we split twice
        // to extract the sub-slice.
        let sub_slice = &bytes.split_at(idx_start).1;
        let sub_slice = &sub_slice.split_at(idx_curr - idx_start).0;

        res[i] = match core::str::from_utf8(sub_slice) {
            Ok(sub_str) => sub_str,
            Err(_) => panic!("Invalid string list in configuration"),
        };

        idx_curr += 1;
        idx_start = idx_curr;
        i += 1;
    }

    res
}

/// Returns the len of a list of comma (",") separated values.
pub const fn str_list_len(env_var: Option<&str>) -> usize {
    let env_var = match env_var {
        Some(var) => var,
        None => return 0,
    };

    let mut len = 1;
    let mut i = 0;
    let bytes = env_var.as_bytes();
    while i < bytes.len() {
        if bytes[i] == b',' {
            len += 1;
        }
        i += 1;
    }
    len
}

pub const fn parse_str_or(env_var: Option<&'static str>, default: &'static str) -> &'static str {
    match env_var {
        Some(var) => var,
        None => default,
    }
}
