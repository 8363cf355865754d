//! Build
//!
//! Builds the harness firmware for a given configuration, and extracts a raw image that can be
//! loaded by the simulator.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use crate::config::{read_config, Config, Profiles};
use crate::path::{get_linker_script_path, get_target_dir_path, get_workspace_path};
use crate::BuildArgs;

/// Target triple used to build the firmware.
///
/// RV32I has no atomic read-modify-write, the firmware only relies on atomic loads and stores.
pub const FIRMWARE_TARGET: &str = "riscv32i-unknown-none-elf";

/// Name of the firmware package and binary.
const FIRMWARE_PACKAGE: &str = "tpu_harness";

/// Default load address of the firmware, above the signature.
const DEFAULT_START_ADDRESS: usize = 0x1000;

pub fn build(args: &BuildArgs) -> ExitCode {
    let cfg = match read_config(&args.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match build_firmware(&cfg) {
        Ok(image) => {
            if let Some(config) = &args.config {
                log::info!(
                    "Built the harness with config '{}', binary available at:",
                    config.display()
                );
            } else {
                log::info!("Built the harness, binary available at:");
            }
            log::info!("{}", image.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Builds the firmware and returns the path of the raw image.
fn build_firmware(cfg: &Config) -> Result<PathBuf, String> {
    let release = cfg.target.profile == Some(Profiles::Release);

    let mut build_cmd = Command::new(env!("CARGO"));
    build_cmd
        .current_dir(get_workspace_path())
        .arg("build")
        .arg("--target")
        .arg(FIRMWARE_TARGET)
        .arg("--package")
        .arg(FIRMWARE_PACKAGE)
        .arg("--bin")
        .arg(FIRMWARE_PACKAGE);
    if release {
        build_cmd.arg("--release");
    }

    build_cmd.env("RUSTFLAGS", linker_args(cfg, &get_linker_script_path()));
    build_cmd.envs(cfg.build_envs());
    log::debug!("{:?}", build_cmd);

    let status = build_cmd
        .status()
        .map_err(|err| format!("Could not run cargo: {}", err))?;
    if !status.success() {
        return Err(format!("Build failed with command: {:?}", build_cmd));
    }

    let mut elf_path = get_target_dir_path(release);
    elf_path.push(FIRMWARE_PACKAGE);
    objcopy(&elf_path)
}

/// The rustc flags passing the linker script and the memory layout to the linker.
fn linker_args(cfg: &Config, linker_script: &Path) -> String {
    let start_address = cfg.target.start_address.unwrap_or(DEFAULT_START_ADDRESS);
    let mut args = format!(
        "-C link-arg=-T{} -C link-arg=--defsym=_start_address={}",
        linker_script.display(),
        start_address
    );
    // Move the signature section along with the fixed signature address.
    if let Some(address) = cfg.signature.address {
        args.push_str(&format!(
            " -C link-arg=--defsym=_signature_address={}",
            address
        ));
    }
    args
}

/// Extract raw binary from elf file.
///
/// Returns the path of the resulting binary.
fn objcopy(elf_path: &Path) -> Result<PathBuf, String> {
    let bin_path = elf_path.with_extension("img");

    let mut objcopy_cmd = Command::new("rust-objcopy");
    objcopy_cmd
        .arg("-O")
        .arg("binary")
        .arg(elf_path)
        .arg(&bin_path);

    let status = objcopy_cmd
        .status()
        .map_err(|err| format!("objcopy failed, is `rust-objcopy` installed? ({})", err))?;
    if !status.success() {
        return Err(String::from("objcopy failed"));
    }

    Ok(bin_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn default_linker_args() {
        let cfg = parse_config("").unwrap();
        let args = linker_args(&cfg, Path::new("misc/linker-script.x"));
        assert_eq!(
            args,
            "-C link-arg=-Tmisc/linker-script.x -C link-arg=--defsym=_start_address=4096"
        );
    }

    #[test]
    fn fixed_signature_address() {
        let cfg = parse_config("[signature]\naddress = 0x300\n[target]\nstart_address = 0x0\n")
            .unwrap();
        let args = linker_args(&cfg, Path::new("script.x"));
        assert!(args.contains("--defsym=_start_address=0"));
        assert!(args.ends_with("--defsym=_signature_address=768"));
    }
}
