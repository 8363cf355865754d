//! Harness configuration
//!
//! The configuration is read from a TOML file by the runner, which sets the corresponding
//! environment variables during the firmware build. The firmware parses them at compile time.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Deserialize;

// ——————————————————————————— Config Definition ———————————————————————————— //

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub accelerator: Accelerator,
    #[serde(default)]
    pub driver: Driver,
    #[serde(default)]
    pub signature: Signature,
    #[serde(default)]
    pub target: Target,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Log {
    pub level: Option<String>,
    pub color: Option<bool>,
    pub error: Option<Vec<String>>,
    pub warn: Option<Vec<String>>,
    pub info: Option<Vec<String>>,
    pub debug: Option<Vec<String>>,
    pub trace: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Platform {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Accelerator {
    pub base: Option<usize>,
    pub id_registers: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Driver {
    pub busy_bit: Option<bool>,
    pub clear_done: Option<bool>,
    pub poll_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Signature {
    pub layout: Option<SignatureLayout>,
    pub address: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub start_address: Option<usize>,
    pub profile: Option<Profiles>,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SignatureLayout {
    /// Status code and both checksums
    #[default]
    Record,
    /// A single status word
    Word,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Profiles {
    Debug,
    Release,
}

// ————————————————————————— Environment Variables —————————————————————————— //

impl Config {
    pub fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        envs.extend(self.log.build_envs());
        envs.extend(self.platform.build_envs());
        envs.extend(self.accelerator.build_envs());
        envs.extend(self.driver.build_envs());
        envs.extend(self.signature.build_envs());
        envs
    }
}

impl Log {
    fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        if let Some(level) = &self.level {
            envs.insert(String::from("TPU_LOG_LEVEL"), level.clone());
        }
        if let Some(color) = self.color {
            envs.insert(String::from("TPU_LOG_COLOR"), format!("{}", color));
        }

        let lists = [
            ("TPU_LOG_ERROR", &self.error),
            ("TPU_LOG_WARN", &self.warn),
            ("TPU_LOG_INFO", &self.info),
            ("TPU_LOG_DEBUG", &self.debug),
            ("TPU_LOG_TRACE", &self.trace),
        ];
        for (var, modules) in lists {
            if let Some(modules) = modules {
                envs.insert(String::from(var), modules.join(","));
            }
        }
        envs
    }
}

impl Platform {
    fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        if let Some(name) = &self.name {
            envs.insert(String::from("TPU_PLATFORM_NAME"), name.clone());
        }
        envs
    }
}

impl Accelerator {
    fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        if let Some(base) = self.base {
            envs.insert(String::from("TPU_ACCEL_BASE"), format!("0x{:x}", base));
        }
        if let Some(id_registers) = self.id_registers {
            envs.insert(
                String::from("TPU_ACCEL_ID_REGISTERS"),
                format!("{}", id_registers),
            );
        }
        envs
    }
}

impl Driver {
    fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        if let Some(busy_bit) = self.busy_bit {
            envs.insert(String::from("TPU_DRIVER_BUSY_BIT"), format!("{}", busy_bit));
        }
        if let Some(clear_done) = self.clear_done {
            envs.insert(
                String::from("TPU_DRIVER_CLEAR_DONE"),
                format!("{}", clear_done),
            );
        }
        if let Some(poll_limit) = self.poll_limit {
            envs.insert(
                String::from("TPU_DRIVER_POLL_LIMIT"),
                format!("{}", poll_limit),
            );
        }
        envs
    }
}

impl Signature {
    fn build_envs(&self) -> HashMap<String, String> {
        let mut envs = HashMap::new();
        if let Some(layout) = self.layout {
            let layout = match layout {
                SignatureLayout::Record => "record",
                SignatureLayout::Word => "word",
            };
            envs.insert(String::from("TPU_SIGNATURE_LAYOUT"), String::from(layout));
        }
        if let Some(address) = self.address {
            envs.insert(
                String::from("TPU_SIGNATURE_ADDRESS"),
                format!("0x{:x}", address),
            );
        }
        envs
    }
}

// ————————————————————————————— Config Loader —————————————————————————————— //

/// Parses a configuration file.
pub fn parse_config(config: &str) -> Result<Config, String> {
    toml::from_str::<Config>(config).map_err(|err| format!("Failed to parse configuration: {}", err))
}

/// Reads the configuration at `path`, or returns the default configuration.
pub fn read_config(path: &Option<PathBuf>) -> Result<Config, String> {
    let Some(path) = path else {
        log::debug!("No config file provided, using defaults");
        return Ok(Config::default());
    };

    let config = fs::read_to_string(path)
        .map_err(|err| format!("Could not read config '{}': {}", path.display(), err))?;
    parse_config(&config)
}
