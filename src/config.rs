//! Runtime configuration
use serde_yaml::{self, Value};
use std::fs::File;

use crate::{
    error::{ErrorCode, RuntimeError},
    recoverable_error,
};

#[derive(Debug)]
/// Runtime configuration data
pub struct Config {
    /// Is logging enabled?
    logging: bool,
    /// Interpreter number reported in the header
    interpreter_number: u8,
    /// Interpreter version byte reported in the header
    interpreter_version: u8,
    /// Fixed RNG seed, for reproducible transcripts
    random_seed: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: false,
            // 6 = "IBM PC", the least-surprising interpreter number
            interpreter_number: 6,
            interpreter_version: b'Z',
            random_seed: None,
        }
    }
}

impl TryFrom<File> for Config {
    type Error = RuntimeError;

    fn try_from(value: File) -> Result<Self, Self::Error> {
        match serde_yaml::from_reader::<File, Value>(value) {
            Ok(data) => {
                let logging = match data["logging"].as_str() {
                    Some(t) => t == "enabled",
                    None => false,
                };
                let interpreter_number = match data["interpreter_number"].as_u64() {
                    Some(v) => v as u8,
                    None => 6,
                };
                let interpreter_version = match data["interpreter_version"].as_u64() {
                    Some(v) => v as u8,
                    None => b'Z',
                };
                let random_seed = data["random_seed"].as_u64().map(|v| v as u16);
                Ok(Config::new(
                    logging,
                    interpreter_number,
                    interpreter_version,
                    random_seed,
                ))
            }
            Err(e) => recoverable_error!(ErrorCode::ConfigError, "{}", e),
        }
    }
}

impl Config {
    /// Constructor
    ///
    /// # Arguments
    /// * `logging` - Logging enabled flag
    /// * `interpreter_number` - Interpreter number reported in the header
    /// * `interpreter_version` - Interpreter version byte reported in the header
    /// * `random_seed` - Fixed RNG seed, if any
    pub fn new(
        logging: bool,
        interpreter_number: u8,
        interpreter_version: u8,
        random_seed: Option<u16>,
    ) -> Self {
        Config {
            logging,
            interpreter_number,
            interpreter_version,
            random_seed,
        }
    }

    /// Get the logging flag
    ///
    /// # Returns
    /// Logging flag
    pub fn logging(&self) -> bool {
        self.logging
    }

    /// Get the interpreter number
    ///
    /// # Returns
    /// Interpreter number
    pub fn interpreter_number(&self) -> u8 {
        self.interpreter_number
    }

    /// Get the interpreter version byte
    ///
    /// # Returns
    /// Interpreter version byte
    pub fn interpreter_version(&self) -> u8 {
        self.interpreter_version
    }

    /// Get the fixed RNG seed
    ///
    /// # Returns
    /// [Option] with the seed value, [None] to seed from entropy
    pub fn random_seed(&self) -> Option<u16> {
        self.random_seed
    }
}
