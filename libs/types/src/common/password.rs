//! Tag access password
//!
//! 32 bits held in the upper half of the RESERVED bank. The reader takes it as
//! 8 hex characters; it is normalized to lowercase here.

use crate::protocol::constants::DEFAULT_ACCESS_PASSWORD;
use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hex characters in an access password
pub const ACCESS_PASSWORD_HEX_LEN: usize = 8;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessPassword(String);

impl AccessPassword {
    pub fn new(value: &str) -> Result<Self, TypeError> {
        if value.len() != ACCESS_PASSWORD_HEX_LEN {
            return Err(TypeError::InvalidHex(format!(
                "access password must be {} hex characters, got {}",
                ACCESS_PASSWORD_HEX_LEN,
                value.len()
            )));
        }
        hex::decode(value).map_err(|e| TypeError::InvalidHex(format!("access password: {}", e)))?;
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ACCESS_PASSWORD
    }

    /// RESERVED bank payload for words 0-3: the password in both the kill and access halves
    pub fn reserved_bank_data(&self) -> String {
        format!("{0}{0}", self.0)
    }
}

impl Default for AccessPassword {
    fn default() -> Self {
        Self(DEFAULT_ACCESS_PASSWORD.to_string())
    }
}

impl FromStr for AccessPassword {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccessPassword {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AccessPassword> for String {
    fn from(password: AccessPassword) -> Self {
        password.0
    }
}

impl fmt::Display for AccessPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep passwords out of logs
impl fmt::Debug for AccessPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("AccessPassword(default)")
        } else {
            f.write_str("AccessPassword(****)")
        }
    }
}
