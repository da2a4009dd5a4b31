// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::oracle::OracleError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidParameterError {
    name: &'static str,
    value: f64,
}

impl InvalidParameterError {
    pub fn new(name: &'static str, value: f64) -> Self {
        Self { name, value }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid value {} for parameter {}", self.value, self.name)
    }
}

impl std::error::Error for InvalidParameterError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidParameter(InvalidParameterError),
    InvertedBands { fast_accept: f64, prefilter: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidParameter(e) => write!(f, "{}", e),
            ConfigError::InvertedBands {
                fast_accept,
                prefilter,
            } => write!(
                f,
                "Fast-accept ratio {} exceeds prefilter ratio {}",
                fast_accept, prefilter
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<InvalidParameterError> for ConfigError {
    fn from(err: InvalidParameterError) -> Self {
        ConfigError::InvalidParameter(err)
    }
}

/// Every attempted matrix chunk failed.
#[derive(Debug)]
pub struct OracleUnavailableError {
    attempted_chunks: usize,
    last_error: OracleError,
}

impl OracleUnavailableError {
    pub fn new(attempted_chunks: usize, last_error: OracleError) -> Self {
        Self {
            attempted_chunks,
            last_error,
        }
    }

    pub fn attempted_chunks(&self) -> usize {
        self.attempted_chunks
    }

    pub fn last_error(&self) -> &OracleError {
        &self.last_error
    }
}

impl std::fmt::Display for OracleUnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Distance oracle unavailable: all {} attempted chunks failed (last error: {})",
            self.attempted_chunks, self.last_error
        )
    }
}

impl std::error::Error for OracleUnavailableError {}

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    OracleUnavailable(OracleUnavailableError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "config: {e}"),
            EngineError::OracleUnavailable(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<OracleUnavailableError> for EngineError {
    fn from(e: OracleUnavailableError) -> Self {
        EngineError::OracleUnavailable(e)
    }
}
