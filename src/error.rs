// Copyright 2021 Nym Technologies SA
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{self, Display, Formatter};

/// A `Result` alias where the `Err` case is `bbs_credentials::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Possible protocol errors
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for Error {}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// An input had an invalid size, an out-of-range index or a duplicate index.
    InvalidParameter,

    /// The system randomness source failed to produce usable bytes.
    Randomness,

    /// Error originating from deserialization of elements.
    Deserialization,

    /// The recomputed Fiat-Shamir challenge did not match the one in the proof.
    ChallengeMismatch,

    /// The final pairing equation did not hold for the presented proof.
    PairingFailed,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidParameter => write!(f, "encountered an invalid parameter"),
            ErrorKind::Randomness => write!(f, "encountered a randomness source failure"),
            ErrorKind::Deserialization => {
                write!(f, "encountered error during deserialization")
            }
            ErrorKind::ChallengeMismatch => {
                write!(f, "the proof challenge did not verify")
            }
            ErrorKind::PairingFailed => write!(f, "the pairing check did not verify"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.kind, self.error)
    }
}

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            error: error.into(),
        }
    }

    /// The broad category of this error. Verification rejections carry
    /// [`ErrorKind::ChallengeMismatch`] or [`ErrorKind::PairingFailed`];
    /// any other kind means the proof could not be evaluated at all.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether this error represents a rejected (but well-formed) proof
    /// rather than a failure to evaluate it.
    pub fn is_rejected_proof(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ChallengeMismatch | ErrorKind::PairingFailed
        )
    }
}
