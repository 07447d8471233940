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

use sha3::Sha3_384;

pub mod error;
mod impls;
pub mod proofs;
pub mod scheme;
pub mod traits;
pub mod utils;

/// Raw attribute bytes as supplied by the holder. Index positions are
/// significant and must be preserved across issuance and presentation.
pub type Attribute = Vec<u8>;

// reason for sha3 384 is for the 48 bytes output matching a compressed
// G1 encoding, which the increment-and-check hashing relies on
pub(crate) type G1HashDigest = Sha3_384;

pub use error::{Error, ErrorKind, Result};
pub use scheme::issuance::{issue, Signature};
pub use scheme::keygen::{keygen, KeyPair, SecretKey, VerificationKey};
pub use scheme::presentation::{present, Presentation};
pub use scheme::setup::{setup, Parameters};
pub use scheme::verification::{verify_presentation, verify_signature};
pub use traits::{Base58, Bytable};
