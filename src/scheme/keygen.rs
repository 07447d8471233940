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

use crate::error::{Error, ErrorKind, Result};
use crate::scheme::setup::Parameters;
use crate::traits::{Base58, Bytable};
use crate::utils::{scalar_to_be_bytes, try_deserialize_g2_projective, try_deserialize_scalar};
use bls12_381::{G2Projective, Scalar};
use ff::Field;
use group::Curve;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Issuer signing key. Held by the issuer only; zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct SecretKey {
    pub(crate) x: Scalar,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl SecretKey {
    pub fn verification_key<R>(&self, params: &Parameters<R>) -> VerificationKey {
        VerificationKey {
            x2: params.gen2() * self.x,
        }
    }

    /// Fixed-width big-endian encoding of the signing scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        scalar_to_be_bytes(&self.x)
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<SecretKey> {
        let x = try_deserialize_scalar(bytes, "failed to deserialize the secret key scalar")?;
        if bool::from(x.is_zero()) {
            return Err(Error::new(
                ErrorKind::Deserialization,
                "the secret key scalar cannot be zero",
            ));
        }
        Ok(SecretKey { x })
    }
}

/// Issuer verification key `X2 = x * g2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey {
    pub(crate) x2: G2Projective,
}

impl VerificationKey {
    pub fn to_bytes(&self) -> [u8; 96] {
        self.x2.to_affine().to_compressed()
    }

    pub fn from_bytes(bytes: &[u8; 96]) -> Result<VerificationKey> {
        let x2 = try_deserialize_g2_projective(bytes, "failed to deserialize the verification key")?;
        Ok(VerificationKey { x2 })
    }
}

pub struct KeyPair {
    pub secret_key: SecretKey,
    pub verification_key: VerificationKey,
}

/// Generate an issuer keypair `(x, x * g2)` for the provided parameters.
pub fn keygen<R: RngCore + CryptoRng>(params: &mut Parameters<R>) -> Result<KeyPair> {
    let x = params.random_scalar_nonzero()?;
    let secret_key = SecretKey { x };
    let verification_key = secret_key.verification_key(params);

    Ok(KeyPair {
        secret_key,
        verification_key,
    })
}

impl Bytable for SecretKey {
    fn to_byte_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn try_from_byte_slice(slice: &[u8]) -> Result<Self> {
        let bytes = slice.try_into().map_err(|_| {
            Error::new(
                ErrorKind::Deserialization,
                "tried to deserialize a secret key with an invalid number of bytes",
            )
        })?;
        SecretKey::from_bytes(&bytes)
    }
}

impl Base58 for SecretKey {}

impl Bytable for VerificationKey {
    fn to_byte_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn try_from_byte_slice(slice: &[u8]) -> Result<Self> {
        let bytes = slice.try_into().map_err(|_| {
            Error::new(
                ErrorKind::Deserialization,
                "tried to deserialize a verification key with an invalid number of bytes",
            )
        })?;
        VerificationKey::from_bytes(&bytes)
    }
}

impl Base58 for VerificationKey {}
