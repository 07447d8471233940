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
use crate::scheme::SecretKey;
use crate::traits::{Base58, Bytable};
use crate::utils::{
    attribute_to_scalar, scalar_to_be_bytes, try_deserialize_g1_projective,
    try_deserialize_scalar,
};
use crate::Attribute;
use bls12_381::{G1Affine, G1Projective, Scalar};
use ff::Field;
use group::Curve;
use rand_core::{CryptoRng, RngCore};

/// A credential signature `(A, e)` with `A = (x + e)^-1 * C` over the
/// full attribute commitment `C`. Held privately by the holder; leaking
/// it compromises this single credential but not the issuer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub(crate) G1Projective, pub(crate) Scalar);

impl Signature {
    pub(crate) fn a(&self) -> &G1Projective {
        &self.0
    }

    pub(crate) fn e(&self) -> &Scalar {
        &self.1
    }

    // A || e
    pub fn to_bytes(&self) -> [u8; 80] {
        let mut bytes = [0u8; 80];
        bytes[..48].copy_from_slice(&self.0.to_affine().to_compressed());
        bytes[48..].copy_from_slice(&scalar_to_be_bytes(&self.1));
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 80]) -> Result<Signature> {
        let a_bytes = bytes[..48].try_into().unwrap();
        let a = try_deserialize_g1_projective(&a_bytes, "failed to deserialize the signature point")?;

        let e_bytes = bytes[48..].try_into().unwrap();
        let e = try_deserialize_scalar(&e_bytes, "failed to deserialize the signature scalar")?;

        Ok(Signature(a, e))
    }
}

/// Produces `g1 + h[0] * m[0] + ... + h[n-1] * m[n-1]`. Callers are
/// responsible for pairing each scalar with the generator at its
/// original attribute index.
pub(crate) fn compute_commitment(
    g1: &G1Affine,
    generators: &[G1Affine],
    attribute_scalars: &[Scalar],
) -> G1Projective {
    debug_assert_eq!(generators.len(), attribute_scalars.len());

    generators
        .iter()
        .zip(attribute_scalars.iter())
        .map(|(h_i, m_i)| h_i * m_i)
        .sum::<G1Projective>()
        + g1
}

/// Signs an attribute vector under the issuer key, producing `(A, e)`
/// with `A * (x + e) = C`. The attributes are fully known to the issuer;
/// only `e` consumes issuer randomness.
pub fn issue<R: RngCore + CryptoRng>(
    params: &mut Parameters<R>,
    secret_key: &SecretKey,
    attributes: &[Attribute],
) -> Result<Signature> {
    if attributes.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            "tried to issue a credential for an empty set of attributes",
        ));
    }

    if attributes.len() != params.num_attributes() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            format!(
                "tried to issue a credential for a different number of attributes than specified in setup (setup: {}, requested: {})",
                params.num_attributes(),
                attributes.len()
            ),
        ));
    }

    let attribute_scalars = attributes
        .iter()
        .map(|attribute| attribute_to_scalar(attribute))
        .collect::<Vec<_>>();
    let commitment = compute_commitment(params.gen1(), params.gen_hs(), &attribute_scalars);

    // retry until x + e is invertible; a fresh uniform e collides with
    // -x with negligible probability
    loop {
        let e = params.random_scalar()?;
        let inverse: Option<Scalar> = (secret_key.x + e).invert().into();
        if let Some(inverse) = inverse {
            return Ok(Signature(commitment * inverse, e));
        }
    }
}

impl Bytable for Signature {
    fn to_byte_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn try_from_byte_slice(slice: &[u8]) -> Result<Self> {
        let bytes = slice.try_into().map_err(|_| {
            Error::new(
                ErrorKind::Deserialization,
                "tried to deserialize a signature with an invalid number of bytes",
            )
        })?;
        Signature::from_bytes(&bytes)
    }
}

impl Base58 for Signature {}
