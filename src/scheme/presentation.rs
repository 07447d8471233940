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
use crate::proofs::DisclosureProof;
use crate::scheme::issuance::{compute_commitment, Signature};
use crate::scheme::setup::Parameters;
use crate::traits::{Base58, Bytable};
use crate::utils::{attribute_to_scalar, try_deserialize_g1_projective};
use crate::Attribute;
use bls12_381::G1Projective;
use group::Curve;
use itertools::Itertools;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// A single showing of a credential: the re-randomized signature
/// components plus the proof of knowledge over the hidden attributes.
/// Constructed fresh (with fresh randomness) per presentation so that
/// showings of the same credential are unlinkable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    // A'
    pub(crate) a_prime: G1Projective,
    // B'
    pub(crate) b_prime: G1Projective,
    // (c, z_r, z_j, z_e)
    pub(crate) pi: DisclosureProof,
}

impl Presentation {
    /// Number of hidden-attribute responses carried by this proof.
    pub fn num_hidden(&self) -> usize {
        self.pi.num_hidden()
    }

    // A' || B' || c || z_r || z_j[0..h) || z_e
    pub fn to_bytes(&self) -> Vec<u8> {
        let proof_bytes = self.pi.to_bytes();

        let mut bytes = Vec::with_capacity(96 + proof_bytes.len());
        bytes.extend_from_slice(&self.a_prime.to_affine().to_compressed());
        bytes.extend_from_slice(&self.b_prime.to_affine().to_compressed());
        bytes.extend_from_slice(&proof_bytes);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Presentation> {
        if bytes.len() < 192 {
            return Err(Error::new(
                ErrorKind::Deserialization,
                "tried to deserialize a presentation with insufficient number of bytes",
            ));
        }

        let a_prime_bytes = bytes[..48].try_into().unwrap();
        let a_prime = try_deserialize_g1_projective(
            &a_prime_bytes,
            "failed to deserialize the re-randomized signature point",
        )?;

        let b_prime_bytes = bytes[48..96].try_into().unwrap();
        let b_prime = try_deserialize_g1_projective(
            &b_prime_bytes,
            "failed to deserialize the masked commitment point",
        )?;

        let pi = DisclosureProof::from_bytes(&bytes[96..])?;

        Ok(Presentation {
            a_prime,
            b_prime,
            pi,
        })
    }
}

/// Validates the revealed index set and turns it into a presence bitmap
/// over all attribute positions. The bitmap drives the single-pass
/// partition that must stay in lockstep between prover and verifier.
pub(crate) fn revealed_presence_bitmap(
    revealed_indices: &[usize],
    num_attributes: usize,
) -> Result<Vec<bool>> {
    if revealed_indices.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            "tried to present a credential with an empty set of revealed attributes",
        ));
    }

    if revealed_indices.len() > num_attributes {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            format!(
                "tried to reveal more attributes than the credential carries (carried: {}, revealed: {})",
                num_attributes,
                revealed_indices.len()
            ),
        ));
    }

    if !revealed_indices.iter().all_unique() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            "the revealed attribute indices contain duplicates",
        ));
    }

    let mut revealed = vec![false; num_attributes];
    for &index in revealed_indices {
        if index >= num_attributes {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                format!(
                    "revealed attribute index out of bounds (index: {}, attributes: {})",
                    index, num_attributes
                ),
            ));
        }
        revealed[index] = true;
    }

    Ok(revealed)
}

/// Produces a fresh presentation of the credential revealing exactly
/// the attributes at `revealed_indices`. The nonce is supplied by the
/// verifier (or the application); replay protection is its concern.
pub fn present<R: RngCore + CryptoRng>(
    params: &mut Parameters<R>,
    credential: &Signature,
    attributes: &[Attribute],
    revealed_indices: &[usize],
    nonce: &[u8],
) -> Result<Presentation> {
    if attributes.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            "tried to present a credential with an empty set of attributes",
        ));
    }

    if attributes.len() != params.num_attributes() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            format!(
                "tried to present a different number of attributes than specified in setup (setup: {}, presented: {})",
                params.num_attributes(),
                attributes.len()
            ),
        ));
    }

    let revealed = revealed_presence_bitmap(revealed_indices, attributes.len())?;

    // single pass keeping attributes and their generators in lockstep,
    // both partitions ordered ascending by original index
    let mut attribute_scalars = Vec::with_capacity(attributes.len());
    let mut revealed_attributes = Vec::with_capacity(revealed_indices.len());
    let mut revealed_generators = Vec::with_capacity(revealed_indices.len());
    let mut revealed_scalars = Vec::with_capacity(revealed_indices.len());
    let mut hidden_generators = Vec::with_capacity(attributes.len() - revealed_indices.len());
    let mut hidden_scalars = Vec::with_capacity(attributes.len() - revealed_indices.len());

    for (i, attribute) in attributes.iter().enumerate() {
        let scalar = attribute_to_scalar(attribute);
        attribute_scalars.push(scalar);
        if revealed[i] {
            revealed_attributes.push(attribute.clone());
            revealed_generators.push(params.gen_hs()[i]);
            revealed_scalars.push(scalar);
        } else {
            hidden_generators.push(params.gen_hs()[i]);
            hidden_scalars.push(scalar);
        }
    }

    let full_commitment = compute_commitment(params.gen1(), params.gen_hs(), &attribute_scalars);
    let revealed_commitment =
        compute_commitment(params.gen1(), &revealed_generators, &revealed_scalars);

    // fresh nonzero masking factor; it lives only on this stack frame
    let masking_factor = Zeroizing::new(params.random_scalar_nonzero()?);

    // A' = r * A
    let a_prime = credential.a() * *masking_factor;
    // B' = r * C - e * A', which equals x * A' for a valid signature
    // and is what the pairing check certifies against X2
    let b_prime = full_commitment * *masking_factor + a_prime * (-credential.e());

    let pi = DisclosureProof::construct(
        params,
        nonce,
        &revealed_commitment,
        &hidden_generators,
        &hidden_scalars,
        &a_prime,
        &b_prime,
        &masking_factor,
        credential.e(),
        &revealed_attributes,
    )?;

    Ok(Presentation {
        a_prime,
        b_prime,
        pi,
    })
}

impl Bytable for Presentation {
    fn to_byte_vec(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn try_from_byte_slice(slice: &[u8]) -> Result<Self> {
        Presentation::from_bytes(slice)
    }
}

impl Base58 for Presentation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::issuance::issue;
    use crate::scheme::keygen::keygen;
    use crate::scheme::setup::setup;
    use rand_core::OsRng;

    fn attributes(values: &[&str]) -> Vec<Attribute> {
        values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }

    #[test]
    fn masked_commitment_equals_secret_times_masked_signature() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[1], b"nonce").unwrap();

        // B' = x * A' by construction
        assert_eq!(
            presentation.b_prime,
            presentation.a_prime * keypair.secret_key.x
        );
    }

    #[test]
    fn presentation_rejects_invalid_revealed_sets() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        // empty revealed set
        let err = present(&mut params, &credential, &attributes, &[], b"nonce").unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());

        // duplicate index
        let err = present(&mut params, &credential, &attributes, &[0, 0], b"nonce").unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());

        // out of range index
        let err = present(&mut params, &credential, &attributes, &[3], b"nonce").unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());

        // more indices than attributes
        let err = present(
            &mut params,
            &credential,
            &attributes,
            &[0, 1, 2, 3],
            b"nonce",
        )
        .unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());
    }

    #[test]
    fn presentation_rejects_mismatched_attribute_count() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let all = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &all).unwrap();

        let err = present(&mut params, &credential, &all[..2], &[0], b"nonce").unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());
    }

    #[test]
    fn repeated_presentations_are_rerandomized() {
        let mut params = setup(OsRng, 2).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let first = present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();
        let second = present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        assert_ne!(first.a_prime, second.a_prime);
        assert_ne!(first.b_prime, second.b_prime);
    }

    #[test]
    fn presentation_bytes_roundtrip() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0, 2], b"nonce").unwrap();
        let bytes = presentation.to_bytes();
        // A' || B' || c || z_r || one hidden response || z_e
        assert_eq!(96 + 32 * 4, bytes.len());
        assert_eq!(presentation, Presentation::from_bytes(&bytes).unwrap());

        // revealing everything leaves no hidden responses on the wire
        let presentation =
            present(&mut params, &credential, &attributes, &[0, 1, 2], b"nonce").unwrap();
        let bytes = presentation.to_bytes();
        assert_eq!(96 + 32 * 3, bytes.len());
        assert_eq!(presentation, Presentation::from_bytes(&bytes).unwrap());
    }
}
