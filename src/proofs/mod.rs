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

use bls12_381::{G1Affine, G1Projective, Scalar};
use digest::Digest;
use group::Curve;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Error, ErrorKind, Result};
use crate::scheme::setup::Parameters;
use crate::utils::{scalar_to_be_bytes, try_deserialize_scalar};
use crate::Attribute;

type ChallengeDigest = Sha256;

/// Schnorr-style proof of knowledge of `(r, e, hidden attributes)`
/// consistent with the re-randomized signature components `A'`, `B'`
/// and the revealed portion of the commitment, made non-interactive
/// through the Fiat-Shamir challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureProof {
    challenge: Scalar,
    // z_r
    response_r: Scalar,
    // z_j, ascending by original attribute index
    response_hidden: Vec<Scalar>,
    // z_e
    response_e: Scalar,
}

// note: G1 elements use their compressed representations and the inputs
// are concatenated without any length prefixing; the resulting byte
// string must be identical between prover and verifier
fn compute_challenge(
    nonce: &[u8],
    commitment: &G1Projective,
    a_prime: &G1Projective,
    b_prime: &G1Projective,
    revealed_attributes: &[Attribute],
) -> Scalar {
    let mut h = ChallengeDigest::new();
    h.update(nonce);
    h.update(commitment.to_affine().to_compressed());
    h.update(a_prime.to_affine().to_compressed());
    h.update(b_prime.to_affine().to_compressed());
    for attribute in revealed_attributes {
        h.update(attribute);
    }
    let digest = h.finalize();

    // the 256-bit digest interpreted as a big-endian integer reduced
    // modulo the group order
    let mut wide = [0u8; 64];
    for (i, byte) in digest.iter().rev().enumerate() {
        wide[i] = *byte;
    }
    Scalar::from_bytes_wide(&wide)
}

impl DisclosureProof {
    /// Construct the proof for the prover side.
    ///
    /// `hidden_generators` and `hidden_attribute_scalars` must be in
    /// lockstep, ordered ascending by original attribute index; the
    /// hidden responses carry the factor `c * r * m_j` because the
    /// hidden attributes are bound inside `r * C` in the final check.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn construct<R: RngCore + CryptoRng>(
        params: &mut Parameters<R>,
        nonce: &[u8],
        revealed_commitment: &G1Projective,
        hidden_generators: &[G1Affine],
        hidden_attribute_scalars: &[Scalar],
        a_prime: &G1Projective,
        b_prime: &G1Projective,
        masking_factor: &Scalar,
        signature_e: &Scalar,
        revealed_attributes: &[Attribute],
    ) -> Result<Self> {
        // fresh witnesses per presentation; reusing them across
        // sessions would leak the masked attributes
        let witness_r = Zeroizing::new(params.random_scalar()?);
        let witness_e = Zeroizing::new(params.random_scalar()?);
        let witness_hidden =
            Zeroizing::new(params.n_random_scalars(hidden_attribute_scalars.len())?);

        // U = wr * C_rev + w0 * h[j0] + ... + wk * h[jk] + we * A'
        let commitment = revealed_commitment * *witness_r
            + hidden_generators
                .iter()
                .zip(witness_hidden.iter())
                .map(|(h_j, w_j)| h_j * w_j)
                .sum::<G1Projective>()
            + a_prime * *witness_e;

        let challenge =
            compute_challenge(nonce, &commitment, a_prime, b_prime, revealed_attributes);

        let challenge_times_r = Zeroizing::new(challenge * masking_factor);

        let response_r = *witness_r + *challenge_times_r;
        let response_e = *witness_e - challenge * signature_e;
        let response_hidden = witness_hidden
            .iter()
            .zip(hidden_attribute_scalars.iter())
            .map(|(w_j, m_j)| w_j + *challenge_times_r * m_j)
            .collect();

        Ok(DisclosureProof {
            challenge,
            response_r,
            response_hidden,
            response_e,
        })
    }

    /// Recomputes the commitment from the responses and checks the
    /// Fiat-Shamir equation. The substitution yields the prover's `U`
    /// exactly when the responses are consistent with `A'`, `B'` and
    /// the revealed commitment.
    pub(crate) fn verify(
        &self,
        nonce: &[u8],
        revealed_commitment: &G1Projective,
        hidden_generators: &[G1Affine],
        a_prime: &G1Projective,
        b_prime: &G1Projective,
        revealed_attributes: &[Attribute],
    ) -> Result<()> {
        if self.response_hidden.len() != hidden_generators.len() {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                format!(
                    "the proof carries a different number of hidden responses than expected (expected: {}, found: {})",
                    hidden_generators.len(),
                    self.response_hidden.len()
                ),
            ));
        }

        // U' = zr * C_rev + z0 * h[j0] + ... + zk * h[jk] + ze * A' - c * B'
        let commitment = revealed_commitment * self.response_r
            + hidden_generators
                .iter()
                .zip(self.response_hidden.iter())
                .map(|(h_j, z_j)| h_j * z_j)
                .sum::<G1Projective>()
            + a_prime * self.response_e
            + b_prime * (-self.challenge);

        let challenge =
            compute_challenge(nonce, &commitment, a_prime, b_prime, revealed_attributes);

        if challenge != self.challenge {
            return Err(Error::new(
                ErrorKind::ChallengeMismatch,
                "the recomputed challenge does not match the proof",
            ));
        }

        Ok(())
    }

    pub(crate) fn num_hidden(&self) -> usize {
        self.response_hidden.len()
    }

    // c || z_r || z_j[0..h) || z_e
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(32 * (3 + self.response_hidden.len()));
        bytes.extend_from_slice(&scalar_to_be_bytes(&self.challenge));
        bytes.extend_from_slice(&scalar_to_be_bytes(&self.response_r));
        for response in &self.response_hidden {
            bytes.extend_from_slice(&scalar_to_be_bytes(response));
        }
        bytes.extend_from_slice(&scalar_to_be_bytes(&self.response_e));
        bytes
    }

    // the number of hidden responses is not encoded inline; it is
    // reconstructed from the total length at parse time
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 96 || bytes.len() % 32 != 0 {
            return Err(Error::new(
                ErrorKind::Deserialization,
                "tried to deserialize a disclosure proof with an invalid number of bytes",
            ));
        }

        let challenge_bytes = bytes[..32].try_into().unwrap();
        let challenge =
            try_deserialize_scalar(&challenge_bytes, "failed to deserialize the proof challenge")?;

        let response_r_bytes = bytes[32..64].try_into().unwrap();
        let response_r =
            try_deserialize_scalar(&response_r_bytes, "failed to deserialize the r response")?;

        let num_hidden = (bytes.len() - 96) / 32;
        let mut response_hidden = Vec::with_capacity(num_hidden);
        for i in 0..num_hidden {
            let start = 64 + i * 32;
            let response_bytes = bytes[start..start + 32].try_into().unwrap();
            response_hidden.push(try_deserialize_scalar(
                &response_bytes,
                "failed to deserialize a hidden attribute response",
            )?);
        }

        let response_e_bytes = bytes[bytes.len() - 32..].try_into().unwrap();
        let response_e =
            try_deserialize_scalar(&response_e_bytes, "failed to deserialize the e response")?;

        Ok(DisclosureProof {
            challenge,
            response_r,
            response_hidden,
            response_e,
        })
    }

    #[cfg(test)]
    pub(crate) fn flip_challenge_bit(&mut self) {
        let mut bytes = scalar_to_be_bytes(&self.challenge);
        bytes[31] ^= 1;
        self.challenge = try_deserialize_scalar(&bytes, "flipped challenge").unwrap();
    }

    #[cfg(test)]
    pub(crate) fn flip_response_r_bit(&mut self) {
        let mut bytes = scalar_to_be_bytes(&self.response_r);
        bytes[31] ^= 1;
        self.response_r = try_deserialize_scalar(&bytes, "flipped r response").unwrap();
    }

    #[cfg(test)]
    pub(crate) fn flip_response_e_bit(&mut self) {
        let mut bytes = scalar_to_be_bytes(&self.response_e);
        bytes[31] ^= 1;
        self.response_e = try_deserialize_scalar(&bytes, "flipped e response").unwrap();
    }

    #[cfg(test)]
    pub(crate) fn flip_hidden_response_bit(&mut self, index: usize) {
        let mut bytes = scalar_to_be_bytes(&self.response_hidden[index]);
        bytes[31] ^= 1;
        self.response_hidden[index] =
            try_deserialize_scalar(&bytes, "flipped hidden response").unwrap();
    }
}
