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
use crate::G1HashDigest;
use bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use digest::Digest;

/// Domain-separation tag under which the h1 generators are derived.
/// Shared parameters only interoperate if every implementation uses
/// the same tag.
pub const G1_HASH_DOMAIN: &[u8] = b"BBS_CREDENTIALS_BLS12381G1_GENERATOR";

/// Hashes a message onto G1. Used for deriving the independent h1
/// generators from fresh random seeds, so that no discrete-log relation
/// among them (or to the standard generator) is known.
pub(crate) fn hash_g1<M: AsRef<[u8]>>(msg: M) -> G1Projective {
    _hash_g1_increment_and_check::<G1HashDigest, _>(msg)
}

// not constant time, which is fine for its single use on public inputs
// (the generator seeds are public once parameters are published)
fn _hash_g1_increment_and_check<D, M>(msg: M) -> G1Projective
where
    D: Digest + digest::FixedOutputReset,
    M: AsRef<[u8]>,
{
    let mut h = D::new();

    let mut ctr = 0u64;
    loop {
        // add the counter suffix to the message
        Digest::update(&mut h, G1_HASH_DOMAIN);
        Digest::update(&mut h, &msg);
        Digest::update(&mut h, ctr.to_le_bytes());
        ctr += 1;

        let digest = h.finalize_reset();
        debug_assert_eq!(digest.len(), 48);

        // first bit must be set - otherwise it implies uncompressed form (i.e. 96 bytes)
        // second bit must not be set - otherwise it implies the point at infinity
        let compression_flag_set = ((digest[0] >> 7) & 1) == 1;
        let infinity_flag_set = ((digest[0] >> 6) & 1) == 1;

        // continue the loop as there's no point in attempting the point recovery
        if !compression_flag_set || infinity_flag_set {
            continue;
        }

        let mut candidate = [0u8; 48];
        candidate.copy_from_slice(&digest);

        let option: Option<G1Affine> = G1Affine::from_compressed_unchecked(&candidate).into();
        if let Some(point) = option {
            let point_projective: G1Projective = point.into();
            return point_projective.clear_cofactor();
        }
    }
}

/// Maps raw attribute bytes to a scalar by interpreting them as a
/// big-endian unsigned integer reduced modulo the group order.
/// Attributes longer than 32 bytes are therefore not collision
/// resistant; this encoding is part of the wire protocol and cannot be
/// changed unilaterally.
pub(crate) fn attribute_to_scalar(attribute: &[u8]) -> Scalar {
    // 2^256 mod q, the distance between consecutive 32-byte limbs
    let mut radix_bytes = [0u8; 64];
    radix_bytes[32] = 1;
    let radix = Scalar::from_bytes_wide(&radix_bytes);

    // Horner evaluation over 32-byte limbs, most significant first;
    // rchunks keeps the short limb (if any) at the front
    let mut acc = Scalar::zero();
    for limb in attribute.rchunks(32).rev() {
        let mut wide = [0u8; 64];
        for (i, byte) in limb.iter().rev().enumerate() {
            wide[i] = *byte;
        }
        acc = acc * radix + Scalar::from_bytes_wide(&wide);
    }
    acc
}

/// Fixed-width big-endian encoding of a scalar, as used on the wire.
pub(crate) fn scalar_to_be_bytes(scalar: &Scalar) -> [u8; 32] {
    let mut bytes = scalar.to_bytes();
    bytes.reverse();
    bytes
}

pub(crate) fn try_deserialize_scalar(bytes: &[u8; 32], err_msg: &'static str) -> Result<Scalar> {
    let mut le_bytes = *bytes;
    le_bytes.reverse();
    Option::from(Scalar::from_bytes(&le_bytes))
        .ok_or_else(|| Error::new(ErrorKind::Deserialization, err_msg))
}

pub(crate) fn try_deserialize_g1_projective(
    bytes: &[u8; 48],
    err_msg: &'static str,
) -> Result<G1Projective> {
    let affine: Option<G1Affine> = G1Affine::from_compressed(bytes).into();
    affine
        .map(G1Projective::from)
        .ok_or_else(|| Error::new(ErrorKind::Deserialization, err_msg))
}

pub(crate) fn try_deserialize_g2_projective(
    bytes: &[u8; 96],
    err_msg: &'static str,
) -> Result<G2Projective> {
    let affine: Option<G2Affine> = G2Affine::from_compressed(bytes).into();
    affine
        .map(G2Projective::from)
        .ok_or_else(|| Error::new(ErrorKind::Deserialization, err_msg))
}
