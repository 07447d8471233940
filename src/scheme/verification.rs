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
use crate::scheme::issuance::{compute_commitment, Signature};
use crate::scheme::keygen::VerificationKey;
use crate::scheme::presentation::{revealed_presence_bitmap, Presentation};
use crate::scheme::setup::Parameters;
use crate::utils::attribute_to_scalar;
use crate::Attribute;
use bls12_381::{multi_miller_loop, G1Affine, G2Prepared};
use core::ops::Neg;
use group::{Curve, Group};

/// Checks whether e(P, Q) * e(-R, S) == id
fn check_bilinear_pairing(p: &G1Affine, q: &G2Prepared, r: &G1Affine, s: &G2Prepared) -> bool {
    // checking e(P, Q) * e(-R, S) == id
    // is equivalent to checking e(P, Q) == e(R, S)
    // but requires only a single final exponentiation rather than two of them
    let multi_miller = multi_miller_loop(&[(p, q), (&r.neg(), s)]);
    multi_miller.final_exponentiation().is_identity().into()
}

/// Verifies a presentation against the revealed attribute values and
/// their original indices.
///
/// `Ok(())` means the proof is valid. An `Err` whose kind is
/// [`ErrorKind::ChallengeMismatch`] or [`ErrorKind::PairingFailed`] is a
/// rejected proof; any other kind means the inputs were malformed and
/// the proof could not be evaluated.
pub fn verify_presentation<R>(
    params: &Parameters<R>,
    verification_key: &VerificationKey,
    presentation: &Presentation,
    nonce: &[u8],
    revealed_attributes: &[Attribute],
    revealed_indices: &[usize],
) -> Result<()> {
    if revealed_attributes.len() != revealed_indices.len() {
        return Err(Error::new(
            ErrorKind::InvalidParameter,
            format!(
                "the number of revealed attributes does not match the number of revealed indices (attributes: {}, indices: {})",
                revealed_attributes.len(),
                revealed_indices.len()
            ),
        ));
    }

    let revealed = revealed_presence_bitmap(revealed_indices, params.num_attributes())?;

    // re-pair each revealed value with its generator and put both in
    // the canonical ascending-index order the prover used
    let mut indexed_revealed = revealed_indices
        .iter()
        .zip(revealed_attributes.iter())
        .map(|(&index, attribute)| (index, attribute))
        .collect::<Vec<_>>();
    indexed_revealed.sort_by_key(|(index, _)| *index);

    let mut revealed_generators = Vec::with_capacity(indexed_revealed.len());
    let mut revealed_scalars = Vec::with_capacity(indexed_revealed.len());
    let mut ordered_revealed = Vec::with_capacity(indexed_revealed.len());
    for (index, attribute) in indexed_revealed {
        revealed_generators.push(params.gen_hs()[index]);
        revealed_scalars.push(attribute_to_scalar(attribute));
        ordered_revealed.push(attribute.clone());
    }

    // the hidden generators are the complement, likewise ascending
    let hidden_generators = params
        .gen_hs()
        .iter()
        .enumerate()
        .filter(|(i, _)| !revealed[*i])
        .map(|(_, h_i)| *h_i)
        .collect::<Vec<_>>();

    let revealed_commitment =
        compute_commitment(params.gen1(), &revealed_generators, &revealed_scalars);

    presentation.pi.verify(
        nonce,
        &revealed_commitment,
        &hidden_generators,
        &presentation.a_prime,
        &presentation.b_prime,
        &ordered_revealed,
    )?;

    // e(A', X2) = e(B', g2) certifies B' = x * A', transporting the
    // signature relation through the re-randomization; it is
    // independent of the revealed/hidden partition
    let pairing_holds = !bool::from(presentation.a_prime.is_identity())
        && check_bilinear_pairing(
            &presentation.a_prime.to_affine(),
            &G2Prepared::from(verification_key.x2.to_affine()),
            &presentation.b_prime.to_affine(),
            params.prepared_miller_g2(),
        );

    if !pairing_holds {
        return Err(Error::new(
            ErrorKind::PairingFailed,
            "the presented proof does not verify against the issuer key",
        ));
    }

    Ok(())
}

/// Checks a raw credential signature against the full attribute vector:
/// e(A, X2 + e * g2) == e(C, g2). The holder runs this once on receipt;
/// presentations never check it directly.
pub fn verify_signature<R>(
    params: &Parameters<R>,
    verification_key: &VerificationKey,
    attributes: &[Attribute],
    signature: &Signature,
) -> bool {
    if attributes.is_empty() || attributes.len() != params.num_attributes() {
        return false;
    }

    let attribute_scalars = attributes
        .iter()
        .map(|attribute| attribute_to_scalar(attribute))
        .collect::<Vec<_>>();
    let commitment = compute_commitment(params.gen1(), params.gen_hs(), &attribute_scalars);

    let x2_plus_e = verification_key.x2 + params.gen2() * signature.e();

    check_bilinear_pairing(
        &signature.a().to_affine(),
        &G2Prepared::from(x2_plus_e.to_affine()),
        &commitment.to_affine(),
        params.prepared_miller_g2(),
    ) && !bool::from(signature.a().is_identity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::issuance::issue;
    use crate::scheme::keygen::keygen;
    use crate::scheme::presentation::present;
    use crate::scheme::setup::setup;
    use rand_core::OsRng;

    fn attributes(values: &[&str]) -> Vec<Attribute> {
        values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }

    #[test]
    fn presentation_verifies_on_partially_revealed_attributes() {
        let mut params = setup(OsRng, 5).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&[
            "attribute1",
            "attribute2",
            "attribute3",
            "attribute4",
            "attribute5",
        ]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let revealed_indices = [0, 4];
        let nonce = b"random_nonce";
        let presentation =
            present(&mut params, &credential, &attributes, &revealed_indices, nonce).unwrap();

        let revealed = vec![attributes[0].clone(), attributes[4].clone()];
        assert!(verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            nonce,
            &revealed,
            &revealed_indices,
        )
        .is_ok());
    }

    #[test]
    fn presentation_verifies_when_everything_is_revealed() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0, 1, 2], b"nonce").unwrap();
        assert_eq!(0, presentation.num_hidden());

        assert!(verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            b"nonce",
            &attributes,
            &[0, 1, 2],
        )
        .is_ok());
    }

    #[test]
    fn presentations_verify_for_a_range_of_attribute_counts() {
        for num_attributes in 1u32..=8 {
            let mut params = setup(OsRng, num_attributes).unwrap();
            let keypair = keygen(&mut params).unwrap();
            let attributes = (0..num_attributes)
                .map(|i| format!("attribute{}", i).into_bytes())
                .collect::<Vec<_>>();
            let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

            // reveal every other attribute, always including the first
            let revealed_indices = (0..num_attributes as usize).step_by(2).collect::<Vec<_>>();
            let revealed = revealed_indices
                .iter()
                .map(|&i| attributes[i].clone())
                .collect::<Vec<_>>();

            let presentation = present(
                &mut params,
                &credential,
                &attributes,
                &revealed_indices,
                b"nonce",
            )
            .unwrap();

            assert!(verify_presentation(
                &params,
                &keypair.verification_key,
                &presentation,
                b"nonce",
                &revealed,
                &revealed_indices,
            )
            .is_ok());
        }
    }

    #[test]
    fn repeated_presentations_are_unlinkable_and_both_verify() {
        let mut params = setup(OsRng, 10).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = (0..10)
            .map(|i| format!("attribute{}", i).into_bytes())
            .collect::<Vec<_>>();
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let first = present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();
        let second = present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        assert_ne!(first.a_prime, second.a_prime);
        assert_ne!(first.b_prime, second.b_prime);

        for presentation in [&first, &second] {
            assert!(verify_presentation(
                &params,
                &keypair.verification_key,
                presentation,
                b"nonce",
                &attributes[..1],
                &[0],
            )
            .is_ok());
        }
    }

    #[test]
    fn substituted_revealed_attribute_is_rejected() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0, 1, 2], b"nonce").unwrap();

        let substituted = vec![b"a".to_vec(), b"X".to_vec(), b"c".to_vec()];
        let err = verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            b"nonce",
            &substituted,
            &[0, 1, 2],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::ChallengeMismatch, err.kind());
    }

    #[test]
    fn replayed_nonce_mismatch_is_rejected() {
        let mut params = setup(OsRng, 2).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        let err = verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            b"different nonce",
            &attributes[..1],
            &[0],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::ChallengeMismatch, err.kind());
    }

    #[test]
    fn tampered_proof_scalars_are_rejected() {
        let mut params = setup(OsRng, 5).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c", "d", "e"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0, 4], b"nonce").unwrap();
        let revealed = vec![attributes[0].clone(), attributes[4].clone()];

        let mut tampered = presentation.clone();
        tampered.pi.flip_challenge_bit();
        assert!(verify_presentation(
            &params,
            &keypair.verification_key,
            &tampered,
            b"nonce",
            &revealed,
            &[0, 4],
        )
        .is_err());

        let mut tampered = presentation.clone();
        tampered.pi.flip_response_r_bit();
        assert!(verify_presentation(
            &params,
            &keypair.verification_key,
            &tampered,
            b"nonce",
            &revealed,
            &[0, 4],
        )
        .is_err());

        let mut tampered = presentation.clone();
        tampered.pi.flip_response_e_bit();
        assert!(verify_presentation(
            &params,
            &keypair.verification_key,
            &tampered,
            b"nonce",
            &revealed,
            &[0, 4],
        )
        .is_err());

        for hidden_index in 0..presentation.num_hidden() {
            let mut tampered = presentation.clone();
            tampered.pi.flip_hidden_response_bit(hidden_index);
            assert!(verify_presentation(
                &params,
                &keypair.verification_key,
                &tampered,
                b"nonce",
                &revealed,
                &[0, 4],
            )
            .is_err());
        }
    }

    #[test]
    fn swapped_proof_points_are_rejected() {
        let mut params = setup(OsRng, 2).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        let swapped = Presentation {
            a_prime: presentation.b_prime,
            b_prime: presentation.a_prime,
            pi: presentation.pi.clone(),
        };

        let err = verify_presentation(
            &params,
            &keypair.verification_key,
            &swapped,
            b"nonce",
            &attributes[..1],
            &[0],
        )
        .unwrap_err();
        assert!(err.is_rejected_proof());
    }

    #[test]
    fn presentation_under_a_different_key_is_rejected() {
        let mut params = setup(OsRng, 2).unwrap();
        let keypair1 = keygen(&mut params).unwrap();
        let keypair2 = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b"]);
        let credential = issue(&mut params, &keypair1.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        // the challenge does not involve the issuer key, so the failure
        // surfaces in the pairing equation
        let err = verify_presentation(
            &params,
            &keypair2.verification_key,
            &presentation,
            b"nonce",
            &attributes[..1],
            &[0],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::PairingFailed, err.kind());
    }

    #[test]
    fn mismatched_verification_inputs_are_rejected() {
        let mut params = setup(OsRng, 3).unwrap();
        let keypair = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b", "c"]);
        let credential = issue(&mut params, &keypair.secret_key, &attributes).unwrap();

        let presentation =
            present(&mut params, &credential, &attributes, &[0], b"nonce").unwrap();

        // attribute and index counts disagree
        let err = verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            b"nonce",
            &attributes[..2],
            &[0],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());

        // claimed revealed set implies a different number of hidden responses
        let err = verify_presentation(
            &params,
            &keypair.verification_key,
            &presentation,
            b"nonce",
            &attributes[..2],
            &[0, 1],
        )
        .unwrap_err();
        assert_eq!(ErrorKind::InvalidParameter, err.kind());
    }

    #[test]
    fn raw_signature_verification() {
        let mut params = setup(OsRng, 2).unwrap();
        let keypair1 = keygen(&mut params).unwrap();
        let keypair2 = keygen(&mut params).unwrap();
        let attributes = attributes(&["a", "b"]);
        let signature = issue(&mut params, &keypair1.secret_key, &attributes).unwrap();

        assert!(verify_signature(
            &params,
            &keypair1.verification_key,
            &attributes,
            &signature,
        ));

        assert!(!verify_signature(
            &params,
            &keypair2.verification_key,
            &attributes,
            &signature,
        ));

        let tampered = vec![b"a".to_vec(), b"X".to_vec()];
        assert!(!verify_signature(
            &params,
            &keypair1.verification_key,
            &tampered,
            &signature,
        ));
    }
}
