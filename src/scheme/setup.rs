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
use crate::utils::hash_g1;
use bls12_381::{G1Affine, G2Affine, G2Prepared, Scalar};
use ff::Field;
use group::Curve;
use rand_core::{CryptoRng, RngCore};

/// Public parameters of the credential system: the standard generators
/// of G1 and G2 plus one independent G1 generator per attribute slot.
/// The parameters own the rng used by all subsequent protocol
/// operations; every operation is otherwise a pure function of its
/// inputs.
pub struct Parameters<R> {
    g1: G1Affine,
    hs: Vec<G1Affine>,
    g2: G2Affine,
    _g2_prepared_miller: G2Prepared,
    rng: R,
}

impl<R> std::fmt::Debug for Parameters<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameters")
            .field("g1", &self.g1)
            .field("hs", &self.hs)
            .field("g2", &self.g2)
            .finish_non_exhaustive()
    }
}

impl<R> Parameters<R> {
    /// Creates parameters supporting `num_attributes` attribute slots.
    ///
    /// Each h1 generator is obtained by hashing 48 fresh random bytes
    /// onto G1, so no discrete-log relation among the generators (or to
    /// g1) is known to anyone, the issuer included.
    pub fn new(mut rng: R, num_attributes: u32) -> Result<Parameters<R>>
    where
        R: RngCore + CryptoRng,
    {
        if num_attributes == 0 {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "tried to setup the scheme for 0 attributes",
            ));
        }

        let mut hs = Vec::with_capacity(num_attributes as usize);
        for _ in 0..num_attributes {
            let mut seed = [0u8; 48];
            rng.try_fill_bytes(&mut seed)
                .map_err(|err| Error::new(ErrorKind::Randomness, err.to_string()))?;
            hs.push(hash_g1(seed).to_affine());
        }

        Ok(Parameters {
            g1: G1Affine::generator(),
            hs,
            g2: G2Affine::generator(),
            _g2_prepared_miller: G2Prepared::from(G2Affine::generator()),
            rng,
        })
    }

    pub(crate) fn gen1(&self) -> &G1Affine {
        &self.g1
    }

    pub(crate) fn gen2(&self) -> &G2Affine {
        &self.g2
    }

    pub(crate) fn prepared_miller_g2(&self) -> &G2Prepared {
        &self._g2_prepared_miller
    }

    /// The independent per-attribute generators h1[0..l).
    pub fn gen_hs(&self) -> &[G1Affine] {
        &self.hs
    }

    /// Number of attribute slots these parameters support.
    pub fn num_attributes(&self) -> usize {
        self.hs.len()
    }

    pub(crate) fn random_scalar(&mut self) -> Result<Scalar>
    where
        R: RngCore + CryptoRng,
    {
        // sample 64 uniform bytes and wide-reduce so the result carries
        // no modular bias; try_fill_bytes surfaces rng failures instead
        // of panicking mid-protocol
        let mut bytes = [0u8; 64];
        self.rng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| Error::new(ErrorKind::Randomness, err.to_string()))?;
        Ok(Scalar::from_bytes_wide(&bytes))
    }

    pub(crate) fn random_scalar_nonzero(&mut self) -> Result<Scalar>
    where
        R: RngCore + CryptoRng,
    {
        loop {
            let candidate = self.random_scalar()?;
            if !bool::from(candidate.is_zero()) {
                return Ok(candidate);
            }
        }
    }

    pub(crate) fn n_random_scalars(&mut self, n: usize) -> Result<Vec<Scalar>>
    where
        R: RngCore + CryptoRng,
    {
        (0..n).map(|_| self.random_scalar()).collect()
    }
}

/// Convenience wrapper around [`Parameters::new`].
pub fn setup<R: RngCore + CryptoRng>(rng: R, num_attributes: u32) -> Result<Parameters<R>> {
    Parameters::new(rng, num_attributes)
}
