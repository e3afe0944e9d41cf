//! Candidate selection and random reviewer sampling
//!
//! Eligibility is always "active member of exactly one team, not excluded".
//! Sampling is the only source of randomness in the system and goes through
//! a [`Sampler`] so tests can make it reproducible.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use crate::store::StoreTx;
use crate::Result;

/// Uniform sampling without replacement
pub trait Sampler: Send + Sync {
    /// Pick `min(k, pool.len())` distinct ids from `pool`
    fn sample(&self, pool: &[String], k: usize) -> Vec<String>;
}

fn sample_with<R: RngCore + ?Sized>(rng: &mut R, pool: &[String], k: usize) -> Vec<String> {
    if pool.len() <= k {
        return pool.to_vec();
    }
    pool.choose_multiple(rng, k).cloned().collect()
}

/// Samples from a fresh thread-local generator on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSampler;

impl Sampler for ThreadRngSampler {
    fn sample(&self, pool: &[String], k: usize) -> Vec<String> {
        sample_with(&mut rand::thread_rng(), pool, k)
    }
}

/// Samples from a caller-provided generator
#[derive(Debug)]
pub struct RngSampler<R> {
    rng: Mutex<R>,
}

impl<R: RngCore + Send> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl RngSampler<StdRng> {
    /// Reproducible sampler for tests
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

/// Deterministic sampler
pub type SeededSampler = RngSampler<StdRng>;

impl<R: RngCore + Send> Sampler for RngSampler<R> {
    fn sample(&self, pool: &[String], k: usize) -> Vec<String> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        sample_with(&mut *rng, pool, k)
    }
}

/// Finds eligible reviewers and samples from them
#[derive(Clone)]
pub struct CandidateSelector {
    sampler: Arc<dyn Sampler>,
}

impl std::fmt::Debug for CandidateSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateSelector").finish_non_exhaustive()
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngSampler))
    }
}

impl CandidateSelector {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        Self { sampler }
    }

    /// Active members of `team_name` not in `exclude_ids`
    pub async fn select_candidates(
        &self,
        tx: &mut dyn StoreTx,
        team_name: &str,
        exclude_ids: &[String],
    ) -> Result<Vec<String>> {
        let eligible = tx.find_active_team_members(team_name, exclude_ids).await?;
        tracing::debug!(
            team = %team_name,
            excluded = exclude_ids.len(),
            eligible = eligible.len(),
            "Selected candidates"
        );
        Ok(eligible)
    }

    /// Uniformly pick `min(k, eligible.len())` of `eligible`
    pub fn sample(&self, eligible: &[String], k: usize) -> Vec<String> {
        self.sampler.sample(eligible, k)
    }
}
