use rand::{SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};

use super::{DomainConfig, SimError, SpatialDomain, TickReport};

pub const SIM_FPS: u32 = 35;
pub const DT: f32 = 1.0 / SIM_FPS as f32;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// Totals over a batch of tics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tics: u64,
    pub moved: u64,
    pub unchanged: u64,
    pub contacts: u64,
    pub despawns: u64,
    pub commands: u64,
}

impl RunSummary {
    fn absorb(&mut self, r: &TickReport) {
        self.tics += 1;
        self.moved += r.moved as u64;
        self.unchanged += r.unchanged as u64;
        self.contacts += r.contacts as u64;
        self.despawns += r.despawns as u64;
        self.commands += r.commands as u64;
    }
}

/// Owns the domain and drives it at a fixed rate.
pub struct TicRunner {
    domain: SpatialDomain,
    rng: StdRng,
    last: Instant,
    tics: u64,
}

impl TicRunner {
    pub fn new(config: DomainConfig, seed: u64) -> Result<Self, SimError> {
        Ok(Self {
            domain: SpatialDomain::new(config)?,
            rng: StdRng::seed_from_u64(seed),
            last: Instant::now(),
            tics: 0,
        })
    }

    #[inline]
    pub fn domain(&self) -> &SpatialDomain {
        &self.domain
    }

    #[inline]
    pub fn domain_mut(&mut self) -> &mut SpatialDomain {
        &mut self.domain
    }

    /// The runner's seeded RNG, for spawning from the same stream.
    #[inline]
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    #[inline]
    pub fn tics(&self) -> u64 {
        self.tics
    }

    /// Run exactly one fixed‑rate game tic.
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        let report = self.domain.tick(DT, &mut self.rng)?;
        self.tics += 1;
        Ok(report)
    }

    /// Run `n` tics back to back (headless).
    pub fn run(&mut self, n: u64) -> Result<RunSummary, SimError> {
        let mut summary = RunSummary::default();
        for _ in 0..n {
            let r = self.step()?;
            summary.absorb(&r);
        }
        Ok(summary)
    }

    /// Advance enough tics to synchronise simulation with real time.
    pub fn pump(&mut self) -> Result<RunSummary, SimError> {
        let mut summary = RunSummary::default();
        while self.last.elapsed() >= TIC {
            let r = self.step()?;
            summary.absorb(&r);
            self.last += TIC;
        }
        Ok(summary)
    }
}
