//! Headless crowd run on top of the spatial hash grid.
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- --entities 5000 --ticks 350
//! ```
//!
//! Spawns wanderers, seekers and a few oversized bodies.  The player
//! walks a circle around the origin and fires a shot every few tics;
//! one area select happens half way through.  Grid and tic totals are
//! printed at the end.

use anyhow::Context;
use clap::Parser;
use glam::{Vec2, vec2};
use rand::Rng;

use hashgrid::grid::{Bounds, GridConfig};
use hashgrid::sim::{DT, DomainConfig, SIM_FPS, TicRunner};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Number of roaming bodies
    #[arg(long, default_value_t = 2000)]
    entities: usize,

    /// Number of bodies chasing the player
    #[arg(long, default_value_t = 200)]
    seekers: usize,

    /// Fire one shot every N tics (0 = never)
    #[arg(long, default_value_t = 5)]
    fire_every: u64,

    /// Tics to simulate
    #[arg(long, default_value_t = 10 * SIM_FPS as u64)]
    ticks: u64,

    /// Level‑0 cell size in world units
    #[arg(long, default_value_t = 100.0)]
    cell_size: f32,

    /// Number of grid levels
    #[arg(long, default_value_t = 3)]
    levels: usize,

    /// Cell growth per level
    #[arg(long, default_value_t = 4)]
    ratio: u32,

    /// Half side of the square arena
    #[arg(long, default_value_t = 2000.0)]
    arena: f32,

    /// Radius of the circle the player walks around the origin
    #[arg(long, default_value_t = 400.0)]
    player_orbit: f32,

    /// Radius of the mid‑run area select (0 = skip)
    #[arg(long, default_value_t = 300.0)]
    select_radius: f32,

    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

const AGENT_RADIUS: f32 = 10.0;
const WANDER_SPEED: f32 = 120.0;
const SEEK_SPEED: f32 = 90.0;
const SHOT_SPEED: f32 = 900.0;
const SHOT_LIFETIME: f32 = 2.0;
/// Player angular speed, radians per second.
const PLAYER_TURN: f32 = 0.5;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let config = DomainConfig {
        grid: GridConfig::new(opts.cell_size, opts.levels, opts.ratio),
        arena: Bounds::new(Vec2::splat(-opts.arena), Vec2::splat(opts.arena)),
        ..DomainConfig::default()
    };
    let mut sim = TicRunner::new(config, opts.seed).context("building simulation domain")?;

    // ─────────── populate ───────────
    let half = opts.arena;
    for _ in 0..opts.entities {
        let p = random_point(sim.rng(), half);
        sim.domain_mut().spawn_wanderer(p, AGENT_RADIUS, WANDER_SPEED);
    }
    for _ in 0..opts.seekers {
        let p = random_point(sim.rng(), half);
        sim.domain_mut().spawn_seeker(p, AGENT_RADIUS, SEEK_SPEED);
    }
    // a few large bodies that land on coarse levels
    for i in 0..4 {
        let p = vec2(-half * 0.5 + i as f32 * half * 0.33, half * 0.5);
        sim.domain_mut().spawn_sized(p, 150.0, 150.0 * (i + 1) as f32);
    }
    log::info!(
        "spawned {} wanderers, {} seekers, 4 large bodies",
        opts.entities,
        opts.seekers
    );

    // ─────────── run ───────────
    let mut moved = 0u64;
    let mut unchanged = 0u64;
    let mut contacts = 0u64;
    let mut despawns = 0u64;
    for tic in 0..opts.ticks {
        let heading = Vec2::from_angle(tic as f32 * DT * PLAYER_TURN);
        sim.domain_mut().set_player(heading * opts.player_orbit);

        if opts.fire_every > 0 && tic % opts.fire_every == 0 {
            let angle = sim.rng().gen_range(0.0..std::f32::consts::TAU);
            let player = sim.domain().player();
            sim.domain_mut().spawn_projectile(
                player,
                Vec2::from_angle(angle),
                SHOT_SPEED,
                SHOT_LIFETIME,
            );
        }
        if opts.select_radius > 0.0 && tic == opts.ticks / 2 {
            let hit = sim.domain_mut().select_in_area(Vec2::ZERO, opts.select_radius);
            log::info!("area select r={} picked {} bodies", opts.select_radius, hit.len());
        }

        let r = sim.step().with_context(|| format!("tic {tic}"))?;
        moved += r.moved as u64;
        unchanged += r.unchanged as u64;
        contacts += r.contacts as u64;
        despawns += r.despawns as u64;
    }

    log::info!("run finished after {} tics", sim.tics());

    // ─────────── report ───────────
    let domain = sim.domain();
    let grid = domain.grid();
    let stats = grid.stats();
    println!(
        "{} tics ({:.1}s simulated), {} entities alive",
        sim.tics(),
        domain.clock(),
        domain.world().len()
    );
    println!(
        "grid updates: {moved} re-bucketed, {unchanged} unchanged ({:.1}% skipped)",
        percent(unchanged, moved + unchanged)
    );
    println!(
        "buckets: {} (inserts {}, erases {}, skipped moves {})",
        grid.bucket_count(),
        stats.inserts,
        stats.erases,
        stats.moves_skipped
    );
    for i in 0..grid.level_count() {
        if let Some(level) = grid.level(i) {
            println!(
                "  level {i}: cell {:>8.1}  buckets {:>6}  entries {:>7}",
                level.cell_size(),
                level.bucket_count(),
                level.entry_count()
            );
        }
    }
    println!("contacts {contacts}, shot despawns {despawns}");
    Ok(())
}

fn random_point<R: Rng>(rng: &mut R, half: f32) -> Vec2 {
    vec2(rng.gen_range(-half..half), rng.gen_range(-half..half))
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
