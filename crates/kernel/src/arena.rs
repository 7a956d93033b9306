use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use range_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::error::{ArenaError, ConfigError};
use crate::fireball::Fireball;
use crate::target::Target;

/// A record produced by every spawn, removal and tick of the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArenaEvent {
    TargetSpawned { id: EntityId, position: Vec3 },
    FireballLaunched {
        id: EntityId,
        origin: Vec3,
        direction: Vec3,
    },
    /// `fireball` destroyed `target`. Both are gone afterwards.
    TargetHit { target: EntityId, fireball: EntityId },
    /// Fireball shrank below the visibility threshold.
    FireballExpired { id: EntityId },
    Stepped { tick: u64 },
}

/// Shot and hit counters for the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaStats {
    pub shots: u64,
    pub hits: u64,
}

/// What a single [`Arena::step`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub spawned: Option<EntityId>,
    /// `(fireball, target)` pairs, in scan order.
    pub hits: Vec<(EntityId, EntityId)>,
    pub expired: Vec<EntityId>,
}

/// Read-only snapshot of arena state for HUDs and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaSummary {
    pub tick: u64,
    pub elapsed: f64,
    pub targets: usize,
    pub fireballs: usize,
    pub stats: ArenaStats,
}

/// The authoritative game state.
///
/// All mutations go through [`Arena::launch`] and [`Arena::step`]. Targets
/// and fireballs are kept in creation order, which is also id order.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    targets: Vec<Target>,
    fireballs: Vec<Fireball>,
    tick: u64,
    last_spawn_tick: u64,
    next_id: EntityId,
    rng: StdRng,
    stats: ArenaStats,
    /// Append-only event log.
    event_log: Vec<ArenaEvent>,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            targets: Vec::new(),
            fireballs: Vec::new(),
            tick: 0,
            last_spawn_tick: 0,
            next_id: EntityId(0),
            stats: ArenaStats::default(),
            event_log: Vec::new(),
        })
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Ticks advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since the arena was created.
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 / self.config.tick_rate
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn fireballs(&self) -> &[Fireball] {
        &self.fireballs
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    pub fn summary(&self) -> ArenaSummary {
        ArenaSummary {
            tick: self.tick,
            elapsed: self.elapsed(),
            targets: self.targets.len(),
            fireballs: self.fireballs.len(),
            stats: self.stats,
        }
    }

    pub fn events(&self) -> &[ArenaEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Fire a new fireball. Counts as a shot even if it never hits.
    pub fn launch(&mut self, origin: Vec3, direction: Vec3) -> Result<EntityId, ArenaError> {
        let fireball = Fireball::launch(
            self.next_id,
            origin,
            direction,
            self.config.fireball_start_distance,
        )?;
        let id = self.allocate_id();
        self.event_log.push(ArenaEvent::FireballLaunched {
            id,
            origin,
            direction: fireball.direction(),
        });
        self.fireballs.push(fireball);
        self.stats.shots += 1;
        tracing::debug!(%id, ?origin, "fireball launched");
        Ok(id)
    }

    /// Advance the arena by one fixed tick.
    ///
    /// Order: spawn, collide, spin targets, move and expire fireballs.
    /// Collisions use positions from before this tick's movement.
    pub fn step(&mut self) -> StepReport {
        let _span = tracing::debug_span!("arena_step", tick = self.tick + 1).entered();
        self.tick += 1;
        let mut report = StepReport {
            spawned: self.spawn_if_due(),
            ..StepReport::default()
        };

        report.hits = self.resolve_collisions();

        for target in &mut self.targets {
            target.advance(self.config.target_spin_step);
        }

        let (distance_step, spin_step, min_scale) = (
            self.config.fireball_distance_step,
            self.config.fireball_spin_step,
            self.config.min_visible_scale,
        );
        let mut expired = Vec::new();
        self.fireballs.retain_mut(|f| {
            f.advance(distance_step, spin_step);
            let visible = f.is_visible(min_scale);
            if !visible {
                expired.push(f.id);
            }
            visible
        });
        for id in &expired {
            tracing::debug!(%id, "fireball expired");
            self.event_log.push(ArenaEvent::FireballExpired { id: *id });
        }
        report.expired = expired;

        self.event_log.push(ArenaEvent::Stepped { tick: self.tick });
        report
    }

    fn spawn_if_due(&mut self) -> Option<EntityId> {
        let ticks_since = (self.tick - self.last_spawn_tick) as f64;
        let due = ticks_since > self.config.spawn_interval * self.config.tick_rate;
        if !due || self.targets.len() >= self.config.max_targets {
            return None;
        }
        let id = self.allocate_id();
        let target = Target::random(
            id,
            &mut self.rng,
            self.config.spawn_radius_min,
            self.config.spawn_radius_max,
        );
        tracing::debug!(%id, position = ?target.position, "target spawned");
        self.event_log.push(ArenaEvent::TargetSpawned {
            id,
            position: target.position,
        });
        self.targets.push(target);
        self.last_spawn_tick = self.tick;
        Some(id)
    }

    /// Linear scan of every fireball against every remaining target.
    fn resolve_collisions(&mut self) -> Vec<(EntityId, EntityId)> {
        let radius = self.config.hit_radius;
        let targets = &mut self.targets;
        let mut hits = Vec::new();
        self.fireballs.retain(|fireball| {
            let pos = fireball.position();
            let before = hits.len();
            targets.retain(|target| {
                let hit = target.is_close_to(pos, radius);
                if hit {
                    hits.push((fireball.id, target.id));
                }
                !hit
            });
            hits.len() == before
        });
        for &(fireball, target) in &hits {
            tracing::debug!(%fireball, %target, "target hit");
            self.event_log
                .push(ArenaEvent::TargetHit { target, fireball });
        }
        self.stats.hits += hits.len() as u64;
        hits
    }

    /// Spawn a target at an exact position, bypassing the cadence and cap.
    ///
    /// Used by scripted scenarios and tests.
    pub fn place_target(&mut self, position: Vec3) -> EntityId {
        let id = self.allocate_id();
        self.event_log
            .push(ArenaEvent::TargetSpawned { id, position });
        self.targets.push(Target::new(id, position));
        id
    }

    /// Deterministic hash of the arena state for comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        let mix_vec = |h: &mut u64, v: Vec3| {
            for c in v.to_array() {
                mix(h, &c.to_le_bytes());
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.stats.shots.to_le_bytes());
        mix(&mut h, &self.stats.hits.to_le_bytes());
        for t in &self.targets {
            mix(&mut h, &t.id.0.to_le_bytes());
            mix_vec(&mut h, t.position);
            mix(&mut h, &t.spin().to_le_bytes());
        }
        for f in &self.fireballs {
            mix(&mut h, &f.id.0.to_le_bytes());
            mix_vec(&mut h, f.origin());
            mix_vec(&mut h, f.direction());
            mix(&mut h, &f.distance().to_le_bytes());
            mix(&mut h, &f.spin().to_le_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(ArenaConfig::default()).unwrap()
    }

    /// Config with spawning effectively disabled.
    fn quiet() -> Arena {
        Arena::new(ArenaConfig {
            spawn_interval: 1.0e6,
            ..ArenaConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn arena_starts_empty() {
        let a = arena();
        assert_eq!(a.tick(), 0);
        assert!(a.targets().is_empty());
        assert!(a.fireballs().is_empty());
        assert_eq!(a.stats(), ArenaStats::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = ArenaConfig {
            max_targets: 0,
            ..ArenaConfig::default()
        };
        assert_eq!(Arena::new(cfg).unwrap_err(), ConfigError::ZeroTargetCap);
    }

    #[test]
    fn first_spawn_needs_strictly_more_than_interval() {
        let mut a = arena();
        for _ in 0..60 {
            assert_eq!(a.step().spawned, None);
        }
        assert!(a.step().spawned.is_some());
        assert_eq!(a.targets().len(), 1);
    }

    #[test]
    fn one_spawn_per_elapsed_second() {
        let mut a = arena();
        let mut spawns = 0;
        for _ in 0..610 {
            if a.step().spawned.is_some() {
                spawns += 1;
            }
        }
        // Every 61st tick at 60 Hz.
        assert_eq!(spawns, 10);
        assert_eq!(a.targets().len(), 10);
    }

    #[test]
    fn target_cap_is_respected() {
        let mut a = arena();
        for _ in 0..60 * 40 {
            a.step();
            assert!(a.targets().len() <= 16);
        }
        assert_eq!(a.targets().len(), 16);
    }

    #[test]
    fn spawn_resumes_immediately_after_hit_at_cap() {
        let mut a = Arena::new(ArenaConfig {
            max_targets: 1,
            ..ArenaConfig::default()
        })
        .unwrap();
        for _ in 0..61 {
            a.step();
        }
        assert_eq!(a.targets().len(), 1);
        for _ in 0..200 {
            assert_eq!(a.step().spawned, None);
        }
        let pos = a.targets()[0].position;
        // Start distance puts the fireball right on the target.
        a.launch(pos - Vec3::X * 1.5, Vec3::X).unwrap();
        let report = a.step();
        assert_eq!(report.hits.len(), 1);
        assert!(a.targets().is_empty());
        // The interval has long elapsed, so the next tick refills.
        assert!(a.step().spawned.is_some());
    }

    #[test]
    fn fireball_destroys_nearby_target() {
        let mut a = quiet();
        let target = a.place_target(Vec3::new(0.0, 0.0, -1.6));
        let fireball = a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        let report = a.step();
        assert_eq!(report.hits, vec![(fireball, target)]);
        assert!(a.targets().is_empty());
        assert!(a.fireballs().is_empty());
        assert_eq!(a.stats(), ArenaStats { shots: 1, hits: 1 });
    }

    #[test]
    fn distant_target_survives() {
        let mut a = quiet();
        a.place_target(Vec3::new(3.0, 0.0, 0.0));
        a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        let report = a.step();
        assert!(report.hits.is_empty());
        assert_eq!(a.targets().len(), 1);
        assert_eq!(a.fireballs().len(), 1);
    }

    #[test]
    fn one_fireball_can_clear_a_cluster() {
        let mut a = quiet();
        a.place_target(Vec3::new(0.0, 0.1, -1.5));
        a.place_target(Vec3::new(0.0, -0.1, -1.5));
        a.place_target(Vec3::new(0.0, 0.0, -5.0));
        a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        let report = a.step();
        assert_eq!(report.hits.len(), 2);
        assert_eq!(a.targets().len(), 1);
        assert_eq!(a.stats().hits, 2);
    }

    #[test]
    fn removed_target_cannot_be_hit_twice() {
        let mut a = quiet();
        a.place_target(Vec3::new(0.0, 0.0, -1.5));
        let first = a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        let second = a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        let report = a.step();
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].0, first);
        assert_eq!(a.fireballs().len(), 1);
        assert_eq!(a.fireballs()[0].id, second);
    }

    #[test]
    fn removal_iff_within_hit_radius() {
        // Sweep targets across the boundary and compare against the rule.
        for i in 0..40 {
            let offset = i as f32 * 0.02;
            let mut a = quiet();
            a.place_target(Vec3::new(offset, 0.0, -1.5));
            let fb = a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
            let pos = a.fireballs()[0].position();
            let within = a.targets()[0].position.distance(pos) < 0.3;
            let report = a.step();
            assert_eq!(!report.hits.is_empty(), within, "offset {offset}");
            assert_eq!(a.targets().is_empty(), within);
            assert_eq!(a.fireballs().iter().any(|f| f.id == fb), !within);
        }
    }

    #[test]
    fn fireball_expires_when_too_small() {
        let mut a = quiet();
        let id = a.launch(Vec3::ZERO, Vec3::Y).unwrap();
        let mut ticks = 0;
        loop {
            ticks += 1;
            let report = a.step();
            if !report.expired.is_empty() {
                assert_eq!(report.expired, vec![id]);
                break;
            }
            assert!(ticks < 1_000, "fireball never expired");
        }
        assert!(a.fireballs().is_empty());
        // 1.5 + 0.07 * n > 10  =>  n = 122
        assert_eq!(ticks, 122);
        assert!(a.events().contains(&ArenaEvent::FireballExpired { id }));
    }

    #[test]
    fn far_launch_expires_on_first_step() {
        let mut a = quiet();
        let id = a.launch(Vec3::new(0.0, 0.0, 20.0), Vec3::Z).unwrap();
        let report = a.step();
        assert_eq!(report.expired, vec![id]);
        assert!(a.fireballs().is_empty());
        assert_eq!(a.stats().shots, 1);
    }

    #[test]
    fn launch_counts_shots_and_rejects_zero_direction() {
        let mut a = quiet();
        assert!(a.launch(Vec3::ZERO, Vec3::ZERO).is_err());
        assert_eq!(a.stats().shots, 0);
        a.launch(Vec3::ZERO, Vec3::X).unwrap();
        assert_eq!(a.stats().shots, 1);
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut a = quiet();
        let t = a.place_target(Vec3::new(5.0, 0.0, 0.0));
        let f = a.launch(Vec3::ZERO, Vec3::Y).unwrap();
        assert_ne!(t, f);
        assert!(f > t);
    }

    #[test]
    fn events_are_recorded() {
        let mut a = quiet();
        a.place_target(Vec3::new(0.0, 0.0, -1.5));
        a.launch(Vec3::ZERO, -Vec3::Z).unwrap();
        a.step();
        // spawn + launch + hit + step
        assert_eq!(a.events().len(), 4);
        assert!(matches!(a.events()[2], ArenaEvent::TargetHit { .. }));
        assert_eq!(a.events()[3], ArenaEvent::Stepped { tick: 1 });
    }

    #[test]
    fn drain_events_clears_log() {
        let mut a = quiet();
        a.step();
        assert_eq!(a.drain_events().len(), 1);
        assert!(a.events().is_empty());
    }

    #[test]
    fn same_seed_same_state() {
        let run = |seed| {
            let mut a = Arena::new(ArenaConfig::with_seed(seed)).unwrap();
            for i in 0..900 {
                if i % 45 == 0 {
                    a.launch(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.1, 0.0, -1.0))
                        .unwrap();
                }
                a.step();
            }
            a
        };
        let (a, b) = (run(7), run(7));
        assert_eq!(a.state_hash(), b.state_hash());
        assert_eq!(a.targets(), b.targets());
        assert_ne!(run(8).state_hash(), a.state_hash());
    }

    #[test]
    fn summary_reflects_state() {
        let mut a = quiet();
        a.place_target(Vec3::new(4.0, 0.0, 0.0));
        a.launch(Vec3::ZERO, Vec3::Y).unwrap();
        for _ in 0..60 {
            a.step();
        }
        let s = a.summary();
        assert_eq!(s.tick, 60);
        assert!((s.elapsed - 1.0).abs() < 1e-9);
        assert_eq!(s.targets, 1);
        assert_eq!(s.fireballs, 1);
        assert_eq!(s.stats.shots, 1);
    }
}
