//! Obstacle stream: scrolling, pruning and spawning
//!
//! Obstacles scroll left at a fixed speed, are dropped once fully off-field,
//! and a new one appears at the right edge whenever the previous spawn has
//! travelled `horizontal_spacing`. Gap positions are drawn from an injected
//! RNG so runs replay exactly for a given seed.

use rand::Rng;
use rand::distr::Uniform;

use super::state::{Obstacle, Session, SimEvent, TickReport};
use crate::config::SimConfig;

/// Draw the gap top for a new obstacle.
///
/// The draw is uniform over `[min_margin, field_height - pipe_gap - min_margin]`,
/// narrowed to `previous ± max_consecutive_difference` when that bound is
/// configured. An empty range resolves to its lower bound. A range that
/// cannot be sampled (infinite or overflowing bounds) falls back to the
/// midpoint of the full range.
pub fn roll_gap_top<R: Rng>(config: &SimConfig, previous: Option<f32>, rng: &mut R) -> f32 {
    let (base_min, base_max) = config.gap_top_range();

    let (mut lo, mut hi) = (base_min, base_max);
    if let (Some(prev), Some(diff)) = (previous, config.max_consecutive_difference) {
        lo = lo.max(prev - diff);
        hi = hi.min(prev + diff);
    }

    let drawn = if lo < hi {
        match Uniform::new_inclusive(lo, hi) {
            Ok(range) => rng.sample(range),
            Err(err) => {
                let midpoint = fallback_gap_top(base_min, base_max);
                log::warn!("Cannot sample gap top from [{lo}, {hi}] ({err}), using {midpoint}");
                midpoint
            }
        }
    } else {
        if lo > hi {
            log::warn!("Empty gap top range [{lo}, {hi}], clamping to {lo}");
        }
        lo
    };

    let drawn = if drawn.is_finite() {
        drawn
    } else {
        let midpoint = fallback_gap_top(base_min, base_max);
        log::warn!("Non-finite gap top draw, using {midpoint}");
        midpoint
    };

    if base_min <= base_max {
        drawn.clamp(base_min, base_max)
    } else {
        base_min
    }
}

/// Midpoint of the full range, or its lower bound if the midpoint overflows
fn fallback_gap_top(base_min: f32, base_max: f32) -> f32 {
    let midpoint = base_min / 2.0 + base_max / 2.0;
    if midpoint.is_finite() {
        midpoint
    } else if base_min.is_finite() {
        base_min
    } else {
        0.0
    }
}

/// True when a new obstacle should enter at the right edge
pub fn needs_spawn(obstacles: &[Obstacle], config: &SimConfig) -> bool {
    match obstacles.last() {
        None => true,
        Some(last) => last.x < config.field_width - config.horizontal_spacing,
    }
}

/// Scroll, prune and spawn obstacles for one tick
pub fn advance_obstacles(session: &mut Session) -> TickReport {
    let mut report = TickReport::default();
    let speed = session.config.pipe_speed;
    let pipe_width = session.config.pipe_width;

    for obstacle in &mut session.obstacles {
        obstacle.x -= speed;
    }

    session.obstacles.retain(|o| {
        let keep = o.x > -pipe_width;
        if !keep {
            report.push(SimEvent::Despawned { id: o.id });
        }
        keep
    });

    if needs_spawn(&session.obstacles, &session.config) {
        let previous = session.obstacles.last().map(|o| o.gap_top);
        let gap_top = roll_gap_top(&session.config, previous, &mut session.rng);
        let id = session.next_obstacle_id();
        let obstacle = Obstacle::new(id, session.config.field_width, gap_top, session.config.pipe_gap);
        log::debug!("Spawned obstacle {} with gap [{}, {}]", id, obstacle.gap_top, obstacle.gap_bottom);
        session.obstacles.push(obstacle);
        report.push(SimEvent::Spawned { id, gap_top });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_first_spawn_on_empty_field() {
        let mut session = Session::new(SimConfig::default(), 1);
        let report = advance_obstacles(&mut session);
        assert_eq!(session.obstacles().len(), 1);
        let obstacle = session.obstacles()[0];
        assert_eq!(obstacle.x, 400.0);
        assert!(!obstacle.passed);
        assert!(report.contains(&SimEvent::Spawned {
            id: obstacle.id,
            gap_top: obstacle.gap_top
        }));
    }

    #[test]
    fn test_scroll_and_prune() {
        let mut session = Session::new(SimConfig::default(), 1);
        let gone = session.insert_obstacle(-57.0, 200.0);
        let kept = session.insert_obstacle(100.0, 200.0);
        let report = advance_obstacles(&mut session);

        assert!(report.contains(&SimEvent::Despawned { id: gone }));
        assert_eq!(session.obstacles()[0].id, kept);
        assert_eq!(session.obstacles()[0].x, 97.0);
        // 97 < 400 - 220, so a fresh obstacle enters on the right
        assert_eq!(session.obstacles().len(), 2);
        assert_eq!(session.obstacles()[1].x, 400.0);
    }

    #[test]
    fn test_no_spawn_until_spacing_travelled() {
        let mut session = Session::new(SimConfig::default(), 1);
        session.insert_obstacle(183.0, 200.0);
        advance_obstacles(&mut session);
        // 180 is not below 180
        assert_eq!(session.obstacles().len(), 1);
        advance_obstacles(&mut session);
        assert_eq!(session.obstacles().len(), 2);
    }

    #[test]
    fn test_consecutive_difference_clamp() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let top = roll_gap_top(&config, Some(60.0), &mut rng);
            assert!((50.0..=210.0).contains(&top), "gap top {top} strayed too far");
        }
    }

    #[test]
    fn test_unbounded_variant_covers_full_range() {
        let config = SimConfig {
            max_consecutive_difference: None,
            ..SimConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let tops: Vec<f32> = (0..500)
            .map(|_| roll_gap_top(&config, Some(60.0), &mut rng))
            .collect();
        assert!(tops.iter().any(|&t| t > 300.0));
        assert!(tops.iter().all(|&t| (50.0..=420.0).contains(&t)));
    }

    #[test]
    fn test_degenerate_range_clamps_without_panic() {
        // Negative difference makes the narrowed range empty
        let config = SimConfig {
            max_consecutive_difference: Some(-10.0),
            ..SimConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(roll_gap_top(&config, Some(200.0), &mut rng), 210.0);

        // Gap taller than the field leaves no feasible range at all
        let config = SimConfig {
            pipe_gap: 550.0,
            ..SimConfig::default()
        };
        assert_eq!(roll_gap_top(&config, None, &mut rng), 50.0);
    }

    #[test]
    fn test_unsampleable_range_falls_back() {
        let mut rng = Pcg32::seed_from_u64(3);

        // Range overflows to [-3e38, inf]: midpoint overflows, lower bound is kept
        let config = SimConfig {
            field_height: 3.0e38,
            min_margin: -3.0e38,
            max_consecutive_difference: None,
            ..SimConfig::default()
        };
        let top = roll_gap_top(&config, None, &mut rng);
        assert_eq!(top, -3.0e38);

        let config = SimConfig {
            field_height: f32::INFINITY,
            ..SimConfig::default()
        };
        assert_eq!(roll_gap_top(&config, None, &mut rng), 50.0);
    }

    #[test]
    fn test_infinite_field_spawns_without_panic() {
        let config = SimConfig {
            field_height: f32::INFINITY,
            ..SimConfig::default()
        };
        let mut session = Session::new(config, 9);
        session.jump();
        crate::sim::physics_tick(&mut session);
        let obstacle = session.obstacles()[0];
        assert_eq!(obstacle.gap_top, 50.0);
        assert_eq!(obstacle.gap_bottom, 180.0);
    }

    #[test]
    fn test_non_finite_previous_is_ignored() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let top = roll_gap_top(&config, Some(f32::NAN), &mut rng);
        assert!(top.is_finite());
        assert!((50.0..=420.0).contains(&top));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let run = |seed| {
            let mut session = Session::new(SimConfig::default(), seed);
            for _ in 0..400 {
                advance_obstacles(&mut session);
            }
            session.obstacles().to_vec()
        };
        assert_eq!(run(42), run(42));
    }

    proptest! {
        #[test]
        fn generated_gaps_respect_margins(seed in any::<u64>(), ticks in 1_usize..600) {
            let mut session = Session::new(SimConfig::default(), seed);
            let config = session.config().clone();
            for _ in 0..ticks {
                advance_obstacles(&mut session);
                for o in session.obstacles() {
                    prop_assert!((o.gap_bottom - o.gap_top - config.pipe_gap).abs() < 1e-3);
                    prop_assert!(o.gap_top >= config.min_margin);
                    prop_assert!(o.gap_bottom <= config.field_height - config.min_margin + 1e-3);
                }
            }
        }

        #[test]
        fn spawns_are_at_least_spacing_apart(seed in any::<u64>()) {
            let mut session = Session::new(SimConfig::default(), seed);
            let spacing = session.config().horizontal_spacing;
            for _ in 0..800 {
                let before = session.obstacles().last().map(|o| o.x - session.config().pipe_speed);
                let report = advance_obstacles(&mut session);
                let spawned = report.events.iter().any(|e| matches!(e, SimEvent::Spawned { .. }));
                if let (true, Some(prev_x)) = (spawned, before) {
                    let new_x = session.obstacles().last().map(|o| o.x).unwrap_or_default();
                    prop_assert!(new_x - prev_x >= spacing, "spawned {} after {}", new_x, prev_x);
                }
            }
        }
    }
}
