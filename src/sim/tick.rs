//! Session controller: control inputs and fixed-rate transitions
//!
//! Phase machine: `Idle -> Running` on the first control input (either mode),
//! `Running -> Over` on a boundary violation or collision, `Over -> Idle` on
//! reset. Mode is orthogonal to phase; switching into autopilot from `Over`
//! resets and starts a new run.

use super::autopilot::evaluate_policy;
use super::collision::evaluate;
use super::obstacles::advance_obstacles;
use super::physics::{StepOutcome, apply_impulse, step_body};
use super::state::{Body, ControlMode, ImpulseSource, Phase, Session, SimEvent, TickReport};

/// One-shot control inputs applied at the start of a tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (click/tap/space)
    pub jump: bool,
    /// Return to a fresh idle run
    pub reset: bool,
    /// Switch control mode
    pub mode: Option<ControlMode>,
}

impl Session {
    /// Manual jump impulse. Starts the run from `Idle`; ignored once `Over`.
    pub fn jump(&mut self) -> TickReport {
        let mut report = TickReport::default();
        match self.phase {
            Phase::Over => return report,
            Phase::Idle => self.start(&mut report),
            Phase::Running => {}
        }
        apply_impulse(&mut self.body, &self.config);
        report.push(SimEvent::Jumped {
            source: ImpulseSource::Manual,
        });
        report
    }

    /// Re-initialize body, obstacles and score; keeps mode and best score
    pub fn reset(&mut self) -> TickReport {
        self.body = Body::new(&self.config);
        self.obstacles.clear();
        self.score = 0;
        self.ticks = 0;
        self.phase = Phase::Idle;
        log::info!("Session reset (mode: {:?}, best: {})", self.mode, self.best_score);

        let mut report = TickReport::default();
        report.push(SimEvent::Reset);
        report
    }

    /// Switch control mode. Entering autopilot starts the run, resetting first if it is over.
    pub fn set_mode(&mut self, mode: ControlMode) -> TickReport {
        let mut report = TickReport::default();
        if mode == self.mode {
            return report;
        }

        self.mode = mode;
        log::info!("Control mode: {:?}", mode);
        report.push(SimEvent::ModeChanged { mode });

        if mode == ControlMode::Autopilot {
            if self.phase == Phase::Over {
                report.extend(self.reset());
            }
            if self.phase == Phase::Idle {
                self.start(&mut report);
            }
        }
        report
    }

    pub fn toggle_mode(&mut self) -> TickReport {
        self.set_mode(self.mode.toggled())
    }

    fn start(&mut self, report: &mut TickReport) {
        self.phase = Phase::Running;
        log::info!("Run started (seed: {}, mode: {:?})", self.seed, self.mode);
        report.push(SimEvent::Started);
    }

    /// Enter `Over`. The caller reports `cause` unless it already has.
    fn end_run(&mut self, cause: SimEvent) {
        self.phase = Phase::Over;
        log::info!(
            "Run over after {} ticks: {:?}, score {}",
            self.ticks,
            cause,
            self.score
        );
    }
}

/// Apply one tick's control inputs, then advance one physics tick
pub fn tick(session: &mut Session, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();

    if input.reset {
        report.extend(session.reset());
    }
    if let Some(mode) = input.mode {
        report.extend(session.set_mode(mode));
    }
    if input.jump {
        report.extend(session.jump());
    }

    report.extend(physics_tick(session));
    report
}

/// Advance body, obstacles, collisions and score by one fixed step.
///
/// Does nothing unless the session is `Running`.
pub fn physics_tick(session: &mut Session) -> TickReport {
    let mut report = TickReport::default();
    if session.phase != Phase::Running {
        return report;
    }

    session.ticks += 1;

    match step_body(&session.body, &session.config) {
        StepOutcome::Moved(body) => session.body = body,
        StepOutcome::BoundaryViolation => {
            session.end_run(SimEvent::BoundaryViolation);
            report.push(SimEvent::BoundaryViolation);
            return report;
        }
    }

    report.extend(advance_obstacles(session));

    let eval = evaluate(
        &session.body,
        &mut session.obstacles,
        session.score,
        &session.config,
    );
    session.score += eval.points;
    session.best_score = session.best_score.max(session.score);
    report.extend(eval.report);

    if let Some(id) = eval.collision {
        // Collision event is already in the evaluator's report
        session.end_run(SimEvent::Collision { id });
    }

    report
}

/// One autopilot decision step.
///
/// Only acts in autopilot mode. From `Idle` the autopilot counts as the first
/// control input and starts the run.
pub fn autopilot_tick(session: &mut Session) -> TickReport {
    let mut report = TickReport::default();
    if session.mode != ControlMode::Autopilot {
        return report;
    }

    match session.phase {
        Phase::Over => return report,
        Phase::Idle => session.start(&mut report),
        Phase::Running => {}
    }

    let decision = evaluate_policy(&session.body, &session.obstacles, &session.config);
    log::debug!(
        "Autopilot at y={:.1} v={:.1}: {:?} -> {}",
        session.body.pos.y,
        session.body.velocity,
        decision.rule,
        if decision.jump { "jump" } else { "hold" }
    );
    if decision.jump {
        apply_impulse(&mut session.body, &session.config);
        report.push(SimEvent::Jumped {
            source: ImpulseSource::Autopilot,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use glam::Vec2;

    fn running_session() -> Session {
        let mut session = Session::new(SimConfig::default(), 12345);
        session.jump();
        session
    }

    #[test]
    fn test_tick_idle_to_running() {
        let mut session = Session::new(SimConfig::default(), 12345);
        assert_eq!(session.phase(), Phase::Idle);

        // Tick without input - should stay idle and frozen
        let report = tick(&mut session, &TickInput::default());
        assert!(report.events.is_empty());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.ticks(), 0);

        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        let report = tick(&mut session, &input);
        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(report.events[0], SimEvent::Started);
        assert!(report.contains(&SimEvent::Jumped {
            source: ImpulseSource::Manual
        }));
        // Impulse, then one step: y moved by the jump force, gravity applied once
        assert_eq!(session.body().pos.y, 287.5 - 8.0);
        assert_eq!(session.body().velocity, -7.5);
        assert_eq!(session.obstacles().len(), 1);
    }

    #[test]
    fn test_boundary_violation_ends_run() {
        let mut session = running_session();
        let edge = Body {
            pos: Vec2::new(50.0, 574.0),
            velocity: 2.0,
        };
        session.set_body(edge);
        let report = physics_tick(&mut session);
        assert_eq!(session.phase(), Phase::Over);
        assert!(report.contains(&SimEvent::BoundaryViolation));
        assert_eq!(*session.body(), edge);

        // Frozen once over
        assert!(physics_tick(&mut session).events.is_empty());
        assert!(session.jump().events.is_empty());
        assert_eq!(*session.body(), edge);
    }

    #[test]
    fn test_collision_ends_run() {
        let mut session = running_session();
        session.set_body(Body {
            pos: Vec2::new(50.0, 100.0),
            velocity: 0.0,
        });
        let id = session.insert_obstacle(43.0, 200.0);
        let report = physics_tick(&mut session);
        let collisions = report
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::Collision { .. }))
            .count();
        assert_eq!(collisions, 1);
        assert!(report.contains(&SimEvent::Collision { id }));
        assert!(report.ended_run());
        assert_eq!(session.phase(), Phase::Over);

        // Frozen once over, like a boundary violation
        let body = *session.body();
        assert!(physics_tick(&mut session).events.is_empty());
        assert_eq!(*session.body(), body);
    }

    #[test]
    fn test_scoring_once_per_obstacle() {
        let mut session = running_session();
        session.set_body(Body {
            pos: Vec2::new(50.0, 250.0),
            velocity: -0.5,
        });
        // Trailing edge at 52, crosses the body at x=50 after one scroll
        let id = session.insert_obstacle(-8.0, 200.0);

        let first = physics_tick(&mut session);
        assert!(first.contains(&SimEvent::Scored { id, score: 1 }));
        assert_eq!(session.score(), 1);
        assert_eq!(session.best_score(), 1);

        for _ in 0..5 {
            let report = physics_tick(&mut session);
            assert!(!report.events.iter().any(|e| matches!(e, SimEvent::Scored { .. })));
        }
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = running_session();
        for _ in 0..40 {
            physics_tick(&mut session);
        }
        let report = tick(
            &mut session,
            &TickInput {
                reset: true,
                ..Default::default()
            },
        );
        assert!(report.contains(&SimEvent::Reset));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(*session.body(), Body::new(session.config()));
        assert!(session.obstacles().is_empty());
        assert_eq!(session.score(), 0);
        assert_eq!(session.ticks(), 0);
    }

    #[test]
    fn test_autopilot_from_over_resets_and_runs() {
        let mut session = running_session();
        session.set_body(Body {
            pos: Vec2::new(50.0, 1.0),
            velocity: -5.0,
        });
        physics_tick(&mut session);
        assert_eq!(session.phase(), Phase::Over);

        let report = session.set_mode(ControlMode::Autopilot);
        assert_eq!(
            report.events,
            vec![
                SimEvent::ModeChanged {
                    mode: ControlMode::Autopilot
                },
                SimEvent::Reset,
                SimEvent::Started,
            ]
        );
        assert_eq!(session.phase(), Phase::Running);
        assert_eq!(*session.body(), Body::new(session.config()));
    }

    #[test]
    fn test_mode_switch_while_running_keeps_run() {
        let mut session = running_session();
        physics_tick(&mut session);
        let ticks = session.ticks();
        session.toggle_mode();
        assert_eq!(session.mode(), ControlMode::Autopilot);
        assert_eq!(session.phase(), Phase::Running);
        session.toggle_mode();
        assert_eq!(session.mode(), ControlMode::Manual);
        assert_eq!(session.ticks(), ticks);
        // Same mode again is a no-op
        assert!(session.set_mode(ControlMode::Manual).events.is_empty());
    }

    #[test]
    fn test_autopilot_tick_only_in_autopilot_mode() {
        let mut session = Session::new(SimConfig::default(), 1);
        assert!(autopilot_tick(&mut session).events.is_empty());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_autopilot_tick_applies_impulse() {
        let mut session = Session::new(SimConfig::default(), 1);
        session.set_mode(ControlMode::Autopilot);
        // Near the floor the ground rule fires
        session.set_body(Body {
            pos: Vec2::new(50.0, 540.0),
            velocity: 4.0,
        });
        let report = autopilot_tick(&mut session);
        assert!(report.contains(&SimEvent::Jumped {
            source: ImpulseSource::Autopilot
        }));
        assert_eq!(session.body().velocity, session.config().jump_force);
        assert_eq!(session.body().pos.y, 540.0);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs stay identical
        let run = || {
            let mut session = Session::new(SimConfig::default(), 99999);
            session.set_mode(ControlMode::Autopilot);
            for i in 0..900 {
                if i % 3 == 0 {
                    autopilot_tick(&mut session);
                }
                physics_tick(&mut session);
            }
            session.snapshot()
        };
        assert_eq!(run(), run());
    }
}
