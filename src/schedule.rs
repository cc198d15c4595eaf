//! Fixed-rate scheduling of the physics and autopilot ticks
//!
//! The host feeds elapsed wall time into `Scheduler::advance`; each periodic
//! task converts it into whole ticks with its own accumulator. Ticks run one
//! at a time in time order, so neither task ever observes a partially updated
//! session. Cancelling a task simply stops it being rescheduled.

use crate::consts::{AUTOPILOT_HZ, MAX_FRAME_DT, MAX_SUBSTEPS, PHYSICS_HZ};
use crate::sim::{ControlMode, Phase, Session, TickReport, autopilot_tick, physics_tick};

/// A fixed-rate task driven by an elapsed-time accumulator
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    period: f32,
    accumulator: f32,
    armed: bool,
}

impl PeriodicTask {
    pub fn new(rate_hz: f32) -> Self {
        Self {
            period: 1.0 / rate_hz,
            accumulator: 0.0,
            armed: false,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start scheduling; the first tick falls one full period from now
    pub fn arm(&mut self) {
        self.armed = true;
        self.accumulator = 0.0;
    }

    /// Stop scheduling and forget any partial period
    pub fn cancel(&mut self) {
        self.armed = false;
        self.accumulator = 0.0;
    }

    fn feed(&mut self, dt: f32) {
        if self.armed {
            self.accumulator += dt;
        }
    }

    /// How far past its deadline the next tick is (None if not due)
    fn overdue(&self) -> Option<f32> {
        (self.armed && self.accumulator >= self.period).then(|| self.accumulator - self.period)
    }

    fn consume(&mut self) {
        self.accumulator -= self.period;
    }

    /// Drop whole periods left after hitting the substep cap
    fn discard_backlog(&mut self) {
        if self.accumulator >= self.period {
            self.accumulator %= self.period;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    Physics,
    Autopilot,
}

/// Drives one session's physics (60 Hz) and autopilot (20 Hz) ticks
#[derive(Debug, Clone)]
pub struct Scheduler {
    physics: PeriodicTask,
    autopilot: PeriodicTask,
    shut_down: bool,
    /// Physics ticks run so far
    pub physics_ticks: u64,
    /// Autopilot decisions made so far
    pub autopilot_ticks: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(PHYSICS_HZ, AUTOPILOT_HZ)
    }
}

impl Scheduler {
    pub fn new(physics_hz: f32, autopilot_hz: f32) -> Self {
        Self {
            physics: PeriodicTask::new(physics_hz),
            autopilot: PeriodicTask::new(autopilot_hz),
            shut_down: false,
            physics_ticks: 0,
            autopilot_ticks: 0,
        }
    }

    pub fn physics_task(&self) -> &PeriodicTask {
        &self.physics
    }

    pub fn autopilot_task(&self) -> &PeriodicTask {
        &self.autopilot
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Cancel both tasks for good (session teardown)
    pub fn shutdown(&mut self) {
        self.physics.cancel();
        self.autopilot.cancel();
        self.shut_down = true;
        log::debug!("Scheduler shut down");
    }

    /// Arm or cancel each task to match the session's phase and mode.
    ///
    /// Physics runs only while `Running`. The autopilot runs in autopilot
    /// mode until the run is over, so it can start an idle run itself.
    pub fn sync(&mut self, session: &Session) {
        if self.shut_down {
            return;
        }
        let want_physics = session.phase() == Phase::Running;
        let want_autopilot =
            session.mode() == ControlMode::Autopilot && session.phase() != Phase::Over;

        for (task, want, name) in [
            (&mut self.physics, want_physics, "physics"),
            (&mut self.autopilot, want_autopilot, "autopilot"),
        ] {
            if want && !task.is_armed() {
                task.arm();
                log::debug!("Armed {name} task");
            } else if !want && task.is_armed() {
                task.cancel();
                log::debug!("Cancelled {name} task");
            }
        }
    }

    /// Feed `dt` seconds of host time and run every tick that falls due
    pub fn advance(&mut self, session: &mut Session, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        if self.shut_down {
            return report;
        }

        // Clamp long stalls (e.g. a suspended tab) and garbage deltas
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

        self.sync(session);
        self.physics.feed(dt);
        self.autopilot.feed(dt);

        let mut physics_steps = 0;
        let mut autopilot_steps = 0;
        loop {
            let physics_due = self.physics.overdue().filter(|_| physics_steps < MAX_SUBSTEPS);
            let autopilot_due = self
                .autopilot
                .overdue()
                .filter(|_| autopilot_steps < MAX_SUBSTEPS);

            // Most overdue first; a decision at the same instant precedes the step
            let next = match (physics_due, autopilot_due) {
                (None, None) => break,
                (Some(_), None) => Due::Physics,
                (None, Some(_)) => Due::Autopilot,
                (Some(p), Some(a)) if p > a => Due::Physics,
                (Some(_), Some(_)) => Due::Autopilot,
            };

            match next {
                Due::Physics => {
                    self.physics.consume();
                    physics_steps += 1;
                    self.physics_ticks += 1;
                    report.extend(physics_tick(session));
                }
                Due::Autopilot => {
                    self.autopilot.consume();
                    autopilot_steps += 1;
                    self.autopilot_ticks += 1;
                    report.extend(autopilot_tick(session));
                }
            }

            // Phase may have changed; cancellation takes effect before the next tick
            self.sync(session);
        }

        if physics_steps >= MAX_SUBSTEPS {
            self.physics.discard_backlog();
        }
        if autopilot_steps >= MAX_SUBSTEPS {
            self.autopilot.discard_backlog();
        }

        report
    }
}
