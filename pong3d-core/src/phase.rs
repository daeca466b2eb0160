/// Frame-loop phases and the table-driven director that advances them
use crate::config::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Orbiting cube cluster
    Cluster,
    /// Ball bouncing between the paddles
    Rally,
    /// Ball escapes past a paddle
    Breakout,
    /// Terminal; front ends stop their loop
    Finished,
}

/// (from, to) pairs. A phase moves on once its time-in-phase reaches the
/// duration the timeline gives it.
const TRANSITIONS: [(Phase, Phase); 3] = [
    (Phase::Cluster, Phase::Rally),
    (Phase::Rally, Phase::Breakout),
    (Phase::Breakout, Phase::Finished),
];

impl Timeline {
    /// Time spent in `phase` before it transitions. `None` for the
    /// terminal phase.
    pub fn duration(&self, phase: Phase) -> Option<f32> {
        match phase {
            Phase::Cluster => Some(self.cluster_seconds),
            Phase::Rally => Some(self.rally_seconds),
            Phase::Breakout => Some(self.breakout_seconds),
            Phase::Finished => None,
        }
    }
}

/// Next phase if `phase` has run for `elapsed` seconds.
pub fn transition(phase: Phase, elapsed: f32, timeline: &Timeline) -> Option<Phase> {
    let (_, next) = TRANSITIONS.iter().find(|(from, _)| *from == phase)?;
    let limit = timeline.duration(phase)?;
    (elapsed >= limit).then_some(*next)
}

/// Holds the active phase and when it started.
#[derive(Debug, Clone)]
pub struct Director {
    timeline: Timeline,
    phase: Phase,
    started_at: f32,
}

impl Director {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            phase: Phase::Cluster,
            started_at: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Apply every transition that holds at `time` and return the active
    /// phase with the time spent in it.
    ///
    /// Phase start times advance by the nominal duration rather than to
    /// `time`, so a long frame gap skips phases without drifting the
    /// timeline.
    pub fn advance(&mut self, time: f32) -> (Phase, f32) {
        while let Some(next) = transition(self.phase, time - self.started_at, &self.timeline) {
            let duration = self.timeline.duration(self.phase).unwrap_or(0.0).max(0.0);
            log::info!("phase {:?} -> {:?} at {:.2}s", self.phase, next, time);
            self.started_at += duration;
            self.phase = next;
        }
        (self.phase, (time - self.started_at).max(0.0))
    }
}
