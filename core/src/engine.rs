use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cadence of the 3-2-1-GO countdowns and of the counting clock.
pub const TICK: Duration = Duration::from_secs(1);

/// How long the per-round results stay on screen.
pub const RESULTS_WINDOW: Duration = Duration::from_millis(3500);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownTick {
    Three,
    Two,
    One,
    Go,
}

impl CountdownTick {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Two => "2",
            Self::One => "1",
            Self::Go => "GO!",
        }
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Three => Some(Self::Two),
            Self::Two => Some(Self::One),
            Self::One => Some(Self::Go),
            Self::Go => None,
        }
    }
}

/// The engine's stage within a round lifecycle. Exactly one is active, and
/// invalid flag combinations are unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    InitialCountdown { tick: CountdownTick },
    BoxesVisible,
    Counting { seconds_left: u32 },
    ResultsVisible,
    InterRoundCountdown { tick: CountdownTick },
    Complete,
}

impl Phase {
    pub const fn is_counting(self) -> bool {
        matches!(self, Self::Counting { .. })
    }

    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Outputs pushed to the host, in the order they were produced by a single
/// transition. The host must treat payloads as immutable snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// Whether counting input should currently be accepted.
    CountingActive(bool),
    /// A new layout is on the grid.
    BoxesRevealed(Vec<BoxCell>),
    /// The grid is empty again.
    BoxesCleared,
    /// Cumulative scores after a round was scored.
    ScoresPosted(Scores),
    /// The host should zero its tallies for the next round.
    TalliesResetRequested,
    /// The final round's results window elapsed. Fired exactly once.
    GameOver,
}

/// Phase-sequenced state machine driving countdown, box reveal, the counting
/// clock, scoring and round progression.
///
/// The engine never owns a timer. After `start` or any `advance`, the host
/// asks `pending_delay` how long to wait and fires `advance` again when the
/// delay elapses, handing over its live tallies as a read snapshot. Keeping
/// at most one scheduled callback, and cancelling it before scheduling the
/// next, is the host's side of the contract.
#[derive(Clone, Debug)]
pub struct RoundEngine<G = RandomBoxGenerator> {
    schedule: RoundSchedule,
    generator: G,
    round: RoundNumber,
    phase: Phase,
    active_boxes: Vec<BoxCell>,
    targets: TargetCounts,
    scores: Scores,
    last_verdict: Option<RoundVerdict>,
}

impl<G: BoxGenerator> RoundEngine<G> {
    pub fn new(schedule: RoundSchedule, generator: G) -> Self {
        Self {
            schedule,
            generator,
            round: 1,
            phase: Phase::Idle,
            active_boxes: Vec::new(),
            targets: TargetCounts::default(),
            scores: Scores::default(),
            last_verdict: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> RoundNumber {
        self.round
    }

    pub fn round_count(&self) -> RoundNumber {
        self.schedule.round_count()
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn targets(&self) -> TargetCounts {
        self.targets
    }

    pub fn active_boxes(&self) -> &[BoxCell] {
        &self.active_boxes
    }

    pub fn last_verdict(&self) -> Option<RoundVerdict> {
        self.last_verdict
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_complete()
    }

    /// Current 3-2-1-GO value, in either countdown phase.
    pub fn countdown(&self) -> Option<CountdownTick> {
        match self.phase {
            Phase::InitialCountdown { tick } | Phase::InterRoundCountdown { tick } => Some(tick),
            _ => None,
        }
    }

    /// Seconds remaining on the counting clock.
    pub fn seconds_left(&self) -> Option<u32> {
        match self.phase {
            Phase::Counting { seconds_left } => Some(seconds_left),
            _ => None,
        }
    }

    /// Enters the initial countdown. Calling again while the game is running
    /// is a no-op, so a duplicated start signal cannot produce two
    /// concurrent countdown sequences.
    pub fn start(&mut self) -> Vec<EngineEvent> {
        if self.phase != Phase::Idle {
            log::warn!("start ignored, engine already in {:?}", self.phase);
            return Vec::new();
        }

        log::debug!("game started, {} rounds", self.round_count());
        self.phase = Phase::InitialCountdown {
            tick: CountdownTick::Three,
        };
        Vec::new()
    }

    /// Fires the pending scheduled operation. `tallies` is the host's live
    /// count pair, read synchronously at this instant; it is only consulted
    /// when the counting clock expires.
    pub fn advance(&mut self, tallies: Tallies) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        match self.phase {
            Phase::Idle | Phase::Complete => {
                log::warn!("advance ignored, no operation pending in {:?}", self.phase);
            }
            Phase::InitialCountdown { tick } => match tick.next() {
                Some(tick) => self.phase = Phase::InitialCountdown { tick },
                None => self.reveal_boxes(&mut events),
            },
            Phase::InterRoundCountdown { tick } => match tick.next() {
                Some(tick) => self.phase = Phase::InterRoundCountdown { tick },
                None => {
                    self.round += 1;
                    self.reveal_boxes(&mut events);
                }
            },
            Phase::BoxesVisible => {
                self.phase = Phase::Counting {
                    seconds_left: self.schedule.duration_secs(self.round),
                };
                events.push(EngineEvent::CountingActive(true));
            }
            Phase::Counting { seconds_left } if seconds_left > 1 => {
                self.phase = Phase::Counting {
                    seconds_left: seconds_left - 1,
                };
            }
            Phase::Counting { .. } => self.score_round(tallies, &mut events),
            Phase::ResultsVisible => {
                if self.round < self.round_count() {
                    self.last_verdict = None;
                    self.phase = Phase::InterRoundCountdown {
                        tick: CountdownTick::Three,
                    };
                    events.push(EngineEvent::TalliesResetRequested);
                } else {
                    self.phase = Phase::Complete;
                    log::debug!("all rounds complete, final scores {:?}", self.scores);
                    events.push(EngineEvent::GameOver);
                }
            }
        }

        events
    }

    /// Delay until the next scheduled operation, or `None` when the engine
    /// holds nothing pending (before `start` and after `Complete`).
    pub fn pending_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle | Phase::Complete => None,
            Phase::InitialCountdown { .. }
            | Phase::InterRoundCountdown { .. }
            | Phase::Counting { .. } => Some(TICK),
            // minimal reveal window: still flows through the timer slot
            Phase::BoxesVisible => Some(Duration::ZERO),
            Phase::ResultsVisible => Some(RESULTS_WINDOW),
        }
    }

    fn reveal_boxes(&mut self, events: &mut Vec<EngineEvent>) {
        let layout = self.generator.generate(self.schedule.box_budget(self.round));
        log::debug!(
            "round {}: {} boxes revealed",
            self.round,
            layout.boxes.len()
        );

        self.targets = layout.targets;
        self.active_boxes = layout.boxes;
        self.phase = Phase::BoxesVisible;
        events.push(EngineEvent::BoxesRevealed(self.active_boxes.clone()));
    }

    fn score_round(&mut self, tallies: Tallies, events: &mut Vec<EngineEvent>) {
        let verdict = RoundVerdict {
            left_correct: tallies.left == self.targets.left,
            right_correct: tallies.right == self.targets.right,
        };
        if verdict.left_correct {
            self.scores.left += 1;
        }
        if verdict.right_correct {
            self.scores.right += 1;
        }
        log::debug!(
            "round {} scored: tallies {:?}, targets {:?}, scores {:?}",
            self.round,
            tallies,
            self.targets,
            self.scores
        );

        self.last_verdict = Some(verdict);
        self.active_boxes.clear();
        self.phase = Phase::ResultsVisible;
        events.push(EngineEvent::CountingActive(false));
        events.push(EngineEvent::BoxesCleared);
        events.push(EngineEvent::ScoresPosted(self.scores));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always lays out `left + right` boxes from the top-left corner.
    struct FixedGenerator {
        left: u32,
        right: u32,
    }

    impl BoxGenerator for FixedGenerator {
        fn generate(&mut self, budget: u32) -> BoxLayout {
            assert!(self.left <= budget && self.right <= budget);
            let boxes = (0..self.left + self.right)
                .map(|index| BoxCell {
                    index: index as CellIndex,
                    side: if index < self.left {
                        Side::Left
                    } else {
                        Side::Right
                    },
                })
                .collect();
            BoxLayout {
                boxes,
                targets: TargetCounts {
                    left: self.left,
                    right: self.right,
                },
            }
        }
    }

    fn engine(left: u32, right: u32) -> RoundEngine<FixedGenerator> {
        RoundEngine::new(RoundSchedule::standard(), FixedGenerator { left, right })
    }

    /// Drives through 3-2-1-GO and the reveal; leaves the engine in Counting.
    fn run_to_counting(engine: &mut RoundEngine<FixedGenerator>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(engine.advance(Tallies::default()));
        }
        assert!(engine.phase().is_counting());
        events
    }

    /// Burns the counting clock and fires the scoring transition with the
    /// given tallies; leaves the engine in ResultsVisible.
    fn run_counting_out(engine: &mut RoundEngine<FixedGenerator>, tallies: Tallies) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Phase::Counting { seconds_left } = engine.phase() {
            let snapshot = if seconds_left == 1 {
                tallies
            } else {
                Tallies::default()
            };
            events.extend(engine.advance(snapshot));
        }
        assert_eq!(engine.phase(), Phase::ResultsVisible);
        events
    }

    #[test]
    fn initial_countdown_runs_three_two_one_go_then_reveals() {
        let mut engine = engine(9, 3);
        engine.start();
        assert_eq!(engine.countdown(), Some(CountdownTick::Three));

        assert!(engine.advance(Tallies::default()).is_empty());
        assert_eq!(engine.countdown(), Some(CountdownTick::Two));
        assert!(engine.advance(Tallies::default()).is_empty());
        assert_eq!(engine.countdown(), Some(CountdownTick::One));
        assert!(engine.advance(Tallies::default()).is_empty());
        assert_eq!(engine.countdown(), Some(CountdownTick::Go));

        // fourth second: GO elapses and round 1's layout appears
        let events = engine.advance(Tallies::default());
        assert_eq!(engine.phase(), Phase::BoxesVisible);
        assert_eq!(
            events,
            vec![EngineEvent::BoxesRevealed(engine.active_boxes().to_vec())]
        );
        assert_eq!(engine.active_boxes().len() as u32, engine.targets().total());
    }

    #[test]
    fn start_twice_does_not_restart_the_countdown() {
        let mut engine = engine(9, 3);
        engine.start();
        engine.advance(Tallies::default());
        assert_eq!(engine.countdown(), Some(CountdownTick::Two));

        assert!(engine.start().is_empty());
        assert_eq!(engine.countdown(), Some(CountdownTick::Two));
    }

    #[test]
    fn counting_starts_with_round_duration_and_gates_input() {
        let mut engine = engine(9, 3);
        engine.start();
        for _ in 0..4 {
            engine.advance(Tallies::default());
        }

        let events = engine.advance(Tallies::default());
        assert_eq!(events, vec![EngineEvent::CountingActive(true)]);
        assert_eq!(engine.seconds_left(), Some(5));
    }

    #[test]
    fn exact_match_scores_both_sides() {
        let mut engine = engine(9, 3);
        engine.start();
        run_to_counting(&mut engine);

        let events = run_counting_out(&mut engine, Tallies { left: 9, right: 3 });
        assert_eq!(
            events,
            vec![
                EngineEvent::CountingActive(false),
                EngineEvent::BoxesCleared,
                EngineEvent::ScoresPosted(Scores { left: 1, right: 1 }),
            ]
        );
        assert_eq!(
            engine.last_verdict(),
            Some(RoundVerdict {
                left_correct: true,
                right_correct: true,
            })
        );
        assert!(engine.active_boxes().is_empty());
    }

    #[test]
    fn over_and_undercounting_score_neither_side() {
        let mut engine = engine(9, 3);
        engine.start();
        run_to_counting(&mut engine);

        run_counting_out(&mut engine, Tallies { left: 10, right: 2 });
        assert_eq!(engine.scores(), Scores::default());
        assert_eq!(
            engine.last_verdict(),
            Some(RoundVerdict {
                left_correct: false,
                right_correct: false,
            })
        );
    }

    #[test]
    fn one_side_can_score_alone() {
        let mut engine = engine(9, 3);
        engine.start();
        run_to_counting(&mut engine);

        run_counting_out(&mut engine, Tallies { left: 9, right: 7 });
        assert_eq!(engine.scores(), Scores { left: 1, right: 0 });
    }

    #[test]
    fn inter_round_countdown_requests_a_tally_reset() {
        let mut engine = engine(9, 3);
        engine.start();
        run_to_counting(&mut engine);
        run_counting_out(&mut engine, Tallies::default());

        let events = engine.advance(Tallies::default());
        assert_eq!(events, vec![EngineEvent::TalliesResetRequested]);
        assert_eq!(engine.countdown(), Some(CountdownTick::Three));
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.last_verdict(), None);

        // round advances when the inter-round GO elapses
        for _ in 0..4 {
            engine.advance(Tallies::default());
        }
        assert_eq!(engine.round(), 2);
        assert_eq!(engine.phase(), Phase::BoxesVisible);
    }

    #[test]
    fn full_game_fires_game_over_exactly_once() {
        let mut engine = engine(8, 8);
        let mut events = engine.start();
        // perfect play: hand the engine its own targets at every expiry
        while engine.pending_delay().is_some() {
            let targets = engine.targets();
            events.extend(engine.advance(Tallies {
                left: targets.left,
                right: targets.right,
            }));
        }

        assert!(engine.is_complete());
        let game_overs = events
            .iter()
            .filter(|event| matches!(event, EngineEvent::GameOver))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(engine.scores(), Scores { left: 7, right: 7 });

        let resets = events
            .iter()
            .filter(|event| matches!(event, EngineEvent::TalliesResetRequested))
            .count();
        assert_eq!(resets, 6);
    }

    #[test]
    fn scores_never_decrease_and_never_exceed_round_count() {
        let mut engine = engine(8, 8);
        engine.start();
        let mut prev = Scores::default();
        while engine.pending_delay().is_some() {
            let targets = engine.targets();
            // left always right, right always wrong
            for event in engine.advance(Tallies {
                left: targets.left,
                right: targets.right + 1,
            }) {
                if let EngineEvent::ScoresPosted(scores) = event {
                    assert!(scores.left >= prev.left && scores.right >= prev.right);
                    assert!(scores.left <= engine.round_count());
                    prev = scores;
                }
            }
        }
        assert_eq!(prev, Scores { left: 7, right: 0 });
    }

    #[test]
    fn counting_active_is_bracketed_by_reveal_and_results() {
        let mut engine = engine(8, 8);
        engine.start();
        let mut active = false;
        while engine.pending_delay().is_some() {
            let phase_before = engine.phase();
            for event in engine.advance(Tallies::default()) {
                if let EngineEvent::CountingActive(value) = event {
                    match value {
                        true => assert_eq!(phase_before, Phase::BoxesVisible),
                        false => assert!(phase_before.is_counting()),
                    }
                    active = value;
                }
            }
            // input is never accepted during countdowns or results
            if engine.countdown().is_some() || engine.phase() == Phase::ResultsVisible {
                assert!(!active);
            }
        }
    }

    #[test]
    fn complete_engine_schedules_nothing_and_ignores_advance() {
        let mut engine = engine(8, 8);
        engine.start();
        while engine.pending_delay().is_some() {
            engine.advance(Tallies::default());
        }

        assert_eq!(engine.pending_delay(), None);
        let snapshot = engine.phase();
        assert!(engine.advance(Tallies { left: 1, right: 1 }).is_empty());
        assert_eq!(engine.phase(), snapshot);
        assert_eq!(engine.scores(), Scores::default());
    }

    #[test]
    fn advance_before_start_is_a_no_op() {
        let mut engine = engine(9, 3);
        assert!(engine.advance(Tallies::default()).is_empty());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn random_generator_round_one_targets_fall_in_documented_window() {
        let mut engine = RoundEngine::new(RoundSchedule::standard(), RandomBoxGenerator::new(1));
        engine.start();
        for _ in 0..4 {
            engine.advance(Tallies::default());
        }

        // round 1 budget is 12, so each side draws from [7, 12]
        let targets = engine.targets();
        assert!((7..=12).contains(&targets.left));
        assert!((7..=12).contains(&targets.right));
        assert_eq!(engine.active_boxes().len() as u32, targets.total());
    }
}
