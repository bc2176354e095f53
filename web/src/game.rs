use crate::utils::js_random_seed;
use clap::Args;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use kazoete_core as game;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlayerKey {
    IncrementLeft,
    DecrementLeft,
    IncrementRight,
    DecrementRight,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    StartClicked,
    BeginCounting,
    EngineTick,
    Key(PlayerKey),
    PlayAgain,
}

/// Host-owned view state fed by engine events. The tallies live here, never
/// in the engine; the engine only gets them as a snapshot on every tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct HostState {
    pub tallies: game::Tallies,
    pub counting_active: bool,
    pub active_boxes: Vec<game::BoxCell>,
    pub scores: game::Scores,
    pub game_over: bool,
}

impl HostState {
    /// Applies a counting key. Input is only accepted while the engine says
    /// the counting window is open; decrements clamp at zero.
    fn apply_key(&mut self, key: PlayerKey) -> bool {
        use PlayerKey::*;

        if !self.counting_active || self.game_over {
            return false;
        }

        match key {
            IncrementLeft => {
                self.tallies.left += 1;
                true
            }
            IncrementRight => {
                self.tallies.right += 1;
                true
            }
            DecrementLeft if self.tallies.left > 0 => {
                self.tallies.left -= 1;
                true
            }
            DecrementRight if self.tallies.right > 0 => {
                self.tallies.right -= 1;
                true
            }
            DecrementLeft | DecrementRight => false,
        }
    }

    fn apply_event(&mut self, event: game::EngineEvent) {
        use game::EngineEvent::*;

        match event {
            CountingActive(active) => self.counting_active = active,
            BoxesRevealed(boxes) => self.active_boxes = boxes,
            BoxesCleared => self.active_boxes.clear(),
            ScoresPosted(scores) => self.scores = scores,
            TalliesResetRequested => self.tallies = game::Tallies::default(),
            GameOver => self.game_over = true,
        }
    }

    fn apply_events(&mut self, events: Vec<game::EngineEvent>) -> bool {
        let updated = !events.is_empty();
        for event in events {
            log::debug!("engine event: {:?}", event);
            self.apply_event(event);
        }
        updated
    }
}

/// Final standing derived from the cumulative scores.
pub(crate) fn winner(scores: game::Scores) -> (&'static str, &'static str) {
    use core::cmp::Ordering::*;

    match scores.left.cmp(&scores.right) {
        Greater => ("Left Player wins!", "left"),
        Less => ("Right Player wins!", "right"),
        Equal => ("It's a draw!", "draw"),
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    #[prop_or_default]
    pub seed: Option<u64>,
}

pub(crate) struct GameView {
    engine: game::RoundEngine,
    host: HostState,
    show_menu: bool,
    started: bool,
    pending_op: Option<Timeout>,
    _keydown: EventListener,
}

impl GameView {
    fn new_engine(seed: u64) -> game::RoundEngine {
        log::debug!("engine seed: {}", seed);
        game::RoundEngine::new(
            game::RoundSchedule::standard(),
            game::RandomBoxGenerator::new(seed),
        )
    }

    /// Replaces the single pending-operation slot from the engine's schedule.
    /// Dropping the previous `Timeout` cancels it, so at most one engine
    /// callback is ever live.
    fn schedule_next(&mut self, ctx: &Context<Self>) {
        self.pending_op = self.engine.pending_delay().map(|delay| {
            let link = ctx.link().clone();
            Timeout::new(delay.as_millis() as u32, move || {
                link.send_message(Msg::EngineTick)
            })
        });
    }

    fn create_key_listener(ctx: &Context<Self>) -> EventListener {
        use PlayerKey::*;

        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::window(), "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = match event.key().as_str() {
                "a" | "A" => IncrementLeft,
                "s" | "S" => DecrementLeft,
                "ArrowRight" => IncrementRight,
                "ArrowLeft" => DecrementRight,
                _ => return,
            };
            log::trace!("key: {:?}", key);
            link.send_message(Msg::Key(key));
        })
    }

    fn view_menu(&self, ctx: &Context<Self>) -> Html {
        let cb_start = ctx.link().callback(|_| Msg::StartClicked);

        html! {
            <div class="menu">
                <h1>{"Welcome to Box Game"}</h1>
                <p>{"Click Start to begin the game."}</p>
                <button class="start" onclick={cb_start}>{"Start"}</button>
            </div>
        }
    }

    fn view_game_over(&self, ctx: &Context<Self>) -> Html {
        let scores = self.host.scores;
        let (label, class) = winner(scores);
        let cb_again = ctx.link().callback(|_| Msg::PlayAgain);

        html! {
            <div class="final-results">
                <h1>{"Game Over!"}</h1>
                <h2 class={classes!(class)}>{ label }</h2>
                <p class="left">{ format!("Left Player: {} points", scores.left) }</p>
                <p class="right">{ format!("Right Player: {} points", scores.right) }</p>
                <button class="start" onclick={cb_again}>{"Play Again"}</button>
            </div>
        }
    }

    fn view_round_status(&self) -> Html {
        let engine = &self.engine;

        html! {
            <div class="round-status">
                <h2>{ format!("Round: {} / {}", engine.round(), engine.round_count()) }</h2>
                <div class="scores">
                    <span class="left">{ format!("Left: {}", self.host.scores.left) }</span>
                    { " | " }
                    <span class="right">{ format!("Right: {}", self.host.scores.right) }</span>
                </div>
                {
                    if let Some(tick) = engine.countdown() {
                        html! { <h1 class="countdown">{ tick.label() }</h1> }
                    } else if let Some(verdict) = engine.last_verdict() {
                        self.view_round_results(verdict)
                    } else if let Some(seconds) = engine.seconds_left() {
                        html! {
                            <div class="clock">
                                <h3>{ format!("Time left: {}s", seconds) }</h3>
                                <p>{ format!("Left: {} | Right: {}", self.host.tallies.left, self.host.tallies.right) }</p>
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        }
    }

    fn view_round_results(&self, verdict: game::RoundVerdict) -> Html {
        let targets = self.engine.targets();
        let mark = |correct: bool| if correct { "✓" } else { "✗" };

        html! {
            <div class="results">
                <h3>{"Round results"}</h3>
                <p>{ format!("Left: {} {} (correct: {})", self.host.tallies.left, mark(verdict.left_correct), targets.left) }</p>
                <p>{ format!("Right: {} {} (correct: {})", self.host.tallies.right, mark(verdict.right_correct), targets.right) }</p>
            </div>
        }
    }

    fn view_grid(&self) -> Html {
        html! {
            <table class="grid">
                {
                    for (0..game::GRID_ROWS).map(|row| html! {
                        <tr>
                            {
                                for (0..game::GRID_COLS).map(|col| {
                                    let index = row * game::GRID_COLS + col;
                                    let side = self
                                        .host
                                        .active_boxes
                                        .iter()
                                        .find(|cell| cell.index == index)
                                        .map(|cell| cell.side);
                                    let class = classes!("cell", side.map(game::Side::as_str));
                                    html! { <td {class}/> }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }

    fn view_board(&self, ctx: &Context<Self>) -> Html {
        let cb_begin = ctx.link().callback(|_| Msg::BeginCounting);

        html! {
            <>
                <div class="middle">
                    <div class="hand left">
                        <p class="counter">{ self.host.tallies.left }</p>
                        <h3>{"Press \"A\""}</h3>
                    </div>
                    { self.view_grid() }
                    <div class="hand right">
                        <p class="counter">{ self.host.tallies.right }</p>
                        <h3>{"Press \"→\""}</h3>
                    </div>
                </div>
                if !self.started {
                    <>
                        <div class="welcome">
                            <h2>{"Press \"A\" or \"→\" to count the boxes!"}</h2>
                            <h3>{"Press \"S\" or \"←\" to decrement the count!"}</h3>
                        </div>
                        <button class="start" onclick={cb_begin}>{"Start Counting"}</button>
                    </>
                }
            </>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);

        Self {
            engine: Self::new_engine(seed),
            host: HostState::default(),
            show_menu: true,
            started: false,
            pending_op: None,
            _keydown: Self::create_key_listener(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            StartClicked => {
                self.show_menu = false;
                true
            }
            BeginCounting => {
                if self.started {
                    return false;
                }
                self.started = true;
                let events = self.engine.start();
                self.host.apply_events(events);
                self.schedule_next(ctx);
                true
            }
            EngineTick => {
                let events = self.engine.advance(self.host.tallies);
                self.host.apply_events(events);
                self.schedule_next(ctx);
                true
            }
            Key(key) => self.host.apply_key(key),
            PlayAgain => {
                // dropping the slot cancels anything still scheduled
                self.pending_op = None;
                self.engine = Self::new_engine(js_random_seed());
                self.host = HostState::default();
                self.started = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if self.show_menu {
            return self.view_menu(ctx);
        }
        if self.host.game_over {
            return self.view_game_over(ctx);
        }

        html! {
            <div class="kazoete">
                <div class="top-bar">
                    if self.started {
                        { self.view_round_status() }
                    }
                </div>
                { self.view_board(ctx) }
            </div>
        }
    }
}
