// src/intents.rs - Per-mode gesture bindings, cooldowns and scroll steps
//
// Turns debounced gestures into abstract intents for an OS dispatch layer.
// Nothing here touches the OS.
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::gestures::{ControlMode, Gesture};
use crate::state::GestureState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SwitchMode,
    MoveCursor,
    LeftClick,
    RightClick,
    DoubleClick,
    MiddleClick,
    Scroll,
    Maximize,
    Minimize,
    CloseWindow,
    SwitchWindow,
    ShowDesktop,
    Screenshot,
    PlayPause,
    PrevTrack,
    VolumeUp,
    VolumeDown,
    Mute,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SwitchMode => "switch_mode",
            Intent::MoveCursor => "move_cursor",
            Intent::LeftClick => "left_click",
            Intent::RightClick => "right_click",
            Intent::DoubleClick => "double_click",
            Intent::MiddleClick => "middle_click",
            Intent::Scroll => "scroll",
            Intent::Maximize => "maximize",
            Intent::Minimize => "minimize",
            Intent::CloseWindow => "close_window",
            Intent::SwitchWindow => "switch_window",
            Intent::ShowDesktop => "show_desktop",
            Intent::Screenshot => "screenshot",
            Intent::PlayPause => "play_pause",
            Intent::PrevTrack => "prev_track",
            Intent::VolumeUp => "volume_up",
            Intent::VolumeDown => "volume_down",
            Intent::Mute => "mute",
        }
    }

    /// Window and media intents are suppressed right after a mode switch so
    /// the hand leaving the OK sign does not fire the new mode's bindings.
    pub fn quiet_after_mode_switch(&self) -> bool {
        matches!(
            self,
            Intent::Maximize
                | Intent::Minimize
                | Intent::CloseWindow
                | Intent::SwitchWindow
                | Intent::ShowDesktop
                | Intent::Screenshot
                | Intent::PlayPause
                | Intent::PrevTrack
                | Intent::VolumeUp
                | Intent::VolumeDown
                | Intent::Mute
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollStep {
    pub direction: ScrollDirection,
    /// 1..=5 notches.
    pub speed: u8,
}

impl ScrollStep {
    /// Signed notches, positive scrolls up.
    pub fn notches(&self) -> i32 {
        match self.direction {
            ScrollDirection::Up => self.speed as i32,
            ScrollDirection::Down => -(self.speed as i32),
        }
    }
}

const SCROLL_UP_BELOW: f64 = 25.0;
const SCROLL_DOWN_ABOVE: f64 = 65.0;
const SCROLL_MAX_SPEED: u8 = 5;

/// Maps a V-sign tilt (degrees from vertical) to a scroll step. Near vertical
/// scrolls up, near horizontal scrolls down, the band between is neutral.
pub fn scroll_step(angle: f64) -> Option<ScrollStep> {
    let a = angle.abs();
    let (direction, over) = if a < SCROLL_UP_BELOW {
        (ScrollDirection::Up, SCROLL_UP_BELOW - a)
    } else if a > SCROLL_DOWN_ABOVE {
        (ScrollDirection::Down, a - SCROLL_DOWN_ABOVE)
    } else {
        return None;
    };
    let speed = ((over / 5.0).floor() as u8).saturating_add(1).min(SCROLL_MAX_SPEED);
    Some(ScrollStep { direction, speed })
}

/// How long a gesture must be established before its binding fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    Ready { frames: u32, seconds: f64 },
    Held(f64),
}

impl Gate {
    pub fn is_open(&self, state: &GestureState, now: f64) -> bool {
        match *self {
            Gate::Ready { frames, seconds } => state.is_ready(frames, seconds, now),
            Gate::Held(seconds) => state.is_held_for(seconds, now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub gesture: Gesture,
    pub gate: Gate,
    pub intent: Intent,
}

const fn ready(gesture: Gesture, frames: u32, seconds: f64, intent: Intent) -> Binding {
    Binding {
        gesture,
        gate: Gate::Ready { frames, seconds },
        intent,
    }
}

const fn held(gesture: Gesture, seconds: f64, intent: Intent) -> Binding {
    Binding {
        gesture,
        gate: Gate::Held(seconds),
        intent,
    }
}

pub const MODE_SWITCH_GATE: Gate = Gate::Ready { frames: 5, seconds: 0.3 };
pub const L_CLICK_GATE: Gate = Gate::Ready { frames: 2, seconds: 0.8 };

const CURSOR_BINDINGS: &[Binding] = &[
    ready(Gesture::PinchMiddle, 3, 0.35, Intent::LeftClick),
    ready(Gesture::RockSign, 3, 0.82, Intent::RightClick),
    ready(Gesture::CallMe, 5, 0.25, Intent::DoubleClick),
    held(Gesture::PeaceSign, 0.1, Intent::Scroll),
    ready(Gesture::RingCurl, 3, 0.2, Intent::MiddleClick),
];

const SCROLL_BINDINGS: &[Binding] = &[held(Gesture::PeaceSign, 0.1, Intent::Scroll)];

const WINDOW_BINDINGS: &[Binding] = &[
    ready(Gesture::OpenPalm, 5, 1.5, Intent::Maximize),
    ready(Gesture::Grab, 5, 1.5, Intent::Minimize),
    ready(Gesture::RockSign, 3, 0.62, Intent::SwitchWindow),
    ready(Gesture::PinchMiddle, 3, 0.52, Intent::ShowDesktop),
    ready(Gesture::CallMe, 8, 0.5, Intent::CloseWindow),
    ready(Gesture::PeaceSign, 5, 0.83, Intent::Screenshot),
];

const MEDIA_BINDINGS: &[Binding] = &[
    ready(Gesture::OpenPalm, 3, 0.2, Intent::PlayPause),
    ready(Gesture::PeaceSign, 3, 0.2, Intent::PrevTrack),
    held(Gesture::PinchMiddle, 0.1, Intent::VolumeUp),
    held(Gesture::RockSign, 0.1, Intent::VolumeDown),
    ready(Gesture::Grab, 5, 0.3, Intent::Mute),
];

/// Mode-specific bindings. Cursor movement and the mode switch apply in every
/// mode and are not listed here.
pub fn bindings(mode: ControlMode) -> &'static [Binding] {
    match mode {
        ControlMode::Cursor => CURSOR_BINDINGS,
        ControlMode::Scroll => SCROLL_BINDINGS,
        ControlMode::Window => WINDOW_BINDINGS,
        ControlMode::Media => MEDIA_BINDINGS,
    }
}

/// Minimum interval between two firings of the same intent.
#[derive(Debug, Clone)]
pub struct Cooldowns {
    intervals: HashMap<Intent, f64>,
    last_fired: HashMap<Intent, f64>,
    mode_switch_quiet: f64,
    last_mode_switch: Option<f64>,
}

impl Default for Cooldowns {
    fn default() -> Self {
        let intervals = HashMap::from([
            (Intent::SwitchMode, 0.8),
            (Intent::LeftClick, 0.5),
            (Intent::RightClick, 0.7),
            (Intent::DoubleClick, 0.6),
            (Intent::MiddleClick, 0.5),
            (Intent::Maximize, 0.8),
            (Intent::Minimize, 0.8),
            (Intent::CloseWindow, 1.0),
            (Intent::SwitchWindow, 0.5),
            (Intent::ShowDesktop, 1.0),
            (Intent::Screenshot, 1.5),
            (Intent::PlayPause, 0.5),
            (Intent::PrevTrack, 0.5),
            (Intent::VolumeUp, 0.1),
            (Intent::VolumeDown, 0.1),
            (Intent::Mute, 0.5),
        ]);
        Self {
            intervals,
            last_fired: HashMap::new(),
            mode_switch_quiet: 1.0,
            last_mode_switch: None,
        }
    }
}

impl Cooldowns {
    pub fn interval(&self, intent: Intent) -> Option<f64> {
        self.intervals.get(&intent).copied()
    }

    pub fn can_fire(&self, intent: Intent, now: f64) -> bool {
        let cooled = match (self.interval(intent), self.last_fired.get(&intent)) {
            (Some(interval), Some(last)) => now - last >= interval,
            _ => true,
        };
        cooled && !(intent.quiet_after_mode_switch() && self.in_mode_switch_quiet(now))
    }

    pub fn in_mode_switch_quiet(&self, now: f64) -> bool {
        self.last_mode_switch
            .is_some_and(|at| now - at < self.mode_switch_quiet)
    }

    pub fn record(&mut self, intent: Intent, now: f64) {
        self.last_fired.insert(intent, now);
        if intent == Intent::SwitchMode {
            self.last_mode_switch = Some(now);
        }
    }

    pub fn clear(&mut self) {
        self.last_fired.clear();
        self.last_mode_switch = None;
    }
}

/// One intent produced for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntentEvent {
    pub intent: Intent,
    /// Mode in effect after the event; for a mode switch, the new mode.
    pub mode: ControlMode,
    pub scroll: Option<ScrollStep>,
    pub timestamp: f64,
}

/// Tracks the control mode and turns each frame's gesture state into intents.
#[derive(Debug, Clone, Default)]
pub struct IntentResolver {
    mode: ControlMode,
    cooldowns: Cooldowns,
}

impl IntentResolver {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            cooldowns: Cooldowns::default(),
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    /// `peace_angle` is the V-sign tilt for this frame, when a hand is present.
    pub fn resolve(&mut self, state: &GestureState, peace_angle: Option<f64>, now: f64) -> Vec<IntentEvent> {
        let mut events = Vec::new();
        let gesture = state.gesture;

        if gesture == Gesture::OkSign {
            if MODE_SWITCH_GATE.is_open(state, now) && self.cooldowns.can_fire(Intent::SwitchMode, now) {
                self.mode = self.mode.next();
                self.cooldowns.record(Intent::SwitchMode, now);
                info!("Control mode: {}", self.mode);
                events.push(self.event(Intent::SwitchMode, None, now));
            }
            return events;
        }
        if gesture == Gesture::None {
            return events;
        }

        if matches!(gesture, Gesture::IndexUp | Gesture::LSign) {
            events.push(self.event(Intent::MoveCursor, None, now));
            if gesture == Gesture::LSign && L_CLICK_GATE.is_open(state, now) {
                self.fire(Intent::LeftClick, now, &mut events);
            }
        }

        let binding = bindings(self.mode)
            .iter()
            .find(|b| b.gesture == gesture && b.gate.is_open(state, now));
        if let Some(binding) = binding {
            if binding.intent == Intent::Scroll {
                if let Some(step) = peace_angle.and_then(scroll_step) {
                    events.push(self.event(Intent::Scroll, Some(step), now));
                }
            } else {
                self.fire(binding.intent, now, &mut events);
            }
        }

        events
    }

    fn fire(&mut self, intent: Intent, now: f64, events: &mut Vec<IntentEvent>) {
        if !self.cooldowns.can_fire(intent, now) {
            return;
        }
        self.cooldowns.record(intent, now);
        debug!("Intent {} in {} mode", intent.as_str(), self.mode);
        events.push(self.event(intent, None, now));
    }

    fn event(&self, intent: Intent, scroll: Option<ScrollStep>, now: f64) -> IntentEvent {
        IntentEvent {
            intent,
            mode: self.mode,
            scroll,
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(gesture: Gesture, frames: u32, start: f64) -> GestureState {
        GestureState {
            gesture,
            start_time: start,
            stable_frames: frames,
        }
    }

    fn intents(events: &[IntentEvent]) -> Vec<Intent> {
        events.iter().map(|e| e.intent).collect()
    }

    #[test]
    fn scroll_steps_from_angle() {
        assert_eq!(
            scroll_step(0.0),
            Some(ScrollStep { direction: ScrollDirection::Up, speed: 5 })
        );
        assert_eq!(
            scroll_step(-22.0),
            Some(ScrollStep { direction: ScrollDirection::Up, speed: 1 })
        );
        assert_eq!(scroll_step(45.0), None);
        assert_eq!(scroll_step(25.0), None);
        assert_eq!(scroll_step(65.0), None);
        assert_eq!(
            scroll_step(-71.0),
            Some(ScrollStep { direction: ScrollDirection::Down, speed: 2 })
        );
        assert_eq!(scroll_step(90.0).map(|s| s.notches()), Some(-5));
    }

    #[test]
    fn ok_sign_cycles_mode_with_cooldown() {
        let mut resolver = IntentResolver::default();
        assert!(resolver.resolve(&run(Gesture::OkSign, 4, 0.0), None, 1.0).is_empty());

        let events = resolver.resolve(&run(Gesture::OkSign, 5, 0.0), None, 1.0);
        assert_eq!(intents(&events), vec![Intent::SwitchMode]);
        assert_eq!(events[0].mode, ControlMode::Scroll);

        // Still holding: blocked until the cooldown lapses.
        assert!(resolver.resolve(&run(Gesture::OkSign, 10, 0.0), None, 1.5).is_empty());
        resolver.resolve(&run(Gesture::OkSign, 20, 0.0), None, 1.9);
        assert_eq!(resolver.mode(), ControlMode::Window);
    }

    #[test]
    fn index_up_moves_cursor_in_every_mode() {
        for mode in ControlMode::ALL {
            let mut resolver = IntentResolver::new(mode);
            let events = resolver.resolve(&run(Gesture::IndexUp, 1, 0.0), None, 0.0);
            assert_eq!(intents(&events), vec![Intent::MoveCursor]);
        }
    }

    #[test]
    fn l_sign_moves_and_clicks_once_ready() {
        let mut resolver = IntentResolver::default();
        let early = resolver.resolve(&run(Gesture::LSign, 2, 0.0), None, 0.5);
        assert_eq!(intents(&early), vec![Intent::MoveCursor]);

        let ready = resolver.resolve(&run(Gesture::LSign, 2, 0.0), None, 0.8);
        assert_eq!(intents(&ready), vec![Intent::MoveCursor, Intent::LeftClick]);

        let cooling = resolver.resolve(&run(Gesture::LSign, 3, 0.0), None, 1.0);
        assert_eq!(intents(&cooling), vec![Intent::MoveCursor]);
    }

    #[test]
    fn cursor_bindings() {
        let mut resolver = IntentResolver::default();
        let events = resolver.resolve(&run(Gesture::RockSign, 3, 0.0), None, 0.9);
        assert_eq!(intents(&events), vec![Intent::RightClick]);
        let events = resolver.resolve(&run(Gesture::RingCurl, 3, 1.0), None, 1.3);
        assert_eq!(intents(&events), vec![Intent::MiddleClick]);
    }

    #[test]
    fn peace_scrolls_by_angle() {
        let mut resolver = IntentResolver::new(ControlMode::Scroll);
        let state = run(Gesture::PeaceSign, 1, 0.0);
        let events = resolver.resolve(&state, Some(3.0), 0.2);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].scroll.map(|s| s.notches()), Some(5));
        assert!(resolver.resolve(&state, Some(45.0), 0.3).is_empty());
        assert!(resolver.resolve(&state, None, 0.3).is_empty());
    }

    #[test]
    fn window_intents_wait_out_mode_switch() {
        let mut resolver = IntentResolver::new(ControlMode::Scroll);
        resolver.resolve(&run(Gesture::OkSign, 5, 0.0), None, 0.5);
        assert_eq!(resolver.mode(), ControlMode::Window);

        let palm = run(Gesture::OpenPalm, 5, -0.5);
        assert!(resolver.resolve(&palm, None, 1.4).is_empty());
        let events = resolver.resolve(&palm, None, 1.6);
        assert_eq!(intents(&events), vec![Intent::Maximize]);
    }

    #[test]
    fn media_volume_repeats_on_short_cooldown() {
        let mut resolver = IntentResolver::new(ControlMode::Media);
        let pinch = run(Gesture::PinchMiddle, 1, 0.0);
        assert_eq!(intents(&resolver.resolve(&pinch, None, 0.1)), vec![Intent::VolumeUp]);
        assert!(resolver.resolve(&pinch, None, 0.15).is_empty());
        assert_eq!(intents(&resolver.resolve(&pinch, None, 0.25)), vec![Intent::VolumeUp]);
    }

    #[test]
    fn none_and_unbound_gestures_produce_nothing() {
        let mut resolver = IntentResolver::default();
        assert!(resolver.resolve(&run(Gesture::None, 50, 0.0), None, 10.0).is_empty());
        assert!(resolver.resolve(&run(Gesture::PinkyCurl, 50, 0.0), None, 10.0).is_empty());
    }
}
