//! PIN candidate tables and search scheduler
//!
//! The search walks two half-PIN spaces: P1 (the first four digits,
//! 10000 candidates) and P2 (the last three data digits, 1000
//! candidates). Candidate order is a plain vector; each value's status
//! (default, promoted, already tried) lives in a parallel map indexed by
//! the numeric value, so reordering the queue never loses track of what
//! has been attempted.

use reaver_core::{KeyState, TargetConfig, P1_SIZE, P2_SIZE};
use tracing::info;

/// Compute the 8th (checksum) digit of a WPS PIN from its 7 data digits.
pub fn wps_pin_checksum(mut pin: u32) -> u8 {
    let mut accum = 0;
    while pin > 0 {
        accum += 3 * (pin % 10);
        pin /= 10;
        accum += pin % 10;
        pin /= 10;
    }
    ((10 - accum % 10) % 10) as u8
}

/// Search-order hint and already-tried marker, per candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Default,
    /// Known-common value, searched first
    Promoted,
    /// Below the cursor; never produced again outside an explicit reorder
    Tried,
}

/// First halves seen often enough in the field to try before the
/// numeric sweep.
const COMMON_P1: &[&str] = &[
    "1234", "0000", "1111", "2222", "3333", "4444", "5555", "6666", "7777", "8888", "9999",
];
/// Common second halves
const COMMON_P2: &[&str] = &["123", "000", "111", "222", "333", "444", "555", "666", "777"];

/// Result of an external-hint queue jump.
pub const JUMP_NOOP: i32 = 0;
pub const JUMP_TRIED: i32 = -1;
pub const JUMP_LOCKED: i32 = -2;
pub const JUMP_REORDERED: i32 = 1;

/// All mutable search state for one attack session.
#[derive(Debug, Clone)]
pub struct PinScheduler {
    p1: Vec<String>,
    p2: Vec<String>,
    /// Status per first-half value (index = numeric value)
    k1: Vec<Priority>,
    /// Status per second-half value
    k2: Vec<Priority>,
    p1_index: usize,
    p2_index: usize,
    key_state: KeyState,
    static_p1: Option<String>,
    static_p2: Option<String>,
    /// Operator-supplied arbitrary PIN string; disables the search
    pin_string: Option<String>,
    /// Deauth-without-NACK events carried across restarts
    aux_counter: u64,
}

impl PinScheduler {
    /// Seed the candidate tables: a fixed half fills its whole array
    /// with the one value, otherwise promoted values come first in table
    /// order followed by the remaining values in ascending numeric
    /// order.
    pub fn generate(cfg: &TargetConfig) -> Self {
        let pin_string = if cfg.pin_string_mode {
            cfg.static_p1.clone()
        } else {
            None
        };

        let mut k1 = vec![Priority::Default; P1_SIZE];
        let mut k2 = vec![Priority::Default; P2_SIZE];
        for v in COMMON_P1 {
            if let Ok(n) = v.parse::<usize>() {
                k1[n] = Priority::Promoted;
            }
        }
        for v in COMMON_P2 {
            if let Ok(n) = v.parse::<usize>() {
                k2[n] = Priority::Promoted;
            }
        }

        let p1 = match (&pin_string, &cfg.static_p1) {
            (None, Some(fixed)) => vec![fixed.clone(); P1_SIZE],
            _ => {
                let mut out: Vec<String> =
                    COMMON_P1.iter().map(|s| (*s).to_string()).collect();
                out.extend(
                    (0..P1_SIZE)
                        .filter(|n| k1[*n] == Priority::Default)
                        .map(|n| format!("{:04}", n)),
                );
                out
            }
        };
        let p2 = match (&pin_string, &cfg.static_p2) {
            (None, Some(fixed)) => vec![fixed.clone(); P2_SIZE],
            _ => {
                let mut out: Vec<String> =
                    COMMON_P2.iter().map(|s| (*s).to_string()).collect();
                out.extend(
                    (0..P2_SIZE)
                        .filter(|n| k2[*n] == Priority::Default)
                        .map(|n| format!("{:03}", n)),
                );
                out
            }
        };

        Self {
            p1,
            p2,
            k1,
            k2,
            p1_index: 0,
            p2_index: 0,
            key_state: KeyState::Key1Wip,
            static_p1: if cfg.pin_string_mode {
                None
            } else {
                cfg.static_p1.clone()
            },
            static_p2: cfg.static_p2.clone(),
            pin_string,
            aux_counter: 0,
        }
    }

    pub fn key_state(&self) -> KeyState {
        self.key_state
    }

    pub fn p1_index(&self) -> usize {
        self.p1_index
    }

    pub fn p2_index(&self) -> usize {
        self.p2_index
    }

    pub fn pin_string_mode(&self) -> bool {
        self.pin_string.is_some()
    }

    pub fn static_p1(&self) -> Option<&str> {
        self.static_p1.as_deref()
    }

    pub fn static_p2(&self) -> Option<&str> {
        self.static_p2.as_deref()
    }

    pub fn aux_counter(&self) -> u64 {
        self.aux_counter
    }

    pub fn bump_aux_counter(&mut self) {
        self.aux_counter += 1;
    }

    pub(crate) fn p1_value(&self, i: usize) -> &str {
        &self.p1[i]
    }

    pub(crate) fn p2_value(&self, i: usize) -> &str {
        &self.p2[i]
    }

    /// The PIN to try next: current first half, current second half,
    /// checksum digit. In pin-string mode the operator's string passes
    /// through verbatim.
    pub fn current_pin(&self) -> String {
        if let Some(s) = &self.pin_string {
            return s.clone();
        }
        let key = format!("{}{}", self.p1[self.p1_index], self.p2[self.p2_index]);
        let numeric = key.parse::<u32>().unwrap_or(0);
        format!("{}{}", key, wps_pin_checksum(numeric))
    }

    /// First half rejected: mark it tried and move the cursor. Running
    /// out of first halves moves the search to the second half.
    pub fn advance_p1(&mut self) {
        if self.key_state != KeyState::Key1Wip {
            return;
        }
        self.mark_p1_tried(self.p1_index);
        if self.p1_index + 1 < P1_SIZE {
            self.p1_index += 1;
        } else {
            self.key_state = KeyState::Key2Wip;
        }
    }

    /// Second half rejected, symmetric to [`advance_p1`].
    ///
    /// [`advance_p1`]: PinScheduler::advance_p1
    pub fn advance_p2(&mut self) {
        if self.key_state != KeyState::Key2Wip {
            return;
        }
        self.mark_p2_tried(self.p2_index);
        if self.p2_index + 1 < P2_SIZE {
            self.p2_index += 1;
        } else {
            self.key_state = KeyState::KeyDone;
        }
    }

    /// The registrar confirmed the first half (an M5 was reached); the
    /// cursor stays on the cracked value.
    pub fn first_half_cracked(&mut self) {
        if self.key_state == KeyState::Key1Wip {
            self.key_state = KeyState::Key2Wip;
        }
    }

    /// A full PIN was accepted; short-circuits the search regardless of
    /// cursor position.
    pub fn accept(&mut self) {
        self.key_state = KeyState::KeyDone;
    }

    fn mark_p1_tried(&mut self, i: usize) {
        if let Ok(n) = self.p1[i].parse::<usize>() {
            if n < P1_SIZE {
                self.k1[n] = Priority::Tried;
            }
        }
    }

    fn mark_p2_tried(&mut self, i: usize) {
        if let Ok(n) = self.p2[i].parse::<usize>() {
            if n < P2_SIZE {
                self.k2[n] = Priority::Tried;
            }
        }
    }

    /// Drop back to a fresh search over the already-generated tables.
    pub(crate) fn reset_cursors(&mut self) {
        self.p1_index = 0;
        self.p2_index = 0;
        self.key_state = KeyState::Key1Wip;
        self.aux_counter = 0;
    }

    pub(crate) fn restore(
        &mut self,
        p1: Vec<String>,
        p2: Vec<String>,
        p1_index: usize,
        p2_index: usize,
        key_state: KeyState,
        aux_counter: u64,
    ) {
        self.p1 = p1;
        self.p2 = p2;
        self.p1_index = p1_index.min(P1_SIZE - 1);
        self.p2_index = p2_index.min(P2_SIZE - 1);
        self.key_state = key_state;
        self.aux_counter = aux_counter;
        for i in 0..self.p1_index {
            self.mark_p1_tried(i);
        }
        for i in 0..self.p2_index {
            self.mark_p2_tried(i);
        }
    }

    /// Promote externally derived first-half hints: matching untried
    /// values move to the front of the untried queue, preserving the
    /// relative order of everything else. Slots below the cursor are
    /// never disturbed. A fixed first half makes this a no-op.
    pub fn promote_p1(&mut self, hints: &[&str]) {
        if self.static_p1.is_some() || self.pin_string.is_some() {
            return;
        }
        for i in 0..self.p1_index {
            self.mark_p1_tried(i);
        }

        let mut front: Vec<String> = Vec::new();
        for hint in hints {
            let n = match hint.parse::<usize>() {
                Ok(n) if n < P1_SIZE => n,
                _ => continue,
            };
            if self.k1[n] == Priority::Tried {
                continue;
            }
            let canonical = format!("{:04}", n);
            if !front.contains(&canonical) {
                self.k1[n] = Priority::Promoted;
                front.push(canonical);
            }
        }
        if front.is_empty() {
            return;
        }

        let tail: Vec<String> = self.p1[self.p1_index..]
            .iter()
            .filter(|v| !front.contains(v))
            .cloned()
            .collect();
        let mut rebuilt = front;
        info!(hints = rebuilt.len(), "promoted first-half pin hints");
        rebuilt.extend(tail);
        rebuilt.truncate(P1_SIZE - self.p1_index);
        self.p1.truncate(self.p1_index);
        self.p1.extend(rebuilt);
    }

    /// Second-half twin of [`promote_p1`].
    ///
    /// [`promote_p1`]: PinScheduler::promote_p1
    pub fn promote_p2(&mut self, hints: &[&str]) {
        if self.static_p2.is_some() || self.pin_string.is_some() {
            return;
        }
        for i in 0..self.p2_index {
            self.mark_p2_tried(i);
        }

        let mut front: Vec<String> = Vec::new();
        for hint in hints {
            let n = match hint.parse::<usize>() {
                Ok(n) if n < P2_SIZE => n,
                _ => continue,
            };
            if self.k2[n] == Priority::Tried {
                continue;
            }
            let canonical = format!("{:03}", n);
            if !front.contains(&canonical) {
                self.k2[n] = Priority::Promoted;
                front.push(canonical);
            }
        }
        if front.is_empty() {
            return;
        }

        let tail: Vec<String> = self.p2[self.p2_index..]
            .iter()
            .filter(|v| !front.contains(v))
            .cloned()
            .collect();
        let mut rebuilt = front;
        info!(hints = rebuilt.len(), "promoted second-half pin hints");
        rebuilt.extend(tail);
        rebuilt.truncate(P2_SIZE - self.p2_index);
        self.p2.truncate(self.p2_index);
        self.p2.extend(rebuilt);
    }

    /// Move an externally supplied first-half value to the head of the
    /// queue. Returns [`JUMP_NOOP`] when it already is the current
    /// candidate, [`JUMP_TRIED`] when it sits below the cursor,
    /// [`JUMP_LOCKED`] when the first half is no longer being searched,
    /// and [`JUMP_REORDERED`] after an in-place rotate. Idempotent.
    pub fn jump_p1_queue(&mut self, value: &str) -> i32 {
        if self.key_state != KeyState::Key1Wip {
            return JUMP_LOCKED;
        }
        match self.p1.iter().position(|v| v == value) {
            None => JUMP_TRIED,
            Some(i) if i == self.p1_index => JUMP_NOOP,
            Some(i) if i < self.p1_index => JUMP_TRIED,
            Some(i) => {
                self.p1[self.p1_index..=i].rotate_right(1);
                JUMP_REORDERED
            }
        }
    }

    /// Second-half twin of [`jump_p1_queue`].
    ///
    /// [`jump_p1_queue`]: PinScheduler::jump_p1_queue
    pub fn jump_p2_queue(&mut self, value: &str) -> i32 {
        if self.key_state == KeyState::KeyDone {
            return JUMP_LOCKED;
        }
        match self.p2.iter().position(|v| v == value) {
            None => JUMP_TRIED,
            Some(i) if i == self.p2_index => JUMP_NOOP,
            Some(i) if i < self.p2_index => JUMP_TRIED,
            Some(i) => {
                self.p2[self.p2_index..=i].rotate_right(1);
                JUMP_REORDERED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scheduler() -> PinScheduler {
        PinScheduler::generate(&TargetConfig::default())
    }

    #[test]
    fn checksum_reference_values() {
        assert_eq!(wps_pin_checksum(1234567), 0);
        assert_eq!(wps_pin_checksum(0), 0);
        assert_eq!(wps_pin_checksum(9996480), 1);
        assert_eq!(wps_pin_checksum(1111111), 5);
    }

    #[test]
    fn generate_places_promoted_first_then_numeric_order() {
        let s = scheduler();
        assert_eq!(s.p1[0], "1234");
        assert_eq!(s.p1[1], "0000");
        // after the promoted block the sweep starts at the smallest
        // unpromoted value
        assert_eq!(s.p1[COMMON_P1.len()], "0001");
        assert_eq!(s.p1.len(), P1_SIZE);
        assert_eq!(s.p2.len(), P2_SIZE);

        let unique: HashSet<&String> = s.p1.iter().collect();
        assert_eq!(unique.len(), P1_SIZE);
    }

    #[test]
    fn fixed_half_fills_uniformly() {
        let mut cfg = TargetConfig::default();
        cfg.static_p1 = Some("5678".into());
        let s = PinScheduler::generate(&cfg);
        assert!(s.p1.iter().all(|v| v == "5678"));
        assert_eq!(s.p2.len(), P2_SIZE);
        assert_eq!(s.current_pin(), "5678123".to_owned() + &wps_pin_checksum(5678123).to_string());
    }

    #[test]
    fn current_pin_appends_checksum() {
        let s = scheduler();
        // first candidate: p1 "1234", p2 "123"
        assert_eq!(s.current_pin(), "12341230");
        assert_eq!(wps_pin_checksum(1234123), 0);
    }

    #[test]
    fn pin_string_mode_passes_through() {
        let mut cfg = TargetConfig::default();
        cfg.pin_string_mode = true;
        cfg.static_p1 = Some("not-a-pin".into());
        let s = PinScheduler::generate(&cfg);
        assert_eq!(s.current_pin(), "not-a-pin");
        assert!(s.pin_string_mode());
    }

    #[test]
    fn cursors_are_monotonic_and_pins_unique() {
        let mut s = scheduler();
        let mut seen = HashSet::new();
        let mut last_p1 = 0;
        for _ in 0..2000 {
            if s.key_state() == KeyState::KeyDone {
                break;
            }
            let pin = s.current_pin();
            assert!(seen.insert(pin), "pin produced twice");
            assert!(s.p1_index() >= last_p1);
            last_p1 = s.p1_index();
            s.advance_p1();
        }
    }

    #[test]
    fn exhausting_p1_moves_to_second_half() {
        let mut s = scheduler();
        for _ in 0..P1_SIZE {
            s.advance_p1();
        }
        assert_eq!(s.key_state(), KeyState::Key2Wip);
        // cursor stays on the last candidate
        assert_eq!(s.p1_index(), P1_SIZE - 1);

        for _ in 0..P2_SIZE {
            s.advance_p2();
        }
        assert_eq!(s.key_state(), KeyState::KeyDone);
    }

    #[test]
    fn accept_short_circuits() {
        let mut s = scheduler();
        s.advance_p1();
        s.accept();
        assert_eq!(s.key_state(), KeyState::KeyDone);
        // further advances are ignored
        let idx = s.p1_index();
        s.advance_p1();
        assert_eq!(s.p1_index(), idx);
    }

    #[test]
    fn jump_is_idempotent() {
        let mut s = scheduler();
        s.advance_p1();
        s.advance_p1();

        assert_eq!(s.jump_p1_queue("4321"), JUMP_REORDERED);
        assert_eq!(s.p1[s.p1_index()], "4321");
        assert_eq!(s.jump_p1_queue("4321"), JUMP_NOOP);
    }

    #[test]
    fn jump_rejects_tried_values() {
        let mut s = scheduler();
        let first = s.current_pin();
        assert!(first.starts_with("1234"));
        s.advance_p1();
        assert_eq!(s.jump_p1_queue("1234"), JUMP_TRIED);
    }

    #[test]
    fn jump_rejects_locked_half() {
        let mut s = scheduler();
        s.first_half_cracked();
        assert_eq!(s.jump_p1_queue("4321"), JUMP_LOCKED);
        s.accept();
        assert_eq!(s.jump_p2_queue("321"), JUMP_LOCKED);
    }

    #[test]
    fn jump_preserves_intervening_order() {
        let mut s = scheduler();
        let before: Vec<String> = s.p1[0..5].to_vec();
        let target = s.p1[4].clone();
        assert_eq!(s.jump_p1_queue(&target), JUMP_REORDERED);
        assert_eq!(s.p1[0], target);
        // everything between shifted up by one
        assert_eq!(&s.p1[1..5], &before[0..4]);
    }

    #[test]
    fn promotion_inserts_after_cursor() {
        let mut s = scheduler();
        s.advance_p1();
        s.advance_p1();
        let tried: Vec<String> = s.p1[0..2].to_vec();

        s.promote_p1(&["9990", "9991"]);
        assert_eq!(&s.p1[0..2], &tried[..]);
        assert_eq!(s.p1[2], "9990");
        assert_eq!(s.p1[3], "9991");
        assert_eq!(s.p1.len(), P1_SIZE);

        let unique: HashSet<&String> = s.p1.iter().collect();
        assert_eq!(unique.len(), P1_SIZE);
    }

    #[test]
    fn promotion_skips_tried_hints() {
        let mut s = scheduler();
        s.advance_p1(); // "1234" tried
        let cursor = s.p1_index();
        s.promote_p1(&["1234"]);
        // nothing to promote, queue unchanged
        assert_eq!(s.p1_index(), cursor);
        assert_eq!(s.p1[0], "1234");
        assert_ne!(s.p1[cursor], "1234");
    }
}
