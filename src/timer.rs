use std::time::{Duration, Instant};

/// 45 minutes
pub const DEFAULT_MINUTES: u32 = 45;

/// Longest accepted "set time" input, in digits
pub const MAX_MINUTE_DIGITS: usize = 3;

/// Largest base duration, the most "set time" can express
pub const MAX_MINUTES: u32 = 999;

/// Pomodoro-style countdown, advanced by whole elapsed seconds
#[derive(Debug, Clone)]
pub struct Countdown {
    base_secs: u32,
    remaining_secs: u32,
    running: bool,
    // Start of the second currently being counted
    last_tick: Option<Instant>,
}

impl Countdown {
    /// `base_minutes` comes from the config file and is clamped to 1-999
    pub fn new(base_minutes: u32) -> Self {
        let base_secs = base_minutes.clamp(1, MAX_MINUTES) * 60;
        Self {
            base_secs,
            remaining_secs: base_secs,
            running: false,
            last_tick: None,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_pause(&mut self, now: Instant) {
        if self.running {
            self.pause();
        } else if self.remaining_secs > 0 {
            self.running = true;
            self.last_tick = Some(now);
        }
    }

    fn pause(&mut self) {
        self.running = false;
        self.last_tick = None;
    }

    /// Stops and goes back to the base duration
    pub fn reset(&mut self) {
        self.pause();
        self.remaining_secs = self.base_secs;
    }

    /// Accepts 1-3 digits of whole minutes greater than zero. Always stops
    /// the countdown; returns whether the time changed.
    pub fn set_minutes(&mut self, input: &str) -> bool {
        self.pause();
        let input = input.trim();
        if input.is_empty()
            || input.len() > MAX_MINUTE_DIGITS
            || !input.chars().all(|c| c.is_ascii_digit())
        {
            return false;
        }
        match input.parse::<u32>() {
            Ok(minutes) if minutes > 0 => {
                self.remaining_secs = minutes * 60;
                true
            }
            _ => false,
        }
    }

    /// Count down every whole second since the last tick. Stops at zero.
    pub fn tick(&mut self, now: Instant) {
        let Some(last) = self.last_tick else {
            return;
        };
        if !self.running {
            return;
        }

        let elapsed = now.saturating_duration_since(last).as_secs();
        if elapsed == 0 {
            return;
        }
        let steps = elapsed.min(self.remaining_secs as u64) as u32;
        self.remaining_secs -= steps;
        self.last_tick = Some(last + Duration::from_secs(elapsed));

        if self.remaining_secs == 0 {
            tracing::info!("countdown finished");
            self.pause();
        }
    }

    /// Time until the next whole second elapses, for repaint scheduling
    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        let last = self.last_tick?;
        let since = now.saturating_duration_since(last);
        Some(Duration::from_secs(1).saturating_sub(Duration::from_nanos(
            (since.as_nanos() % 1_000_000_000) as u64,
        )))
    }

    /// "mm:ss"
    pub fn display(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    /// Whole minutes left, used to prefill the set-time dialog
    pub fn remaining_minutes(&self) -> u32 {
        self.remaining_secs / 60
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

pub fn format_mm_ss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_base_duration() {
        let c = Countdown::default();
        assert_eq!(c.display(), "45:00");
        assert!(!c.is_running());
    }

    #[test]
    fn ticks_once_per_elapsed_second() {
        let t0 = Instant::now();
        let mut c = Countdown::new(1);
        c.start_pause(t0);
        c.tick(t0 + Duration::from_millis(900));
        assert_eq!(c.remaining_secs(), 60);
        c.tick(t0 + Duration::from_millis(1_100));
        assert_eq!(c.remaining_secs(), 59);
        c.tick(t0 + Duration::from_millis(3_050));
        assert_eq!(c.remaining_secs(), 57);
    }

    #[test]
    fn stops_at_zero() {
        let t0 = Instant::now();
        let mut c = Countdown::new(1);
        c.start_pause(t0);
        c.tick(t0 + Duration::from_secs(600));
        assert_eq!(c.remaining_secs(), 0);
        assert!(!c.is_running());

        c.start_pause(t0 + Duration::from_secs(601));
        assert!(!c.is_running());
    }

    #[test]
    fn pause_freezes_time() {
        let t0 = Instant::now();
        let mut c = Countdown::new(5);
        c.start_pause(t0);
        c.tick(t0 + Duration::from_secs(2));
        c.start_pause(t0 + Duration::from_secs(2));
        c.tick(t0 + Duration::from_secs(30));
        assert_eq!(c.display(), "04:58");
    }

    #[test]
    fn reset_returns_to_base_even_after_set() {
        let mut c = Countdown::new(45);
        assert!(c.set_minutes("10"));
        assert_eq!(c.display(), "10:00");
        c.reset();
        assert_eq!(c.display(), "45:00");
    }

    #[test]
    fn set_minutes_rejects_bad_input_and_stops() {
        let t0 = Instant::now();
        let mut c = Countdown::new(45);
        c.start_pause(t0);
        assert!(!c.set_minutes("0"));
        assert!(!c.is_running());
        assert!(!c.set_minutes(""));
        assert!(!c.set_minutes("1000"));
        assert!(!c.set_minutes("1a"));
        assert_eq!(c.display(), "45:00");

        assert!(c.set_minutes("120"));
        assert_eq!(c.display(), "120:00");
        assert_eq!(c.remaining_minutes(), 120);
    }

    #[test]
    fn base_duration_from_config_is_clamped() {
        assert_eq!(Countdown::new(u32::MAX).display(), "999:00");
        assert_eq!(Countdown::new(0).display(), "01:00");

        let mut c = Countdown::new(u32::MAX);
        c.set_minutes("5");
        c.reset();
        assert_eq!(c.remaining_secs(), 999 * 60);
    }
}
