//! Vertical placement of event blocks inside a 24-hour day column.

pub const HOURS_PER_DAY: u32 = 24;

/// Absolute floor for a block's rendered height
pub const MIN_BLOCK_HEIGHT: f32 = 30.0;

/// Floor expressed as a share of one hour row, used when rows are short
pub const MIN_BLOCK_HOUR_SHARE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventBox {
    pub top: f32,
    pub height: f32,
}

impl EventBox {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Parse "HH:MM" into (hour, minute). Components that are missing or not
/// numbers read as 0; times are never validated beyond that.
pub fn parse_wall_time(time: &str) -> (u32, u32) {
    let mut parts = time.trim().split(':');
    let hour = parts.next().and_then(|h| h.trim().parse().ok()).unwrap_or(0);
    let minute = parts.next().and_then(|m| m.trim().parse().ok()).unwrap_or(0);
    (hour, minute)
}

/// Offset of a wall-clock time from the top of the column
pub fn offset_for(time: &str, hour_height: f32) -> f32 {
    let (hour, minute) = parse_wall_time(time);
    hour as f32 * hour_height + (minute as f32 / 60.0) * hour_height
}

/// Smallest height a block is drawn with
pub fn min_block_height(hour_height: f32) -> f32 {
    MIN_BLOCK_HEIGHT.min(hour_height * MIN_BLOCK_HOUR_SHARE)
}

/// Top offset and height of an event block. Inverted or empty ranges are
/// not rejected, they are drawn at the floor height.
pub fn position(start: &str, end: &str, hour_height: f32) -> EventBox {
    let top = offset_for(start, hour_height);
    let raw_height = offset_for(end, hour_height) - top;
    EventBox {
        top,
        height: raw_height.max(min_block_height(hour_height)),
    }
}

/// Hour row height that fits the whole day into `available` pixels
pub fn hour_height_for(available: f32) -> f32 {
    (available / HOURS_PER_DAY as f32).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_HEIGHTS: [f32; 5] = [10.0, 24.0, 37.5, 60.0, 120.0];

    fn hhmm(minutes: u32) -> String {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }

    #[test]
    fn top_is_hours_plus_minute_fraction() {
        let b = position("09:30", "10:00", 40.0);
        assert_eq!(b.top, 380.0);
        assert_eq!(b.height, 30.0);
    }

    #[test]
    fn later_start_never_moves_block_up() {
        for hour_height in HOUR_HEIGHTS {
            let mut last_top = f32::MIN;
            for minutes in 0..24 * 60 {
                let top = position(&hhmm(minutes), "23:59", hour_height).top;
                assert!(top >= last_top, "{minutes} at {hour_height}");
                last_top = top;
            }
        }
    }

    #[test]
    fn height_respects_floor_and_is_exact_above_it() {
        for hour_height in HOUR_HEIGHTS {
            let floor = min_block_height(hour_height);
            for start in (0..24 * 60).step_by(7) {
                for end in ((start + 1)..24 * 60).step_by(11) {
                    let b = position(&hhmm(start), &hhmm(end), hour_height);
                    assert!(b.height >= floor);
                    let delta = (end - start) as f32 / 60.0 * hour_height;
                    if delta > floor {
                        assert!((b.height - delta).abs() < 1e-2, "{start}-{end} at {hour_height}");
                    }
                }
            }
        }
    }

    #[test]
    fn floor_is_smaller_of_fixed_minimum_and_hour_share() {
        assert_eq!(min_block_height(100.0), 30.0);
        assert!((min_block_height(20.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn inverted_range_is_drawn_at_floor() {
        // Standup edited to end before it starts
        let b = position("09:00", "08:10", 60.0);
        assert_eq!(b.height, min_block_height(60.0));
        assert_eq!(b.top, 540.0);

        let empty = position("13:00", "13:00", 12.0);
        assert_eq!(empty.height, min_block_height(12.0));
    }

    #[test]
    fn unparsable_components_read_as_zero() {
        assert_eq!(parse_wall_time("7"), (7, 0));
        assert_eq!(parse_wall_time("xx:15"), (0, 15));
        assert_eq!(parse_wall_time(""), (0, 0));
    }

    #[test]
    fn full_day_fits_available_height() {
        assert_eq!(hour_height_for(720.0), 30.0);
        assert_eq!(hour_height_for(-5.0), 0.0);
    }
}
