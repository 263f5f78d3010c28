use chrono::NaiveDate;
use egui::{Color32, Painter, Rect, RichText, Ui};

use crate::config::ClockFormat;
use crate::schedule::geometry::{self, HOURS_PER_DAY};
use crate::schedule::{Day, Event};
use crate::timer::Countdown;
use super::theme::{event_colors, grid_colors, DANGER};

/// Width of the hour label column
pub const TIME_COLUMN_WIDTH: f32 = 50.0;

/// Result from schedule header interactions
#[derive(Default)]
pub struct HeaderResult {
    pub prev: bool,
    pub next: bool,
    pub add: bool,
}

/// Result from timer tab interactions
#[derive(Default)]
pub struct TimerResult {
    pub toggle: bool,
    pub reset: bool,
    pub open_set_time: bool,
}

/// Format a time string "HH:MM" according to clock format
pub fn format_clock_time(time_24: &str, clock_format: ClockFormat) -> String {
    match clock_format {
        ClockFormat::Hour24 => time_24.to_string(),
        ClockFormat::Hour12 => {
            let parts: Vec<&str> = time_24.split(':').collect();
            if parts.len() >= 2 {
                if let (Ok(hour), Ok(min)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                    let (h12, ampm) = if hour == 0 {
                        (12, "am")
                    } else if hour < 12 {
                        (hour, "am")
                    } else if hour == 12 {
                        (12, "pm")
                    } else {
                        (hour - 12, "pm")
                    };
                    return format!("{}:{:02}{}", h12, min, ampm);
                }
            }
            time_24.to_string()
        }
    }
}

/// Arrow - day - arrow bar above the pager. Tapping the day label adds an event.
pub fn render_schedule_header(ui: &mut Ui, day: Day, date: NaiveDate) -> HeaderResult {
    let mut result = HeaderResult::default();
    let (line_color, _) = grid_colors();
    let text = Color32::from_rgb(229, 231, 235);

    ui.horizontal(|ui| {
        let arrow_font = egui::FontId::proportional(20.0);

        let left = ui.add(egui::Label::new(
            RichText::new(egui_phosphor::regular::CARET_LEFT).font(arrow_font.clone()).color(text)
        ).sense(egui::Sense::click()));
        if left.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        result.prev = left.clicked();

        // Center column takes everything between the arrows
        let center_width = (ui.available_width() - 40.0).max(0.0);
        ui.allocate_ui_with_layout(
            egui::vec2(center_width, 44.0),
            egui::Layout::top_down(egui::Align::Center),
            |ui| {
                let label = ui.add(egui::Label::new(
                    RichText::new(format!("{}  {}", day.label(), date.format("%b %-d")))
                        .size(20.0)
                        .strong()
                        .color(text)
                ).sense(egui::Sense::click()));
                let hint = ui.add(egui::Label::new(
                    RichText::new("Click me to add an event!")
                        .size(11.0)
                        .color(Color32::from_rgb(107, 114, 128))
                ).sense(egui::Sense::click()));
                if label.hovered() || hint.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                result.add = label.clicked() || hint.clicked();
            },
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let right = ui.add(egui::Label::new(
                RichText::new(egui_phosphor::regular::CARET_RIGHT).font(arrow_font).color(text)
            ).sense(egui::Sense::click()));
            if right.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            result.next = right.clicked();
        });
    });

    let y = ui.cursor().min.y;
    let rect = ui.max_rect();
    ui.painter().line_segment(
        [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
        egui::Stroke::new(1.0, line_color),
    );

    result
}

/// Hour labels down the left edge
pub fn paint_time_column(painter: &Painter, rect: Rect, hour_height: f32, clock_format: ClockFormat) {
    let (line_color, label_color) = grid_colors();
    // Labels shrink with the rows so 24 of them always fit
    let font = egui::FontId::proportional((hour_height * 0.45).clamp(8.0, 12.0));

    for hour in 0..HOURS_PER_DAY {
        let top = rect.min.y + hour as f32 * hour_height;
        let label = format_clock_time(&format!("{:02}:00", hour), clock_format);
        painter.text(
            egui::pos2(rect.max.x - 8.0, top + hour_height / 2.0),
            egui::Align2::RIGHT_CENTER,
            label,
            font.clone(),
            label_color,
        );
        painter.line_segment(
            [
                egui::pos2(rect.min.x, top + hour_height),
                egui::pos2(rect.max.x, top + hour_height),
            ],
            egui::Stroke::new(1.0, line_color),
        );
    }
}

/// Paint one day page: hour lines plus its event blocks. Returns the block
/// rects in the same order as `events`.
pub fn paint_day_page(painter: &Painter, rect: Rect, events: &[Event], hour_height: f32) -> Vec<Rect> {
    let (line_color, _) = grid_colors();
    let (fill, text, secondary) = event_colors();

    for hour in 1..=HOURS_PER_DAY {
        let y = rect.min.y + hour as f32 * hour_height;
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            egui::Stroke::new(1.0, line_color),
        );
    }

    let mut blocks = Vec::with_capacity(events.len());
    for event in events {
        let placed = geometry::position(&event.start, &event.end, hour_height);
        let block = Rect::from_min_max(
            egui::pos2(rect.min.x + 2.0, rect.min.y + placed.top),
            egui::pos2(rect.max.x - 2.0, rect.min.y + placed.bottom()),
        );
        blocks.push(block);

        painter.rect_filled(block, 4.0, fill);

        // Show as many lines as the block has room for
        let clipped = painter.with_clip_rect(block.intersect(painter.clip_rect()));
        let mut y = block.min.y + 3.0;
        let lines = [
            (event.title.as_str(), 15.0, text),
            (event.location.as_str(), 13.0, text),
        ];
        for (line, size, color) in lines {
            if y + size > block.max.y {
                break;
            }
            clipped.text(
                egui::pos2(block.min.x + 6.0, y),
                egui::Align2::LEFT_TOP,
                line,
                egui::FontId::proportional(size),
                color,
            );
            y += size + 3.0;
        }
        if y + 12.0 <= block.max.y {
            clipped.text(
                egui::pos2(block.min.x + 6.0, y),
                egui::Align2::LEFT_TOP,
                format!("{} - {}", event.start, event.end),
                egui::FontId::proportional(12.0),
                secondary,
            );
        }
    }

    blocks
}

/// Index of the topmost block under `pos`. Later blocks are painted on top.
pub fn hit_test(blocks: &[Rect], pos: egui::Pos2) -> Option<usize> {
    blocks.iter().rposition(|block| block.contains(pos))
}

pub fn render_timer(ui: &mut Ui, countdown: &Countdown) -> TimerResult {
    let mut result = TimerResult::default();

    ui.vertical_centered(|ui| {
        let top_space = (ui.available_height() / 2.0 - 120.0).max(24.0);
        ui.add_space(top_space);

        let time_color = if countdown.remaining_secs() == 0 { DANGER } else { Color32::WHITE };
        let time = ui.add(egui::Label::new(
            RichText::new(countdown.display())
                .size(64.0)
                .strong()
                .color(time_color)
        ).sense(egui::Sense::click()));
        if time.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        result.open_set_time = time.clicked();

        ui.label(RichText::new("Tap to set time").size(11.0).color(Color32::from_rgb(156, 163, 175)));
        ui.add_space(32.0);

        let (play_icon, play_label) = if countdown.is_running() {
            (egui_phosphor::regular::PAUSE, "Pause")
        } else {
            (egui_phosphor::regular::PLAY, "Start")
        };

        // Center the two buttons as a group
        let buttons_width = 240.0;
        let margin = ((ui.available_width() - buttons_width) / 2.0).max(0.0);
        ui.horizontal(|ui| {
            ui.add_space(margin);
            if ui.add(
                egui::Button::new(
                    RichText::new(format!("{} {}", play_icon, play_label)).size(17.0).color(Color32::WHITE)
                )
                .fill(Color32::from_rgb(29, 78, 216))
                .rounding(18.0)
                .min_size(egui::vec2(110.0, 36.0))
            ).clicked() {
                result.toggle = true;
            }
            if ui.add(
                egui::Button::new(
                    RichText::new(format!("{} Reset", egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE))
                        .size(17.0)
                        .color(Color32::WHITE)
                )
                .fill(Color32::from_rgb(156, 163, 175))
                .rounding(18.0)
                .min_size(egui::vec2(110.0, 36.0))
            ).clicked() {
                result.reset = true;
            }
        });
    });

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_hour_labels() {
        assert_eq!(format_clock_time("00:00", ClockFormat::Hour12), "12:00am");
        assert_eq!(format_clock_time("09:05", ClockFormat::Hour12), "9:05am");
        assert_eq!(format_clock_time("12:30", ClockFormat::Hour12), "12:30pm");
        assert_eq!(format_clock_time("23:00", ClockFormat::Hour12), "11:00pm");
        assert_eq!(format_clock_time("23:00", ClockFormat::Hour24), "23:00");
        assert_eq!(format_clock_time("bad", ClockFormat::Hour12), "bad");
    }

    #[test]
    fn hit_test_prefers_block_painted_last() {
        let lower = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(100.0, 60.0));
        let upper = Rect::from_min_max(egui::pos2(0.0, 30.0), egui::pos2(100.0, 90.0));
        let blocks = [lower, upper];
        assert_eq!(hit_test(&blocks, egui::pos2(50.0, 10.0)), Some(0));
        assert_eq!(hit_test(&blocks, egui::pos2(50.0, 45.0)), Some(1));
        assert_eq!(hit_test(&blocks, egui::pos2(50.0, 95.0)), None);
    }
}
