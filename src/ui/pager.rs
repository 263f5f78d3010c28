use std::sync::Arc;
use std::time::Duration;

use egui::{Rect, Sense, Ui};
use tokio::runtime::Handle;

use crate::config::ClockFormat;
use crate::schedule::geometry::hour_height_for;
use crate::schedule::paging::{day_at, extended_days, DayStrip, EXTENDED_LEN};
use crate::schedule::{Day, ScheduleController};
use super::views::{hit_test, paint_day_page, paint_time_column, TIME_COLUMN_WIDTH};

/// Horizontally paged day view over the nine page strip
pub struct DayPager {
    strip: DayStrip,
}

impl DayPager {
    pub fn new(runtime: Handle, snap_delay: Duration, ctx: egui::Context) -> Self {
        let wake = Arc::new(move || ctx.request_repaint());
        Self {
            strip: DayStrip::new(runtime, snap_delay, wake),
        }
    }

    pub fn show_day(&mut self, day: Day) {
        self.strip.show_day(day);
    }

    /// Draw the time column and the strip. `interactive` is false while a
    /// dialog covers the view.
    pub fn ui(&mut self, ui: &mut Ui, controller: &mut ScheduleController, clock_format: ClockFormat, interactive: bool) {
        self.strip.apply_due_snaps(controller);

        let full = ui.available_rect_before_wrap();
        let hour_height = hour_height_for(full.height());
        let column = Rect::from_min_max(full.min, egui::pos2(full.min.x + TIME_COLUMN_WIDTH, full.max.y));
        let strip = Rect::from_min_max(egui::pos2(column.max.x, full.min.y), full.max);
        let page_width = strip.width().max(1.0);

        let sense = if interactive { Sense::click_and_drag() } else { Sense::hover() };
        let response = ui.allocate_rect(full, sense);

        if response.drag_started() {
            self.strip.begin_drag();
        }
        if response.dragged() {
            // Finger moving left brings later days in
            self.strip.drag_by(-response.drag_delta().x / page_width);
        }
        if response.drag_stopped() {
            let velocity = ui.input(|i| i.pointer.velocity().x);
            self.strip.release(-velocity / page_width);
        }

        if !response.dragged() {
            let dt = ui.input(|i| i.stable_dt).min(0.1);
            self.strip.step(dt, controller);
        }
        if !self.strip.motion().is_settled() {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(full);
        paint_time_column(&painter, column, hour_height, clock_format);

        let strip_painter = ui.painter_at(strip);
        let offset = self.strip.motion().offset();
        let target = self.strip.motion().target();
        let mut visible_blocks = Vec::new();
        for (index, day) in extended_days().into_iter().enumerate() {
            let x = strip.min.x + (index as f32 - offset) * page_width;
            let page = Rect::from_min_size(egui::pos2(x, strip.min.y), strip.size());
            if !page.intersects(strip) {
                continue;
            }
            let blocks = paint_day_page(&strip_painter, page, controller.week().events(day), hour_height);
            if index == target {
                visible_blocks = blocks;
            }
        }

        // Only the settled real page of the current day opens events
        if response.clicked() && self.strip.motion().is_settled() {
            let real_page = (1..EXTENDED_LEN - 1).contains(&target);
            if real_page && day_at(target) == Some(controller.current_day()) && target == self.strip.rendered_index() {
                if let Some(pos) = response.interact_pointer_pos() {
                    if let Some(index) = hit_test(&visible_blocks, pos) {
                        controller.open_edit_modal(index);
                    }
                }
            }
        }
    }
}
