use chrono::Local;
use eframe::egui;
use egui::{Color32, RichText};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, Tab};
use crate::schedule::store::{FileStore, KeyValueStore, MemoryStore, PersistEvent, Persistence};
use crate::schedule::ScheduleController;
use crate::timer::{Countdown, MAX_MINUTE_DIGITS};
use super::modal::EventModal;
use super::pager::DayPager;
use super::theme::{self, dialog_colors, phosphor_fill_family, tab_colors, ACCENT};
use super::views;

pub struct ShuukanApp {
    config: Config,

    // Schedule
    controller: ScheduleController,
    pager: DayPager,
    modal: EventModal,

    // Saves wait until the stored week has been read
    schedule_loaded: bool,

    // Timer tab
    countdown: Countdown,
    show_set_time: bool,
    set_time_input: String,

    // Load/save failure shown to the user
    notice: Option<String>,

    // Async communication
    persistence: Persistence,
    persist_rx: Receiver<PersistEvent>,
    // Declared last so tasks owned by the fields above are cancelled first
    _runtime: tokio::runtime::Runtime,
}

impl ShuukanApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {:#}", e);
            Config::default()
        });
        theme::setup_fonts(&cc.egui_ctx);
        theme::setup_theme(&cc.egui_ctx);

        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        let (persist_tx, persist_rx) = channel();

        let store = open_store(&config);
        let ctx = cc.egui_ctx.clone();
        let wake = Arc::new(move || ctx.request_repaint());
        let persistence = Persistence::new(store, runtime.handle().clone(), persist_tx, wake);
        persistence.load();

        let pager = DayPager::new(runtime.handle().clone(), config.snap_delay(), cc.egui_ctx.clone());
        let countdown = Countdown::new(config.timer_minutes);

        Self {
            controller: ScheduleController::new(),
            pager,
            modal: EventModal::default(),
            schedule_loaded: false,
            countdown,
            show_set_time: false,
            set_time_input: String::new(),
            notice: None,
            persistence,
            persist_rx,
            _runtime: runtime,
            config,
        }
    }

    fn check_async_results(&mut self) {
        while let Ok(event) = self.persist_rx.try_recv() {
            match event {
                PersistEvent::Loaded(week) => {
                    if let Some(week) = week {
                        tracing::info!(events = week.total_events(), "restored schedule");
                        self.controller.replace_week(week);
                    }
                    self.schedule_loaded = true;
                }
                PersistEvent::LoadFailed(message) => {
                    // Keep the empty week; edits from here on are still saved
                    self.schedule_loaded = true;
                    self.notice = Some(message);
                }
                PersistEvent::Saved => {}
                PersistEvent::SaveFailed(message) => {
                    self.notice = Some(message);
                }
            }
        }
    }

    fn flush_pending_save(&mut self) {
        if !self.schedule_loaded {
            return;
        }
        if let Some(week) = self.controller.take_pending_save() {
            self.persistence.save(week);
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.config.tab == tab {
            return;
        }
        self.config.tab = tab;
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {:#}", e);
        }
    }

    fn render_tab_bar(&mut self, ui: &mut egui::Ui) {
        let (selected, unselected) = tab_colors();
        let tabs = [
            (Tab::Timer, egui_phosphor::fill::TIMER, "Timer"),
            (Tab::Schedule, egui_phosphor::fill::CALENDAR_BLANK, "Schedule"),
        ];
        let tab_width = ui.available_width() / tabs.len() as f32;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for (tab, icon, label) in tabs {
                let color = if self.config.tab == tab { selected } else { unselected };
                let (rect, response) = ui.allocate_exact_size(egui::vec2(tab_width, 52.0), egui::Sense::click());
                let painter = ui.painter();
                painter.text(
                    rect.center() - egui::vec2(0.0, 8.0),
                    egui::Align2::CENTER_CENTER,
                    icon,
                    egui::FontId::new(24.0, phosphor_fill_family()),
                    color,
                );
                painter.text(
                    rect.center() + egui::vec2(0.0, 14.0),
                    egui::Align2::CENTER_CENTER,
                    label,
                    egui::FontId::proportional(11.0),
                    color,
                );
                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if response.clicked() {
                    self.select_tab(tab);
                }
            }
        });
    }

    fn render_schedule(&mut self, ui: &mut egui::Ui, interactive: bool) {
        let day = self.controller.current_day();
        let date = day.date_in_week_of(Local::now().date_naive());

        let header = ui.add_enabled_ui(interactive, |ui| views::render_schedule_header(ui, day, date)).inner;
        if header.prev {
            let day = self.controller.go_to_prev_day();
            self.pager.show_day(day);
        }
        if header.next {
            let day = self.controller.go_to_next_day();
            self.pager.show_day(day);
        }
        if header.add {
            self.controller.open_add_modal();
        }

        self.pager.ui(ui, &mut self.controller, self.config.clock_format, interactive);
    }

    fn render_timer(&mut self, ui: &mut egui::Ui, interactive: bool) {
        let result = ui.add_enabled_ui(interactive, |ui| views::render_timer(ui, &self.countdown)).inner;
        if result.toggle {
            self.countdown.start_pause(Instant::now());
        }
        if result.reset {
            self.countdown.reset();
        }
        if result.open_set_time {
            self.set_time_input = self.countdown.remaining_minutes().to_string();
            self.show_set_time = true;
        }
    }

    fn render_set_time_dialog(&mut self, ctx: &egui::Context) {
        let (content_bg, frame_color, text, _) = dialog_colors();
        let dialog_frame = egui::Frame::none()
            .fill(content_bg)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(20.0));

        let mut apply = false;
        let mut cancel = false;

        egui::Window::new("Set Shuukan Time")
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame)
            .show(ctx, |ui| {
                ui.visuals_mut().override_text_color = Some(text);
                ui.visuals_mut().extreme_bg_color = Color32::from_rgb(243, 244, 246);

                ui.label(RichText::new("Set Shuukan Time").size(17.0).strong());
                ui.label(RichText::new("Minutes").size(13.0));
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.set_time_input)
                        .char_limit(MAX_MINUTE_DIGITS)
                        .desired_width(120.0)
                );
                if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    apply = true;
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.add(egui::Button::new(RichText::new("Set").color(Color32::WHITE)).fill(ACCENT)).clicked() {
                        apply = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            });

        if apply {
            if !self.countdown.set_minutes(&self.set_time_input) {
                tracing::debug!(input = %self.set_time_input, "ignored invalid timer minutes");
            }
            self.show_set_time = false;
        }
        if cancel {
            self.show_set_time = false;
        }
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notice.clone() else {
            return;
        };
        let (content_bg, frame_color, text, _) = dialog_colors();
        let dialog_frame = egui::Frame::none()
            .fill(content_bg)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .rounding(egui::Rounding::same(8.0))
            .inner_margin(egui::Margin::same(20.0));

        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame)
            .show(ctx, |ui| {
                ui.visuals_mut().override_text_color = Some(text);
                ui.label(RichText::new(&message).size(14.0));
                ui.add_space(12.0);
                if ui.button("OK").clicked() {
                    self.notice = None;
                }
            });
    }
}

impl eframe::App for ShuukanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle pinch-to-zoom (trackpad pinch or Ctrl+scroll)
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = (self.config.font_scale * zoom_delta).clamp(0.75, 2.5);
            if (zoom_delta - 1.0).abs() > 0.01 {
                let _ = self.config.save();
            }
        }
        ctx.set_pixels_per_point(self.config.font_scale);

        self.check_async_results();

        let now = Instant::now();
        self.countdown.tick(now);
        if self.countdown.is_running() {
            if let Some(wait) = self.countdown.until_next_tick(now) {
                ctx.request_repaint_after(wait);
            }
        }

        let dialog_open = self.controller.draft().visible || self.show_set_time || self.notice.is_some();

        egui::TopBottomPanel::bottom("tab_bar")
            .frame(egui::Frame::none().fill(Color32::from_rgb(17, 24, 39)))
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!dialog_open, |ui| self.render_tab_bar(ui));
            });

        egui::CentralPanel::default().frame(
            egui::Frame::none()
                .fill(ctx.style().visuals.panel_fill)
                .inner_margin(egui::Margin::symmetric(8.0, 8.0))
        ).show(ctx, |ui| {
            match self.config.tab {
                Tab::Timer => self.render_timer(ui, !dialog_open),
                Tab::Schedule => self.render_schedule(ui, !dialog_open),
            }
        });

        self.modal.show(ctx, &mut self.controller);
        if self.show_set_time {
            self.render_set_time_dialog(ctx);
        }
        self.render_notice(ctx);

        self.flush_pending_save();
    }
}

/// Storage for the schedule: configured dir, else the platform data dir,
/// else an in-memory store that lasts for this run
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    if let Some(dir) = &config.data_dir {
        return Arc::new(FileStore::new(dir.clone()));
    }
    match FileStore::default_location() {
        Ok(store) => {
            tracing::info!(dir = %store.dir().display(), "using schedule data dir");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("No data directory, schedule will not survive restart: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    }
}
