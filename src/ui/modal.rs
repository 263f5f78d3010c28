use chrono::Timelike;
use egui::{Color32, RichText};

use crate::schedule::{PickerMode, ScheduleController};
use super::theme::{dialog_colors, ACCENT, DANGER};

/// Add/edit event card. Keeps the picker's screen rect between frames so a
/// click anywhere else can commit the pending time.
#[derive(Default)]
pub struct EventModal {
    picker_rect: Option<egui::Rect>,
}

impl EventModal {
    pub fn show(&mut self, ctx: &egui::Context, controller: &mut ScheduleController) {
        if !controller.draft().visible {
            self.picker_rect = None;
            return;
        }

        // Tap outside the open picker commits it
        if controller.draft().picker_mode.is_some() {
            if let Some(picker) = self.picker_rect {
                let outside = ctx.input(|i| {
                    i.pointer.any_click()
                        && i.pointer.interact_pos().map_or(false, |pos| !picker.contains(pos))
                });
                if outside {
                    controller.tap_outside();
                }
            }
        }

        let screen = ctx.screen_rect();
        ctx.layer_painter(egui::LayerId::new(egui::Order::PanelResizeLine, egui::Id::new("modal_backdrop")))
            .rect_filled(screen, 0.0, Color32::from_black_alpha(140));

        let (content_bg, frame_color, text, muted) = dialog_colors();
        let dialog_frame = egui::Frame::none()
            .fill(content_bg)
            .stroke(egui::Stroke::new(2.0, frame_color))
            .rounding(egui::Rounding::same(12.0))
            .inner_margin(egui::Margin::same(20.0));

        let width = (screen.width() - 40.0).clamp(260.0, 420.0);
        let mut picker_rect = None;

        egui::Window::new("event_modal")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .fixed_size([width, 0.0])
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(dialog_frame)
            .show(ctx, |ui| {
                ui.visuals_mut().override_text_color = Some(text);
                ui.visuals_mut().extreme_bg_color = Color32::from_rgb(243, 244, 246);
                ui.visuals_mut().widgets.inactive.bg_stroke = egui::Stroke::new(1.0, frame_color);

                let editing = controller.draft().is_editing();
                let can_save = controller.can_save();

                ui.horizontal(|ui| {
                    if ui.add(egui::Label::new(RichText::new("Cancel").size(16.0).color(ACCENT))
                        .sense(egui::Sense::click())).clicked()
                    {
                        controller.close_modal();
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if editing { "Save" } else { "Add" };
                        let color = if can_save { ACCENT } else { muted };
                        let save = ui.add_enabled(
                            can_save,
                            egui::Label::new(RichText::new(label).size(16.0).strong().color(color))
                                .sense(egui::Sense::click()),
                        );
                        if save.clicked() {
                            controller.save();
                        }

                        ui.centered_and_justified(|ui| {
                            ui.label(RichText::new(controller.draft().day.label()).size(17.0).strong());
                        });
                    });
                });

                ui.add_space(14.0);

                ui.add(
                    egui::TextEdit::singleline(controller.title_mut())
                        .hint_text("Title")
                        .desired_width(f32::INFINITY)
                        .margin(egui::vec2(10.0, 8.0))
                );
                ui.add(
                    egui::TextEdit::singleline(controller.location_mut())
                        .hint_text("Location or Video Call")
                        .desired_width(f32::INFINITY)
                        .margin(egui::vec2(10.0, 8.0))
                );

                ui.add_space(10.0);

                let draft = controller.draft();
                let rows = [
                    (PickerMode::Start, "Starts", draft.start),
                    (PickerMode::End, "Ends", draft.end),
                ];
                for (mode, label, time) in rows {
                    let row = ui.horizontal(|ui| {
                        ui.label(RichText::new(label).size(15.0));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(RichText::new(time.format("%H:%M").to_string()).size(15.0).color(ACCENT));
                        });
                    }).response.interact(egui::Sense::click());
                    if row.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    if row.clicked() {
                        controller.show_picker(mode);
                    }
                }

                if let (Some(mode), Some(value)) = (controller.draft().picker_mode, controller.draft().picker_value()) {
                    ui.add_space(8.0);
                    let picker = egui::Frame::none()
                        .fill(Color32::from_rgb(243, 244, 246))
                        .rounding(8.0)
                        .inner_margin(egui::Margin::same(12.0))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                let title = match mode {
                                    PickerMode::Start => "Set Start Time",
                                    PickerMode::End => "Set End Time",
                                };
                                ui.label(RichText::new(title).size(15.0).strong());
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    if ui.add(egui::Label::new(RichText::new("Done").size(15.0).strong().color(ACCENT))
                                        .sense(egui::Sense::click())).clicked()
                                    {
                                        controller.apply_time();
                                    }
                                });
                            });

                            ui.add_space(6.0);
                            let mut hour = value.hour();
                            let mut minute = value.minute();
                            let changed = ui.horizontal(|ui| {
                                let h = ui.add(egui::DragValue::new(&mut hour).range(0..=23).speed(0.1)
                                    .custom_formatter(|n, _| format!("{:02}", n as u32)));
                                ui.label(":");
                                let m = ui.add(egui::DragValue::new(&mut minute).range(0..=59).speed(0.2)
                                    .custom_formatter(|n, _| format!("{:02}", n as u32)));
                                h.changed() || m.changed()
                            }).inner;

                            if changed {
                                if let Some(time) = value.date().and_hms_opt(hour, minute, 0) {
                                    controller.picker_changed(time);
                                }
                            }
                        });
                    picker_rect = Some(picker.response.rect);
                }

                if editing {
                    ui.add_space(16.0);
                    ui.vertical_centered(|ui| {
                        if ui.add(egui::Label::new(RichText::new("Delete Event").size(16.0).color(DANGER))
                            .sense(egui::Sense::click())).clicked()
                        {
                            controller.delete_event();
                        }
                    });
                }
            });

        self.picker_rect = picker_rect;
    }
}
