//! Owns the week, the current day and the event draft.
//!
//! Views hold a reference to one `ScheduleController` and call its
//! operations; none of them keep their own copy of the schedule. Every
//! mutation of the week bumps a revision so the caller can persist it.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::model::{Day, Event, EventId, WeekSchedule};

/// Which draft time the picker is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Start,
    End,
}

/// Transient form state for one event being added or edited
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub visible: bool,
    pub day: Day,
    pub title: String,
    pub location: String,
    /// Only hour and minute are ever read back
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub picker_mode: Option<PickerMode>,
    pub temp_time: Option<NaiveDateTime>,
    /// Event being edited, `None` while adding
    pub editing: Option<EventId>,
}

impl EditState {
    fn blank(day: Day, now: NaiveDateTime) -> Self {
        Self {
            visible: false,
            day,
            title: String::new(),
            location: String::new(),
            start: now,
            end: now,
            picker_mode: None,
            temp_time: None,
            editing: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty() && !self.location.trim().is_empty()
    }

    /// Time the picker should show: the pending value, else the field it edits
    pub fn picker_value(&self) -> Option<NaiveDateTime> {
        let mode = self.picker_mode?;
        Some(self.temp_time.unwrap_or(match mode {
            PickerMode::Start => self.start,
            PickerMode::End => self.end,
        }))
    }
}

pub struct ScheduleController {
    current_day: Day,
    week: WeekSchedule,
    draft: EditState,
    revision: u64,
    persisted_revision: u64,
}

impl ScheduleController {
    pub fn new() -> Self {
        Self::with_week(WeekSchedule::new())
    }

    pub fn with_week(week: WeekSchedule) -> Self {
        Self {
            current_day: Day::Mon,
            week,
            draft: EditState::blank(Day::Mon, Local::now().naive_local()),
            revision: 0,
            persisted_revision: 0,
        }
    }

    pub fn current_day(&self) -> Day {
        self.current_day
    }

    pub fn week(&self) -> &WeekSchedule {
        &self.week
    }

    pub fn draft(&self) -> &EditState {
        &self.draft
    }

    pub fn title_mut(&mut self) -> &mut String {
        &mut self.draft.title
    }

    pub fn location_mut(&mut self) -> &mut String {
        &mut self.draft.location
    }

    pub fn can_save(&self) -> bool {
        self.draft.can_save()
    }

    // Day navigation

    pub fn go_to_prev_day(&mut self) -> Day {
        self.current_day = self.current_day.prev();
        tracing::debug!(day = %self.current_day, "previous day");
        self.current_day
    }

    pub fn go_to_next_day(&mut self) -> Day {
        self.current_day = self.current_day.next();
        tracing::debug!(day = %self.current_day, "next day");
        self.current_day
    }

    /// Used by the pager once it settles on a real day
    pub fn set_current_day(&mut self, day: Day) {
        self.current_day = day;
    }

    // Modal

    pub fn open_add_modal(&mut self) {
        self.open_add_modal_at(Local::now().naive_local());
    }

    pub fn open_add_modal_at(&mut self, now: NaiveDateTime) {
        self.draft = EditState::blank(self.current_day, now);
        self.draft.visible = true;
    }

    /// Opens the draft for the event at `index` on the current day. The
    /// index is resolved to the event's id right away.
    pub fn open_edit_modal(&mut self, index: usize) -> bool {
        self.open_edit_modal_on(index, Local::now().date_naive())
    }

    pub fn open_edit_modal_on(&mut self, index: usize, today: NaiveDate) -> bool {
        let day = self.current_day;
        let Some(event) = self.week.event_at(day, index) else {
            tracing::warn!(%day, index, "no event to edit");
            return false;
        };

        let mut draft = EditState::blank(day, today.and_time(NaiveTime::MIN));
        draft.title = event.title.clone();
        draft.location = event.location.clone();
        draft.start = time_on(today, &event.start);
        draft.end = time_on(today, &event.end);
        draft.editing = Some(event.id);
        draft.visible = true;
        self.draft = draft;
        true
    }

    /// Commits the draft. Does nothing unless title and location are both
    /// non-blank.
    pub fn save(&mut self) -> bool {
        if !self.draft.can_save() {
            return false;
        }

        let day = self.draft.day;
        let mut event = Event::new(
            self.draft.title.trim(),
            self.draft.location.trim(),
            format_wall_time(self.draft.start),
            format_wall_time(self.draft.end),
        );

        match self.draft.editing {
            Some(id) => {
                event.id = id;
                if !self.week.replace(day, event.clone()) {
                    tracing::warn!(%day, "edited event no longer exists, adding it back");
                    self.week.add(day, event);
                }
            }
            None => self.week.add(day, event),
        }

        self.hide_modal();
        self.touch();
        true
    }

    /// Removes the event being edited
    pub fn delete_event(&mut self) -> bool {
        let Some(id) = self.draft.editing else {
            return false;
        };
        let removed = self.week.remove(self.draft.day, id).is_some();
        self.hide_modal();
        if removed {
            self.touch();
        }
        removed
    }

    /// Hides the modal; anything not saved is dropped except times already applied
    pub fn close_modal(&mut self) {
        self.hide_modal();
    }

    // Time picker

    pub fn show_picker(&mut self, mode: PickerMode) {
        self.draft.temp_time = Some(match mode {
            PickerMode::Start => self.draft.start,
            PickerMode::End => self.draft.end,
        });
        self.draft.picker_mode = Some(mode);
    }

    /// The picker surface reported a new candidate time
    pub fn picker_changed(&mut self, time: NaiveDateTime) {
        self.draft.temp_time = Some(time);
    }

    pub fn apply_time(&mut self) {
        if let (Some(time), Some(mode)) = (self.draft.temp_time, self.draft.picker_mode) {
            match mode {
                PickerMode::Start => self.draft.start = time,
                PickerMode::End => self.draft.end = time,
            }
        }
        self.draft.picker_mode = None;
        self.draft.temp_time = None;
    }

    /// A tap outside the picker commits the pending time
    pub fn tap_outside(&mut self) {
        self.apply_time();
    }

    // Persistence hooks

    /// Replaces the week with one read from storage. Not itself a change
    /// that needs saving.
    pub fn replace_week(&mut self, week: WeekSchedule) {
        self.week = week;
        self.persisted_revision = self.revision;
    }

    /// Snapshot to persist if the week changed since the last call
    pub fn take_pending_save(&mut self) -> Option<WeekSchedule> {
        if self.revision == self.persisted_revision {
            return None;
        }
        self.persisted_revision = self.revision;
        Some(self.week.clone())
    }

    fn hide_modal(&mut self) {
        self.draft.visible = false;
        self.draft.picker_mode = None;
        self.draft.temp_time = None;
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl Default for ScheduleController {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_wall_time(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// `"HH:MM"` on `date`; out-of-range parts fall back to midnight
fn time_on(date: NaiveDate, time: &str) -> NaiveDateTime {
    let (hour, minute) = super::geometry::parse_wall_time(time);
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}
