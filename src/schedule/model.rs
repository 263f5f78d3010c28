use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Key under which the whole week is persisted
pub const STORAGE_KEY: &str = "shuukan_schedule_data";

/// Day of the week, Monday first. Declaration order is the index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Wraps around, so `from_index(7)` is Monday again
    pub fn from_index(index: usize) -> Day {
        Self::ALL[index % 7]
    }

    pub fn next(self) -> Day {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Day {
        Self::from_index(self.index() + 6)
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Day {
        Self::from_index(weekday.num_days_from_monday() as usize)
    }

    /// Calendar date of this weekday within the Monday-first week containing `today`
    pub fn date_in_week_of(self, today: NaiveDate) -> NaiveDate {
        let monday = today - Duration::days(Day::from_weekday(today.weekday()).index() as i64);
        monday + Duration::days(self.index() as i64)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Surrogate identity for an event, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// One calendar entry. `start`/`end` are 24-hour "HH:MM" wall-clock strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    // Records written before ids existed get a fresh one on load
    #[serde(default)]
    pub id: EventId,
    pub title: String,
    pub location: String,
    pub start: String,
    pub end: String,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            title: title.into(),
            location: location.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// The persisted aggregate: every day of the week mapped to its events,
/// kept ascending by `start` after each save.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSchedule {
    days: BTreeMap<Day, Vec<Event>>,
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self {
            days: Day::ALL.iter().map(|day| (*day, Vec::new())).collect(),
        }
    }

    pub fn events(&self, day: Day) -> &[Event] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn event_at(&self, day: Day, index: usize) -> Option<&Event> {
        self.events(day).get(index)
    }

    pub fn position_of(&self, day: Day, id: EventId) -> Option<usize> {
        self.events(day).iter().position(|e| e.id == id)
    }

    pub fn total_events(&self) -> usize {
        self.iter().map(|(_, events)| events.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Day, &[Event])> {
        self.days.iter().map(|(day, events)| (*day, events.as_slice()))
    }

    /// Appends and re-sorts the day
    pub fn add(&mut self, day: Day, event: Event) {
        let events = self.day_mut(day);
        events.push(event);
        sort_by_start(events);
    }

    /// Replaces the event with the same id in place and re-sorts the day.
    /// Returns false when no event with that id exists on `day`.
    pub fn replace(&mut self, day: Day, event: Event) -> bool {
        let events = self.day_mut(day);
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event;
                sort_by_start(events);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, day: Day, id: EventId) -> Option<Event> {
        let index = self.position_of(day, id)?;
        Some(self.day_mut(day).remove(index))
    }

    fn day_mut(&mut self, day: Day) -> &mut Vec<Event> {
        self.days.entry(day).or_default()
    }
}

impl Default for WeekSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<Day, Vec<Event>>> for WeekSchedule {
    fn from(stored: BTreeMap<Day, Vec<Event>>) -> Self {
        let mut week = WeekSchedule::new();
        week.days.extend(stored);
        week
    }
}

impl Serialize for WeekSchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.days.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeekSchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<Day, Vec<Event>>::deserialize(deserializer).map(WeekSchedule::from)
    }
}

/// Lexicographic on zero-padded "HH:MM", which is chronological. Stable.
fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| a.start.cmp(&b.start));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_week_has_every_day_empty() {
        let week = WeekSchedule::new();
        for day in Day::ALL {
            assert!(week.events(day).is_empty());
        }
        assert_eq!(week.iter().count(), 7);
    }

    #[test]
    fn day_index_wraps() {
        assert_eq!(Day::Mon.prev(), Day::Sun);
        assert_eq!(Day::Sun.next(), Day::Mon);
        assert_eq!(Day::from_index(13), Day::Sun);
    }

    #[test]
    fn adding_keeps_day_sorted_by_start() {
        let mut week = WeekSchedule::new();
        week.add(Day::Mon, Event::new("Standup", "Zoom", "09:00", "09:15"));
        assert_eq!(week.events(Day::Mon).len(), 1);

        week.add(Day::Mon, Event::new("Lunch", "Cafe", "08:00", "08:30"));
        let titles: Vec<&str> = week.events(Day::Mon).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Lunch", "Standup"]);
    }

    #[test]
    fn equal_starts_keep_insertion_order() {
        let mut week = WeekSchedule::new();
        week.add(Day::Tue, Event::new("First", "A", "10:00", "11:00"));
        week.add(Day::Tue, Event::new("Second", "B", "10:00", "10:30"));
        let titles: Vec<&str> = week.events(Day::Tue).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn sorted_after_every_add_for_all_starts() {
        let mut week = WeekSchedule::new();
        // Walk the day in an order that is far from sorted
        for step in 0..96u32 {
            let minutes = (step * 37) % (24 * 60);
            let start = format!("{:02}:{:02}", minutes / 60, minutes % 60);
            week.add(Day::Wed, Event::new("e", "l", start.clone(), start));
            let events = week.events(Day::Wed);
            assert!(events.windows(2).all(|pair| pair[0].start <= pair[1].start));
        }
    }

    #[test]
    fn replace_and_remove_use_identity() {
        let mut week = WeekSchedule::new();
        let standup = Event::new("Standup", "Zoom", "09:00", "09:15");
        let id = standup.id;
        week.add(Day::Fri, standup);
        week.add(Day::Fri, Event::new("Review", "Room 2", "10:00", "11:00"));

        let mut moved = week.events(Day::Fri)[0].clone();
        moved.start = "12:00".to_string();
        assert!(week.replace(Day::Fri, moved));
        assert_eq!(week.position_of(Day::Fri, id), Some(1));

        assert!(week.remove(Day::Fri, id).is_some());
        assert!(week.remove(Day::Fri, id).is_none());
        assert_eq!(week.events(Day::Fri).len(), 1);
    }

    #[test]
    fn serializes_as_day_keyed_map() {
        let mut week = WeekSchedule::new();
        week.add(Day::Mon, Event::new("Standup", "Zoom", "09:00", "09:15"));
        let json = serde_json::to_value(&week).unwrap();
        assert_eq!(json["Mon"][0]["title"], "Standup");
        assert_eq!(json["Sun"], serde_json::json!([]));
    }

    #[test]
    fn legacy_records_without_ids_load_and_missing_days_are_filled() {
        let raw = r#"{"Tue":[{"title":"Gym","location":"Club","start":"18:00","end":"19:00"}]}"#;
        let week: WeekSchedule = serde_json::from_str(raw).unwrap();
        assert_eq!(week.events(Day::Tue)[0].title, "Gym");
        assert!(week.events(Day::Mon).is_empty());
        assert_eq!(week.iter().count(), 7);
    }

    #[test]
    fn date_in_week_is_monday_first() {
        // 2026-10-16 is a Friday
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(Day::Mon.date_in_week_of(today), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
        assert_eq!(Day::Sun.date_in_week_of(today), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(Day::from_weekday(today.weekday()), Day::Fri);
    }
}
