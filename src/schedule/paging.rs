//! Circular day paging.
//!
//! The seven real days are shown through a nine page strip with a copy of
//! Sunday in front and a copy of Monday behind:
//!
//! ```text
//! extended: 0    1    2    3    4    5    6    7    8
//! day:      Sun  Mon  Tue  Wed  Thu  Fri  Sat  Sun  Mon
//! ```
//!
//! Dragging onto a copy is allowed, and once the gesture settles the
//! strip jumps (unanimated) to the real page for that day. The copies
//! only exist here; the controller only ever sees real days.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::controller::ScheduleController;
use super::model::Day;
use super::Wake;

pub const EXTENDED_LEN: usize = 9;

/// Real Monday; where the strip starts
pub const INITIAL_EXTENDED_INDEX: usize = 1;

pub const DEFAULT_SNAP_DELAY: Duration = Duration::from_millis(10);

pub fn day_at(extended: usize) -> Option<Day> {
    match extended {
        0 => Some(Day::Sun),
        8 => Some(Day::Mon),
        1..=7 => Some(Day::from_index(extended - 1)),
        _ => None,
    }
}

/// Real page of a day
pub fn extended_index_for(day: Day) -> usize {
    day.index() + 1
}

pub fn extended_days() -> [Day; EXTENDED_LEN] {
    let mut days = [Day::Mon; EXTENDED_LEN];
    for (i, slot) in days.iter_mut().enumerate() {
        *slot = day_at(i).unwrap_or(Day::Mon);
    }
    days
}

/// Who moved the strip last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    User,
    Programmatic,
}

/// Jump the strip to `to` without animation and make `day` current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snap {
    pub to: usize,
    pub day: Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    /// Programmatic scroll landed; nothing to correct
    Ignore,
    SelectDay(Day),
    /// Landed on a copy; correct after the gesture has settled
    SnapAfterDelay(Snap),
}

/// Wrap-correction protocol for the nine page strip
#[derive(Debug)]
pub struct CircularPager {
    rendered: usize,
    origin: ScrollOrigin,
}

impl CircularPager {
    pub fn new() -> Self {
        Self {
            rendered: INITIAL_EXTENDED_INDEX,
            origin: ScrollOrigin::User,
        }
    }

    pub fn rendered_index(&self) -> usize {
        self.rendered
    }

    pub fn origin(&self) -> ScrollOrigin {
        self.origin
    }

    pub fn begin_drag(&mut self) {
        self.origin = ScrollOrigin::User;
    }

    /// Index-driven scroll (header arrows). Returns the page to animate to.
    pub fn scroll_to_day(&mut self, day: Day) -> usize {
        self.origin = ScrollOrigin::Programmatic;
        extended_index_for(day)
    }

    /// The surface reports which page is now visible
    pub fn on_visible_changed(&mut self, index: usize) -> PageAction {
        self.rendered = index.min(EXTENDED_LEN - 1);
        if self.origin == ScrollOrigin::Programmatic {
            return PageAction::Ignore;
        }

        match self.rendered {
            0 => PageAction::SnapAfterDelay(Snap { to: 7, day: Day::Sun }),
            8 => PageAction::SnapAfterDelay(Snap { to: 1, day: Day::Mon }),
            i => PageAction::SelectDay(Day::from_index(i - 1)),
        }
    }

    pub fn apply_snap(&mut self, snap: Snap) {
        self.rendered = snap.to;
    }
}

impl Default for CircularPager {
    fn default() -> Self {
        Self::new()
    }
}

/// Delayed snaps as runtime tasks. Dropping the scheduler aborts any that
/// have not fired yet. `wake` runs after each snap is sent.
pub struct SnapScheduler {
    runtime: Handle,
    tx: Sender<Snap>,
    wake: Wake,
    delay: Duration,
    pending: Vec<JoinHandle<()>>,
}

impl SnapScheduler {
    pub fn new(runtime: Handle, tx: Sender<Snap>, delay: Duration, wake: Wake) -> Self {
        Self {
            runtime,
            tx,
            wake,
            delay,
            pending: Vec::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, snap: Snap) {
        self.pending.retain(|task| !task.is_finished());

        let tx = self.tx.clone();
        let wake = Wake::clone(&self.wake);
        let delay = self.delay;
        self.pending.push(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the view is gone
            if tx.send(snap).is_ok() {
                wake();
            }
        }));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|task| !task.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        for task in self.pending.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SnapScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Horizontal position of the strip, in pages. Drives drag, settle
/// animation and unanimated jumps for the view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMotion {
    offset: f32,
    target: usize,
    settled: bool,
}

impl PageMotion {
    /// Fraction of a page a drag must travel to turn the page
    pub const TURN_THRESHOLD: f32 = 0.25;
    /// Pages per second that count as a fling
    pub const FLING_THRESHOLD: f32 = 1.5;
    const SETTLE_EPSILON: f32 = 0.002;
    const SETTLE_RATE: f32 = 14.0;

    pub fn at(index: usize) -> Self {
        Self {
            offset: index as f32,
            target: index,
            settled: true,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Follow the finger; `pages` is positive when moving towards later days
    pub fn drag_by(&mut self, pages: f32) {
        self.settled = false;
        self.offset = (self.offset + pages).clamp(0.0, (EXTENDED_LEN - 1) as f32);
    }

    /// Finger lifted: pick the page to settle on. The strip lands on the
    /// page it was dragged to, turning one more page once the partial
    /// travel passes the threshold. `fling` is in pages per second,
    /// positive towards later days, and always turns at least one page.
    pub fn release(&mut self, fling: f32) -> usize {
        let offset = self.offset;
        let mut page = if offset >= self.target as f32 {
            offset.floor() + if offset.fract() > Self::TURN_THRESHOLD { 1.0 } else { 0.0 }
        } else {
            offset.ceil() - if offset.ceil() - offset > Self::TURN_THRESHOLD { 1.0 } else { 0.0 }
        };
        if fling > Self::FLING_THRESHOLD && page <= offset {
            page = offset.floor() + 1.0;
        } else if fling < -Self::FLING_THRESHOLD && page >= offset {
            page = offset.ceil() - 1.0;
        }
        self.animate_to(page.clamp(0.0, (EXTENDED_LEN - 1) as f32) as usize);
        self.target
    }

    pub fn animate_to(&mut self, index: usize) {
        self.target = index.min(EXTENDED_LEN - 1);
        self.settled = false;
    }

    pub fn jump_to(&mut self, index: usize) {
        *self = Self::at(index.min(EXTENDED_LEN - 1));
    }

    /// Advance the settle animation by `dt` seconds. Returns the page once
    /// the strip comes to rest on it.
    pub fn step(&mut self, dt: f32) -> Option<usize> {
        if self.settled {
            return None;
        }
        let goal = self.target as f32;
        let t = (dt * Self::SETTLE_RATE).clamp(0.0, 1.0);
        self.offset += (goal - self.offset) * t;
        if (goal - self.offset).abs() < Self::SETTLE_EPSILON {
            self.offset = goal;
            self.settled = true;
            return Some(self.target);
        }
        None
    }
}

/// Everything the day view drives: the wrap-correction protocol, the strip
/// position and the pending corrections. Settled pages and fired snaps are
/// applied straight to the controller.
pub struct DayStrip {
    pager: CircularPager,
    motion: PageMotion,
    snaps: SnapScheduler,
    snap_rx: Receiver<Snap>,
}

impl DayStrip {
    pub fn new(runtime: Handle, snap_delay: Duration, wake: Wake) -> Self {
        let (tx, snap_rx) = channel();
        Self {
            pager: CircularPager::new(),
            motion: PageMotion::at(INITIAL_EXTENDED_INDEX),
            snaps: SnapScheduler::new(runtime, tx, snap_delay, wake),
            snap_rx,
        }
    }

    pub fn motion(&self) -> &PageMotion {
        &self.motion
    }

    pub fn rendered_index(&self) -> usize {
        self.pager.rendered_index()
    }

    /// Animate to the real page of `day` (header arrows)
    pub fn show_day(&mut self, day: Day) {
        let target = self.pager.scroll_to_day(day);
        self.motion.animate_to(target);
    }

    pub fn begin_drag(&mut self) {
        self.pager.begin_drag();
    }

    pub fn drag_by(&mut self, pages: f32) {
        self.motion.drag_by(pages);
    }

    pub fn release(&mut self, fling: f32) -> usize {
        let target = self.motion.release(fling);
        tracing::debug!(target, "drag released");
        target
    }

    /// Advance the settle animation, reporting the page if it came to rest
    pub fn step(&mut self, dt: f32, controller: &mut ScheduleController) {
        if let Some(index) = self.motion.step(dt) {
            self.settle_on(index, controller);
        }
    }

    pub fn settle_on(&mut self, index: usize, controller: &mut ScheduleController) {
        tracing::debug!(index, origin = ?self.pager.origin(), "page settled");
        match self.pager.on_visible_changed(index) {
            PageAction::Ignore => {}
            PageAction::SelectDay(day) => controller.set_current_day(day),
            PageAction::SnapAfterDelay(snap) => {
                self.snaps.schedule(snap);
                tracing::debug!(pending = self.snaps.pending_count(), "wrap correction scheduled");
            }
        }
    }

    /// Apply every correction that has fired. Returns whether any did.
    pub fn apply_due_snaps(&mut self, controller: &mut ScheduleController) -> bool {
        let mut applied = false;
        while let Ok(snap) = self.snap_rx.try_recv() {
            tracing::debug!(to = snap.to, day = %snap.day, "wrapping strip");
            self.pager.apply_snap(snap);
            self.motion.jump_to(snap.to);
            controller.set_current_day(snap.day);
            applied = true;
        }
        applied
    }
}
