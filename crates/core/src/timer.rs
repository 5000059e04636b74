//! Countdown timers addressed by generation-checked handles.
//!
//! The periodic source (a tokio interval, a test loop, ...) lives outside this
//! module and only ever calls [`Timers::tick`] with the handle it was given.
//! Stopping a timer frees its slot and bumps the slot generation, so any tick
//! still in flight for the old handle is ignored.

/// Handle to a countdown stored in a [`Timers`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: u32,
    generation: u32,
}

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining: u32, elapsed: u32 },
    /// Fired once; the countdown is released afterwards.
    Expired { elapsed: u32 },
}

/// Remaining/elapsed pair for one countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    elapsed: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining: duration_secs,
            elapsed: 0,
        }
    }

    /// Resume a countdown that already ran for `elapsed` seconds.
    #[must_use]
    pub fn resumed(remaining: u32, elapsed: u32) -> Self {
        Self { remaining, elapsed }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Advance by one second.
    ///
    /// Reaching zero (or ticking at zero) clamps `remaining` to 0 and reports
    /// `Expired`.
    pub fn advance(&mut self) -> TimerEvent {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.remaining <= 1 {
            self.remaining = 0;
            return TimerEvent::Expired {
                elapsed: self.elapsed,
            };
        }
        self.remaining -= 1;
        TimerEvent::Tick {
            remaining: self.remaining,
            elapsed: self.elapsed,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    countdown: Option<Countdown>,
}

/// Arena of running countdowns.
#[derive(Debug, Default)]
pub struct Timers {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh countdown.
    pub fn start(&mut self, duration_secs: u32) -> TimerHandle {
        self.insert(Countdown::new(duration_secs))
    }

    /// Start from an existing countdown state (used when resuming).
    pub fn insert(&mut self, countdown: Countdown) -> TimerHandle {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.countdown = Some(countdown);
            return TimerHandle {
                slot,
                generation: entry.generation,
            };
        }

        let slot = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            countdown: Some(countdown),
        });
        TimerHandle {
            slot,
            generation: 0,
        }
    }

    /// Tick the countdown behind `handle`.
    ///
    /// Returns `None` for a stale handle (stopped or already expired).
    pub fn tick(&mut self, handle: TimerHandle) -> Option<TimerEvent> {
        let event = self.live_mut(handle)?.advance();
        if matches!(event, TimerEvent::Expired { .. }) {
            self.release(handle.slot);
        }
        Some(event)
    }

    /// Stop the countdown. Returns `false` if the handle was already stale.
    pub fn stop(&mut self, handle: TimerHandle) -> bool {
        if self.live_mut(handle).is_none() {
            return false;
        }
        self.release(handle.slot);
        true
    }

    #[must_use]
    pub fn get(&self, handle: TimerHandle) -> Option<&Countdown> {
        let slot = self.slots.get(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.countdown.as_ref()
    }

    #[must_use]
    pub fn is_running(&self, handle: TimerHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of countdowns currently running.
    #[must_use]
    pub fn running(&self) -> usize {
        self.slots.iter().filter(|s| s.countdown.is_some()).count()
    }

    fn live_mut(&mut self, handle: TimerHandle) -> Option<&mut Countdown> {
        let slot = self.slots.get_mut(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.countdown.as_mut()
    }

    fn release(&mut self, slot: u32) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            entry.countdown = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.free.push(slot);
        }
    }
}
