//! Interpolation.
//!
//! The server sends discrete snapshots stamped with its own clock.
//! The client renders at its own rate, a fixed delay behind the estimated
//! server clock, picking (or blending) from a bounded, time-ordered history.

use std::{borrow::Cow, cmp::Ordering};

use arena_shared::{
    config::{EvictionPolicy, SelectionMode},
    math::Vec2,
    net::{Enemy, Snapshot},
};
use tracing::debug;

/// Default render delay behind the server clock, milliseconds.
pub const RENDER_DELAY_MS: f64 = 70.0;

/// Default snapshot history length.
pub const BUFFER_CAPACITY: usize = 1000;

/// Inserts `item` into an already sorted `vec`, keeping it sorted under `cmp`.
///
/// Equal elements keep arrival order: the new item goes after them.
pub fn insert_sorted<T, F>(vec: &mut Vec<T>, item: T, mut cmp: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let idx = vec.partition_point(|probe| cmp(probe, &item) != Ordering::Greater);
    vec.insert(idx, item);
    idx
}

/// Bounded snapshot history, ascending by timestamp.
#[derive(Debug)]
pub struct SnapshotBuffer {
    history: Vec<Snapshot>,
    capacity: usize,
    policy: EvictionPolicy,
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::new(BUFFER_CAPACITY, EvictionPolicy::default())
    }
}

impl SnapshotBuffer {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            history: Vec::new(),
            capacity: capacity.max(1),
            policy,
        }
    }

    /// Inserts a snapshot at its timestamp position, then enforces capacity.
    ///
    /// Returns the snapshot evicted to make room, if any.
    pub fn insert(&mut self, snap: Snapshot) -> Option<Snapshot> {
        insert_sorted(&mut self.history, snap, |a, b| a.timestamp.cmp(&b.timestamp));
        if self.history.len() <= self.capacity {
            return None;
        }
        let evicted = match self.policy {
            EvictionPolicy::EvictOldest => self.history.remove(0),
            EvictionPolicy::EvictNewest => self.history.pop()?,
        };
        debug!(timestamp = evicted.timestamp, policy = ?self.policy, "Evicted snapshot");
        Some(evicted)
    }

    /// Finds the adjacent pair with `a.timestamp <= target <= b.timestamp`.
    pub fn bracket(&self, target: f64) -> Option<(&Snapshot, &Snapshot)> {
        self.history.windows(2).find_map(|pair| {
            let (a, b) = (&pair[0], &pair[1]);
            (a.timestamp as f64 <= target && target <= b.timestamp as f64).then_some((a, b))
        })
    }

    /// Returns the snapshot nearest to `target` among a bracketing pair.
    ///
    /// Ties go to the older snapshot. A target past the newest entry gets the
    /// newest, so a stalled or closed feed keeps showing its last state. Any
    /// other miss (single entry, target before the oldest) gets the oldest.
    pub fn closest_to(&self, target: f64) -> Option<&Snapshot> {
        if let Some((a, b)) = self.bracket(target) {
            let da = (target - a.timestamp as f64).abs();
            let db = (b.timestamp as f64 - target).abs();
            return Some(if db < da { b } else { a });
        }
        match self.newest() {
            Some(newest) if target > newest.timestamp as f64 => Some(newest),
            _ => self.oldest(),
        }
    }

    pub fn oldest(&self) -> Option<&Snapshot> {
        self.history.first()
    }

    pub fn newest(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.history.iter()
    }

    /// Returns the number of buffered snapshots.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if no snapshots are buffered.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Maps local monotonic time onto the server's timestamp domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockOffset {
    pub server_epoch: i64,
    pub local_epoch: f64,
}

impl ClockOffset {
    pub fn server_now(&self, local_now: f64) -> f64 {
        self.server_epoch as f64 + (local_now - self.local_epoch)
    }
}

/// Linear interpolation of `y` at `target` between `(t1, y1)` and `(t2, y2)`.
///
/// Coincident sample times yield `y1`.
pub fn interpolate(y1: f32, y2: f32, t1: f64, t2: f64, target: f64) -> f32 {
    if t1 == t2 {
        return y1;
    }
    let alpha = ((target - t1) / (t2 - t1)) as f32;
    y1 + (y2 - y1) * alpha
}

/// Chooses the snapshot to display each frame.
#[derive(Debug)]
pub struct Selector {
    offset: Option<ClockOffset>,
    render_delay_ms: f64,
    mode: SelectionMode,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(RENDER_DELAY_MS, SelectionMode::default())
    }
}

impl Selector {
    pub fn new(render_delay_ms: f64, mode: SelectionMode) -> Self {
        Self {
            offset: None,
            render_delay_ms,
            mode,
        }
    }

    /// Records the clock offset from the first snapshot seen. Later calls are no-ops.
    ///
    /// Returns true when this call set the offset.
    pub fn observe(&mut self, server_timestamp: i64, local_now: f64) -> bool {
        if self.offset.is_some() {
            return false;
        }
        self.offset = Some(ClockOffset {
            server_epoch: server_timestamp,
            local_epoch: local_now,
        });
        debug!(server_timestamp, local_now, "Clock offset captured");
        true
    }

    pub fn offset(&self) -> Option<ClockOffset> {
        self.offset
    }

    pub fn render_delay_ms(&self) -> f64 {
        self.render_delay_ms
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Estimated server clock at `local_now`.
    pub fn server_now(&self, local_now: f64) -> Option<f64> {
        self.offset.map(|o| o.server_now(local_now))
    }

    /// Server time to render at `local_now`.
    pub fn target(&self, local_now: f64) -> Option<f64> {
        self.server_now(local_now).map(|now| now - self.render_delay_ms)
    }

    /// Nearest buffered snapshot to the render target.
    pub fn select<'a>(&self, buf: &'a SnapshotBuffer, local_now: f64) -> Option<&'a Snapshot> {
        buf.closest_to(self.target(local_now)?)
    }

    /// Display snapshot according to the configured mode.
    ///
    /// Nearest selection borrows from the buffer; blending builds a new snapshot.
    pub fn display<'a>(
        &self,
        buf: &'a SnapshotBuffer,
        local_now: f64,
    ) -> Option<Cow<'a, Snapshot>> {
        let target = self.target(local_now)?;
        match self.mode {
            SelectionMode::Nearest => buf.closest_to(target).map(Cow::Borrowed),
            SelectionMode::Blend => match buf.bracket(target) {
                Some((a, b)) => Some(Cow::Owned(blend(a, b, target))),
                None => buf.closest_to(target).map(Cow::Borrowed),
            },
        }
    }
}

/// Blends two snapshots at `target`, `a` older than `b`.
///
/// Enemies are matched by username; bullets only blend when both snapshots
/// carry the same number, otherwise the nearer snapshot's bullets are kept.
pub fn blend(a: &Snapshot, b: &Snapshot, target: f64) -> Snapshot {
    let (ta, tb) = (a.timestamp as f64, b.timestamp as f64);
    let alpha = interpolate(0.0, 1.0, ta, tb, target);
    let lerp = |p: Vec2, q: Vec2| p.lerp(q, alpha);
    let nearer = if (tb - target).abs() < (target - ta).abs() { b } else { a };

    let enemies = nearer
        .enemies
        .iter()
        .map(|e| {
            let from = a.enemies.iter().find(|o| o.username == e.username);
            let to = b.enemies.iter().find(|o| o.username == e.username);
            match (from, to) {
                (Some(from), Some(to)) => Enemy {
                    coords: lerp(from.coords, to.coords),
                    dir: e.dir,
                    username: e.username.clone(),
                },
                _ => e.clone(),
            }
        })
        .collect();

    let bullets = if a.bullets.len() == b.bullets.len() {
        a.bullets
            .iter()
            .zip(&b.bullets)
            .map(|(p, q)| lerp(*p, *q))
            .collect()
    } else {
        nearer.bullets.clone()
    };

    Snapshot {
        timestamp: target.round() as i64,
        my_coords: lerp(a.my_coords, b.my_coords),
        enemies,
        bullets,
    }
}
