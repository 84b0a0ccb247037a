//! Collaborators a partial talks to while it plays a note.
//!
//! The voice allocator and the part mixer live outside this crate. A partial
//! only needs the handful of values below from them, so they are traits; the
//! `HeldNote` and `StaticPart` implementations are enough to drive partials
//! directly (tests, benches, the scope binary).

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use crate::patch::{PatchCache, PatchTemp, RhythmTemp};

/// The note a partial belongs to.
pub trait Poly: Send + Sync {
    fn key(&self) -> u8;
    fn velocity(&self) -> u8;
    /// False once the key is released and nothing holds it (no pedal).
    fn can_sustain(&self) -> bool;
    /// Called once when partial `partial_index` stops playing this note.
    fn partial_deactivated(&self, partial_index: usize);
}

/// The part (channel) that owns the note.
pub trait Part: Send + Sync {
    fn patch_temp(&self) -> PatchTemp;
    /// 0..100.
    fn expression(&self) -> u8;
    /// System master volume, 0..100.
    fn master_volume(&self) -> u8;
    /// Current pitch bend in pitch units (4096 per octave).
    fn pitch_bend(&self) -> i32 {
        0
    }
    /// Modulation wheel, 0..100.
    fn modulation(&self) -> u8 {
        0
    }
}

/// Everything bound to a partial for the lifetime of one note.
#[derive(Clone)]
pub struct NoteContext {
    pub part: Arc<dyn Part>,
    pub poly: Arc<dyn Poly>,
    pub patch: Arc<PatchCache>,
    pub rhythm: Option<RhythmTemp>,
}

impl NoteContext {
    pub fn key(&self) -> i32 {
        self.poly.key() as i32
    }

    pub fn velocity(&self) -> i32 {
        self.poly.velocity() as i32
    }
}

impl std::fmt::Debug for NoteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteContext")
            .field("key", &self.poly.key())
            .field("velocity", &self.poly.velocity())
            .field("rhythm", &self.rhythm)
            .finish_non_exhaustive()
    }
}

/// A key that stays down until `release` is called.
///
/// Tracks which partials are still sounding it as a bitmask, so callers can
/// tell when the whole note has finished.
#[derive(Debug)]
pub struct HeldNote {
    key: u8,
    velocity: u8,
    held: AtomicBool,
    partials: AtomicU32,
}

impl HeldNote {
    pub fn new(key: u8, velocity: u8) -> Self {
        Self {
            key,
            velocity,
            held: AtomicBool::new(true),
            partials: AtomicU32::new(0),
        }
    }

    /// Record that partial `partial_index` is playing this note.
    pub fn assign(&self, partial_index: usize) {
        self.partials
            .fetch_or(partial_bit(partial_index), Ordering::AcqRel);
    }

    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    pub fn live_partials(&self) -> u32 {
        self.partials.load(Ordering::Acquire)
    }

    pub fn is_sounding(&self) -> bool {
        self.live_partials() != 0
    }
}

impl Poly for HeldNote {
    fn key(&self) -> u8 {
        self.key
    }

    fn velocity(&self) -> u8 {
        self.velocity
    }

    fn can_sustain(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    fn partial_deactivated(&self, partial_index: usize) {
        self.partials
            .fetch_and(!partial_bit(partial_index), Ordering::AcqRel);
    }
}

fn partial_bit(index: usize) -> u32 {
    1u32.checked_shl(index as u32).unwrap_or(0)
}

/// A part whose controllers only change when somebody calls the setters.
#[derive(Debug)]
pub struct StaticPart {
    panpot: AtomicU8,
    output_level: AtomicU8,
    expression: AtomicU8,
    master_volume: AtomicU8,
    pitch_bend: AtomicI32,
    modulation: AtomicU8,
}

impl StaticPart {
    pub fn new(patch_temp: PatchTemp) -> Self {
        Self {
            panpot: AtomicU8::new(patch_temp.panpot),
            output_level: AtomicU8::new(patch_temp.output_level),
            expression: AtomicU8::new(100),
            master_volume: AtomicU8::new(100),
            pitch_bend: AtomicI32::new(0),
            modulation: AtomicU8::new(0),
        }
    }

    pub fn set_panpot(&self, panpot: u8) {
        self.panpot.store(panpot, Ordering::Relaxed);
    }

    pub fn set_output_level(&self, level: u8) {
        self.output_level.store(level, Ordering::Relaxed);
    }

    pub fn set_expression(&self, expression: u8) {
        self.expression.store(expression, Ordering::Relaxed);
    }

    pub fn set_master_volume(&self, volume: u8) {
        self.master_volume.store(volume, Ordering::Relaxed);
    }

    pub fn set_pitch_bend(&self, bend: i32) {
        self.pitch_bend.store(bend, Ordering::Relaxed);
    }

    pub fn set_modulation(&self, modulation: u8) {
        self.modulation.store(modulation, Ordering::Relaxed);
    }
}

impl Default for StaticPart {
    fn default() -> Self {
        Self::new(PatchTemp::default())
    }
}

impl Part for StaticPart {
    fn patch_temp(&self) -> PatchTemp {
        PatchTemp {
            panpot: self.panpot.load(Ordering::Relaxed),
            output_level: self.output_level.load(Ordering::Relaxed),
        }
    }

    fn expression(&self) -> u8 {
        self.expression.load(Ordering::Relaxed)
    }

    fn master_volume(&self) -> u8 {
        self.master_volume.load(Ordering::Relaxed)
    }

    fn pitch_bend(&self) -> i32 {
        self.pitch_bend.load(Ordering::Relaxed)
    }

    fn modulation(&self) -> u8 {
        self.modulation.load(Ordering::Relaxed)
    }
}
