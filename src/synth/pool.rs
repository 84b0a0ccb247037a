use std::sync::Arc;

use log::{debug, error};

use crate::config::SynthConfig;
use crate::dsp::mix::{accumulate, interleave_stereo, mix_buffers_ring, mix_buffers_ring_mix};
use crate::error::Result;
use crate::patch::{PatchCache, RhythmTemp};
use crate::rom::PcmRom;
use crate::synth::context::{Part, Poly};
use crate::synth::partial::{MixType, Partial};
use crate::tables::Tables;
use crate::MAX_BLOCK_SIZE;

/// Fixed set of partials plus the per-tick rendering driver.
///
/// Pair links are pool indices. Every operation that can end a partial also
/// repairs the link on the other side, so a partial never points at a pair
/// that points somewhere else while both are live.
#[derive(Debug)]
pub struct PartialPool {
    tables: Arc<Tables>,
    partials: Vec<Partial>,
    scratch: Vec<i16>,
}

impl PartialPool {
    pub fn new(config: &SynthConfig, rom: Arc<PcmRom>) -> Result<Self> {
        config.validate()?;
        let tables = Arc::new(Tables::new(config.sample_rate));
        let partials = (0..config.partial_count)
            .map(|index| Partial::new(index, tables.clone(), rom.clone()))
            .collect();

        Ok(Self {
            tables,
            partials,
            scratch: vec![0; MAX_BLOCK_SIZE * 2],
        })
    }

    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn partial(&self, index: usize) -> Option<&Partial> {
        self.partials.get(index)
    }

    pub fn partials(&self) -> impl Iterator<Item = &Partial> {
        self.partials.iter()
    }

    pub fn activate(&mut self, index: usize, part_index: usize) -> bool {
        match self.partials.get_mut(index) {
            Some(partial) => {
                partial.activate(part_index);
                true
            }
            None => false,
        }
    }

    /// Start a note on partial `index`, optionally paired with another
    /// partial of the same structure. Precondition failures are logged and
    /// leave the partial as it was.
    pub fn start_partial(
        &mut self,
        index: usize,
        part: Arc<dyn Part>,
        poly: Option<Arc<dyn Poly>>,
        patch: Option<Arc<PatchCache>>,
        rhythm: Option<RhythmTemp>,
        pair: Option<usize>,
    ) -> bool {
        let len = self.partials.len();
        if index >= len {
            error!("start_partial: no partial {index} in a pool of {len}");
            return false;
        }
        let pair = pair.filter(|&p| {
            let valid = p < len && p != index;
            if !valid {
                error!("start_partial: partial {index} cannot pair with {p}");
            }
            valid
        });

        let old_pair = self.partials[index].pair();
        if !self.partials[index].start_partial(part, poly, patch, rhythm, pair) {
            return false;
        }

        // A previous partner that still points here belongs to an old note.
        let new_pair = self.partials[index].pair();
        if let Some(old) = old_pair.filter(|&old| Some(old) != new_pair) {
            if self.partials[old].pair() == Some(index) {
                self.partials[old].set_pair(None);
            }
        }
        true
    }

    /// Deactivate a partial and cut its pair link on both sides.
    pub fn deactivate(&mut self, index: usize) -> bool {
        let Some(partial) = self.partials.get_mut(index) else {
            return false;
        };
        let was_active = partial.deactivate();
        self.sever(index);
        was_active
    }

    pub fn deactivate_all(&mut self) {
        for index in 0..self.partials.len() {
            self.deactivate(index);
        }
    }

    fn sever(&mut self, index: usize) {
        let Some(pair) = self.partials[index].pair() else {
            return;
        };
        self.partials[index].set_pair(None);
        if self.partials[pair].pair() == Some(index) {
            self.partials[pair].set_pair(None);
        }
        debug!("partials {index} and {pair} unpaired");
    }

    /// Render partial `index` (and its ring-modulation slave) into
    /// interleaved stereo `out`. At most `MAX_BLOCK_SIZE` frames are
    /// rendered; everything in `out` past them is zeroed.
    ///
    /// Returns false when there was nothing to render: the partial is
    /// inactive, already rendered this tick, or a slave that only its
    /// master may render.
    pub fn produce_output(&mut self, index: usize, out: &mut [i16], frames: usize) -> bool {
        let Some(partial) = self.partials.get(index) else {
            return false;
        };
        if !partial.is_active() || partial.already_outputed() || partial.is_ring_modulating_slave() {
            return false;
        }
        if !partial.has_note() {
            error!("partial {index}: active without a note");
            return false;
        }

        let frames = frames.min(MAX_BLOCK_SIZE).min(out.len() / 2);
        let mix_type = partial.mix_type();
        let pair = partial.pair();

        let generated = self.partials[index].generate_samples(frames);

        if let Some(pair) = pair.filter(|_| mix_type.is_ring()) {
            let pair_generated = self.partials[pair].generate_samples(generated);

            if !self.partials[index].is_active() {
                self.deactivate(pair);
            } else if !self.partials[pair].is_active() {
                self.sever(index);
            }

            // Samples past the pair's output pass through unchanged.
            if pair_generated > 0 {
                let (master, slave) = two_mut(&mut self.partials, index, pair);
                let own = &mut master.buffer_mut()[..pair_generated];
                let other = Some(&slave.buffer()[..pair_generated]);
                if mix_type == MixType::RingMix {
                    mix_buffers_ring_mix(own, other);
                } else {
                    mix_buffers_ring(own, other);
                }
            }
        }

        // A partial that ended on its own no longer partners anyone.
        if !self.partials[index].is_active() {
            self.sever(index);
        }

        let partial = &self.partials[index];
        let (rendered, rest) = out.split_at_mut(frames * 2);
        interleave_stereo(&partial.buffer()[..generated], partial.pan(), rendered);
        rest.fill(0);
        true
    }

    /// Render one tick of every partial, summed with saturation into
    /// interleaved stereo `out`. Returns how many partials produced output.
    ///
    /// One tick covers at most `MAX_BLOCK_SIZE` frames; the rest of `out`
    /// is left silent.
    pub fn render(&mut self, out: &mut [i16]) -> usize {
        out.fill(0);
        let frames = (out.len() / 2).min(MAX_BLOCK_SIZE);
        let out = &mut out[..frames * 2];

        for partial in &mut self.partials {
            partial.clear_already_outputed();
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        let mut produced = 0;
        for index in 0..self.partials.len() {
            if self.produce_output(index, &mut scratch[..frames * 2], frames) {
                accumulate(out, &scratch[..frames * 2]);
                produced += 1;
            }
        }
        self.scratch = scratch;
        produced
    }

    pub fn start_decay_all(&mut self, index: usize) {
        if let Some(partial) = self.partials.get_mut(index) {
            partial.start_decay_all();
        }
    }

    /// Release every active partial owned by `part_index`.
    pub fn start_decay_part(&mut self, part_index: usize) {
        for partial in self.owned_by(part_index) {
            partial.start_decay_all();
        }
    }

    /// Let every sustaining partial of `part_index` follow a level change.
    pub fn recalc_sustain_part(&mut self, part_index: usize) {
        for partial in self.owned_by(part_index) {
            partial.recalc_sustain();
        }
    }

    pub fn free_partial_count(&self) -> usize {
        self.partials.iter().filter(|p| !p.is_active()).count()
    }

    pub fn first_free(&self) -> Option<usize> {
        self.partials.iter().position(|p| !p.is_active())
    }

    pub fn should_reverb(&self, index: usize) -> bool {
        self.partials.get(index).is_some_and(Partial::should_reverb)
    }

    fn owned_by(&mut self, part_index: usize) -> impl Iterator<Item = &mut Partial> {
        self.partials
            .iter_mut()
            .filter(move |p| p.owner_part() == Some(part_index))
    }
}

fn two_mut(partials: &mut [Partial], a: usize, b: usize) -> (&mut Partial, &mut Partial) {
    if a < b {
        let (left, right) = partials.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = partials.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
