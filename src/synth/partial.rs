use std::sync::Arc;

use log::{debug, error};

use crate::dsp::mix::{pan_coefficients, split_pan};
use crate::dsp::{PcmPlayer, SynthWave};
use crate::patch::{PatchCache, RhythmTemp};
use crate::rom::{PcmRom, PcmWave};
use crate::synth::context::{NoteContext, Part, Poly};
use crate::synth::tva::Tva;
use crate::synth::tvf::{cutoff_code, Tvf};
use crate::synth::tvp::Tvp;
use crate::tables::Tables;
use crate::MAX_BLOCK_SIZE;

/// How the two partials of a structure combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixType {
    Normal,
    /// Master plus master times slave.
    RingMix,
    /// Master times slave only.
    Ring,
    /// Each partial panned into its own half, no interaction.
    SplitPan,
}

impl MixType {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => MixType::RingMix,
            2 => MixType::Ring,
            3 => MixType::SplitPan,
            _ => MixType::Normal,
        }
    }

    pub fn is_ring(self) -> bool {
        matches!(self, MixType::RingMix | MixType::Ring)
    }
}

/// Which half of a structure a partial plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructurePosition {
    First,
    Second,
}

impl From<u8> for StructurePosition {
    fn from(position: u8) -> Self {
        if position == 0 {
            StructurePosition::First
        } else {
            StructurePosition::Second
        }
    }
}

/// Sample source, chosen once per note.
#[derive(Debug, Clone)]
pub enum Generator {
    Idle,
    Pcm(PcmPlayer),
    Synth(SynthWave),
}

/// PCM programs per bank.
const PCM_BANK_SIZE: usize = 128;

/// One LA32 voice unit: a sample source shaped by its own TVA, TVP and TVF.
///
/// A partial renders mono into its own buffer. Pairing, ring modulation and
/// stereo output are driven by the `PartialPool` that owns it.
#[derive(Debug)]
pub struct Partial {
    index: usize,
    tables: Arc<Tables>,
    rom: Arc<PcmRom>,

    owner_part: Option<usize>,
    note: Option<NoteContext>,

    tva: Tva,
    tvp: Tvp,
    tvf: Tvf,
    generator: Generator,

    mix_type: MixType,
    structure_position: StructurePosition,
    pair: Option<usize>,
    pan: (i32, i32),
    pulse_width: u8,

    play: bool,
    already_outputed: bool,
    buffer: Box<[f32]>,
}

impl Partial {
    pub fn new(index: usize, tables: Arc<Tables>, rom: Arc<PcmRom>) -> Self {
        Self {
            index,
            tva: Tva::new(tables.clone()),
            tvp: Tvp::new(tables.clone()),
            tvf: Tvf::new(tables.clone()),
            tables,
            rom,
            owner_part: None,
            note: None,
            generator: Generator::Idle,
            mix_type: MixType::Normal,
            structure_position: StructurePosition::First,
            pair: None,
            pan: pan_coefficients(7),
            pulse_width: 0,
            play: false,
            already_outputed: false,
            buffer: vec![0.0; MAX_BLOCK_SIZE].into_boxed_slice(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Assign the partial to a part ahead of `start_partial`.
    pub fn activate(&mut self, part_index: usize) {
        self.owner_part = Some(part_index);
    }

    /// Release the partial and tell its note. Pair links are left to the
    /// pool. Returns false if it was already inactive.
    pub fn deactivate(&mut self) -> bool {
        if self.owner_part.take().is_none() {
            return false;
        }
        if let Some(note) = &self.note {
            note.poly.partial_deactivated(self.index);
        }
        debug!("partial {} deactivated", self.index);
        true
    }

    pub fn owner_part(&self) -> Option<usize> {
        self.owner_part
    }

    pub fn is_active(&self) -> bool {
        self.owner_part.is_some()
    }

    pub fn has_note(&self) -> bool {
        self.note.is_some()
    }

    pub fn is_pcm(&self) -> bool {
        matches!(self.generator, Generator::Pcm(_))
    }

    pub fn pcm_wave(&self) -> Option<PcmWave> {
        match &self.generator {
            Generator::Pcm(player) => Some(player.wave()),
            _ => None,
        }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn mix_type(&self) -> MixType {
        self.mix_type
    }

    pub fn structure_position(&self) -> StructurePosition {
        self.structure_position
    }

    pub fn pair(&self) -> Option<usize> {
        self.pair
    }

    pub(crate) fn set_pair(&mut self, pair: Option<usize>) {
        self.pair = pair;
    }

    pub fn has_ring_modulating_slave(&self) -> bool {
        self.pair.is_some()
            && self.structure_position == StructurePosition::First
            && self.mix_type.is_ring()
    }

    pub fn is_ring_modulating_slave(&self) -> bool {
        self.pair.is_some()
            && self.structure_position == StructurePosition::Second
            && self.mix_type.is_ring()
    }

    /// False once the sample source itself has run out.
    pub fn play(&self) -> bool {
        self.play
    }

    pub fn already_outputed(&self) -> bool {
        self.already_outputed
    }

    pub fn clear_already_outputed(&mut self) {
        self.already_outputed = false;
    }

    pub fn pulse_width(&self) -> u8 {
        self.pulse_width
    }

    /// Left and right pan coefficients.
    pub fn pan(&self) -> (i32, i32) {
        self.pan
    }

    pub fn tva(&self) -> &Tva {
        &self.tva
    }

    pub fn tvp(&self) -> &Tvp {
        &self.tvp
    }

    pub fn tvf(&self) -> &Tvf {
        &self.tvf
    }

    /// Mono samples from the last `generate_samples` call.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut [f32] {
        &mut self.buffer
    }

    /// Bind a new note. Without a poly or a patch, or with a PCM wave the ROM
    /// does not have, the call is logged and the partial is left untouched.
    pub fn start_partial(
        &mut self,
        part: Arc<dyn Part>,
        poly: Option<Arc<dyn Poly>>,
        patch: Option<Arc<PatchCache>>,
        rhythm: Option<RhythmTemp>,
        pair: Option<usize>,
    ) -> bool {
        let (Some(poly), Some(patch)) = (poly, patch) else {
            error!(
                "partial {}: start for part {:?} without a poly or patch",
                self.index, self.owner_part
            );
            return false;
        };

        let wg = &patch.partial_param.wg;
        let pulse_width = ((poly.velocity() as i32 - 64) * (wg.pulse_width_velo_sensitivity as i32 - 7)
            + self.tables.pulse_width_100_to_255[wg.pulse_width.min(100) as usize] as i32)
            .clamp(0, 255) as u8;

        let generator = if patch.pcm_partial {
            let mut pcm = patch.pcm;
            if self.rom.pcm_count() > PCM_BANK_SIZE && patch.waveform > 1 {
                pcm += PCM_BANK_SIZE;
            }
            let Some(wave) = self.rom.wave(pcm) else {
                error!("partial {}: PCM wave {pcm} is not in the ROM", self.index);
                return false;
            };
            Generator::Pcm(PcmPlayer::new(wave))
        } else {
            Generator::Synth(SynthWave::new(
                pulse_width,
                patch.waveform & 1 != 0,
                patch.partial_param.tvf.resonance,
            ))
        };

        let mut mix_type = MixType::from_code(patch.structure_mix);
        let position = StructurePosition::from(patch.structure_position);
        let mut pair = pair;
        let mut pan = rhythm.map_or_else(|| part.patch_temp().panpot, |r| r.panpot);
        if mix_type == MixType::SplitPan {
            pan = split_pan(pan, position == StructurePosition::Second);
            mix_type = MixType::Normal;
            pair = None;
        }

        self.generator = generator;
        self.pulse_width = pulse_width;
        self.mix_type = mix_type;
        self.structure_position = position;
        self.pair = pair;
        self.pan = pan_coefficients(pan);
        self.play = true;
        self.already_outputed = false;
        self.buffer.fill(0.0);

        let note = NoteContext {
            part,
            poly,
            patch,
            rhythm,
        };
        self.tva.reset(&note, self.is_ring_modulating_slave());
        self.tvp.reset(&note);
        self.tvf.reset(&note, self.tvp.base_pitch());

        debug!(
            "partial {} started: part {:?}, key {}, {}, {:?}",
            self.index,
            self.owner_part,
            note.key(),
            if self.is_pcm() { "pcm" } else { "synth" },
            self.mix_type,
        );
        self.note = Some(note);
        true
    }

    /// Render up to `length` mono samples into the partial's buffer.
    ///
    /// Returns how many were written. Fewer than `length` means the note
    /// ended during this block and the partial has deactivated itself.
    pub fn generate_samples(&mut self, length: usize) -> usize {
        if !self.is_active() || self.already_outputed {
            return 0;
        }
        let Some(note) = self.note.as_ref() else {
            error!("partial {}: active without a note", self.index);
            return 0;
        };
        self.already_outputed = true;

        let length = length.min(MAX_BLOCK_SIZE);
        let sample_rate = self.tables.sample_rate;
        let mut finished = false;
        let mut written = 0;

        while written < length {
            let amp = self.tva.next_amp(note);
            if !self.tva.is_playing() {
                finished = true;
                break;
            }

            let pitch = self.tvp.next_pitch(note);
            let freq = self.tables.freq(pitch);

            let sample = match &mut self.generator {
                Generator::Pcm(player) => {
                    let data = self.rom.wave_data(&player.wave());
                    match player.next_sample(freq, sample_rate, data) {
                        Some(sample) => sample,
                        None => {
                            self.play = false;
                            finished = true;
                            break;
                        }
                    }
                }
                Generator::Synth(wave) => {
                    let modifier = self.tvf.next_cutoff_modifier(note);
                    let code = cutoff_code(self.tvf.base_cutoff(), modifier);
                    wave.next_sample(freq, code, &self.tables)
                }
                Generator::Idle => 0.0,
            };

            self.buffer[written] = sample * amp;
            written += 1;
        }

        if finished {
            self.deactivate();
        }
        written
    }

    pub fn start_decay_all(&mut self) {
        if let Some(note) = &self.note {
            self.tva.start_decay(note);
            self.tvp.start_decay(note);
            self.tvf.start_decay(note);
        }
    }

    pub fn recalc_sustain(&mut self) {
        if let Some(note) = &self.note {
            self.tva.recalc_sustain(note);
        }
    }

    pub fn should_reverb(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.note
            .as_ref()
            .is_some_and(|note| note.rhythm.map_or(note.patch.reverb, |r| r.reverb))
    }
}
