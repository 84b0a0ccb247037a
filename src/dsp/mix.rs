/*
Partial Mixdown
===============

Two steps turn a partial's mono buffer into output frames.

Ring modulation
---------------

A structure may tie two partials together. The first partial (the master)
multiplies its own samples by the second's (the slave) before panning:

  ring-mix    out = out + out * pair        (dry master plus the product)
  ring        out = out * pair              (product only)

Results are saturated to full scale. When there is no pair buffer, or the
pair produced fewer samples than the master, the uncovered samples pass
through untouched.

Panning
-------

Pan settings run 0..14 with 7 in the centre and 14 hard left. They are split
into two integer coefficients that always sum to PAN_FULL_SCALE:

    left  = round(pan * PAN_FULL_SCALE / 14)
    right = PAN_FULL_SCALE - left

Split-pan structures squeeze each partial into its own half of the field:

    first  partial:  pan > 7 ? (pan - 7) * 2 : 0
    second partial:  pan < 7 ?  pan * 2      : 14
*/

/// Sum of the left and right pan coefficients.
pub const PAN_FULL_SCALE: i32 = 16384;
/// Highest pan setting (hard left).
pub const PAN_MAX: u8 = 14;
pub const PAN_CENTRE: u8 = 7;

#[inline]
pub fn saturate(sample: f32) -> f32 {
    sample.clamp(-1.0, 1.0)
}

/// `buf = buf + buf * pair`. Leaves `buf` untouched without a pair.
pub fn mix_buffers_ring_mix(buf: &mut [f32], pair: Option<&[f32]>) {
    let Some(pair) = pair else {
        return;
    };
    for (out, p) in buf.iter_mut().zip(pair) {
        *out = saturate(*out * *p + *out);
    }
}

/// `buf = buf * pair`. Leaves `buf` untouched without a pair.
pub fn mix_buffers_ring(buf: &mut [f32], pair: Option<&[f32]>) {
    let Some(pair) = pair else {
        return;
    };
    for (out, p) in buf.iter_mut().zip(pair) {
        *out = saturate(*out * *p);
    }
}

/// Left and right coefficients for a pan setting.
pub fn pan_coefficients(pan: u8) -> (i32, i32) {
    let pan = pan.min(PAN_MAX) as i32;
    let left = (pan * PAN_FULL_SCALE + PAN_MAX as i32 / 2) / PAN_MAX as i32;
    (left, PAN_FULL_SCALE - left)
}

/// Pan setting for one half of a split-pan structure.
pub fn split_pan(pan: u8, second: bool) -> u8 {
    let pan = pan.min(PAN_MAX);
    if !second {
        if pan > PAN_CENTRE {
            (pan - PAN_CENTRE) * 2
        } else {
            0
        }
    } else if pan < PAN_CENTRE {
        pan * 2
    } else {
        PAN_MAX
    }
}

#[inline]
fn to_i16(sample: f32, coefficient: i32) -> i16 {
    let scaled = sample * coefficient as f32 / PAN_FULL_SCALE as f32 * i16::MAX as f32;
    scaled.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Write `mono` as interleaved stereo frames into `out`, zero-filling every
/// frame of `out` past the end of `mono`.
pub fn interleave_stereo(mono: &[f32], (left, right): (i32, i32), out: &mut [i16]) {
    let mut frames = out.chunks_exact_mut(2);
    for (frame, &sample) in frames.by_ref().zip(mono) {
        frame[0] = to_i16(sample, left);
        frame[1] = to_i16(sample, right);
    }
    for frame in frames {
        frame.fill(0);
    }
}

/// Saturating sum of one interleaved buffer into another.
pub fn accumulate(acc: &mut [i16], src: &[i16]) {
    for (a, s) in acc.iter_mut().zip(src) {
        *a = a.saturating_add(*s);
    }
}
