//! Cheap transcendental approximations.

/*
Fast Math
=========

The LA32 never evaluated an exact exponential or sine. Its amplitude curve,
its oscillator slopes and its resonance were all produced by small tables and
short polynomials, and the error of those approximations is part of the
sound. These functions reproduce that level of accuracy. They are NOT drop-in
replacements for `f32::exp2` / `f32::sin` elsewhere.

Vocabulary
----------

  octant      One eighth of a sine period (π/4). Every octant of sin(x) is
              either a sine or a cosine of a value in [0, π/4), so one pair
              of short polynomials covers the whole circle.

  mantissa    The fractional bits of an IEEE float. Adding n << 23 to the
              bit pattern of a float multiplies it by 2^n.


fast_exp2
---------

    2^x = 2^round(x) * 2^f,      f = x - round(x) in [-0.5, 0.5]

2^f comes from a fifth-order Taylor polynomial in ln 2, and 2^round(x) is
added straight into the exponent bits:

    poly(f) = 1 + 0.693147 f + 0.240226 f² + 0.0555041 f³
                + 0.00961812 f⁴ + 0.00133335 f⁵

    bits(2^x) = bits(poly(f)) + (round(x) << 23)


fast_sin / fast_cos
-------------------

    t = x * 4/π      (position in octants)
    i = floor(t) & 7 (which octant)
    f = frac(t)      (position inside the octant, 0..1)

Per octant we pick sin or cos of (π/4)·f or (π/4)·(1 - f), and a sign:

    octant  0     1          2     3          4      5          6      7
    value   sin f cos (1-f)  cos f sin (1-f)  -sin f -cos (1-f) -cos f -sin (1-f)

Both polynomials are odd/even in f and evaluated in f².
*/

use std::f32::consts::PI;

const EXP2_COEFFS: [f32; 5] = [0.693147, 0.240226, 0.0555041, 0.00961812, 0.00133335];

// sin(π/4·f)/f and cos(π/4·f), highest power first.
const SIN_COEFFS: [f32; 5] = [
    3.133_619_4E-7,
    -3.657_644_5E-5,
    0.002_490_395_6,
    -0.080_745_53,
    0.785_398_2,
];
const COS_COEFFS: [f32; 5] = [3.590_870_6E-6, -3.259_924_6E-4, 0.015_854_349, -0.308_425_2, 1.0];

// Per octant: use the cosine polynomial, mirror f, sign.
const OCTANTS: [(bool, bool, f32); 8] = [
    (false, false, 1.0),
    (true, true, 1.0),
    (true, false, 1.0),
    (false, true, 1.0),
    (false, false, -1.0),
    (true, true, -1.0),
    (true, false, -1.0),
    (false, true, -1.0),
];

/// Approximate `2^x`.
///
/// Inputs are clamped to `[-126, 127]` so the exponent trick never produces
/// a denormal or an infinity.
#[inline]
pub fn fast_exp2(x: f32) -> f32 {
    let x = x.clamp(-126.0, 127.0);
    let whole = x.round();
    let f = x - whole;

    let poly = ((((EXP2_COEFFS[4] * f + EXP2_COEFFS[3]) * f + EXP2_COEFFS[2]) * f
        + EXP2_COEFFS[1])
        * f
        + EXP2_COEFFS[0])
        * f
        + 1.0;

    let bits = (poly.to_bits() as i32).wrapping_add((whole as i32) << 23);
    f32::from_bits(bits as u32 & 0x7FFF_FFFF)
}

/// Approximate `sin(x)` for any finite `x`.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    let t = x * (4.0 / PI);
    let whole = t.floor();
    let mut f = t - whole;
    let (use_cos, mirror, sign) = OCTANTS[(whole as i64 & 7) as usize];

    if mirror {
        f = 1.0 - f;
    }
    let f2 = f * f;

    if use_cos {
        let c = &COS_COEFFS;
        sign * ((((c[0] * f2 + c[1]) * f2 + c[2]) * f2 + c[3]) * f2 + c[4])
    } else {
        let s = &SIN_COEFFS;
        sign * f * ((((s[0] * f2 + s[1]) * f2 + s[2]) * f2 + s[3]) * f2 + s[4])
    }
}

/// Approximate `cos(x)` for any finite `x`.
#[inline]
pub fn fast_cos(x: f32) -> f32 {
    fast_sin(x + PI / 2.0)
}
