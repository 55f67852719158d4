//! Astrological Weighting: scans free text for planet and zodiac names.
//!
//! Every hit multiplies the running factor, so a text naming a planet and a sign
//! compounds both weights before the final clamp.

pub const MIN_ASTROLOGY: f64 = 0.6;
pub const MAX_ASTROLOGY: f64 = 1.4;

const PLANETS: [(&str, f64); 10] = [
    ("sun", 1.4),
    ("moon", 1.3),
    ("mercury", 1.2),
    ("venus", 1.25),
    ("earth", 1.15),
    ("mars", 1.3),
    ("jupiter", 1.35),
    ("saturn", 1.2),
    ("neptune", 1.25),
    ("pluto", 1.3),
];

const ZODIAC: [(&str, f64); 12] = [
    ("aries", 1.25),
    ("taurus", 1.15),
    ("gemini", 1.15),
    ("cancer", 1.2),
    ("leo", 1.3),
    ("virgo", 1.1),
    ("libra", 1.15),
    ("scorpio", 1.25),
    ("sagittarius", 1.2),
    ("capricorn", 1.1),
    ("aquarius", 1.2),
    ("pisces", 1.15),
];

/// Compounded planetary/zodiac weight clamped to `[0.6, 1.4]`; `1.0` for empty text.
pub fn astrology_factor(text: Option<&str>) -> f64 {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return 1.0;
    };
    let lower = text.to_lowercase();

    let factor = PLANETS
        .iter()
        .chain(ZODIAC.iter())
        .filter(|(name, _)| lower.contains(name))
        .fold(1.0, |acc, (_, w)| acc * w);

    factor.clamp(MIN_ASTROLOGY, MAX_ASTROLOGY)
}
