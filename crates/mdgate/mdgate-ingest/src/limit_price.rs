//! Limit-price ratio derivation and fallback band construction (§4.7).

/// Board-code prefixes that trade on a 20% daily limit band.
const WIDE_BAND_PREFIXES: [&[u8]; 2] = [b"30", b"68"];

/// Derives the daily limit ratio for a symbol from its six-digit numeric
/// code and whether it carries an ST designation. ChiNext (prefix `30`) and
/// STAR Market (prefix `68`) trade at 20%; ST-designated securities trade
/// at 5%; everything else trades at the default 10%.
pub fn deduce_limit_ratio(numeric_code: &[u8], is_st: bool) -> f64 {
    if numeric_code.len() >= 2 && WIDE_BAND_PREFIXES.contains(&&numeric_code[..2]) {
        0.20
    } else if is_st {
        0.05
    } else {
        0.10
    }
}

/// Rounds an x10000-scaled price to the nearest cent (0.01 yuan, i.e. the
/// nearest multiple of 100 in x10000 units), matching `RoundPriceToX10000`.
fn round_to_cent_x10000(x10000: f64) -> i64 {
    (x10000 / 100.0).round() as i64 * 100
}

/// Builds an upper/lower limit-price fallback from a previous close and a
/// ratio, rounding each bound to the cent before scaling (§4.6:
/// `round(pre_close × (1 ± ratio) × 100) / 100`, then x10000). The lower
/// bound is clamped at zero (§4.8: a limit band can never go negative).
pub fn build_limit_fallback(pre_close_x10000: i64, ratio: f64) -> (i64, i64) {
    let upper = round_to_cent_x10000(pre_close_x10000 as f64 * (1.0 + ratio));
    let lower = round_to_cent_x10000(pre_close_x10000 as f64 * (1.0 - ratio)).max(0);
    (upper, lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chinext_prefix_gets_wide_band() {
        assert_eq!(deduce_limit_ratio(b"300001", false), 0.20);
    }

    #[test]
    fn star_market_prefix_gets_wide_band() {
        assert_eq!(deduce_limit_ratio(b"688001", false), 0.20);
    }

    #[test]
    fn st_designation_gets_narrow_band() {
        assert_eq!(deduce_limit_ratio(b"600001", true), 0.05);
    }

    #[test]
    fn ordinary_symbol_gets_default_band() {
        assert_eq!(deduce_limit_ratio(b"600000", false), 0.10);
    }

    #[test]
    fn wide_band_prefix_wins_over_st_designation() {
        assert_eq!(deduce_limit_ratio(b"300001", true), 0.20);
    }

    #[test]
    fn default_band_brackets_pre_close() {
        let (upper, lower) = build_limit_fallback(100_000, 0.10);
        assert_eq!(upper, 110_000);
        assert_eq!(lower, 90_000);
    }

    #[test]
    fn wide_band_brackets_pre_close() {
        let (upper, lower) = build_limit_fallback(100_000, 0.20);
        assert_eq!(upper, 120_000);
        assert_eq!(lower, 80_000);
    }

    #[test]
    fn narrow_band_brackets_pre_close() {
        let (upper, lower) = build_limit_fallback(100_000, 0.05);
        assert_eq!(upper, 105_000);
        assert_eq!(lower, 95_000);
    }

    #[test]
    fn lower_bound_never_goes_negative() {
        let (_, lower) = build_limit_fallback(1_000, 2.0);
        assert_eq!(lower, 0);
    }

    #[test]
    fn non_cent_aligned_pre_close_rounds_to_the_cent() {
        let (upper, lower) = build_limit_fallback(100_050, 0.10);
        assert_eq!(upper, 110_100);
        assert_eq!(lower, 90_000);
    }
}
