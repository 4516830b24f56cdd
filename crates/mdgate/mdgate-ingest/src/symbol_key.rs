//! Symbol-key derivation (§4.6): `DDDDDD.MX` wind-code strings to a compact
//! integer key plus the canonical 16-byte form.

/// Parses a wind-code of the form `DDDDDD.SH` / `DDDDDD.SZ` (six digits,
/// then `.`, then `SH` or `SZ`). Returns the compact key
/// (`market * 1_000_000 + numeric_code`) and the canonical zero-padded
/// 16-byte symbol. Any other shape is rejected (§4.8: malformed symbol ⇒
/// drop the record).
pub fn parse_symbol_key(wind_code: &str) -> Option<(u32, [u8; 16])> {
    let bytes = wind_code.as_bytes();
    if bytes.len() != 9 {
        return None;
    }
    if !bytes[..6].iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if bytes[6] != b'.' {
        return None;
    }

    let market = match &bytes[7..9] {
        b"SH" => 1u32,
        b"SZ" => 0u32,
        _ => return None,
    };

    let mut numeric_code: u32 = 0;
    for &b in &bytes[..6] {
        numeric_code = numeric_code * 10 + (b - b'0') as u32;
    }
    let key = market * 1_000_000 + numeric_code;

    let mut canonical = [0u8; 16];
    canonical[..9].copy_from_slice(bytes);
    Some((key, canonical))
}

/// The six-digit numeric code prefix, used by limit-ratio derivation. Only
/// meaningful on an already-validated canonical symbol.
pub fn numeric_code_prefix(canonical: &[u8; 16]) -> &[u8] {
    &canonical[..2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sh_symbol_parses_to_market_one() {
        let (key, canon) = parse_symbol_key("600000.SH").unwrap();
        assert_eq!(key, 1_600_000);
        assert_eq!(&canon[..9], b"600000.SH");
        assert_eq!(canon[9], 0);
    }

    #[test]
    fn sz_symbol_parses_to_market_zero() {
        let (key, canon) = parse_symbol_key("000001.SZ").unwrap();
        assert_eq!(key, 1);
        assert_eq!(&canon[..9], b"000001.SZ");
    }

    #[test]
    fn short_numeric_code_is_rejected() {
        assert!(parse_symbol_key("60000.SH").is_none());
    }

    #[test]
    fn unknown_market_suffix_is_rejected() {
        assert!(parse_symbol_key("600000.XY").is_none());
    }

    #[test]
    fn non_numeric_code_is_rejected() {
        assert!(parse_symbol_key("abc.SH").is_none());
    }
}
