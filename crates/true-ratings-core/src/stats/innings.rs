// Innings-pitched notation.
//
// League exports write innings as `D.F`, where `F` counts outs recorded in a
// partial inning (0, 1 or 2), not decimal tenths: "150.2" is 150⅔ innings.

use thiserror::Error;

/// Outs recorded in one full inning.
pub const OUTS_PER_INNING: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InningsParseError {
    #[error("empty innings value")]
    Empty,

    #[error("invalid innings value `{0}`")]
    Invalid(String),
}

/// Convert `D` or `D.F` notation into fractional innings (`D + F/3`).
///
/// An outs digit outside 0-2 is not rejected; it is divided by three like any
/// other. Old exports contain such values and they have always been read
/// this way.
pub fn innings_to_fraction(raw: &str) -> Result<f64, InningsParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InningsParseError::Empty);
    }

    let (whole, outs) = match raw.split_once('.') {
        Some((whole, outs)) => (whole, outs),
        None => (raw, ""),
    };

    let whole: u32 = whole
        .parse()
        .map_err(|_| InningsParseError::Invalid(raw.to_string()))?;
    let outs: u32 = if outs.is_empty() {
        0
    } else {
        outs.parse()
            .map_err(|_| InningsParseError::Invalid(raw.to_string()))?
    };

    Ok(whole as f64 + outs as f64 / OUTS_PER_INNING)
}

/// Convert fractional innings back into `D.F` notation.
///
/// Always emits the outs digit ("150.0", never "150"). Non-finite and
/// negative inputs produce "0.0".
pub fn fraction_to_innings(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0.0".to_string();
    }

    let mut whole = value.floor();
    let mut outs = ((value - whole) * OUTS_PER_INNING).round();
    if outs >= OUTS_PER_INNING {
        whole += 1.0;
        outs = 0.0;
    }

    format!("{}.{}", whole as u64, outs as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn whole_innings_without_fraction() {
        assert!(approx_eq(innings_to_fraction("150").unwrap(), 150.0));
        assert!(approx_eq(innings_to_fraction("0").unwrap(), 0.0));
    }

    #[test]
    fn outs_digit_is_thirds_not_tenths() {
        assert!(approx_eq(innings_to_fraction("150.1").unwrap(), 150.0 + 1.0 / 3.0));
        assert!(approx_eq(innings_to_fraction("150.2").unwrap(), 150.0 + 2.0 / 3.0));
        assert!(approx_eq(innings_to_fraction("150.0").unwrap(), 150.0));
    }

    #[test]
    fn nonstandard_outs_digit_still_divided_by_three() {
        assert!(approx_eq(innings_to_fraction("10.5").unwrap(), 10.0 + 5.0 / 3.0));
        assert!(approx_eq(innings_to_fraction("7.3").unwrap(), 8.0));
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert!(approx_eq(innings_to_fraction(" 45.2 ").unwrap(), 45.0 + 2.0 / 3.0));
    }

    #[test]
    fn trailing_dot_reads_as_whole() {
        assert!(approx_eq(innings_to_fraction("12.").unwrap(), 12.0));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(innings_to_fraction(""), Err(InningsParseError::Empty));
        assert_eq!(innings_to_fraction("   "), Err(InningsParseError::Empty));
        assert!(matches!(
            innings_to_fraction("abc"),
            Err(InningsParseError::Invalid(_))
        ));
        assert!(matches!(
            innings_to_fraction("12.x"),
            Err(InningsParseError::Invalid(_))
        ));
        assert!(matches!(
            innings_to_fraction("-4.1"),
            Err(InningsParseError::Invalid(_))
        ));
    }

    #[test]
    fn notation_survives_a_round_trip() {
        for whole in [0u32, 1, 9, 57, 150, 241] {
            for outs in 0..=2 {
                let text = format!("{whole}.{outs}");
                let value = innings_to_fraction(&text).unwrap();
                assert_eq!(fraction_to_innings(value), text);
            }
        }
    }

    #[test]
    fn fraction_formats_always_carry_outs_digit() {
        assert_eq!(fraction_to_innings(200.0), "200.0");
        assert_eq!(fraction_to_innings(33.0 + 1.0 / 3.0), "33.1");
    }

    #[test]
    fn near_whole_fraction_carries_into_next_inning() {
        assert_eq!(fraction_to_innings(9.9999), "10.0");
    }

    #[test]
    fn degenerate_fraction_inputs() {
        assert_eq!(fraction_to_innings(-3.0), "0.0");
        assert_eq!(fraction_to_innings(f64::NAN), "0.0");
        assert_eq!(fraction_to_innings(f64::INFINITY), "0.0");
    }
}
