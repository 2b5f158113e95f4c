//! Parsing of angular coordinates written in decimal or degrees-minutes-seconds form.

use crate::error::{GeobandsError, Result};

/// Convert degrees, minutes and seconds to decimal degrees.
///
/// `S` and `W` hemispheres produce negative values.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: char) -> f64 {
    let value = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    match hemisphere.to_ascii_uppercase() {
        'S' | 'W' => -value,
        _ => value,
    }
}

/// Which coordinate a value describes; decides the accepted hemisphere letters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Longitude,
    Latitude,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Longitude => "longitude",
            Axis::Latitude => "latitude",
        }
    }

    fn hemispheres(&self) -> [char; 2] {
        match self {
            Axis::Longitude => ['E', 'W'],
            Axis::Latitude => ['N', 'S'],
        }
    }
}

/// Parse a coordinate such as `38.9`, `38 54 12.5 N` or `80°15'30"W`.
///
/// DMS text must end in a hemisphere letter that belongs to `axis` and
/// carries no sign of its own; the hemisphere alone gives the direction.
pub fn parse_coordinate(input: &str, axis: Axis) -> Result<f64> {
    let trimmed = input.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return Ok(value);
    }

    let invalid = |reason: String| GeobandsError::InvalidCoordinate {
        context: format!("{} '{}'", axis.name(), input),
        reason,
    };

    let [positive, negative] = axis.hemispheres();
    let hemisphere = trimmed
        .chars()
        .last()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'N' | 'S' | 'E' | 'W'))
        .ok_or_else(|| {
            invalid(format!(
                "expected decimal degrees or DMS ending in {} or {}",
                positive, negative
            ))
        })?;
    if !axis.hemispheres().contains(&hemisphere.to_ascii_uppercase()) {
        return Err(invalid(format!(
            "hemisphere {} does not apply to {}, expected {} or {}",
            hemisphere,
            axis.name(),
            positive,
            negative
        )));
    }

    let body = trimmed[..trimmed.len() - hemisphere.len_utf8()].trim_start();
    if body.starts_with(['-', '+']) {
        return Err(invalid("a signed value cannot also carry a hemisphere".to_string()));
    }
    let parts: Vec<f64> = body
        .split(|c: char| c.is_whitespace() || matches!(c, '°' | '\'' | '"' | '′' | '″'))
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|_| invalid("non-numeric DMS component".to_string()))
        })
        .collect::<Result<_>>()?;

    let (degrees, minutes, seconds) = match parts.as_slice() {
        [d] => (*d, 0.0, 0.0),
        [d, m] => (*d, *m, 0.0),
        [d, m, s] => (*d, *m, *s),
        _ => return Err(invalid("expected 1 to 3 DMS components".to_string())),
    };

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return Err(invalid("minutes and seconds must be in [0, 60)".to_string()));
    }

    Ok(dms_to_decimal(degrees, minutes, seconds, hemisphere))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dms_to_decimal() {
        assert!((dms_to_decimal(38.0, 54.0, 36.0, 'N') - 38.91).abs() < 1e-9);
        assert!((dms_to_decimal(80.0, 15.0, 0.0, 'W') + 80.25).abs() < 1e-9);
        assert!((dms_to_decimal(12.0, 30.0, 0.0, 's') + 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_coordinate(" -80.25 ", Axis::Longitude).unwrap(), -80.25);
        assert_eq!(parse_coordinate("-12.5", Axis::Latitude).unwrap(), -12.5);
    }

    #[test]
    fn test_parse_dms_variants() {
        assert!((parse_coordinate("38 54 36 N", Axis::Latitude).unwrap() - 38.91).abs() < 1e-9);
        assert!((parse_coordinate("80°15'0\"W", Axis::Longitude).unwrap() + 80.25).abs() < 1e-9);
        assert!((parse_coordinate("45 30 e", Axis::Longitude).unwrap() - 45.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_coordinate("north", Axis::Latitude).is_err());
        assert!(parse_coordinate("38 x 12 N", Axis::Latitude).is_err());
        assert!(parse_coordinate("38 75 0 N", Axis::Latitude).is_err());
        assert!(parse_coordinate("1 2 3 4 N", Axis::Latitude).is_err());
    }

    #[test]
    fn test_sign_and_hemisphere_conflict() {
        for text in ["-38 54 12 N", "- 38 54 12 N", "+38 54 12 N", "-80 15 W"] {
            let axis = if text.ends_with('W') { Axis::Longitude } else { Axis::Latitude };
            let result = parse_coordinate(text, axis);
            assert!(
                matches!(result, Err(GeobandsError::InvalidCoordinate { .. })),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_hemisphere_must_match_axis() {
        assert!(parse_coordinate("38 54 12 N", Axis::Longitude).is_err());
        assert!(parse_coordinate("38 54 12 s", Axis::Longitude).is_err());
        assert!(parse_coordinate("80 15 0 W", Axis::Latitude).is_err());
        assert!(parse_coordinate("80 15 0 E", Axis::Latitude).is_err());

        let err = parse_coordinate("80 15 0 W", Axis::Latitude).unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    proptest! {
        #[test]
        fn prop_dms_text_matches_components(
            degrees in 0u32..180,
            minutes in 0u32..60,
            seconds in 0.0f64..59.99,
            hemisphere in prop::sample::select(vec!['N', 'S', 'E', 'W']),
        ) {
            let axis = match hemisphere {
                'N' | 'S' => Axis::Latitude,
                _ => Axis::Longitude,
            };
            let text = format!("{} {} {} {}", degrees, minutes, seconds, hemisphere);
            let parsed = parse_coordinate(&text, axis).unwrap();
            let expected = dms_to_decimal(degrees as f64, minutes as f64, seconds, hemisphere);
            prop_assert!((parsed - expected).abs() < 1e-12);
        }
    }
}
