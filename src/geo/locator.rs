//! Maidenhead grid locators.
//!
//! A locator is built from pairs: field (`A`-`R`, 20x10 degrees), square
//! (`0`-`9`, 2x1 degrees), subsquare (`a`-`x`, 5x2.5 arc minutes) and
//! extended square (`0`-`9`, 30x15 arc seconds). Letters are accepted in
//! either case.

use super::error::LocatorError;
use super::types::LatLon;

#[derive(Clone, Copy)]
enum PairKind {
    Letters(u8),
    Digits,
}

/// Width/height in degrees of each pair's cells, with its character set.
const PAIRS: [(PairKind, f64, f64); 4] = [
    (PairKind::Letters(18), 20.0, 10.0),
    (PairKind::Digits, 2.0, 1.0),
    (PairKind::Letters(24), 2.0 / 24.0, 1.0 / 24.0),
    (PairKind::Digits, 2.0 / 240.0, 1.0 / 240.0),
];

fn decode_char(kind: PairKind, c: char, position: usize) -> Result<f64, LocatorError> {
    let invalid = || LocatorError::InvalidCharacter {
        character: c,
        position,
    };
    match kind {
        PairKind::Letters(count) => {
            let upper = c.to_ascii_uppercase();
            if !upper.is_ascii_uppercase() {
                return Err(invalid());
            }
            let index = upper as u8 - b'A';
            if index >= count {
                return Err(invalid());
            }
            Ok(index as f64)
        }
        PairKind::Digits => c.to_digit(10).map(|d| d as f64).ok_or_else(invalid),
    }
}

/// Returns the centre of the square named by a 4, 6 or 8 character locator.
pub fn locator_to_lat_lon(locator: &str) -> Result<LatLon, LocatorError> {
    let chars: Vec<char> = locator.trim().chars().collect();
    if !matches!(chars.len(), 4 | 6 | 8) {
        return Err(LocatorError::InvalidLength(chars.len()));
    }

    let mut lon = -180.0;
    let mut lat = -90.0;
    let mut cell = (0.0, 0.0);

    for (pair, chunk) in chars.chunks(2).enumerate() {
        let (kind, width, height) = PAIRS[pair];
        lon += decode_char(kind, chunk[0], pair * 2)? * width;
        lat += decode_char(kind, chunk[1], pair * 2 + 1)? * height;
        cell = (width, height);
    }

    Ok(LatLon {
        latitude_deg: lat + cell.1 / 2.0,
        longitude_deg: lon + cell.0 / 2.0,
    })
}

/// Encodes a position as a locator of `precision` characters (4, 6 or 8).
pub fn lat_lon_to_locator(
    latitude_deg: f64,
    longitude_deg: f64,
    precision: usize,
) -> Result<String, LocatorError> {
    if !matches!(precision, 4 | 6 | 8) {
        return Err(LocatorError::UnsupportedPrecision(precision));
    }

    // Keep the north pole and antimeridian inside the last cell.
    let mut lon = (longitude_deg + 180.0).clamp(0.0, 360.0 - 1e-9);
    let mut lat = (latitude_deg + 90.0).clamp(0.0, 180.0 - 1e-9);
    let mut out = String::with_capacity(precision);

    for &(kind, width, height) in PAIRS.iter().take(precision / 2) {
        let x = (lon / width).floor();
        let y = (lat / height).floor();
        lon -= x * width;
        lat -= y * height;
        let (base, upper_bound) = match kind {
            PairKind::Letters(count) if out.is_empty() => (b'A', count),
            PairKind::Letters(count) => (b'a', count),
            PairKind::Digits => (b'0', 10),
        };
        let x = (x as u8).min(upper_bound - 1);
        let y = (y as u8).min(upper_bound - 1);
        out.push((base + x) as char);
        out.push((base + y) as char);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn four_character_centre() {
        let pos = locator_to_lat_lon("IO91").unwrap();
        assert_abs_diff_eq!(pos.latitude_deg, 51.5, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.longitude_deg, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn six_character_centre() {
        let pos = locator_to_lat_lon("IO91wm").unwrap();
        assert_abs_diff_eq!(pos.latitude_deg, 51.520833, epsilon = 1e-6);
        assert_abs_diff_eq!(pos.longitude_deg, -0.125, epsilon = 1e-6);
    }

    #[test]
    fn eight_character_refines_six() {
        let six = locator_to_lat_lon("IO91wm").unwrap();
        let eight = locator_to_lat_lon("IO91wm44").unwrap();
        assert!((eight.latitude_deg - six.latitude_deg).abs() < 1.0 / 24.0);
        assert!((eight.longitude_deg - six.longitude_deg).abs() < 2.0 / 24.0);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(
            locator_to_lat_lon("io91WM").unwrap(),
            locator_to_lat_lon("IO91wm").unwrap()
        );
    }

    #[test]
    fn malformed_locators_are_errors() {
        assert_eq!(
            locator_to_lat_lon("IO9"),
            Err(LocatorError::InvalidLength(3))
        );
        assert_eq!(locator_to_lat_lon(""), Err(LocatorError::InvalidLength(0)));
        assert!(matches!(
            locator_to_lat_lon("ZZ00"),
            Err(LocatorError::InvalidCharacter { character: 'Z', .. })
        ));
        assert!(matches!(
            locator_to_lat_lon("IOAB"),
            Err(LocatorError::InvalidCharacter { position: 2, .. })
        ));
        assert!(matches!(
            locator_to_lat_lon("IO91yz"),
            Err(LocatorError::InvalidCharacter { position: 4, .. })
        ));
    }

    #[test]
    fn encode_matches_decode() {
        assert_eq!(lat_lon_to_locator(51.5, -0.13, 6).unwrap(), "IO91wm");
        for loc in ["JO01", "FN31pr", "QF22le55", "AA00aa00", "RR99xx99"] {
            let centre = locator_to_lat_lon(loc).unwrap();
            let encoded =
                lat_lon_to_locator(centre.latitude_deg, centre.longitude_deg, loc.len()).unwrap();
            assert_eq!(encoded.to_ascii_uppercase(), loc.to_ascii_uppercase());
        }
    }

    #[test]
    fn encode_rejects_odd_precision() {
        assert_eq!(
            lat_lon_to_locator(0.0, 0.0, 5),
            Err(LocatorError::UnsupportedPrecision(5))
        );
    }
}
