use chrono::{DateTime, Utc};

use crate::geo::{LookAngleSource, Observer};
use crate::predict::pass_finder::PassSearch;
use crate::predict::types::{MutualPass, Pass};

/// Intersects two observers' passes of `satellite`. Every pair is checked;
/// touching passes (zero-length overlap) are not mutual. Sorted by start.
pub fn mutual_passes(passes_a: &[Pass], passes_b: &[Pass], satellite: &str) -> Vec<MutualPass> {
    let mut mutual = Vec::new();

    for a in passes_a.iter().filter(|p| p.satellite == satellite) {
        for b in passes_b.iter().filter(|p| p.satellite == satellite) {
            let start = a.start.max(b.start);
            let end = a.end.min(b.end);
            if start < end {
                mutual.push(MutualPass {
                    satellite: satellite.to_string(),
                    start,
                    end,
                    max_elevation_a_deg: a.max_elevation_deg,
                    max_elevation_b_deg: b.max_elevation_deg,
                });
            }
        }
    }

    mutual.sort_by_key(|m| m.start);
    mutual
}

/// Predicts passes for both observers and intersects them.
#[allow(clippy::too_many_arguments)]
pub fn predict_mutual_passes<S: LookAngleSource + ?Sized>(
    source: &S,
    satellite: &str,
    observer_a: &Observer,
    observer_b: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
    search: &PassSearch,
) -> Vec<MutualPass> {
    let passes_a = search.predict(source, satellite, observer_a, start, end, min_elevation);
    let passes_b = search.predict(source, satellite, observer_b, start, end, min_elevation);
    mutual_passes(&passes_a, &passes_b, satellite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::test_support::{iss, iss_epoch};
    use chrono::Duration;

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(minute)
    }

    fn pass(satellite: &str, start: i64, end: i64, max: f64) -> Pass {
        Pass {
            satellite: satellite.to_string(),
            start: at(start),
            end: at(end),
            max_elevation_deg: max,
            max_elevation_at: at(start),
        }
    }

    #[test]
    fn disjoint_windows_have_no_mutual_pass() {
        let a = vec![pass("AO-91", 0, 10, 20.0), pass("AO-91", 100, 110, 40.0)];
        let b = vec![pass("AO-91", 20, 30, 15.0), pass("AO-91", 200, 210, 60.0)];
        assert!(mutual_passes(&a, &b, "AO-91").is_empty());
    }

    #[test]
    fn overlap_is_intersection_of_windows() {
        let a = vec![pass("AO-91", 0, 10, 20.0)];
        let b = vec![pass("AO-91", 6, 14, 35.0)];
        let mutual = mutual_passes(&a, &b, "AO-91");

        assert_eq!(mutual.len(), 1);
        assert_eq!(mutual[0].start, at(6));
        assert_eq!(mutual[0].end, at(10));
        assert_eq!(mutual[0].max_elevation_a_deg, 20.0);
        assert_eq!(mutual[0].max_elevation_b_deg, 35.0);
        assert_eq!(mutual[0].duration(), Duration::minutes(4));
    }

    #[test]
    fn touching_windows_are_excluded() {
        let a = vec![pass("AO-91", 0, 10, 20.0)];
        let b = vec![pass("AO-91", 10, 20, 20.0)];
        assert!(mutual_passes(&a, &b, "AO-91").is_empty());
    }

    #[test]
    fn output_is_sorted_and_other_satellites_ignored() {
        let a = vec![pass("SO-50", 50, 60, 10.0), pass("SO-50", 0, 10, 10.0)];
        let b = vec![
            pass("SO-50", 55, 65, 10.0),
            pass("SO-50", 5, 15, 10.0),
            pass("RS-44", 0, 100, 80.0),
        ];
        let mutual = mutual_passes(&a, &b, "SO-50");

        assert_eq!(mutual.len(), 2);
        assert_eq!(mutual[0].start, at(5));
        assert_eq!(mutual[1].start, at(55));
        assert!(mutual.iter().all(|m| m.satellite == "SO-50"));
    }

    #[test]
    fn iss_mutual_passes_lie_within_both_observers_passes() {
        let iss = iss();
        let london = Observer::new(51.5, -0.13, 0.0).unwrap();
        let paris = Observer::new(48.85, 2.35, 0.0).unwrap();
        let start = iss_epoch();
        let end = start + Duration::hours(24);
        let search = PassSearch::default();

        let a = search.predict(&iss, iss.name(), &london, start, end, 0.0);
        let b = search.predict(&iss, iss.name(), &paris, start, end, 0.0);
        let mutual = predict_mutual_passes(&iss, iss.name(), &london, &paris, start, end, 0.0, &search);

        assert!(!mutual.is_empty());
        for m in &mutual {
            assert!(m.start < m.end);
            assert!(a.iter().any(|p| m.start >= p.start && m.end <= p.end));
            assert!(b.iter().any(|q| m.start >= q.start && m.end <= q.end));
        }
    }
}
