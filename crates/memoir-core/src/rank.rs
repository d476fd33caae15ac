//! Recency-fusion ranking of similarity candidates.
//!
//! Pure similarity ranking surfaces stale but topically similar memories
//! over fresher, more contextually useful ones. The ranker re-orders
//! candidates by a weighted blend of raw similarity and time-decayed
//! recency. It never errors: empty input yields empty output.

use crate::model::{Candidate, RankedCandidate};
use chrono::{DateTime, Utc};

/// Recency decays to half its value every 24 hours.
pub const HALF_LIFE_HOURS: f32 = 24.0;

/// Weight of raw similarity in the fused score; recency gets the rest.
pub const SIMILARITY_WEIGHT: f32 = 0.7;

/// Recency substituted for candidates with no usable timestamp.
pub const NEUTRAL_RECENCY: f32 = 0.5;

/// Compute the time-decayed recency factor for a candidate.
///
/// 1.0 at age zero, halving every [`HALF_LIFE_HOURS`]. A future
/// timestamp (clock skew) clamps to age zero. A missing timestamp gets
/// the fixed neutral value.
fn recency(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f32 {
    let Some(created_at) = created_at else {
        return NEUTRAL_RECENCY;
    };
    let age_hours = (now - created_at).num_seconds().max(0) as f32 / 3600.0;
    0.5_f32.powf(age_hours / HALF_LIFE_HOURS)
}

/// Fused score for one candidate at the given instant.
pub fn fused_score(candidate: &Candidate, now: DateTime<Utc>) -> f32 {
    SIMILARITY_WEIGHT * candidate.similarity
        + (1.0 - SIMILARITY_WEIGHT) * recency(candidate.created_at, now)
}

/// Re-rank candidates by fused score, descending.
///
/// The sort is stable: candidates with equal fused scores keep the
/// store's original order. Output length always equals input length;
/// truncation to top-k happens upstream at query time.
pub fn rank(candidates: Vec<Candidate>, now: DateTime<Utc>) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let fused = fused_score(&candidate, now);
            RankedCandidate {
                candidate,
                fused_score: fused,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::{NEUTRAL_RECENCY, fused_score, rank};
    use crate::model::{Candidate, Role};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn candidate(text: &str, similarity: f32, age_hours: Option<i64>) -> Candidate {
        Candidate {
            text: text.to_string(),
            role: Some(Role::User),
            created_at: age_hours.map(|h| Utc::now() - Duration::hours(h)),
            similarity,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(rank(Vec::new(), Utc::now()), Vec::new());
    }

    #[test]
    fn output_length_matches_input_length() {
        let candidates = vec![
            candidate("a", 0.9, Some(1)),
            candidate("b", 0.2, None),
            candidate("c", 0.5, Some(100)),
        ];
        let ranked = rank(candidates, Utc::now());
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn recency_breaks_similarity_tie() {
        let now = Utc::now();
        let candidates = vec![
            candidate("old", 0.8, Some(76)),
            candidate("new", 0.8, Some(0)),
        ];
        let ranked = rank(candidates, now);
        assert_eq!(ranked[0].text(), "new");
        assert_eq!(ranked[1].text(), "old");
    }

    #[test]
    fn fresher_candidate_never_scores_below_staler_at_equal_similarity() {
        let now = Utc::now();
        for (young, old) in [(0, 1), (2, 48), (24, 240)] {
            let a = fused_score(&candidate("young", 0.6, Some(young)), now);
            let b = fused_score(&candidate("old", 0.6, Some(old)), now);
            assert!(a >= b, "age {young}h scored {a} < age {old}h scored {b}");
        }
    }

    #[test]
    fn recency_equals_one_at_age_zero() {
        let now = Utc::now();
        let fresh = Candidate {
            text: "fresh".to_string(),
            role: None,
            created_at: Some(now),
            similarity: 0.9,
        };
        let fused = fused_score(&fresh, now);
        assert!((fused - 0.93).abs() < 1e-6, "got {fused}");
    }

    #[test]
    fn recency_halves_every_half_life() {
        let now = Utc::now();
        let day_old = fused_score(&candidate("d", 0.0, Some(24)), now);
        // 0.3 * 0.5 within float tolerance of the seconds-resolution age
        assert!((day_old - 0.15).abs() < 1e-3, "got {day_old}");
    }

    #[test]
    fn missing_timestamp_uses_neutral_recency() {
        let now = Utc::now();
        let untimed = fused_score(&candidate("u", 0.9, None), now);
        let timed = fused_score(&candidate("t", 0.9, Some(0)), now);
        assert!((untimed - (0.7 * 0.9 + 0.3 * NEUTRAL_RECENCY)).abs() < 1e-6);
        assert!((timed - 0.93).abs() < 1e-6);
        assert!(timed > untimed);

        let ranked = rank(
            vec![candidate("u", 0.9, None), candidate("t", 0.9, Some(0))],
            now,
        );
        assert_eq!(ranked[0].text(), "t");
    }

    #[test]
    fn future_timestamp_clamps_to_age_zero() {
        let now = Utc::now();
        let skewed = Candidate {
            text: "skewed".to_string(),
            role: None,
            created_at: Some(now + Duration::hours(5)),
            similarity: 0.5,
        };
        let fused = fused_score(&skewed, now);
        assert!((fused - (0.7 * 0.5 + 0.3)).abs() < 1e-6, "got {fused}");
    }

    #[test]
    fn equal_fused_scores_preserve_input_order() {
        let now = Utc::now();
        let candidates = vec![
            candidate("first", 0.4, None),
            candidate("second", 0.4, None),
            candidate("third", 0.4, None),
        ];
        let ranked = rank(candidates, now);
        let order: Vec<&str> = ranked.iter().map(|r| r.text()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
