//! Per-field acceptance, scoring class, pace deltas and the elimination
//! threshold (spec §4.1).

use crate::models::{ScoringClass, Track};

use super::normalize::normalize;
use super::similarity::similarity;

const DEFAULT_THRESHOLD: f64 = 0.75;
const SHORT_STRING_THRESHOLD: f64 = 0.85;
const SHORT_STRING_MAX_LEN: usize = 5;
const CONTAINMENT_RATIO_MIN: f64 = 0.5;

fn threshold_for(shorter_len: usize) -> f64 {
    if shorter_len <= SHORT_STRING_MAX_LEN {
        SHORT_STRING_THRESHOLD
    } else {
        DEFAULT_THRESHOLD
    }
}

/// Title acceptance: the submission compared directly to the track name.
pub fn title_is_correct(submitted_title: &str, track_name: &str) -> bool {
    let submitted = normalize(submitted_title);
    let target = normalize(track_name);
    let shorter_len = submitted.chars().count().min(target.chars().count());
    similarity(&submitted, &target) >= threshold_for(shorter_len)
}

/// Artist acceptance: any single listed artist matching counts as correct,
/// either by the similarity threshold or by a length-ratio-gated
/// containment check.
pub fn artist_is_correct(submitted_artist: &str, track: &Track) -> bool {
    let submitted = normalize(submitted_artist);
    if submitted.is_empty() {
        return false;
    }

    track.artists.iter().any(|artist| {
        let target = normalize(&artist.name);
        if target.is_empty() {
            return false;
        }

        let shorter_len = submitted.chars().count().min(target.chars().count());
        if similarity(&submitted, &target) >= threshold_for(shorter_len) {
            return true;
        }

        let (shorter, longer) = if submitted.len() <= target.len() {
            (&submitted, &target)
        } else {
            (&target, &submitted)
        };
        if longer.contains(shorter.as_str()) {
            let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
            if ratio >= CONTAINMENT_RATIO_MIN {
                return true;
            }
        }
        false
    })
}

pub fn classify(song_correct: bool, artist_correct: bool) -> ScoringClass {
    match (song_correct, artist_correct) {
        (true, true) => ScoringClass::Both,
        (false, false) => ScoringClass::None,
        _ => ScoringClass::One,
    }
}

/// Elimination threshold for round `r`: `max(1, 10 - ((r - 1) / 6))`.
pub fn elimination_threshold(round: u32) -> i32 {
    let decay = (round.saturating_sub(1)) / 6;
    (10 - decay as i32).max(1)
}

/// Elimination only runs on rounds that are multiples of 6.
pub fn is_elimination_round(round: u32) -> bool {
    round % 6 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artist;

    fn track_with_artists(names: &[&str]) -> Track {
        Track {
            id: crate::models::TrackId::new(),
            uri: "uri".into(),
            name: "Yesterday".into(),
            artists: names
                .iter()
                .map(|n| Artist { id: n.to_string(), name: n.to_string() })
                .collect(),
            album_name: "Help!".into(),
            album_cover_url: None,
            duration_ms: 125_000,
            preview_url: None,
            is_local: false,
        }
    }

    #[test]
    fn exact_title_match_is_correct() {
        assert!(title_is_correct("Yesterday", "Yesterday"));
    }

    #[test]
    fn close_misspelling_is_accepted() {
        assert!(title_is_correct("yesterdai", "Yesterday"));
    }

    #[test]
    fn unrelated_title_is_rejected() {
        assert!(!title_is_correct("Bohemian Rhapsody", "Yesterday"));
    }

    #[test]
    fn any_listed_artist_matching_counts() {
        let track = track_with_artists(&["The Beatles", "George Martin"]);
        assert!(artist_is_correct("beatles", &track));
    }

    #[test]
    fn empty_submission_is_never_correct() {
        let track = track_with_artists(&["The Beatles"]);
        assert!(!artist_is_correct("", &track));
    }

    #[test]
    fn containment_with_good_ratio_is_accepted() {
        let track = track_with_artists(&["Beyonce"]);
        assert!(artist_is_correct("beyon", &track));
    }

    #[test]
    fn classify_maps_boolean_pairs() {
        assert_eq!(classify(true, true), ScoringClass::Both);
        assert_eq!(classify(true, false), ScoringClass::One);
        assert_eq!(classify(false, true), ScoringClass::One);
        assert_eq!(classify(false, false), ScoringClass::None);
    }

    #[test]
    fn elimination_threshold_decays_every_six_rounds() {
        assert_eq!(elimination_threshold(1), 10);
        assert_eq!(elimination_threshold(6), 10);
        assert_eq!(elimination_threshold(7), 9);
        assert_eq!(elimination_threshold(13), 8);
        assert_eq!(elimination_threshold(61), 1);
        assert_eq!(elimination_threshold(1000), 1);
    }

    #[test]
    fn elimination_only_runs_on_multiples_of_six() {
        assert!(!is_elimination_round(1));
        assert!(is_elimination_round(6));
        assert!(is_elimination_round(12));
    }
}
