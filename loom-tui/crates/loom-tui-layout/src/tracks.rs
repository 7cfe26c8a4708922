//! Grid track parsing and sizing.

use loom_tui_core::{Fatal, Result, TrackSpec, WidgetKind};
use smallvec::SmallVec;

use crate::distribute::distribute;

/// Upper bound on tracks per grid axis.
pub const MAX_TRACKS: usize = 4096;

/// A single parsed grid track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track {
    /// A fixed number of cells (`10` or `10px`).
    Fixed(i32),
    /// Sized to the largest child it holds.
    Auto,
    /// Takes a weighted share of the leftover space (`2fr`).
    Fr(f64),
}

impl Track {
    /// Returns the flexible weight of this track, if any.
    pub const fn flex_weight(self) -> Option<f64> {
        match self {
            Self::Fr(weight) => Some(weight),
            Self::Fixed(_) | Self::Auto => None,
        }
    }
}

/// Parsed tracks of one grid axis.
pub type Tracks = SmallVec<[Track; 8]>;

/// Parses a track specification for the grid prop named `prop`.
///
/// A count produces that many `1fr` tracks. Templates accept `auto`, bare
/// cell counts, `<n>px` and `<n>fr`, separated by whitespace.
pub fn parse_tracks(spec: &TrackSpec, prop: &str) -> Result<Tracks> {
    match spec {
        TrackSpec::Count(count) => {
            if !count.is_finite() || *count < 0.0 {
                return Err(Fatal::invalid_props(
                    WidgetKind::Grid,
                    prop,
                    format!("track count must be a finite non-negative number, got {count}"),
                ));
            }
            let count = count.floor();
            if count > MAX_TRACKS as f64 {
                return Err(Fatal::invalid_props(
                    WidgetKind::Grid,
                    prop,
                    format!("track count {count} exceeds {MAX_TRACKS}"),
                ));
            }
            Ok(std::iter::repeat(Track::Fr(1.0))
                .take(count as usize)
                .collect())
        }
        TrackSpec::Template(template) => {
            let mut tracks = Tracks::new();
            for token in template.split_whitespace() {
                if tracks.len() == MAX_TRACKS {
                    return Err(Fatal::invalid_props(
                        WidgetKind::Grid,
                        prop,
                        format!("template has more than {MAX_TRACKS} tracks"),
                    ));
                }
                tracks.push(parse_token(token, prop)?);
            }
            Ok(tracks)
        }
    }
}

fn parse_token(token: &str, prop: &str) -> Result<Track> {
    if token.eq_ignore_ascii_case("auto") {
        return Ok(Track::Auto);
    }

    let unknown = || {
        Fatal::invalid_props(
            WidgetKind::Grid,
            prop,
            format!("unknown track token {token:?}"),
        )
    };

    if let Some(weight) = token.strip_suffix("fr") {
        let weight = parse_number(weight).ok_or_else(unknown)?;
        return Ok(Track::Fr(weight));
    }

    let cells = token.strip_suffix("px").unwrap_or(token);
    let cells = parse_number(cells).ok_or_else(unknown)?;
    Ok(Track::Fixed(cells.floor().min(f64::from(i32::MAX)) as i32))
}

/// Parses a finite, non-negative decimal number.
fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolves final track sizes within `available` cells.
///
/// Gaps are reserved first. Fixed and auto tracks then take their natural
/// sizes in order, clamped to what remains, and flexible tracks split the
/// rest by weight.
pub fn resolve_sizes(tracks: &[Track], natural: &[i32], available: i32, gap: i32) -> Vec<i32> {
    let gaps = gap.saturating_mul(tracks.len().saturating_sub(1) as i32);
    let mut remaining = available.saturating_sub(gaps).max(0);

    let mut sizes = vec![0; tracks.len()];
    for (index, track) in tracks.iter().enumerate() {
        if track.flex_weight().is_some() {
            continue;
        }
        let want = natural.get(index).copied().unwrap_or(0).max(0);
        let size = want.min(remaining);
        sizes[index] = size;
        remaining -= size;
    }

    let weights: SmallVec<[f64; 8]> = tracks
        .iter()
        .map(|track| track.flex_weight().unwrap_or(0.0))
        .collect();
    for (size, share) in sizes.iter_mut().zip(distribute(remaining, &weights)) {
        if share > 0 {
            *size = share;
        }
    }
    sizes
}

/// Returns the starting offset of every track.
pub fn offsets(sizes: &[i32], gap: i32) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut cursor = 0i32;
    for &size in sizes {
        offsets.push(cursor);
        cursor = cursor.saturating_add(size).saturating_add(gap);
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::ErrorCode;
    use pretty_assertions::assert_eq;

    fn template(text: &str) -> Result<Tracks> {
        parse_tracks(&TrackSpec::from(text), "columns")
    }

    #[test]
    fn test_parse_template_tokens() {
        let tracks = template("auto 10 4px 2fr 0.5fr").unwrap();
        assert_eq!(
            tracks.as_slice(),
            &[
                Track::Auto,
                Track::Fixed(10),
                Track::Fixed(4),
                Track::Fr(2.0),
                Track::Fr(0.5),
            ]
        );
    }

    #[test]
    fn test_fractional_fixed_is_floored() {
        assert_eq!(template("2.7").unwrap().as_slice(), &[Track::Fixed(2)]);
    }

    #[test]
    fn test_count_produces_flexible_tracks() {
        let tracks = parse_tracks(&TrackSpec::Count(3.9), "columns").unwrap();
        assert_eq!(tracks.as_slice(), &[Track::Fr(1.0); 3]);
        assert!(parse_tracks(&TrackSpec::Count(0.0), "columns").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_token_names_token_and_prop() {
        let err = parse_tracks(&TrackSpec::from("auto 3em"), "rows").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidProps);
        assert!(err.detail.contains("3em"), "{}", err.detail);
        assert!(err.detail.contains("rows"), "{}", err.detail);
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        for bad in ["fr", "px", "-2", "1e3", "minmax(1,2)", "1..2fr"] {
            assert!(template(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_rejects_bad_counts() {
        for bad in [-1.0, f64::NAN, f64::INFINITY, 1e9] {
            let err = parse_tracks(&TrackSpec::Count(bad), "columns").unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidProps);
        }
    }

    #[test]
    fn test_resolve_fixed_then_flexible() {
        let tracks = [Track::Fixed(4), Track::Fr(1.0), Track::Fr(1.0)];
        assert_eq!(resolve_sizes(&tracks, &[4, 9, 9], 21, 1), vec![4, 8, 7]);
    }

    #[test]
    fn test_resolve_clamps_when_space_runs_out() {
        let tracks = [Track::Auto, Track::Auto, Track::Fr(1.0)];
        assert_eq!(resolve_sizes(&tracks, &[5, 5, 3], 7, 1), vec![5, 0, 0]);
        assert_eq!(resolve_sizes(&tracks, &[5, 5, 3], 0, 1), vec![0, 0, 0]);
    }

    #[test]
    fn test_offsets_include_gaps() {
        assert_eq!(offsets(&[3, 5], 1), vec![0, 4]);
        assert_eq!(offsets(&[], 1), Vec::<i32>::new());
    }
}
