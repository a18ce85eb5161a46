//! Polyline helpers for the renderer.
//!
//! plotters draws paths past the edge of the plotting area, so series are clipped to
//! the x-limits first. Dashed and dotted strokes are cut here as well, measured in
//! pixels so the pattern looks the same whatever the axis scales.

use std::ops::Range;

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Pieces of `points` whose x lies within `range`, with the crossings interpolated.
///
/// A piece always has at least two points; isolated points are dropped.
pub fn clip_x(points: &[(f64, f64)], range: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    // `current` ends exactly at the start of the next edge
    let mut open = false;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.0 - a.0;
        let (t_enter, t_exit) = if dx == 0.0 {
            if range.contains(&a.0) || a.0 == range.end {
                (0.0, 1.0)
            } else {
                (1.0, 0.0)
            }
        } else {
            let t_start = (range.start - a.0) / dx;
            let t_end = (range.end - a.0) / dx;
            (t_start.min(t_end).max(0.0), t_start.max(t_end).min(1.0))
        };

        if t_enter > t_exit {
            flush(&mut pieces, &mut current);
            open = false;
            continue;
        }
        if t_enter > 0.0 || !open {
            flush(&mut pieces, &mut current);
            current.push(lerp(a, b, t_enter));
        }
        current.push(lerp(a, b, t_exit));
        open = t_exit >= 1.0;
        if !open {
            flush(&mut pieces, &mut current);
        }
    }
    flush(&mut pieces, &mut current);
    pieces
}

/// Cut a polyline into dash pieces.
///
/// `scale` is pixels per data unit on each axis; `dash` and `gap` are in pixels.
/// The pattern starts with a dash and carries over vertices.
pub fn dash_segments(
    points: &[(f64, f64)],
    scale: (f64, f64),
    dash: f64,
    gap: f64,
) -> Vec<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if dash <= 0.0 || gap <= 0.0 || scale.0 <= 0.0 || scale.1 <= 0.0 {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current = vec![points[0]];
    let mut drawing = true;
    // distance covered in the current dash or gap
    let mut phase = 0.0;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = ((b.0 - a.0) * scale.0).hypot((b.1 - a.1) * scale.1);
        if !(len > 0.0) {
            continue;
        }
        let mut travelled = 0.0;
        while travelled < len {
            let state_len = if drawing { dash } else { gap };
            let until_switch = state_len - phase;
            let left = len - travelled;
            if until_switch <= left {
                travelled += until_switch;
                let p = lerp(a, b, (travelled / len).min(1.0));
                current.push(p);
                if drawing {
                    flush(&mut segments, &mut current);
                }
                drawing = !drawing;
                phase = 0.0;
            } else {
                travelled = len;
                phase += left;
                if drawing {
                    current.push(b);
                }
            }
        }
    }
    if drawing {
        flush(&mut segments, &mut current);
    }
    segments
}

fn flush(pieces: &mut Vec<Vec<(f64, f64)>>, current: &mut Vec<(f64, f64)>) {
    if current.len() >= 2 {
        pieces.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn inside_line_is_untouched() {
        let pts = vec![(2000.0, 1.0), (2010.0, 2.0), (2020.0, 3.0)];
        assert_eq!(clip_x(&pts, &(2000.0..2060.0)), vec![pts]);
    }

    #[test]
    fn crossing_the_lower_limit_is_interpolated() {
        let pts = vec![(1990.0, 0.0), (2010.0, 20.0), (2020.0, 30.0)];
        let pieces = clip_x(&pts, &(2000.0..2060.0));
        assert_eq!(pieces.len(), 1);
        assert!(close(pieces[0][0], (2000.0, 10.0)));
        assert_eq!(pieces[0][1..], [(2010.0, 20.0), (2020.0, 30.0)]);
    }

    #[test]
    fn leaving_and_reentering_gives_two_pieces() {
        let pts = vec![(0.0, 0.0), (20.0, 0.0), (5.0, 1.0)];
        let pieces = clip_x(&pts, &(0.0..10.0));
        assert_eq!(pieces.len(), 2);
        assert!(close(*pieces[0].last().unwrap(), (10.0, 0.0)));
        assert!(close(pieces[1][0], (10.0, 2.0 / 3.0)));
        assert!(close(pieces[1][1], (5.0, 1.0)));
    }

    #[test]
    fn fully_outside_is_dropped() {
        let pts = vec![(1950.0, 0.0), (1960.0, 1.0)];
        assert!(clip_x(&pts, &(2000.0..2060.0)).is_empty());
    }

    #[test]
    fn dashes_along_a_straight_line() {
        let segs = dash_segments(&[(0.0, 0.0), (10.0, 0.0)], (1.0, 1.0), 2.0, 1.0);
        let spans: Vec<(f64, f64)> = segs.iter().map(|s| (s[0].0, s.last().unwrap().0)).collect();
        assert_eq!(spans, vec![(0.0, 2.0), (3.0, 5.0), (6.0, 8.0), (9.0, 10.0)]);
    }

    #[test]
    fn dash_length_is_measured_in_pixels() {
        // 2 px per unit: a 4 px dash covers 2 data units
        let segs = dash_segments(&[(0.0, 0.0), (10.0, 0.0)], (2.0, 1.0), 4.0, 4.0);
        let spans: Vec<(f64, f64)> = segs.iter().map(|s| (s[0].0, s.last().unwrap().0)).collect();
        assert_eq!(spans, vec![(0.0, 2.0), (4.0, 6.0), (8.0, 10.0)]);
    }

    #[test]
    fn dashes_turn_corners() {
        let segs = dash_segments(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], (1.0, 1.0), 1.5, 10.0);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0], vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.5)]);
    }

    #[test]
    fn too_short_to_dash() {
        assert!(dash_segments(&[(0.0, 0.0)], (1.0, 1.0), 2.0, 1.0).is_empty());
    }
}
