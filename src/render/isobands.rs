//! Filled contour regions traced with marching squares
//!
//! A band is painted as the superlevel set `{f >= level}` of its lower edge,
//! lowest band first, so each higher band covers the part of the one below
//! it. The outline of a superlevel set consists of the isoline through the
//! grid cells plus the stretches of the valid-data border that lie inside the
//! set. Both are emitted as segments in grid index space and chained into
//! closed rings, which are filled with the even-odd rule.
//!
//! Cells with a NaN corner are outside every region.

use crate::dataset::RasterField;
use std::collections::HashMap;

/// Crossings never sit exactly on a grid node, so every node and every
/// crossing is a distinct ring vertex.
const EDGE_MARGIN: f64 = 1e-6;

/// A point in grid index space: `x` is the fractional column, `y` the fractional row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    fn node(row: usize, col: usize) -> Self {
        Self {
            x: col as f64,
            y: row as f64,
        }
    }

    fn key(self) -> (u64, u64) {
        (self.x.to_bits(), self.y.to_bits())
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: GridPoint,
    end: GridPoint,
}

/// Closed outline; the last point connects back to the first
pub type Ring = Vec<GridPoint>;

/// Outline rings of `{f >= level}` over the valid cells of `field`.
pub fn superlevel_rings(field: &RasterField, level: f64) -> Vec<Ring> {
    connect_segments(&march_region(field, level))
}

fn valid_cell(field: &RasterField, row: usize, col: usize) -> bool {
    let (rows, cols) = field.dim();
    if row + 1 >= rows || col + 1 >= cols {
        return false;
    }
    [(row, col), (row, col + 1), (row + 1, col), (row + 1, col + 1)]
        .iter()
        .all(|&idx| field[idx].is_finite())
}

/// Where `level` crosses the edge between two adjacent nodes.
///
/// The fraction is always measured from the lower-indexed node, so both cells
/// sharing the edge produce a bit-identical point.
fn crossing(field: &RasterField, a: (usize, usize), b: (usize, usize), level: f64) -> GridPoint {
    let (n0, n1) = if a < b { (a, b) } else { (b, a) };
    let v0 = f64::from(field[n0]);
    let v1 = f64::from(field[n1]);
    let s = ((level - v0) / (v1 - v0)).clamp(EDGE_MARGIN, 1.0 - EDGE_MARGIN);
    GridPoint {
        x: n0.1 as f64 + s * (n1.1 as f64 - n0.1 as f64),
        y: n0.0 as f64 + s * (n1.0 as f64 - n0.0 as f64),
    }
}

/// Boundary segments of `{f >= level}`, one cell at a time.
fn march_region(field: &RasterField, level: f64) -> Vec<Segment> {
    let (rows, cols) = field.dim();
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            if !valid_cell(field, row, col) {
                continue;
            }

            // Corners clockwise from the top-left node, and the cell across each edge.
            let nodes = [(row, col), (row, col + 1), (row + 1, col + 1), (row + 1, col)];
            let neighbours = [
                row.checked_sub(1).map(|r| (r, col)),
                Some((row, col + 1)),
                Some((row + 1, col)),
                col.checked_sub(1).map(|c| (row, c)),
            ];

            let mut crossings: Vec<(GridPoint, bool)> = Vec::with_capacity(4);
            for k in 0..4 {
                let (p, q) = (nodes[k], nodes[(k + 1) % 4]);
                let exposed = !neighbours[k].is_some_and(|(r, c)| valid_cell(field, r, c));
                let p_in = f64::from(field[p]) >= level;
                let q_in = f64::from(field[q]) >= level;
                let (p_pt, q_pt) = (GridPoint::node(p.0, p.1), GridPoint::node(q.0, q.1));

                match (p_in, q_in) {
                    (true, true) if exposed => segments.push(Segment {
                        start: p_pt,
                        end: q_pt,
                    }),
                    (true, false) => {
                        let x = crossing(field, p, q, level);
                        if exposed {
                            segments.push(Segment { start: p_pt, end: x });
                        }
                        crossings.push((x, true));
                    }
                    (false, true) => {
                        let x = crossing(field, p, q, level);
                        if exposed {
                            segments.push(Segment { start: x, end: q_pt });
                        }
                        crossings.push((x, false));
                    }
                    _ => {}
                }
            }

            // Walking the corners, every exit from the region is followed by an entry.
            let n = crossings.len();
            for i in 0..n {
                let (exit, is_exit) = crossings[i];
                let (entry, is_entry) = crossings[(i + 1) % n];
                if is_exit && !is_entry {
                    segments.push(Segment {
                        start: exit,
                        end: entry,
                    });
                }
            }
        }
    }

    segments
}

/// Chains segments sharing endpoints into rings.
fn connect_segments(segments: &[Segment]) -> Vec<Ring> {
    let mut at_point: HashMap<(u64, u64), Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        at_point.entry(seg.start.key()).or_default().push(i);
        at_point.entry(seg.end.key()).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = segments[first].start;
        let mut ring = vec![origin, segments[first].end];
        let mut current = segments[first].end;

        while current.key() != origin.key() {
            let next = at_point
                .get(&current.key())
                .and_then(|ids| ids.iter().copied().find(|&i| !used[i]));
            let Some(i) = next else { break };
            used[i] = true;
            let seg = segments[i];
            current = if seg.start.key() == current.key() {
                seg.end
            } else {
                seg.start
            };
            ring.push(current);
        }

        if current.key() == origin.key() {
            ring.pop();
        }
        let ring = drop_collinear(ring);
        if ring.len() >= 3 {
            rings.push(ring);
        }
    }
    rings
}

/// Drops vertices lying on a grid line between both of their neighbours.
fn drop_collinear(ring: Ring) -> Ring {
    let n = ring.len();
    if n < 4 {
        return ring;
    }
    (0..n)
        .filter(|&i| {
            let (a, p, b) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let vertical = a.x == p.x && p.x == b.x;
            let horizontal = a.y == p.y && p.y == b.y;
            !(vertical || horizontal)
        })
        .map(|i| ring[i])
        .collect()
}
