use super::level::Level;
use super::types::{LinedefId, WadVertex};
use indexmap::IndexMap;
use log::warn;
use std::fmt;

/// A directed edge of a sector boundary with the sector's interior on its
/// right.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: WadVertex,
    pub end: WadVertex,
    pub linedef: LinedefId,
}

impl Segment {
    pub fn new(start: WadVertex, end: WadVertex, linedef: LinedefId) -> Self {
        Segment {
            start,
            end,
            linedef,
        }
    }

    fn touches(&self, other: &Segment) -> bool {
        self.start == other.start
            || self.start == other.end
            || self.end == other.start
            || self.end == other.end
    }
}

/// Why a sector produced no floor or ceiling.
#[derive(Clone, Debug, PartialEq)]
pub enum MalformedSector {
    NotConverged { passes: usize },
    NoContinuation { at: WadVertex },
    AmbiguousContinuation { at: WadVertex, candidates: usize },
    OpenPath { start: WadVertex, end: WadVertex },
    RepeatedVertex { vertex: WadVertex },
    DegenerateEdge { at: WadVertex },
    TurningAngleOutOfRange { at: WadVertex, cosine: f64 },
    NoPerimeter,
    Triangulation(String),
}

impl fmt::Display for MalformedSector {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MalformedSector::NotConverged { passes } => {
                write!(formatter, "segment merge did not converge in {} passes", passes)
            }
            MalformedSector::NoContinuation { at } => {
                write!(formatter, "path ends at ({}, {})", at.x, at.y)
            }
            MalformedSector::AmbiguousContinuation { at, candidates } => write!(
                formatter,
                "{} possible continuations at ({}, {})",
                candidates, at.x, at.y
            ),
            MalformedSector::OpenPath { start, end } => write!(
                formatter,
                "path from ({}, {}) does not close, ends at ({}, {})",
                start.x, start.y, end.x, end.y
            ),
            MalformedSector::RepeatedVertex { vertex } => {
                write!(formatter, "path visits ({}, {}) twice", vertex.x, vertex.y)
            }
            MalformedSector::DegenerateEdge { at } => {
                write!(formatter, "zero length edge at ({}, {})", at.x, at.y)
            }
            MalformedSector::TurningAngleOutOfRange { at, cosine } => write!(
                formatter,
                "turn at ({}, {}) has cosine {} outside [-1, 1]",
                at.x, at.y, cosine
            ),
            MalformedSector::NoPerimeter => formatter.write_str("no perimeter path"),
            MalformedSector::Triangulation(ref message) => {
                write!(formatter, "triangulation failed: {}", message)
            }
        }
    }
}

/// Boundary segments of every sector, keyed by sector index in index order.
/// Sectors no linedef refers to get an empty list.
///
/// Right sides contribute `v0 -> v1`, left sides the reverse.
pub fn sector_segments(level: &Level) -> IndexMap<usize, Vec<Segment>> {
    let mut segments = (0..level.sectors.len())
        .map(|sector| (sector, Vec::new()))
        .collect::<IndexMap<_, _>>();
    for (id, linedef) in level.linedefs.iter().enumerate() {
        let (v0, v1) = match level.linedef_vertices(linedef) {
            Some(vertices) => vertices,
            None => {
                warn!("Linedef {} has a bad vertex index, left out of sectors.", id);
                continue;
            }
        };
        match level.right_side(linedef) {
            Some(side) => segments[&side.sector_id].push(Segment::new(v0, v1, id)),
            None => warn!("Linedef {} has no usable right side.", id),
        }
        if let Some(side) = level.left_side(linedef) {
            segments[&side.sector_id].push(Segment::new(v1, v0, id));
        } else if linedef.left_sidedef().is_some() {
            warn!("Linedef {} has a bad left sidedef.", id);
        }
    }
    segments
}

struct DisjointSets {
    parents: Vec<usize>,
    ranks: Vec<u8>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        DisjointSets {
            parents: (0..len).collect(),
            ranks: vec![0; len],
        }
    }

    fn find(&mut self, mut element: usize) -> usize {
        while self.parents[element] != element {
            let grandparent = self.parents[self.parents[element]];
            self.parents[element] = grandparent;
            element = grandparent;
        }
        element
    }

    /// Returns `false` if the two were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return false;
        }
        if self.ranks[a] < self.ranks[b] {
            self.parents[a] = b;
        } else {
            self.parents[b] = a;
            if self.ranks[a] == self.ranks[b] {
                self.ranks[a] += 1;
            }
        }
        true
    }
}

/// Groups a sector's segments by shared endpoints and orders each group into
/// a closed path.
///
/// A pass merges the groups of every touching pair; passes repeat until one
/// merges nothing, at most `max_passes` times. Paths come out in order of
/// their lowest segment index and start from that segment.
pub fn assemble_paths(
    segments: &[Segment],
    max_passes: usize,
) -> Result<Vec<Vec<Segment>>, MalformedSector> {
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let mut groups = DisjointSets::new(segments.len());
    let mut converged = false;
    for _ in 0..max_passes {
        let mut merged = false;
        for (i, first) in segments.iter().enumerate() {
            for (j, second) in segments.iter().enumerate().skip(i + 1) {
                if first.touches(second) && groups.union(i, j) {
                    merged = true;
                }
            }
        }
        if !merged {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(MalformedSector::NotConverged { passes: max_passes });
    }

    let mut members = IndexMap::<usize, Vec<usize>>::new();
    for index in 0..segments.len() {
        members
            .entry(groups.find(index))
            .or_insert_with(Vec::new)
            .push(index);
    }
    members
        .values()
        .map(|group| order_path(segments, group))
        .collect()
}

fn order_path(segments: &[Segment], group: &[usize]) -> Result<Vec<Segment>, MalformedSector> {
    let mut used = vec![false; group.len()];
    used[0] = true;
    let mut path = vec![segments[group[0]]];

    while path.len() < group.len() {
        let tail = path[path.len() - 1].end;
        let mut candidates = group
            .iter()
            .enumerate()
            .filter(|&(i_member, &index)| !used[i_member] && segments[index].start == tail)
            .map(|(i_member, _)| i_member);
        let next = match (candidates.next(), candidates.count()) {
            (None, _) => return Err(MalformedSector::NoContinuation { at: tail }),
            (Some(next), 0) => next,
            (Some(_), others) => {
                return Err(MalformedSector::AmbiguousContinuation {
                    at: tail,
                    candidates: others + 1,
                })
            }
        };
        used[next] = true;
        path.push(segments[group[next]]);
    }

    let (start, end) = (path[0].start, path[path.len() - 1].end);
    if start != end {
        return Err(MalformedSector::OpenPath { start, end });
    }
    let mut seen = path.iter().map(|segment| segment.start).collect::<Vec<_>>();
    seen.sort();
    if let Some(pair) = seen.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(MalformedSector::RepeatedVertex { vertex: pair[0] });
    }
    Ok(path)
}
