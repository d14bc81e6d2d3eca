use super::meta::PolygonMetadata;
use super::polygon::{assemble_paths, MalformedSector, Segment};
use super::types::WadVertex;
use log::{debug, warn};
use math::{Line2d, Pnt2d};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathKind {
    Perimeter,
    Hole,
}

/// The closed paths of one sector, split by winding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectorPolygon {
    pub perimeters: Vec<Vec<Segment>>,
    pub holes: Vec<Vec<Segment>>,
}

/// A flattened polygon with holes and its triangles.
///
/// `vertices` holds every perimeter's vertices, then every hole's; each hole
/// starts at the matching entry of `hole_starts`. Triangles index into
/// `vertices`.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangulatedSector {
    pub vertices: Vec<[f32; 2]>,
    pub hole_starts: Vec<usize>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangulatedSector {
    /// The same triangles with the opposite winding, for ceilings.
    pub fn reversed(&self) -> TriangulatedSector {
        TriangulatedSector {
            vertices: self.vertices.clone(),
            hole_starts: self.hole_starts.clone(),
            triangles: self
                .triangles
                .iter()
                .map(|&[a, b, c]| [c, b, a])
                .collect(),
        }
    }
}

fn point(vertex: WadVertex) -> Pnt2d {
    Pnt2d::new(f64::from(vertex.x), f64::from(vertex.y))
}

/// Sum of the signed turns between consecutive edges of a closed path,
/// wrapping from the last edge to the first. Clockwise paths sum to `2π`.
pub fn turning_angle(path: &[Segment], tolerance: f64) -> Result<f64, MalformedSector> {
    let lines = path
        .iter()
        .map(|segment| {
            let line = Line2d::from_two_points(point(segment.start), point(segment.end));
            if line.is_degenerate() {
                Err(MalformedSector::DegenerateEdge { at: segment.start })
            } else {
                Ok(line)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut total = 0.0;
    for (i_line, line) in lines.iter().enumerate() {
        let corner = path[i_line].end;
        let next = &lines[(i_line + 1) % lines.len()];
        let turn = line
            .turn_to(next)
            .ok_or(MalformedSector::DegenerateEdge { at: corner })?;
        if turn.cosine_excess() > tolerance {
            return Err(MalformedSector::TurningAngleOutOfRange {
                at: corner,
                cosine: turn.cosine,
            });
        }
        total += turn.angle.0;
    }
    Ok(total)
}

pub fn classify_path(path: &[Segment], tolerance: f64) -> Result<PathKind, MalformedSector> {
    Ok(if turning_angle(path, tolerance)? > 0.0 {
        PathKind::Perimeter
    } else {
        PathKind::Hole
    })
}

pub fn classify_paths(
    paths: Vec<Vec<Segment>>,
    tolerance: f64,
) -> Result<SectorPolygon, MalformedSector> {
    let mut polygon = SectorPolygon::default();
    for path in paths {
        match classify_path(&path, tolerance)? {
            PathKind::Perimeter => polygon.perimeters.push(path),
            PathKind::Hole => polygon.holes.push(path),
        }
    }
    Ok(polygon)
}

/// Even-odd test of `vertex` against the closed path `path`.
pub fn path_contains(path: &[Segment], vertex: WadVertex) -> bool {
    let (x, y) = (f64::from(vertex.x), f64::from(vertex.y));
    let mut inside = false;
    for segment in path {
        let (x0, y0) = (f64::from(segment.start.x), f64::from(segment.start.y));
        let (x1, y1) = (f64::from(segment.end.x), f64::from(segment.end.y));
        if (y0 > y) != (y1 > y) && x < (x1 - x0) * (y - y0) / (y1 - y0) + x0 {
            inside = !inside;
        }
    }
    inside
}

/// The most deeply nested perimeter containing `vertex`, so an island inside
/// a hole wins over the perimeter around that hole. Ties go to the first.
fn innermost_perimeter(perimeters: &[Vec<Segment>], vertex: WadVertex) -> Option<usize> {
    let containing = perimeters
        .iter()
        .enumerate()
        .filter(|(_, perimeter)| path_contains(perimeter, vertex))
        .map(|(i_perimeter, _)| i_perimeter)
        .collect::<Vec<_>>();
    containing
        .iter()
        .rev()
        .max_by_key(|&&i_perimeter| {
            let corner = perimeters[i_perimeter][0].start;
            containing
                .iter()
                .filter(|&&i_other| {
                    i_other != i_perimeter && path_contains(&perimeters[i_other], corner)
                })
                .count()
        })
        .cloned()
}

/// Ear-clips each perimeter together with the holes inside it.
///
/// A hole belongs to the innermost perimeter containing its first vertex;
/// holes inside no perimeter are logged and left out of the triangles.
pub fn triangulate(polygon: &SectorPolygon) -> Result<TriangulatedSector, MalformedSector> {
    if polygon.perimeters.is_empty() {
        return Err(MalformedSector::NoPerimeter);
    }

    let mut vertices = Vec::new();
    let mut perimeter_starts = Vec::with_capacity(polygon.perimeters.len());
    for perimeter in &polygon.perimeters {
        perimeter_starts.push(vertices.len());
        vertices.extend(perimeter.iter().map(|segment| segment.start));
    }
    let mut hole_starts = Vec::with_capacity(polygon.holes.len());
    let mut holes_of = vec![Vec::new(); polygon.perimeters.len()];
    for (i_hole, hole) in polygon.holes.iter().enumerate() {
        hole_starts.push(vertices.len());
        vertices.extend(hole.iter().map(|segment| segment.start));
        match innermost_perimeter(&polygon.perimeters, hole[0].start) {
            Some(i_perimeter) => holes_of[i_perimeter].push(i_hole),
            None => warn!(
                "Hole at ({}, {}) is outside every perimeter.",
                hole[0].start.x, hole[0].start.y
            ),
        }
    }

    let mut triangles = Vec::new();
    for (i_perimeter, perimeter) in polygon.perimeters.iter().enumerate() {
        // Local index -> index into `vertices`.
        let mut global = (0..perimeter.len())
            .map(|i| perimeter_starts[i_perimeter] + i)
            .collect::<Vec<_>>();
        let mut local_hole_starts = Vec::with_capacity(holes_of[i_perimeter].len());
        for &i_hole in &holes_of[i_perimeter] {
            local_hole_starts.push(global.len());
            let start = hole_starts[i_hole];
            global.extend(start..start + polygon.holes[i_hole].len());
        }

        let coords = global
            .iter()
            .flat_map(|&index| {
                let vertex = vertices[index];
                vec![f64::from(vertex.x), f64::from(vertex.y)]
            })
            .collect::<Vec<_>>();
        let indices = earcutr::earcut(&coords, &local_hole_starts, 2)
            .map_err(|error| MalformedSector::Triangulation(format!("{:?}", error)))?;
        debug!(
            "Perimeter {} with {} holes: {} triangles.",
            i_perimeter,
            local_hole_starts.len(),
            indices.len() / 3
        );
        triangles.extend(indices.chunks(3).filter(|chunk| chunk.len() == 3).map(|chunk| {
            [
                global[chunk[0]] as u32,
                global[chunk[1]] as u32,
                global[chunk[2]] as u32,
            ]
        }));
    }

    Ok(TriangulatedSector {
        vertices: vertices
            .into_iter()
            .map(|vertex| [f32::from(vertex.x), f32::from(vertex.y)])
            .collect(),
        hole_starts,
        triangles,
    })
}

impl SectorPolygon {
    /// Assembles and classifies one sector's boundary segments.
    pub fn from_segments(
        segments: &[Segment],
        meta: &PolygonMetadata,
    ) -> Result<SectorPolygon, MalformedSector> {
        classify_paths(
            assemble_paths(segments, meta.max_merge_passes)?,
            meta.angle_tolerance,
        )
    }

    /// Even-odd over every path, so islands inside holes count as inside.
    pub fn contains(&self, vertex: WadVertex) -> bool {
        self.perimeters
            .iter()
            .chain(&self.holes)
            .filter(|path| path_contains(path, vertex))
            .count()
            % 2
            == 1
    }
}

/// Assembles, classifies and triangulates one sector's boundary segments.
pub fn sector_mesh(
    segments: &[Segment],
    meta: &PolygonMetadata,
) -> Result<TriangulatedSector, MalformedSector> {
    triangulate(&SectorPolygon::from_segments(segments, meta)?)
}
