use super::level::{Level, SideView};
use super::types::{LinedefFlags, LinedefId, TextureRef, WadName, WadSidedef, WadVertex};
use log::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WallSection {
    Lower,
    Middle,
    Upper,
}

/// Which side of the linedef a quad is seen from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    Front,
    Back,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TexelRange {
    pub bottom: f32,
    pub top: f32,
}

/// Vertical texture coordinates of a wall section spanning `bottom..top`.
///
/// `ceiling` is the ceiling height of the sector the section faces. The lower
/// and upper rows are known to be approximate.
pub fn texel_range(
    section: WallSection,
    flags: LinedefFlags,
    y_offset: f32,
    bottom: f32,
    top: f32,
    ceiling: f32,
) -> TexelRange {
    let height = top - bottom;
    let (bottom, top) = match section {
        WallSection::Lower if flags.contains(LinedefFlags::LOWER_UNPEGGED) => {
            (-(ceiling - bottom) - y_offset, -(ceiling - top) - y_offset)
        }
        WallSection::Lower => (-height - y_offset, -y_offset),
        WallSection::Middle if flags.contains(LinedefFlags::LOWER_UNPEGGED) => {
            (-y_offset, height - y_offset)
        }
        WallSection::Middle => (-height - y_offset, -y_offset),
        WallSection::Upper if flags.contains(LinedefFlags::UPPER_UNPEGGED) => {
            (-height - y_offset, -y_offset)
        }
        WallSection::Upper => (-y_offset, height - y_offset),
    };
    TexelRange { bottom, top }
}

/// Two triangles, six unshared vertices, positions in `(x, height, -y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct WallQuad {
    pub linedef: LinedefId,
    pub section: WallSection,
    pub facing: Facing,
    pub texture: WadName,
    pub positions: [[f32; 3]; 6],
    pub uvs: [[[f32; 2]; 3]; 2],
}

struct SectionSpan {
    section: WallSection,
    facing: Facing,
    texture: TextureRef,
    x_offset: i16,
    y_offset: i16,
    bottom: i16,
    top: i16,
    ceiling: i16,
}

impl SectionSpan {
    fn new(section: WallSection, facing: Facing, side: &SideView, bottom: i16, top: i16) -> Self {
        SectionSpan {
            section,
            facing,
            texture: match section {
                WallSection::Lower => side.sidedef.lower(),
                WallSection::Middle => side.sidedef.middle(),
                WallSection::Upper => side.sidedef.upper(),
            },
            x_offset: side.sidedef.x_offset,
            y_offset: side.sidedef.y_offset,
            bottom,
            top,
            ceiling: side.sector.ceiling_height,
        }
    }

    /// Back sections keep the back textures and ceiling but are offset like
    /// the front side.
    fn offset_like(self, sidedef: &WadSidedef) -> Self {
        SectionSpan {
            x_offset: sidedef.x_offset,
            y_offset: sidedef.y_offset,
            ..self
        }
    }
}

/// Every wall quad of one linedef. Linedefs with broken references produce
/// nothing and are logged.
///
/// One-sided linedefs get a single middle section. Two-sided ones get the
/// front middle over the overlap of both sectors, then whichever of the front
/// lower, front upper, back lower and back upper sections are exposed by the
/// height difference. Back sections run from the end vertex to the start one
/// and take their texture offsets from the right sidedef.
pub fn linedef_walls(level: &Level, linedef_id: LinedefId) -> Vec<WallQuad> {
    let linedef = match level.linedefs.get(linedef_id) {
        Some(linedef) => linedef,
        None => return Vec::new(),
    };
    let (v0, v1) = match level.linedef_vertices(linedef) {
        Some(vertices) => vertices,
        None => {
            warn!("Skipping linedef {}: bad vertex index.", linedef_id);
            return Vec::new();
        }
    };
    let front = match level.right_side(linedef) {
        Some(front) => front,
        None => {
            warn!("Skipping linedef {}: bad or missing right side.", linedef_id);
            return Vec::new();
        }
    };
    let (front_floor, front_ceiling) = (front.sector.floor_height, front.sector.ceiling_height);

    let mut spans = Vec::with_capacity(5);
    if linedef.left_sidedef().is_none() {
        spans.push(SectionSpan::new(
            WallSection::Middle,
            Facing::Front,
            &front,
            front_floor,
            front_ceiling,
        ));
    } else {
        let back = match level.left_side(linedef) {
            Some(back) => back,
            None => {
                warn!("Skipping linedef {}: bad left side.", linedef_id);
                return Vec::new();
            }
        };
        let (back_floor, back_ceiling) = (back.sector.floor_height, back.sector.ceiling_height);
        spans.push(SectionSpan::new(
            WallSection::Middle,
            Facing::Front,
            &front,
            front_floor.max(back_floor),
            front_ceiling.min(back_ceiling),
        ));
        if front_floor < back_floor {
            spans.push(SectionSpan::new(
                WallSection::Lower,
                Facing::Front,
                &front,
                front_floor,
                back_floor,
            ));
        }
        if back_ceiling < front_ceiling {
            spans.push(SectionSpan::new(
                WallSection::Upper,
                Facing::Front,
                &front,
                back_ceiling,
                front_ceiling,
            ));
        }
        if back_floor < front_floor {
            spans.push(
                SectionSpan::new(WallSection::Lower, Facing::Back, &back, back_floor, front_floor)
                    .offset_like(front.sidedef),
            );
        }
        if front_ceiling < back_ceiling {
            spans.push(
                SectionSpan::new(WallSection::Upper, Facing::Back, &back, front_ceiling, back_ceiling)
                    .offset_like(front.sidedef),
            );
        }
    }

    let flags = linedef.flags();
    spans
        .iter()
        .filter_map(|span| build_quad(linedef_id, flags, v0, v1, span))
        .collect()
}

fn build_quad(
    linedef: LinedefId,
    flags: LinedefFlags,
    v0: WadVertex,
    v1: WadVertex,
    span: &SectionSpan,
) -> Option<WallQuad> {
    let texture = span.texture.name()?;
    let (start, end) = match span.facing {
        Facing::Front => (v0, v1),
        Facing::Back => (v1, v0),
    };
    let (x0, y0) = (f32::from(start.x), f32::from(start.y));
    let (x1, y1) = (f32::from(end.x), f32::from(end.y));
    let (bottom, top) = (f32::from(span.bottom), f32::from(span.top));

    let length = ((x1 - x0) * (x1 - x0) + (y1 - y0) * (y1 - y0)).sqrt();
    let u0 = f32::from(span.x_offset);
    let u1 = u0 + length;
    let texels = texel_range(
        span.section,
        flags,
        f32::from(span.y_offset),
        bottom,
        top,
        f32::from(span.ceiling),
    );

    Some(WallQuad {
        linedef,
        section: span.section,
        facing: span.facing,
        texture,
        positions: [
            [x0, bottom, -y0],
            [x1, bottom, -y1],
            [x1, top, -y1],
            [x1, top, -y1],
            [x0, top, -y0],
            [x0, bottom, -y0],
        ],
        uvs: [
            [[u0, texels.bottom], [u1, texels.bottom], [u1, texels.top]],
            [[u1, texels.top], [u0, texels.top], [u0, texels.bottom]],
        ],
    })
}
