use crate::types::PALETTE_SIZE;

pub fn name8(name: &str) -> [u8; 8] {
    let mut bytes = [0u8; 8];
    for (dest, &src) in bytes.iter_mut().zip(name.as_bytes()) {
        *dest = src;
    }
    bytes
}

fn push_i16(bytes: &mut Vec<u8>, value: i16) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

fn push_i32(bytes: &mut Vec<u8>, value: i32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

/// Lays out the header, then every lump back to back, then the directory.
pub struct WadBuilder {
    identifier: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn new() -> Self {
        WadBuilder {
            identifier: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.lumps.push((name.to_owned(), bytes));
        self
    }

    pub fn level(self, name: &str, level: &LevelBuilder) -> Self {
        self.lump(name, Vec::new())
            .lump("THINGS", level.things.clone())
            .lump("LINEDEFS", level.linedefs.clone())
            .lump("SIDEDEFS", level.sidedefs.clone())
            .lump("VERTEXES", level.vertices.clone())
            .lump("SEGS", Vec::new())
            .lump("SSECTORS", Vec::new())
            .lump("NODES", Vec::new())
            .lump("SECTORS", level.sectors.clone())
    }

    /// PLAYPAL, PNAMES, one patch, one texture and two flats, enough for
    /// `LevelBuilder::room_with_pillar`.
    pub fn materials(self) -> Self {
        let texture = TextureDef {
            name: "STARTAN3",
            width: 4,
            height: 2,
            patches: vec![(0, 0, 0)],
        };
        self.lump("PLAYPAL", palette(&[(0, 0, 0), (255, 0, 0), (0, 255, 0)]))
            .lump("TEXTURE1", texture_lump(&[texture]))
            .lump("PNAMES", pnames(&["wall00_1"]))
            .lump("P_START", Vec::new())
            .lump("WALL00_1", patch(4, 2, &vec![vec![(0, vec![1, 2])]; 4]))
            .lump("P_END", Vec::new())
            .lump("F_START", Vec::new())
            .lump("FLOOR4_8", vec![1; 4096])
            .lump("CEIL3_5", vec![2; 4096])
            .lump("F_END", Vec::new())
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.identifier);
        let data_size: usize = self.lumps.iter().map(|(_, lump)| lump.len()).sum();
        push_i32(&mut bytes, self.lumps.len() as i32);
        push_i32(&mut bytes, (12 + data_size) as i32);

        let mut offsets = Vec::with_capacity(self.lumps.len());
        for (_, lump) in &self.lumps {
            offsets.push(bytes.len());
            bytes.extend_from_slice(lump);
        }
        for ((name, lump), offset) in self.lumps.iter().zip(offsets) {
            push_i32(&mut bytes, offset as i32);
            push_i32(&mut bytes, lump.len() as i32);
            bytes.extend_from_slice(&name8(name));
        }
        bytes
    }
}

#[derive(Default)]
pub struct LevelBuilder {
    things: Vec<u8>,
    linedefs: Vec<u8>,
    sidedefs: Vec<u8>,
    vertices: Vec<u8>,
    sectors: Vec<u8>,
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thing(mut self, x: i16, y: i16, thing_type: i16) -> Self {
        for &value in &[x, y, 90, thing_type, 7] {
            push_i16(&mut self.things, value);
        }
        self
    }

    pub fn vertex(mut self, x: i16, y: i16) -> Self {
        push_i16(&mut self.vertices, x);
        push_i16(&mut self.vertices, y);
        self
    }

    pub fn linedef(mut self, v0: i16, v1: i16, flags: i16, right: i16, left: i16) -> Self {
        for &value in &[v0, v1, flags, 0, 0, right, left] {
            push_i16(&mut self.linedefs, value);
        }
        self
    }

    pub fn sidedef(
        mut self,
        x_offset: i16,
        y_offset: i16,
        upper: &str,
        lower: &str,
        middle: &str,
        sector: i16,
    ) -> Self {
        push_i16(&mut self.sidedefs, x_offset);
        push_i16(&mut self.sidedefs, y_offset);
        for name in &[upper, lower, middle] {
            self.sidedefs.extend_from_slice(&name8(name));
        }
        push_i16(&mut self.sidedefs, sector);
        self
    }

    pub fn sector(mut self, floor: i16, ceiling: i16, floor_flat: &str, ceiling_flat: &str) -> Self {
        push_i16(&mut self.sectors, floor);
        push_i16(&mut self.sectors, ceiling);
        self.sectors.extend_from_slice(&name8(floor_flat));
        self.sectors.extend_from_slice(&name8(ceiling_flat));
        for &value in &[160, 0, 0] {
            push_i16(&mut self.sectors, value);
        }
        self
    }

    /// A 256x256 room with a solid 64x64 pillar in the middle and the player 1
    /// start in a corner. Every linedef is one-sided and faces into the room.
    pub fn room_with_pillar() -> Self {
        LevelBuilder::new()
            .thing(32, 32, 1)
            .vertex(0, 0)
            .vertex(0, 256)
            .vertex(256, 256)
            .vertex(256, 0)
            .vertex(96, 96)
            .vertex(160, 96)
            .vertex(160, 160)
            .vertex(96, 160)
            .linedef(0, 1, 1, 0, -1)
            .linedef(1, 2, 1, 0, -1)
            .linedef(2, 3, 1, 0, -1)
            .linedef(3, 0, 1, 0, -1)
            .linedef(4, 5, 1, 0, -1)
            .linedef(5, 6, 1, 0, -1)
            .linedef(6, 7, 1, 0, -1)
            .linedef(7, 4, 1, 0, -1)
            .sidedef(0, 0, "-", "-", "STARTAN3", 0)
            .sector(0, 128, "FLOOR4_8", "CEIL3_5")
    }
}

pub fn palette(colors: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut bytes = vec![0u8; PALETTE_SIZE];
    for (i_color, &(r, g, b)) in colors.iter().enumerate() {
        bytes[i_color * 3..][..3].copy_from_slice(&[r, g, b]);
    }
    bytes
}

pub fn pnames(names: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    push_i32(&mut bytes, names.len() as i32);
    for name in names {
        bytes.extend_from_slice(&name8(name));
    }
    bytes
}

pub struct TextureDef {
    pub name: &'static str,
    pub width: i16,
    pub height: i16,
    /// `(x_offset, y_offset, pnames_index)` in drawing order.
    pub patches: Vec<(i16, i16, i16)>,
}

pub fn texture_lump(textures: &[TextureDef]) -> Vec<u8> {
    let mut blocks = Vec::new();
    let mut offsets = Vec::new();
    let header_size = 4 + 4 * textures.len();
    for texture in textures {
        offsets.push((header_size + blocks.len()) as i32);
        blocks.extend_from_slice(&name8(texture.name));
        push_i32(&mut blocks, 0);
        push_i16(&mut blocks, texture.width);
        push_i16(&mut blocks, texture.height);
        push_i32(&mut blocks, 0);
        push_i16(&mut blocks, texture.patches.len() as i16);
        for &(x, y, index) in &texture.patches {
            for &value in &[x, y, index, 1, 0] {
                push_i16(&mut blocks, value);
            }
        }
    }

    let mut bytes = Vec::new();
    push_i32(&mut bytes, textures.len() as i32);
    for offset in offsets {
        push_i32(&mut bytes, offset);
    }
    bytes.extend_from_slice(&blocks);
    bytes
}

/// A picture lump; each column is a list of `(top_delta, palette_indices)`
/// posts.
pub fn patch(width: i16, height: i16, columns: &[Vec<(u8, Vec<u8>)>]) -> Vec<u8> {
    let mut posts = Vec::new();
    let mut offsets = Vec::new();
    let header_size = 8 + 4 * columns.len();
    for column in columns {
        offsets.push((header_size + posts.len()) as i32);
        for (top_delta, pixels) in column {
            posts.push(*top_delta);
            posts.push(pixels.len() as u8);
            posts.push(0);
            posts.extend_from_slice(pixels);
            posts.push(0);
        }
        posts.push(255);
    }

    let mut bytes = Vec::new();
    for &value in &[width, height, 0, 0] {
        push_i16(&mut bytes, value);
    }
    for offset in offsets {
        push_i32(&mut bytes, offset);
    }
    bytes.extend_from_slice(&posts);
    bytes
}
