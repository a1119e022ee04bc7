//! Exact-value vertex welding

use hashbrown::HashMap;

/// Welded vertex with the texcoord already V-flipped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

impl Vertex {
    /// Build from source attributes, flipping V (`v' = 1 - v`)
    pub fn from_source(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            texcoord: [texcoord[0], 1.0 - texcoord[1]],
        }
    }
}

/// Bit patterns of all eight floats; two vertices weld only if every bit matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 8]);

impl VertexKey {
    fn new(v: &Vertex) -> Self {
        let [px, py, pz] = v.position;
        let [nx, ny, nz] = v.normal;
        let [u, w] = v.texcoord;
        Self(bytemuck::cast([px, py, pz, nx, ny, nz, u, w]))
    }
}

/// Outcome of pushing one face corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Welded {
    /// First time this vertex was seen; it was appended at this index
    New(u16),
    /// Matched an existing entry
    Existing(u16),
}

impl Welded {
    pub fn index(self) -> u16 {
        match self {
            Welded::New(i) | Welded::Existing(i) => i,
        }
    }
}

/// Vertex buffer too large for u16 indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLimitReached;

/// Deduplicates corners into a unique vertex buffer plus a triangle index list
#[derive(Debug, Default)]
pub struct VertexWelder {
    lookup: HashMap<VertexKey, u16>,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl VertexWelder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one corner to the index buffer, reusing an identical vertex if present
    pub fn push(&mut self, vertex: Vertex) -> Result<Welded, VertexLimitReached> {
        let key = VertexKey::new(&vertex);
        if let Some(&index) = self.lookup.get(&key) {
            self.indices.push(index);
            return Ok(Welded::Existing(index));
        }

        let index = u16::try_from(self.vertices.len()).map_err(|_| VertexLimitReached)?;
        if index == u16::MAX {
            // 65535 entries is the most a u16 vertex count can describe
            return Err(VertexLimitReached);
        }
        self.lookup.insert(key, index);
        self.vertices.push(vertex);
        self.indices.push(index);
        Ok(Welded::New(index))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Complete triangles pushed so far
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn finish(self) -> (Vec<Vertex>, Vec<u16>) {
        (self.vertices, self.indices)
    }
}
