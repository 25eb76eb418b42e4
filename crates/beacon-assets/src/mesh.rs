use glam::Vec3;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("malformed mesh json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file contains no meshes")]
    Empty,

    #[error("position itemSize must be 3, got {0}")]
    ItemSize(usize),

    #[error("{0}")]
    Invalid(String),
}

/// Triangle mesh ready for upload: flat xyz positions and normals plus a
/// triangle-list index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

// The two accepted payload shapes, told apart by their top-level keys.
#[derive(Deserialize)]
#[serde(untagged)]
enum MeshFile {
    Meshes { meshes: Vec<SceneMesh> },
    Geometry { data: GeometryData },
}

#[derive(Deserialize)]
struct SceneMesh {
    vertices: Vec<f32>,
    #[serde(default)]
    normals: Vec<f32>,
    faces: Vec<Vec<u32>>,
}

#[derive(Deserialize)]
struct GeometryData {
    attributes: GeometryAttributes,
    index: IndexAttribute,
}

#[derive(Deserialize)]
struct GeometryAttributes {
    position: FloatAttribute,
    #[serde(default)]
    normal: Option<FloatAttribute>,
}

#[derive(Deserialize)]
struct FloatAttribute {
    array: Vec<f32>,
    #[serde(rename = "itemSize")]
    item_size: usize,
}

#[derive(Deserialize)]
struct IndexAttribute {
    array: Vec<u32>,
}

impl MeshData {
    /// Parses either `{ meshes: [...] }` (first mesh wins) or the
    /// `{ data: { attributes, index } }` geometry shape.
    pub fn from_json(text: &str) -> Result<Self, MeshError> {
        let mesh = match serde_json::from_str::<MeshFile>(text)? {
            MeshFile::Meshes { meshes } => {
                if meshes.len() > 1 {
                    log::debug!("mesh file has {} meshes, using the first", meshes.len());
                }
                let mesh = meshes.into_iter().next().ok_or(MeshError::Empty)?;
                Self::from_parts(
                    mesh.vertices,
                    mesh.normals,
                    mesh.faces.into_iter().flatten().collect(),
                )?
            }
            MeshFile::Geometry { data } => {
                let position = data.attributes.position;
                if position.item_size != 3 {
                    return Err(MeshError::ItemSize(position.item_size));
                }
                let normals = match data.attributes.normal {
                    Some(normal) if normal.item_size != 3 => {
                        return Err(MeshError::ItemSize(normal.item_size));
                    }
                    Some(normal) => normal.array,
                    None => Vec::new(),
                };
                Self::from_parts(position.array, normals, data.index.array)?
            }
        };
        Ok(mesh)
    }

    /// Validates the buffers, deriving smooth normals when none are given.
    pub fn from_parts(
        positions: Vec<f32>,
        normals: Vec<f32>,
        indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        if positions.is_empty() || positions.len() % 3 != 0 {
            return Err(MeshError::Invalid(format!(
                "position count {} is not a positive multiple of 3",
                positions.len()
            )));
        }
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(MeshError::Invalid(format!(
                "index count {} is not a positive multiple of 3",
                indices.len()
            )));
        }
        let vertex_count = positions.len() / 3;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::Invalid(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        let normals = if normals.is_empty() {
            vertex_normals(&positions, &indices)
        } else if normals.len() != positions.len() {
            return Err(MeshError::Invalid(format!(
                "{} normal components for {} position components",
                normals.len(),
                positions.len()
            )));
        } else {
            normals
        };

        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Area-weighted average of the face normals around each vertex.
pub fn vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };
    let mut sums = vec![Vec3::ZERO; positions.len() / 3];

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2]));
        let face = (b - a).cross(c - a);
        for &i in tri {
            sums[i as usize] += face;
        }
    }

    sums.into_iter()
        .flat_map(|n| n.normalize_or_zero().to_array())
        .collect()
}
