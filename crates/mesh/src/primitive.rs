use thiserror::Error;

/// glTF topology code for a point list.
pub const MODE_POINTS: u32 = 0;
/// glTF default topology when a primitive declares none.
pub const MODE_TRIANGLES: u32 = 4;

/// Attribute arrays of one already-decoded mesh primitive.
///
/// `colors` and `normals` may be empty or shorter than `positions`; indices
/// past their end simply leave the attribute at its default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshPrimitive {
    pub mode: u32,
    pub positions: Vec<[f32; 3]>,
    /// Linear RGBA.
    pub colors: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshPrimitive {
    pub fn is_point_list(&self) -> bool {
        self.mode == MODE_POINTS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh {0} does not exist")]
    MissingMesh(usize),

    #[error("failed to load primitives of mesh {mesh}: {reason}")]
    Primitives { mesh: usize, reason: String },
}

/// Source of decoded mesh primitives, typically a parsed scene asset.
pub trait PrimitiveProvider {
    /// Topology code of every primitive in the mesh, without decoding any
    /// attribute data. `None` if the mesh does not exist.
    fn primitive_modes(&self, mesh: usize) -> Option<Vec<u32>>;

    fn load_primitives(&self, mesh: usize) -> Result<Vec<MeshPrimitive>, MeshError>;
}

/// Meshes held in memory, indexed by position.
impl PrimitiveProvider for [Vec<MeshPrimitive>] {
    fn primitive_modes(&self, mesh: usize) -> Option<Vec<u32>> {
        self.get(mesh)
            .map(|prims| prims.iter().map(|p| p.mode).collect())
    }

    fn load_primitives(&self, mesh: usize) -> Result<Vec<MeshPrimitive>, MeshError> {
        self.get(mesh).cloned().ok_or(MeshError::MissingMesh(mesh))
    }
}
