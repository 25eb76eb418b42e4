use crate::{AssetError, AssetLoader};

/// Program name that selects the fixed legacy pair instead of `<name>.vert`.
pub const LEGACY_PROGRAM: &str = "legacy";
pub const LEGACY_VERTEX_PATH: &str = "shaders/vertex_shader.glsl";
pub const LEGACY_FRAGMENT_PATH: &str = "shaders/fragment_shader.glsl";

/// Vertex and fragment source text of one named program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub name: String,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Fetches `shaders/<name>.vert` and `shaders/<name>.frag` together, or
    /// the legacy pair when `name` is [`LEGACY_PROGRAM`].
    pub async fn load<L: AssetLoader>(loader: &L, name: &str) -> Result<Self, AssetError> {
        if name == LEGACY_PROGRAM {
            return Self::legacy(loader).await;
        }
        let vertex_path = format!("shaders/{name}.vert");
        let fragment_path = format!("shaders/{name}.frag");
        Self::load_pair(loader, name, &vertex_path, &fragment_path).await
    }

    /// The fixed single-pair layout used before programs were named. The
    /// files keep their `.glsl` names but must hold WGSL like every other pair.
    pub async fn legacy<L: AssetLoader>(loader: &L) -> Result<Self, AssetError> {
        Self::load_pair(loader, LEGACY_PROGRAM, LEGACY_VERTEX_PATH, LEGACY_FRAGMENT_PATH).await
    }

    async fn load_pair<L: AssetLoader>(
        loader: &L,
        name: &str,
        vertex_path: &str,
        fragment_path: &str,
    ) -> Result<Self, AssetError> {
        let (vertex, fragment) = futures::try_join!(
            loader.load_text(vertex_path),
            loader.load_text(fragment_path)
        )?;
        Ok(Self {
            name: name.to_string(),
            vertex,
            fragment,
        })
    }
}
