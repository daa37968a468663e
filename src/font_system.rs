use std::path::{Path, PathBuf};
use std::sync::Arc;

use fxhash::FxHashMap;
use parking_lot::Mutex;

use crate::config::FontSpec;
use crate::error::{NewsreelError, NewsreelResult};
use crate::face::FontdueFace;
use crate::font_storage::FontStorage;
use crate::text::FontFace;

/// Shared entry point for font loading.
///
/// Wraps [`FontStorage`] in a `Mutex` so faces can be resolved from any
/// thread, and remembers every resolved [`FontSpec`] so each file is loaded
/// and parsed once no matter how many blocks use it.
///
/// The storage is public for callers that need direct `fontdb` access.
pub struct FontSystem {
    pub font_storage: Mutex<FontStorage>,
    /// Directories searched for relative font paths, in order.
    font_dirs: Mutex<Vec<PathBuf>>,
    faces: Mutex<FxHashMap<FontSpec, Arc<dyn FontFace>>>,
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSystem {
    pub fn new() -> Self {
        Self {
            font_storage: Mutex::new(FontStorage::new()),
            font_dirs: Mutex::new(Vec::new()),
            faces: Mutex::new(FxHashMap::default()),
        }
    }
}

/// font storage initialization
impl FontSystem {
    pub fn load_system_fonts(&self) {
        self.font_storage.lock().load_system_fonts();
    }

    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) -> Vec<fontdb::ID> {
        self.font_storage.lock().load_font_binary(data)
    }

    pub fn load_font_file(&self, path: &Path) -> NewsreelResult<Vec<fontdb::ID>> {
        self.font_storage.lock().load_font_file(path)
    }

    /// Indexes every font in `dir` and adds it to the relative-path search
    /// list.
    pub fn load_fonts_dir(&self, dir: &Path) {
        self.font_storage.lock().load_fonts_dir(dir);
        self.font_dirs.lock().push(dir.to_path_buf());
    }

    pub fn is_empty(&self) -> bool {
        self.font_storage.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.font_storage.lock().len()
    }
}

/// face resolution
impl FontSystem {
    /// Resolves `spec` to a shareable face.
    ///
    /// A configured `path` is loaded directly (relative paths are looked up in
    /// the font directories first); otherwise the family is queried from the
    /// indexed fonts with a sans-serif fallback.
    pub fn resolve(&self, spec: &FontSpec) -> NewsreelResult<Arc<dyn FontFace>> {
        if let Some(face) = self.faces.lock().get(spec) {
            return Ok(Arc::clone(face));
        }

        let font = match &spec.path {
            Some(path) => self.load_path(path)?,
            None => self
                .font_storage
                .lock()
                .query_family(spec.family.as_deref(), spec.weight)
                .map(|(_, font)| font)
                .ok_or_else(|| {
                    NewsreelError::font_load(format!(
                        "no face matches family {:?} at weight {}",
                        spec.family.as_deref().unwrap_or("sans-serif"),
                        spec.weight
                    ))
                })?,
        };

        let face: Arc<dyn FontFace> = Arc::new(FontdueFace::new(font));
        self.faces.lock().insert(spec.clone(), Arc::clone(&face));
        Ok(face)
    }

    /// Number of distinct specs resolved so far.
    pub fn resolved_faces(&self) -> usize {
        self.faces.lock().len()
    }

    fn load_path(&self, path: &Path) -> NewsreelResult<Arc<fontdue::Font>> {
        let path = self.locate(path);
        let mut storage = self.font_storage.lock();
        let ids = storage.load_font_file(&path)?;

        ids.into_iter()
            .find_map(|id| storage.font(id))
            .ok_or_else(|| {
                NewsreelError::font_load(format!("{} could not be parsed", path.display()))
            })
    }

    fn locate(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        self.font_dirs
            .lock()
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| path.to_path_buf())
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_reported() {
        let system = FontSystem::new();
        let err = system
            .resolve(&FontSpec::file("/no/such/dir/Poppins-Bold.ttf"))
            .unwrap_err();
        assert!(matches!(err, NewsreelError::FontLoad(_)));
        assert_eq!(system.resolved_faces(), 0);
    }

    #[test]
    fn unknown_family_on_empty_database_is_reported() {
        let system = FontSystem::new();
        assert!(system.is_empty());
        let err = system
            .resolve(&FontSpec::family("DM Serif Display", 400))
            .unwrap_err();
        assert!(err.to_string().contains("DM Serif Display"));
    }

    #[test]
    fn relative_paths_search_font_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Broken.ttf"), b"not a font").unwrap();

        let system = FontSystem::new();
        system.load_fonts_dir(dir.path());
        assert_eq!(system.locate(Path::new("Broken.ttf")), dir.path().join("Broken.ttf"));

        // found, but holds no face
        let err = system.resolve(&FontSpec::file("Broken.ttf")).unwrap_err();
        assert!(err.to_string().contains("no usable font face"));
    }
}
