use std::{collections::HashMap, path::Path, sync::Arc};

use fxhash::FxHashSet;

use crate::error::{NewsreelError, NewsreelResult};

/// Manages font loading and retrieval using `fontdb` and `fontdue`.
///
/// `fontdb` indexes the available faces; `fontdue` parses a face the first
/// time it is requested and the parsed font is kept for the life of the
/// storage.
pub struct FontStorage {
    /// Faces known to fontdb.
    font_db: fontdb::Database,
    /// Faces parsed by fontdue. Not every fontdb face is necessarily here.
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    /// Creates a new empty font storage.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb.
impl FontStorage {
    /// Loads a font from binary data and returns the ids of the new faces.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) -> Vec<fontdb::ID> {
        let before = self.face_ids();
        self.font_db.load_font_data(data.into());
        self.new_faces_since(&before)
    }

    /// Loads a font file and returns the ids of the faces it contained.
    ///
    /// A file that exists but holds no parsable face is a `FontLoad` error.
    pub fn load_font_file(&mut self, path: &Path) -> NewsreelResult<Vec<fontdb::ID>> {
        let before = self.face_ids();
        self.font_db.load_font_file(path).map_err(|e| {
            NewsreelError::font_load(format!("cannot read {}: {e}", path.display()))
        })?;

        let ids = self.new_faces_since(&before);
        if ids.is_empty() {
            return Err(NewsreelError::font_load(format!(
                "{} contains no usable font face",
                path.display()
            )));
        }
        Ok(ids)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: &Path) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Checks if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Returns the number of known faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    fn face_ids(&self) -> FxHashSet<fontdb::ID> {
        self.font_db.faces().map(|face| face.id).collect()
    }

    fn new_faces_since(&self, before: &FxHashSet<fontdb::ID>) -> Vec<fontdb::ID> {
        self.font_db
            .faces()
            .map(|face| face.id)
            .filter(|id| !before.contains(id))
            .collect()
    }
}

/// Get `Font`
impl FontStorage {
    /// Queries for a face matching the description.
    ///
    /// Returns the ID and the parsed font if found.
    pub fn query(&mut self, query: &fontdb::Query) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let id = self.font_db.query(query)?;
        self.font(id).map(|font| (id, font))
    }

    /// Looks up a family by name (falling back to the generic sans-serif
    /// family) at the given weight.
    pub fn query_family(
        &mut self,
        family: Option<&str>,
        weight: u16,
    ) -> Option<(fontdb::ID, Arc<fontdue::Font>)> {
        let families = match family {
            Some(name) => vec![fontdb::Family::Name(name), fontdb::Family::SansSerif],
            None => vec![fontdb::Family::SansSerif],
        };
        self.query(&fontdb::Query {
            families: &families,
            weight: fontdb::Weight(weight),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    /// Retrieves a parsed font by ID, parsing it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            ..Default::default()
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let r: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(r))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }

    /// Returns face info for an ID.
    pub fn face(&self, id: fontdb::ID) -> Option<&fontdb::FaceInfo> {
        self.font_db.face(id)
    }
}
