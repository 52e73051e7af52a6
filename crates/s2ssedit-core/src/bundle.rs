//! Directory bundles holding the object and layout files of a game.

use crate::codec::{PassthroughCodec, StreamCodec};
use crate::error::{CoreError, CoreResult, StreamKind};
use crate::object_file::ObjectFile;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default object stream file name inside a bundle directory.
pub const DEFAULT_OBJECT_FILE: &str = "Special stage object location lists (Kosinski compression).bin";
/// Default layout stream file name inside a bundle directory.
pub const DEFAULT_LAYOUT_FILE: &str = "Special stage level layouts (Nemesis compression).bin";

/// A directory containing the two special stage data files.
#[derive(Clone)]
pub struct LevelBundle {
    dir: PathBuf,
    object_name: String,
    layout_name: String,
    object_codec: Arc<dyn StreamCodec>,
    layout_codec: Arc<dyn StreamCodec>,
}

impl std::fmt::Debug for LevelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelBundle")
            .field("dir", &self.dir)
            .field("object_name", &self.object_name)
            .field("layout_name", &self.layout_name)
            .field("object_codec", &self.object_codec.name())
            .field("layout_codec", &self.layout_codec.name())
            .finish()
    }
}

impl LevelBundle {
    /// Bundle in `dir` with the default file names and passthrough codecs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            object_name: DEFAULT_OBJECT_FILE.to_string(),
            layout_name: DEFAULT_LAYOUT_FILE.to_string(),
            object_codec: Arc::new(PassthroughCodec),
            layout_codec: Arc::new(PassthroughCodec),
        }
    }

    pub fn with_file_names(
        mut self,
        object_name: impl Into<String>,
        layout_name: impl Into<String>,
    ) -> Self {
        self.object_name = object_name.into();
        self.layout_name = layout_name.into();
        self
    }

    pub fn with_codecs(
        mut self,
        object_codec: Arc<dyn StreamCodec>,
        layout_codec: Arc<dyn StreamCodec>,
    ) -> Self {
        self.object_codec = object_codec;
        self.layout_codec = layout_codec;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn object_path(&self) -> PathBuf {
        self.dir.join(&self.object_name)
    }

    pub fn layout_path(&self) -> PathBuf {
        self.dir.join(&self.layout_name)
    }

    /// True when both files are present.
    pub fn exists(&self) -> bool {
        self.object_path().is_file() && self.layout_path().is_file()
    }

    /// Reads, decodes and parses both files.
    pub fn open(&self) -> CoreResult<ObjectFile> {
        let object_path = self.object_path();
        let layout_path = self.layout_path();
        for path in [&object_path, &layout_path] {
            if !path.is_file() {
                return Err(CoreError::MissingFile(path.clone()));
            }
        }

        let objects = fs::read(&object_path)?;
        let layout = fs::read(&layout_path)?;
        let objects = self
            .object_codec
            .decode(&objects)
            .map_err(|source| CoreError::Codec {
                stream: StreamKind::Objects,
                source,
            })?;
        let layout = self
            .layout_codec
            .decode(&layout)
            .map_err(|source| CoreError::Codec {
                stream: StreamKind::Layout,
                source,
            })?;

        let file = ObjectFile::from_streams(&objects, &layout)?;
        tracing::info!(
            dir = %self.dir.display(),
            stages = file.num_stages(),
            "opened special stage bundle"
        );
        Ok(file)
    }

    /// Re-reads the files from disk, discarding nothing on failure.
    pub fn reload(&self) -> CoreResult<ObjectFile> {
        tracing::debug!(dir = %self.dir.display(), "reloading bundle");
        self.open()
    }

    /// Serialises, encodes and writes both files.
    pub fn save(&self, file: &ObjectFile) -> CoreResult<()> {
        let raw = file.to_streams()?;
        let objects = self
            .object_codec
            .encode(&raw.objects)
            .map_err(|source| CoreError::Codec {
                stream: StreamKind::Objects,
                source,
            })?;
        let layout = self
            .layout_codec
            .encode(&raw.layout)
            .map_err(|source| CoreError::Codec {
                stream: StreamKind::Layout,
                source,
            })?;

        fs::create_dir_all(&self.dir)?;
        fs::write(self.object_path(), objects)?;
        fs::write(self.layout_path(), layout)?;
        tracing::info!(
            dir = %self.dir.display(),
            stages = file.num_stages(),
            "saved special stage bundle"
        );
        Ok(())
    }
}
