use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff"];

/// A single image reference with free-form metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub filename: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Image {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Keyed collection of images handed to a classifier backend.
///
/// Filenames are relative to `dir_name` when it is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub dir_name: Option<PathBuf>,
    #[serde(default)]
    pub images: BTreeMap<String, Image>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir_name: Some(dir.into()),
            images: BTreeMap::new(),
        }
    }

    /// Builds a set from the image files directly inside `dir`, keyed by file
    /// name so `house.jpg` and `house.png` stay distinct.
    pub fn from_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let mut set = Self::with_dir(dir);
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_image_file(&path) {
                continue;
            }
            let Some(name) = path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy();
            set.add_image(name.clone(), name);
        }
        log::debug!("Collected {} images from {:?}", set.len(), dir);
        Ok(set)
    }

    /// Adds or replaces the image stored under `key`.
    pub fn add_image(&mut self, key: impl Into<String>, filename: impl Into<String>) -> Option<Image> {
        self.images.insert(key.into(), Image::new(filename))
    }

    pub fn insert(&mut self, key: impl Into<String>, image: Image) -> Option<Image> {
        self.images.insert(key.into(), image)
    }

    pub fn get(&self, key: &str) -> Option<&Image> {
        self.images.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Image)> {
        self.images.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Absolute-or-relative location of an image, joined onto `dir_name` if set.
    pub fn image_path(&self, key: &str) -> Option<PathBuf> {
        let image = self.images.get(key)?;
        Some(match &self.dir_name {
            Some(dir) => dir.join(&image.filename),
            None => PathBuf::from(&image.filename),
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut set = ImageSet::with_dir("/data/roofs");
        assert!(set.is_empty());
        set.add_image("1", "a.png");
        set.add_image("2", "b.jpg");
        assert_eq!(set.len(), 2);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(set.image_path("2"), Some(PathBuf::from("/data/roofs/b.jpg")));
        assert!(set.image_path("3").is_none());
    }

    #[test]
    fn test_from_dir_filters_extensions() -> io::Result<()> {
        let dir = std::env::temp_dir().join("roofshape-imageset-from-dir");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("nested"))?;
        fs::write(dir.join("house1.PNG"), b"x")?;
        fs::write(dir.join("house2.jpg"), b"x")?;
        fs::write(dir.join("notes.txt"), b"x")?;

        let set = ImageSet::from_dir(&dir)?;
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["house1.PNG", "house2.jpg"]);
        assert_eq!(set.get("house1.PNG").map(|i| i.filename.as_str()), Some("house1.PNG"));
        Ok(())
    }

    #[test]
    fn test_from_dir_keeps_same_stem_images() -> io::Result<()> {
        let dir = std::env::temp_dir().join("roofshape-imageset-same-stem");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("house.jpg"), b"x")?;
        fs::write(dir.join("house.png"), b"x")?;

        let set = ImageSet::from_dir(&dir)?;
        assert_eq!(set.len(), 2);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["house.jpg", "house.png"]);
        assert_eq!(set.image_path("house.png"), Some(dir.join("house.png")));
        Ok(())
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"dir_name": "imgs", "images": {"a": {"filename": "a.png"}}}"#;
        let set: ImageSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.image_path("a"), Some(PathBuf::from("imgs/a.png")));
        assert!(set.get("a").unwrap().properties.is_empty());
    }
}
