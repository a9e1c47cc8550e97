use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Size;
use crate::foundation::error::ThumbResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Role an asset reference plays in a template.
pub enum AssetKind {
    Background,
    Subject,
    Badge,
    Image,
    Overlay,
}

impl AssetKind {
    /// Storage folder the reference is resolved in. Badges share the overlay folder and image
    /// zones share the background folder.
    pub fn folder(self) -> &'static str {
        match self {
            Self::Background | Self::Image => "backgrounds",
            Self::Subject => "subjects",
            Self::Badge | Self::Overlay => "overlays",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
/// Result of looking up an asset reference.
pub enum AssetProbe {
    Missing,
    Present {
        /// Natural pixel size, when known.
        natural: Option<Size>,
    },
}

impl AssetProbe {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    pub fn natural(&self) -> Option<Size> {
        match self {
            Self::Present { natural } => *natural,
            Self::Missing => None,
        }
    }
}

/// Read-only view of the asset store used during rendering.
///
/// Implementations must not perform network IO; the compositor calls this synchronously.
pub trait AssetCatalog {
    fn probe(&self, kind: AssetKind, reference: &str) -> AssetProbe;
}

/// Treats every non-empty reference as present with unknown dimensions.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumePresent;

impl AssetCatalog for AssumePresent {
    fn probe(&self, _kind: AssetKind, reference: &str) -> AssetProbe {
        if reference.trim().is_empty() {
            AssetProbe::Missing
        } else {
            AssetProbe::Present { natural: None }
        }
    }
}

/// In-memory table of known assets, keyed by folder and reference.
#[derive(Clone, Debug, Default)]
pub struct AssetIndex {
    entries: BTreeMap<(&'static str, String), Option<Size>>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: AssetKind, reference: impl Into<String>, natural: Option<Size>) {
        self.entries
            .insert((kind.folder(), reference.into()), natural);
    }

    pub fn with(mut self, kind: AssetKind, reference: impl Into<String>, natural: Option<Size>) -> Self {
        self.insert(kind, reference, natural);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index an asset directory laid out as `<root>/{backgrounds,subjects,overlays}/<file>`.
    ///
    /// References are file names. Dimensions are read from image headers; files whose headers
    /// cannot be read are indexed without a natural size. Missing folders are skipped.
    pub fn scan_dir(root: &Path) -> ThumbResult<Self> {
        let mut out = Self::new();
        for kind in [AssetKind::Background, AssetKind::Subject, AssetKind::Overlay] {
            let dir = root.join(kind.folder());
            if !dir.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("read asset folder '{}'", dir.display()))?;
            for entry in entries {
                let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let natural = match image::image_dimensions(&path) {
                    Ok((w, h)) => Some(Size::new(f64::from(w), f64::from(h))),
                    Err(err) => {
                        tracing::debug!(path = %path.display(), error = %err, "asset dimensions unavailable");
                        None
                    }
                };
                out.insert(kind, name, natural);
            }
        }
        Ok(out)
    }
}

impl AssetCatalog for AssetIndex {
    fn probe(&self, kind: AssetKind, reference: &str) -> AssetProbe {
        match self.entries.get(&(kind.folder(), reference.to_string())) {
            Some(natural) => AssetProbe::Present { natural: *natural },
            None => AssetProbe::Missing,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
