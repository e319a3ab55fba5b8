use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

/// Font style requested by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Heavy display face for ad copy.
    BoldDisplay,
}

/// A font the compositor can render with at a given size.
#[derive(Clone)]
pub enum FontHandle {
    /// A face from a font database, addressed by family name.
    Face {
        /// Database holding the face.
        fontdb: Arc<fontdb::Database>,
        /// Resolved family name.
        family: String,
        /// Font size in pixels.
        size: u32,
    },
    /// No usable face: text is drawn with the minimal built-in renderer.
    Builtin {
        /// Font size in pixels.
        size: u32,
    },
}

impl FontHandle {
    /// Font size in pixels.
    pub fn size(&self) -> u32 {
        match self {
            Self::Face { size, .. } | Self::Builtin { size } => *size,
        }
    }

    /// Resolved family name, if a real face backs this handle.
    pub fn family(&self) -> Option<&str> {
        match self {
            Self::Face { family, .. } => Some(family),
            Self::Builtin { .. } => None,
        }
    }
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Face {
                fontdb,
                family,
                size,
            } => f
                .debug_struct("Face")
                .field("faces", &fontdb.len())
                .field("family", family)
                .field("size", size)
                .finish(),
            Self::Builtin { size } => f.debug_struct("Builtin").field("size", size).finish(),
        }
    }
}

/// Resolves a renderable font for a style and size.
///
/// Implementations own their fallback policy; callers never see a failure.
pub trait FontProvider: Send + Sync {
    /// Resolve a font for `style` at `size` pixels.
    fn resolve_font(&self, style: FontStyle, size: u32) -> FontHandle;
}

/// Default display families tried before generic fallbacks.
pub fn default_display_families() -> Vec<String> {
    [
        "Comic Sans MS",
        "Comic Sans",
        "Liberation Sans",
        "DejaVu Sans",
        "Arial",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Font provider backed by a `fontdb` database of system and bundled fonts.
///
/// Fallback chain: configured display families, then the generic sans-serif family, then any
/// face in the database, then [`FontHandle::Builtin`]. The chain is resolved once at
/// construction.
#[derive(Clone)]
pub struct SystemFontProvider {
    fontdb: Arc<fontdb::Database>,
    resolved_family: Option<String>,
}

impl SystemFontProvider {
    /// Load system fonts plus every font file in `font_dirs`, then resolve `families`.
    pub fn new(families: &[String], font_dirs: &[impl AsRef<Path>]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        Self::from_database(db, families)
    }

    /// Resolve `families` against an existing database.
    pub fn from_database(db: fontdb::Database, families: &[String]) -> Self {
        let resolved_family = resolve_family(&db, families);
        match &resolved_family {
            Some(family) => {
                tracing::debug!(family = %family, faces = db.len(), "resolved display font");
            }
            None => tracing::warn!(
                faces = db.len(),
                "no font faces available; overlays use built-in rendering"
            ),
        }
        Self {
            fontdb: Arc::new(db),
            resolved_family,
        }
    }

    /// Provider with an empty database: every resolution yields [`FontHandle::Builtin`].
    pub fn builtin_only() -> Self {
        Self::from_database(fontdb::Database::new(), &[])
    }

    /// Family chosen by the fallback chain, if any.
    pub fn resolved_family(&self) -> Option<&str> {
        self.resolved_family.as_deref()
    }

    /// Number of faces in the backing database.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }
}

impl std::fmt::Debug for SystemFontProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFontProvider")
            .field("faces", &self.fontdb.len())
            .field("resolved_family", &self.resolved_family)
            .finish()
    }
}

impl FontProvider for SystemFontProvider {
    fn resolve_font(&self, style: FontStyle, size: u32) -> FontHandle {
        match (style, &self.resolved_family) {
            (FontStyle::BoldDisplay, Some(family)) => FontHandle::Face {
                fontdb: Arc::clone(&self.fontdb),
                family: family.clone(),
                size,
            },
            (FontStyle::BoldDisplay, None) => FontHandle::Builtin { size },
        }
    }
}

fn resolve_family(db: &fontdb::Database, families: &[String]) -> Option<String> {
    let bold = |families: &[fontdb::Family<'_>]| {
        db.query(&fontdb::Query {
            families,
            weight: fontdb::Weight::BOLD,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    };

    for name in families {
        if let Some(id) = bold(&[fontdb::Family::Name(name)]) {
            return family_of(db, id);
        }
        tracing::debug!(family = %name, "display family unavailable, trying next");
    }

    if let Some(id) = bold(&[fontdb::Family::SansSerif]) {
        tracing::warn!("display families unavailable; falling back to generic sans-serif");
        return family_of(db, id);
    }

    let first = db.faces().next().map(|face| face.id)?;
    tracing::warn!("no sans-serif face; falling back to the first available face");
    family_of(db, first)
}

fn family_of(db: &fontdb::Database, id: fontdb::ID) -> Option<String> {
    db.face(id)
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory unreadable, skipped");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), "failed to load font: {e}");
        }
    }
}
