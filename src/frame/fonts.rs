use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Extra font directory scanned in addition to system fonts.
pub const FONTS_DIR_ENV: &str = "POPMARK_FONTS_DIR";

/// Family list for regular labels.
pub(crate) const LABEL_FAMILIES: &str = "'DejaVu Sans', Arial, Helvetica, sans-serif";
/// Family list for the hand-drawn bracket label.
pub(crate) const HAND_FAMILIES: &str = "'Comic Neue', 'Comic Sans MS', 'Segoe Print', cursive";

static FONT_DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// Process-wide font database. Built once so repeated renders resolve identical faces.
pub(crate) fn font_db() -> Arc<usvg::fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            if let Some(dir) = std::env::var_os(FONTS_DIR_ENV) {
                load_fonts_from_dir(&mut db, Path::new(&dir));
            }
            tracing::debug!(faces = db.len(), "font database ready");
            Arc::new(db)
        })
        .clone()
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    let mut paths: Vec<_> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
                .unwrap_or(false)
        })
        .collect();
    // Directory order is platform dependent; face ids must not be.
    paths.sort();
    for path in paths {
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// usvg parse options wired to the shared font database.
pub(crate) fn svg_options() -> usvg::Options<'static> {
    usvg::Options {
        fontdb: font_db(),
        font_resolver: font_resolver(),
        ..Default::default()
    }
}

fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<usvg::fontdb::Family<'_>> =
                font.families().iter().map(map_family).collect();
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: map_stretch(font.stretch()),
                style: map_style(font.style()),
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn map_family(family: &usvg::FontFamily) -> usvg::fontdb::Family<'_> {
    match family {
        usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
        usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
        usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
        usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
        usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
        usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
    }
}

fn map_style(style: usvg::FontStyle) -> usvg::fontdb::Style {
    match style {
        usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
        usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
        usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
    }
}

fn map_stretch(stretch: usvg::FontStretch) -> usvg::fontdb::Stretch {
    use usvg::FontStretch as S;
    use usvg::fontdb::Stretch as D;
    match stretch {
        S::UltraCondensed => D::UltraCondensed,
        S::ExtraCondensed => D::ExtraCondensed,
        S::Condensed => D::Condensed,
        S::SemiCondensed => D::SemiCondensed,
        S::Normal => D::Normal,
        S::SemiExpanded => D::SemiExpanded,
        S::Expanded => D::Expanded,
        S::ExtraExpanded => D::ExtraExpanded,
        S::UltraExpanded => D::UltraExpanded,
    }
}
