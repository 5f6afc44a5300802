use std::sync::Arc;

use usvg::fontdb::{Database, Family, Query};

use crate::foundation::error::{FlightError, FlightResult};

/// Sans-serif families tried, in order, when no font file is configured.
const PREFERRED_FAMILIES: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial"];

/// Raw font file bytes plus the face to use inside them (non-zero for collections).
#[derive(Clone, Debug)]
pub struct FontBytes {
    /// TTF/OTF/TTC data.
    pub bytes: Arc<Vec<u8>>,
    /// Face index within `bytes`.
    pub index: u32,
}

impl FontBytes {
    /// A single-face font file.
    pub fn single(bytes: Arc<Vec<u8>>) -> Self {
        Self { bytes, index: 0 }
    }
}

/// Resolve a sans-serif face from the fonts installed on this machine.
#[tracing::instrument]
pub fn system_sans_font() -> FlightResult<FontBytes> {
    let mut db = Database::new();
    db.load_system_fonts();
    pick_sans_face(&db).ok_or_else(|| {
        FlightError::asset_load(format!(
            "no usable system font found ({} faces scanned); set font_path",
            db.len()
        ))
    })
}

/// Generic sans-serif first, then well-known families, then any face at all.
pub(crate) fn pick_sans_face(db: &Database) -> Option<FontBytes> {
    let mut families = vec![Family::SansSerif];
    families.extend(PREFERRED_FAMILIES.iter().map(|&name| Family::Name(name)));

    let id = db
        .query(&Query {
            families: &families,
            ..Query::default()
        })
        .or_else(|| db.faces().next().map(|face| face.id))?;

    db.with_face_data(id, |data, index| FontBytes {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}
