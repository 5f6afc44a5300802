use crate::assets::decode::{PreparedSvg, parse_svg};
use crate::foundation::error::FlightResult;

/// Built-in moving marker: a plane whose nose points toward +x, so a heading of 0 rad is
/// "flying right".
pub const PLANE_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <path fill="#f8fafc" stroke="#0f172a" stroke-width="2" stroke-linejoin="round"
    d="M60 32 C60 29.5 57 28 54 28 L38 28 L24 6 L17 6 L26 28 L12 28 L7 20 L2 20 L5 32 L2 44 L7 44 L12 36 L26 36 L17 58 L24 58 L38 36 L54 36 C57 36 60 34.5 60 32 Z"/>
</svg>"##;

/// Parse the built-in plane icon.
pub fn builtin_plane() -> FlightResult<PreparedSvg> {
    parse_svg(PLANE_ICON_SVG.as_bytes())
}
