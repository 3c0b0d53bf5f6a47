//! Core value types for graver: native handles, document versions, colors and stroke styles.

/// Paint values: gray, RGB, CMYK and explicit "no paint".
pub mod color;
/// Points in document space.
pub mod geometry;
/// Identifier types for native resources and document revisions.
pub mod ids;
/// Enumerated path and stroke style values.
pub mod stroke;

pub use color::{Color, ColorParseError};
pub use geometry::Point;
pub use ids::{DocumentVersion, ItemId, NativeHandle};
pub use stroke::{StrokeCap, StrokeJoin, UnknownStyleName, WindingRule};
