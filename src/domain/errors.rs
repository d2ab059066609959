// Domain-level errors for the render pass.

use std::fmt;

use super::state::{Bounds, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Arena bounds cannot be fitted onto the surface.
    DegenerateBounds(Bounds),
    /// An entity carries a NaN or infinite coordinate or angle.
    NonFiniteGeometry { entity: EntityId },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DegenerateBounds(bounds) => write!(
                f,
                "degenerate arena bounds {}x{}",
                bounds.width, bounds.height
            ),
            RenderError::NonFiniteGeometry { entity } => {
                write!(f, "non-finite geometry for entity {entity}")
            }
        }
    }
}

impl std::error::Error for RenderError {}
