//! Raw correlation hits in scan-resolution coordinates.

/// Above-threshold placement of a transformed template on the scan surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the window's top-left pixel.
    pub x: usize,
    /// Y coordinate (row) of the window's top-left pixel.
    pub y: usize,
    /// ZNCC score at this placement.
    pub score: f32,
}
