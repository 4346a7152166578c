use crate::raster::RasterFrame;

/// Side length of the model's square input.
pub const GRID_SIDE: usize = 28;
/// Number of cells in the model's input grid.
pub const GRID_LEN: usize = GRID_SIDE * GRID_SIDE;

/// A 28×28 grid of ink density in `[0, 1]`, row-major (`row * 28 + col`).
///
/// 1.0 means fully inked, 0.0 means blank.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    cells: [f32; GRID_LEN],
}

impl IntensityGrid {
    pub fn as_slice(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row * GRID_SIDE + col]
    }

    /// Mean ink density over the whole grid.
    pub fn mean(&self) -> f32 {
        self.cells.iter().sum::<f32>() / GRID_LEN as f32
    }
}

/// Ink density of one source pixel: inverted luminance weighted by opacity.
///
/// Dark strokes on a light background yield high values whatever the stroke
/// colour; a transparent pixel contributes nothing.
fn ink(px: &[u8; 4]) -> f32 {
    let [r, g, b, a] = *px;
    let gray = (r as f32 + g as f32 + b as f32) / 3.0;
    let inverted = (255.0 - gray) / 255.0;
    inverted * (a as f32 / 255.0)
}

/// Source index range covered by target cell `cell` along an axis of `len`
/// source pixels: `[floor(cell*len/28), min(ceil((cell+1)*len/28), len))`.
fn window(cell: usize, len: usize) -> (usize, usize) {
    let start = cell * len / GRID_SIDE;
    let end = ((cell + 1) * len + GRID_SIDE - 1) / GRID_SIDE;
    (start, end.min(len))
}

/// Area-averages an arbitrary-size raster onto the fixed 28×28 grid.
///
/// Each target cell is the mean ink of the source sub-rectangle it covers;
/// an empty sub-rectangle yields 0. Sources smaller than 28 along an axis
/// stretch: neighbouring cells share the same source pixels.
pub fn downsample(frame: &RasterFrame) -> IntensityGrid {
    let (w, h) = (frame.width(), frame.height());
    let mut cells = [0.0f32; GRID_LEN];

    for py in 0..GRID_SIDE {
        let (y0, y1) = window(py, h);
        for px in 0..GRID_SIDE {
            let (x0, x1) = window(px, w);

            let mut sum = 0.0f32;
            let mut count = 0usize;
            for y in y0..y1 {
                for pixel in &frame.row(y)[x0..x1] {
                    sum += ink(pixel);
                    count += 1;
                }
            }

            let value = if count > 0 { sum / count as f32 } else { 0.0 };
            cells[py * GRID_SIDE + px] = value.clamp(0.0, 1.0);
        }
    }

    IntensityGrid { cells }
}
