/// Layout units covered by one terminal cell.
pub(crate) const CELL_SIZE_PX: (f32, f32) = (10.0, 20.0);
/// Raster pixels per cell column; half-block drawing needs two rows per cell.
pub(crate) const RASTER_PX_PER_COLUMN: u32 = 2;
pub(crate) const RENDER_THREADS: usize = 2;
