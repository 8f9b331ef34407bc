pub mod loader;

pub use loader::{ImageLoader, PixelGrid, GRID_CHANNELS, GRID_SIZE};
