// Document layout: block building, text measurement and flowing pagination.
// Everything here is pure and CPU-bound; async callers go through
// tokio::task::spawn_blocking (see generation::generator::render_document).

pub mod blocks;
pub mod flow;
pub mod font_metrics;
pub mod page_config;

// Re-export the public API consumed by other modules (render, generator, handlers).
pub use blocks::{build_blocks, Block, BlockKind};
pub use flow::{paginate, LaidOutPage, Layout, PlacedLine};
pub use font_metrics::{FontFace, FontFamily};
pub use page_config::{default_page_config, PageConfig};
