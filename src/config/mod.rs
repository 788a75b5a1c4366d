//! Configuration module

mod viewer;

pub use viewer::HighlightConfig;
pub use viewer::ServerConfig;
pub use viewer::ThemeMode;
pub use viewer::ViewerConfig;
