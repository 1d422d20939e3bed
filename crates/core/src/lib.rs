pub mod clean;
pub mod config;
pub mod signal;

pub use clean::clean_text;
pub use config::{load_config, ConfigError, PipelineConfig};
pub use signal::{DocKind, OcrSource, PageLink, PageSummary, PageText, Signal};
