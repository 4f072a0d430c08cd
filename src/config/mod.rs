pub mod settings;

pub use settings::{AdminConfig, AppConfig};
