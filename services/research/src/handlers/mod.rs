pub mod fx;
pub mod health;
pub mod parse;
pub mod research;

pub use fx::rate_to_sek;
pub use health::detailed_health_check;
pub use parse::parse_items;
pub use research::{research, research_text};
