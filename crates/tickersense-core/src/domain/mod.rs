mod models;
mod ticker;
mod timestamp;

pub use models::{AnalysisRecord, ChangePercent, Credential, Quote};
pub use ticker::Ticker;
pub use timestamp::UtcTimestamp;
