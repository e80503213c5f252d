pub mod language;
pub mod lexicon;
pub mod models;
pub mod reply;
pub mod translit;
pub mod urgency;

pub use language::detect_language;
pub use lexicon::{Classification, KeywordEntry, Lexicon};
pub use models::*;
pub use reply::{compose_reply, should_use_minimal};
pub use translit::transliterate;
pub use urgency::score_urgency;
