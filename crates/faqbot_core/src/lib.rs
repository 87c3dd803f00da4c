pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod generate;
pub mod matching;
pub mod model;
pub mod orchestrator;
pub mod session;
pub mod similarity;

pub use config::{AssistantConfig, DEFAULT_DATASET, DEFAULT_TIMEOUT_SECS};
pub use dataset::{load_entries_csv, parse_entries_csv, REQUIRED_COLUMNS};
pub use error::{Error, Result};
pub use extract::{extract, extract_text, ocr_available};
pub use generate::{
    build_prompt, generate, truncate_context, OllamaGenerator, TextGenerator, DEFAULT_HOST,
    DEFAULT_MODEL, ELLIPSIS, FALLBACK_APOLOGY, MAX_CONTEXT_CHARS,
};
pub use matching::{find_best_match, top_match, DEFAULT_THRESHOLD};
pub use model::{AttachmentKind, ChatTurn, Decision, FaqEntry, MatchResult, Role};
pub use orchestrator::{Assistant, AI_RESPONSE_LABEL};
pub use session::ChatSession;
pub use similarity::token_sort_ratio;
