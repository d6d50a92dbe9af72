//! Core domain for the affiliate blog generator.
//!
//! This crate contains every domain type, the pure stages of the pipeline
//! (request signing, prompt rendering, HTML post-processing), the orchestrator
//! that sequences them, and the port traits that infrastructure crates
//! implement. It performs no I/O of its own.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** It defines *what* is needed; the
//! `coupang`, `llm` and `wordpress` crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Keyword`, `PostId`, `RunId`, etc.) |
//! | [`types`] | Shared value types (`Product`, `GeneratedPost`, `PublishResult`, etc.) |
//! | [`errors`] | Error taxonomy, one type per stage |
//! | [`ports`] | `Clock`, `ProductSearch`, `TextGenerator`, `CmsPublisher` |
//! | [`clock`] | `SystemClock` and `FixedClock` |
//! | [`signer`] | CEA HMAC-SHA256 request signing |
//! | [`template`] | Prompt template selection and rendering |
//! | [`generator`] | `ContentGenerator`: prompts in, HTML out |
//! | [`post_process`] | Title extraction and heading removal |
//! | [`orchestrator`] | `BlogPipeline` |

pub mod clock;
pub mod errors;
pub mod generator;
pub mod identifiers;
pub mod orchestrator;
pub mod ports;
pub mod post_process;
pub mod signer;
pub mod template;
pub mod types;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use clock::{FixedClock, SystemClock};
pub use errors::{
    ConfigError, GenerationError, PipelineError, PublishError, SearchError, SignatureError,
    UpstreamError,
};
pub use generator::{ContentGenerator, DISCLOSURE_HTML};
pub use identifiers::{CategoryId, Keyword, MediaId, PostId, RunId};
pub use orchestrator::{BlogPipeline, GenerateOutcome, PipelineSettings};
pub use ports::{Clock, CmsPublisher, ProductSearch, TextGenerator};
pub use post_process::{split, SplitPost};
pub use signer::{RequestSigner, SignedRequest};
pub use template::{PromptTemplate, TemplateKind, TemplateOrigin, TemplateSource};
pub use types::{
    ChatRequest, GeneratedPost, PostDraft, Product, PublishResult, ReviewedProduct, Timestamp,
};
