//! Source Verification Pipeline
//!
//! Takes a text claim (or a link to a public post), finds candidate sources
//! for it on the web, pulls their content, and asks an AI model how well each
//! source corroborates the claim.
//!
//! # Pipeline
//!
//! 1. **Extract** — resolve post links to text, pull out structured signal
//!    (dates, numbers, names, key statements). Pure, no network.
//! 2. **Locate** — multi-provider web search with credential-ordered
//!    fallback (Google Custom Search, Bing, SerpAPI, LLM suggester).
//! 3. **Fetch** — concurrent retrieval and cleaning of the top candidates;
//!    unreachable pages degrade to snippets or an unavailable marker.
//! 4. **Compare** — one model call rating each usable source's semantic
//!    agreement with the claim, 0-100.
//! 5. **Assemble** — join verdicts back onto the source list positionally.
//!
//! Only empty input and an empty search result abort a request; every later
//! stage degrades to a partial result instead of failing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use verification::Orchestrator;
//!
//! let orchestrator = Orchestrator::from_env();
//! let result = orchestrator.run("Central bank raised rates to 9.5%").await?;
//! println!("{} sources", result.sources.len());
//! ```
//!
//! # Modules
//!
//! - [`extractor`] - Signal extraction and search query building
//! - [`locator`] - Search backends and source-type classification
//! - [`fetcher`] - Concurrent page retrieval and HTML cleanup
//! - [`comparator`] - AI semantic comparison
//! - [`orchestrator`] - Pipeline sequencing and partial-failure policy
//! - [`testing`] - In-memory doubles for the search/compare seams

pub mod comparator;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod input;
mod json;
pub mod locator;
pub mod orchestrator;
pub mod testing;
pub mod types;

pub use comparator::{LlmComparator, SemanticComparator};
pub use config::{GoogleCredentials, SearchConfig};
pub use error::{CompareError, LocatorError, PipelineError};
pub use extractor::{build_query, extract};
pub use fetcher::{ContentFetcher, DEFAULT_FETCH_LIMIT};
pub use locator::{
    classify_source_type, filter_results_by_source_type, ProviderChain, SourceSearch,
    DEFAULT_PREFERRED_TYPES,
};
pub use orchestrator::{NullSink, Orchestrator, ProgressSink, ProgressStage};
pub use types::{
    Comparison, ComparisonMatch, ConfidenceTier, ContentStatus, ExtractedElements, PipelineResult,
    SearchResult, SourceContent, SourceType, VerifiedSource, UNAVAILABLE_TEXT, UNTITLED,
};
