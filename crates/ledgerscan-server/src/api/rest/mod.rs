//! REST API implementation
//!
//! - types: Request/response type definitions
//! - extractors: CSV body and query extractors with JSON rejections
//! - handlers: API endpoint handlers
//! - router: Router creation and configuration
//! - tests: Unit tests for the extractors and payload types

mod extractors;
mod handlers;
mod router;
pub mod types;

// Re-export public API
pub use extractors::{CsvBody, QueryExtractor};
pub use router::{create_router, create_router_with_limit};
pub use types::{
    AnalyzeResponse, AppState, HealthResponse, PersistResponse, RecordsQuery, RecordsResponse,
    ResultsResponse,
};
