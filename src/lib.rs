//! # querydsl
//!
//! A typed query DSL and request body builder for Elasticsearch-style search
//! services.
//!
//! ## Features
//!
//! - Builders that validate required fields before a query exists
//! - A discriminator-keyed JSON codec for queries, suggestions and smoothing models
//! - Shorthand and expanded field forms accepted on decode
//! - Variant-aware structural equality
//! - Request envelopes ready for any HTTP transport
//!
//! ## Example
//!
//! ```
//! use querydsl::prelude::*;
//! use serde_json::json;
//!
//! let query = QueryBuilders::match_query()
//!     .field("message")
//!     .value("this is a test")
//!     .build()
//!     .unwrap();
//!
//! let encoded = query.to_json();
//! assert_eq!(encoded, json!({"match": {"message": "this is a test"}}));
//! assert_eq!(Query::from_json(&encoded).unwrap(), Query::from(query));
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod query;
pub mod request;
pub mod response;
pub mod suggest;

pub mod prelude {
    pub use crate::codec::{IntoDecimal, JsonCodec};
    pub use crate::config::SerializerConfig;
    pub use crate::error::{MakeBodyError, QueryDslError, Result};
    pub use crate::query::{Builder, Query, QueryBuilders, QueryType, SpanQuery};
    pub use crate::request::{
        CatIndicesRequest, HttpMethod, JsonSerializer, Request, SearchRequest, Serializer,
    };
    pub use crate::response::CatIndicesResponse;
    pub use crate::suggest::{
        SmoothingModel, Suggest, SuggestBuilders, SuggestSource, Suggestion,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
