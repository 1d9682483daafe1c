//! Assertion extraction from SSO agent request metadata.

pub mod attributes;
pub mod extractor;
pub mod source;

pub use attributes::{AssertedAttributes, AttributeValue};
pub use extractor::AssertionExtractor;
pub use source::{
    HeaderSource, MetadataMode, MetadataSource, RequestContext, RequestMetadata, ServerVarSource,
};
