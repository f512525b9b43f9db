//! Parse, transform and render documents in one call.
//!
//! # Example
//!
//! ```
//! use xdom::Converter;
//! use xdom_core::Syntax;
//! use xdom_transform::TransformationContext;
//!
//! let converter = Converter::with_defaults();
//! let html = converter
//!     .convert(
//!         "{{id name=\"top\"/}}",
//!         &Syntax::XWIKI_2_1,
//!         &Syntax::XHTML_1_0,
//!         &TransformationContext::new(),
//!     )
//!     .unwrap();
//! assert_eq!(html, "<div id=\"top\"></div>");
//! ```

mod converter;

pub use converter::{ConvertError, Converter, transformation_context};
