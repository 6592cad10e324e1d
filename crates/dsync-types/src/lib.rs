//! Canonical token model for dsync.
//!
//! Every other dsync crate exchanges tokens through the types defined here.
//! The model is a two-level hierarchy: a [`TokenTree`] maps category names to
//! [`TokenCategory`] buckets, and each category maps token names to
//! [`Token`]s. Both levels keep document order, so loading and re-serializing
//! a tree reproduces its layout.
//!
//! # Key Types
//!
//! - [`Token`] -- A named design value with a type tag
//! - [`TokenKind`] / [`TypeTag`] -- The closed set of token kinds, and the tag as written in a document
//! - [`TokenValue`] / [`Typography`] -- Token values and the typography composite
//! - [`TokenCategory`] / [`TokenTree`] -- The category and tree levels
//! - [`TokenPath`] -- Dotted `category.name` locator
//! - [`Rgba`] / [`Dimension`] / [`Duration`] -- Parsed forms of color, length, and time values
//! - [`Platform`] -- Build output platform selector

pub mod color;
pub mod error;
pub mod kind;
pub mod ordered;
pub mod path;
pub mod platform;
pub mod token;
pub mod tree;
pub mod units;
pub mod value;

pub use color::Rgba;
pub use error::{TypeError, TypeResult};
pub use kind::{TokenKind, TypeTag};
pub use ordered::OrderedMap;
pub use path::TokenPath;
pub use platform::Platform;
pub use token::Token;
pub use tree::{TokenCategory, TokenTree};
pub use units::{Dimension, Duration, LengthUnit};
pub use value::{number_from_f64, TokenValue, Typography};
