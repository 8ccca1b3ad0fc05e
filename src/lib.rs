//! Pull-based decoder for length-prefixed, big-endian message broker wire protocols.
//!
//! A [`Decoder`] walks an immutable buffer with a single cursor. Callers issue
//! reads in the order of the wire schema, and may probe with the `can_read_*`
//! family before consuming bytes of a partially received buffer.

#![warn(
    clippy::cognitive_complexity,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_link_with_quotes,
    clippy::doc_markdown,
    clippy::empty_line_after_outer_attr,
    clippy::empty_structs_with_brackets,
    clippy::float_cmp,
    clippy::float_cmp_const,
    clippy::float_equality_without_abs,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    non_ascii_idents,
    noop_method_call,
    clippy::option_if_let_else,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::semicolon_if_nothing_returned,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::similar_names,
    clippy::suspicious_operation_groupings,
    unused_extern_crates,
    unused_import_braces,
    clippy::unused_self,
    clippy::use_debug,
    clippy::used_underscore_binding,
    clippy::useless_let_if_seq,
    clippy::wildcard_dependencies,
    clippy::wildcard_imports
)]

/// Wire decoder
mod decoder;

/// Errors
mod errors;

/// Decoder options
mod opts;


pub use self::decoder::{decode_zigzag, decode_zigzag64, Decoder, TaggedField};
pub use self::errors::{Error, Result};
pub use self::opts::{Config, ConfigBuilder, ConfigBuilderError, TextPolicy};
