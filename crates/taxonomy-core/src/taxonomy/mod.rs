//! # Taxonomy Module
//!
//! Parses bracketed taxonomy notation and materialises it as a tree.
//!
//! ```text
//! Animal{Mammal,Bird{Fish,Reptile},Invertebrate}
//! ```
//!
//! ## Module layout
//!
//! - `parser`: single-pass grammar scanner producing a [`Forest`]
//! - `node`: [`ParserNode`] / [`Forest`] model and canonical rendering
//! - `tree`: [`TaxonomyTree`], the name-keyed rooted tree store
//! - `assembler`: forest to tree materialisation
//!
//! ## Usage
//!
//! ```rust
//! use taxonomy_core::taxonomy::{build_taxonomy_tree, parse_nodes};
//!
//! let forest = parse_nodes("Animal{Mammal,Bird{Fish,Reptile}}").unwrap();
//! assert_eq!(forest.len(), 1);
//!
//! let tree = build_taxonomy_tree(&forest, "Taxonomy");
//! assert!(tree.contains("Fish"));
//! assert!(tree.is_ancestor("Animal", "Reptile"));
//!
//! // Malformed input is an error, empty input is an empty forest
//! assert!(parse_nodes("{Animal}").is_err());
//! assert!(parse_nodes("").unwrap().is_empty());
//! ```

mod assembler;
mod node;
mod parser;
mod tree;

pub use assembler::{
    build_taxonomy_tree, parse_taxonomy, parse_taxonomy_with_root, DEFAULT_ROOT_LABEL,
};
pub use node::{Forest, InvalidNodeName, ParserNode};
pub use parser::{is_valid, parse_nodes, ParseError};
pub use tree::TaxonomyTree;
