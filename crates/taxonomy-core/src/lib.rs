pub mod config;
pub mod error;
pub mod json;
pub mod taxonomy;

pub use config::{Config, OutputConfig, OutputFormat, TaxonomyConfig};
pub use error::{Result, TaxonomyError};
pub use json::{
    format_json, read_json, read_taxonomy_text, to_pretty_json, write_json, MAX_JSON_DEPTH,
};

// Taxonomy parsing
pub use taxonomy::{
    build_taxonomy_tree, is_valid, parse_nodes, parse_taxonomy, parse_taxonomy_with_root, Forest,
    InvalidNodeName, ParseError, ParserNode, TaxonomyTree, DEFAULT_ROOT_LABEL,
};
