//! Taxonomy grammar parser
//!
//! Turns notation such as `Animal{Mammal,Bird{Fish,Reptile}}` into a
//! [`Forest`]. The scan is single pass and all-or-nothing: the first
//! violation discards everything built so far.
//!
//! Grammar (informal):
//!
//! ```text
//! taxonomy := item ("," item)*
//! item     := name ("{" taxonomy "}")?
//! ```
//!
//! Whitespace around names is ignored. Names must be non-empty after trimming.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace};

use super::node::{Forest, ParserNode};

const OPEN: char = '{';
const CLOSE: char = '}';
const SEPARATOR: char = ',';

/// Reason a taxonomy string was rejected
///
/// Positions are byte offsets into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unbalanced braces ({opening} '{{' vs {closing} '}}')")]
    Unbalanced { opening: usize, closing: usize },

    #[error("empty name at offset {position}")]
    EmptyName { position: usize },

    #[error("unmatched '}}' or ',' at offset {position}")]
    DanglingClose { position: usize },
}

impl ParseError {
    /// Offset where scanning stopped, if the failure is positional
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Unbalanced { .. } => None,
            Self::EmptyName { position } | Self::DanglingClose { position } => Some(*position),
        }
    }
}

/// Last control character seen by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Start,
    Open,
    Close,
    Separator,
}

/// Scan state. The top of `open` is the group currently accepting children;
/// a group is attached to its parent (or the roots) when it is popped.
struct Scanner {
    roots: Vec<ParserNode>,
    open: Vec<ParserNode>,
    buffer: String,
    last: Control,
}

impl Scanner {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            open: Vec::new(),
            buffer: String::new(),
            last: Control::Start,
        }
    }

    fn take_name(&mut self) -> Option<String> {
        let name = self.buffer.trim().to_string();
        self.buffer.clear();
        (!name.is_empty()).then_some(name)
    }

    fn attach(&mut self, node: ParserNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn open_group(&mut self, position: usize) -> Result<(), ParseError> {
        let name = self
            .take_name()
            .ok_or(ParseError::EmptyName { position })?;
        trace!(%name, depth = self.open.len(), "open group");
        self.open.push(ParserNode::new(name));
        self.last = Control::Open;
        Ok(())
    }

    /// A named `}` adds a final child but leaves the group current; the pop
    /// happens on the next empty `}` or `,`.
    fn close_group(&mut self, position: usize) -> Result<(), ParseError> {
        match self.take_name() {
            Some(name) => {
                let parent = self
                    .open
                    .last_mut()
                    .ok_or(ParseError::DanglingClose { position })?;
                trace!(%name, parent = %parent.name, "leaf");
                parent.children.push(ParserNode::new(name));
            }
            None => self.pop_after_close(position)?,
        }
        self.last = Control::Close;
        Ok(())
    }

    fn separate(&mut self, position: usize) -> Result<(), ParseError> {
        match self.take_name() {
            Some(name) => {
                trace!(%name, depth = self.open.len(), "sibling");
                self.attach(ParserNode::new(name));
            }
            None => self.pop_after_close(position)?,
        }
        self.last = Control::Separator;
        Ok(())
    }

    /// An empty slot is only legal right after `}`, where it closes one level.
    fn pop_after_close(&mut self, position: usize) -> Result<(), ParseError> {
        if self.last != Control::Close {
            return Err(ParseError::EmptyName { position });
        }
        let node = self
            .open
            .pop()
            .ok_or(ParseError::DanglingClose { position })?;
        self.attach(node);
        Ok(())
    }

    fn finish(mut self) -> Forest {
        let tail = self.take_name();
        while let Some(node) = self.open.pop() {
            self.attach(node);
        }
        if let Some(name) = tail {
            self.roots.push(ParserNode::new(name));
        }
        Forest::new(self.roots)
    }
}

/// Parse taxonomy notation into a forest of root nodes
///
/// `""` yields an empty forest. Any malformed input yields `Err` and no
/// partial result.
pub fn parse_nodes(text: &str) -> Result<Forest, ParseError> {
    let opening = text.chars().filter(|&c| c == OPEN).count();
    let closing = text.chars().filter(|&c| c == CLOSE).count();
    if opening != closing {
        debug!(opening, closing, "rejecting taxonomy with unbalanced braces");
        return Err(ParseError::Unbalanced { opening, closing });
    }

    let mut scanner = Scanner::new();
    for (position, c) in text.char_indices() {
        let step = match c {
            OPEN => scanner.open_group(position),
            CLOSE => scanner.close_group(position),
            SEPARATOR => scanner.separate(position),
            _ => {
                scanner.buffer.push(c);
                Ok(())
            }
        };
        if let Err(e) = step {
            debug!(error = %e, "rejecting taxonomy");
            return Err(e);
        }
    }

    Ok(scanner.finish())
}

/// Whether `text` is well-formed taxonomy notation
pub fn is_valid(text: &str) -> bool {
    parse_nodes(text).is_ok()
}

impl FromStr for Forest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_nodes(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(nodes: &[ParserNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_valid_taxonomy() {
        let forest = parse_nodes("Animal{Mammal,Bird{Fish,Reptile}, Invertebrate}").unwrap();

        assert_eq!(forest.len(), 1);
        let animal = &forest.roots()[0];
        assert_eq!(animal.name, "Animal");
        assert_eq!(names(&animal.children), vec!["Mammal", "Bird", "Invertebrate"]);

        let bird = &animal.children[1];
        assert_eq!(names(&bird.children), vec!["Fish", "Reptile"]);

        assert!(animal.children[0].is_leaf());
        assert!(animal.children[2].is_leaf());
        assert!(bird.children.iter().all(ParserNode::is_leaf));
    }

    #[test]
    fn test_invalid_taxonomy() {
        let invalid = [
            "{Animal,{Mammal,Bird,Reptile},Invertebrate}",
            "{Animal,{Mammal,{Bird,Reptile},Invertebrate}",
            "{Animal,Mammal,}Invertebrate",
            "{Animal,{Mammal,,Bird},Invertebrate}",
            "{Animal,{Mammal,Bird,},Invertebrate}",
            "{Animal,{Mammal,{Bird,},Invertebrate}",
            "{Animal,{Mammal,Bird,,Reptile},Invertebrate}",
        ];

        for text in invalid {
            assert!(parse_nodes(text).is_err(), "accepted: {}", text);
            assert!(!is_valid(text));
        }
    }

    #[test]
    fn test_empty_input_is_empty_forest() {
        let forest = parse_nodes("").unwrap();
        assert!(forest.is_empty());

        let forest = parse_nodes("  \t\n").unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn test_single_name() {
        let forest = parse_nodes("Animal").unwrap();
        assert_eq!(names(forest.roots()), vec!["Animal"]);
        assert!(forest.roots()[0].is_leaf());
    }

    #[test]
    fn test_top_level_siblings() {
        let forest = parse_nodes("Plant, Animal{Bird}, Fungus").unwrap();
        assert_eq!(names(forest.roots()), vec!["Plant", "Animal", "Fungus"]);
        assert_eq!(names(&forest.roots()[1].children), vec!["Bird"]);
    }

    #[test]
    fn test_nested_close_pops_one_level() {
        let forest = parse_nodes("A{B{C{D}},E}").unwrap();
        let a = &forest.roots()[0];
        assert_eq!(names(&a.children), vec!["B", "E"]);
        assert_eq!(names(&a.children[0].children), vec!["C"]);
        assert_eq!(names(&a.children[0].children[0].children), vec!["D"]);
    }

    #[test]
    fn test_trailing_name_after_group_is_root() {
        let forest = parse_nodes("A{B}C").unwrap();
        assert_eq!(names(forest.roots()), vec!["A", "C"]);
        assert_eq!(names(&forest.roots()[0].children), vec!["B"]);
    }

    #[test]
    fn test_name_after_group_then_comma_stays_in_group() {
        let forest = parse_nodes("A{B}C,D").unwrap();
        assert_eq!(names(forest.roots()), vec!["A", "D"]);
        assert_eq!(names(&forest.roots()[0].children), vec!["B", "C"]);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let forest = parse_nodes("  Animal {  Mammal , Bird  }  ").unwrap();
        let animal = &forest.roots()[0];
        assert_eq!(animal.name, "Animal");
        assert_eq!(names(&animal.children), vec!["Mammal", "Bird"]);
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        let forest = parse_nodes("Living Things{Sea Creatures}").unwrap();
        assert_eq!(forest.roots()[0].name, "Living Things");
        assert_eq!(forest.roots()[0].children[0].name, "Sea Creatures");
    }

    #[test]
    fn test_duplicate_names_are_kept_apart() {
        let forest = parse_nodes("Sea{Fish},River{Fish,Fish}").unwrap();
        assert_eq!(forest.roots()[0].children.len(), 1);
        assert_eq!(names(&forest.roots()[1].children), vec!["Fish", "Fish"]);
    }

    #[test]
    fn test_unbalanced_reports_counts() {
        assert_eq!(
            parse_nodes("A{B{C}"),
            Err(ParseError::Unbalanced {
                opening: 2,
                closing: 1
            })
        );
    }

    #[test]
    fn test_group_without_name() {
        assert_eq!(
            parse_nodes("{A}"),
            Err(ParseError::EmptyName { position: 0 })
        );
        assert_eq!(
            parse_nodes("A{ {B}}"),
            Err(ParseError::EmptyName { position: 3 })
        );
    }

    #[test]
    fn test_empty_list_items() {
        assert_eq!(
            parse_nodes("A,,B"),
            Err(ParseError::EmptyName { position: 2 })
        );
        assert_eq!(
            parse_nodes("A{}"),
            Err(ParseError::EmptyName { position: 2 })
        );
        assert_eq!(
            parse_nodes(",A"),
            Err(ParseError::EmptyName { position: 0 })
        );
    }

    #[test]
    fn test_reversed_braces_fail() {
        assert_eq!(
            parse_nodes("}{"),
            Err(ParseError::EmptyName { position: 0 })
        );
    }

    #[test]
    fn test_stray_close_with_name() {
        assert_eq!(
            parse_nodes("A}{B"),
            Err(ParseError::DanglingClose { position: 1 })
        );
    }

    #[test]
    fn test_pop_past_top_level() {
        assert_eq!(
            parse_nodes("A{B}},{C"),
            Err(ParseError::DanglingClose { position: 5 })
        );
    }

    #[test]
    fn test_error_position() {
        assert_eq!(ParseError::EmptyName { position: 4 }.position(), Some(4));
        assert_eq!(
            ParseError::Unbalanced {
                opening: 1,
                closing: 0
            }
            .position(),
            None
        );
    }

    #[test]
    fn test_from_str() {
        let forest: Forest = "A{B}".parse().unwrap();
        assert_eq!(forest.to_string(), "A{B}");
        assert!("A{".parse::<Forest>().is_err());
    }

    fn name_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_]{0,8}"
    }

    fn node_strategy() -> impl Strategy<Value = ParserNode> {
        let leaf = name_strategy().prop_map(ParserNode::new);
        leaf.prop_recursive(4, 32, 4, |inner| {
            (name_strategy(), prop::collection::vec(inner, 1..4))
                .prop_map(|(name, children)| ParserNode::with_children(name, children))
        })
    }

    fn forest_strategy() -> impl Strategy<Value = Forest> {
        prop::collection::vec(node_strategy(), 0..4).prop_map(Forest::new)
    }

    proptest! {
        #[test]
        fn prop_render_then_parse_is_stable(forest in forest_strategy()) {
            let text = forest.to_string();
            prop_assert_eq!(parse_nodes(&text), Ok(forest));
        }

        #[test]
        fn prop_padding_does_not_change_structure(forest in forest_strategy()) {
            let padded = forest
                .to_string()
                .replace(',', " , ")
                .replace('{', " {\n ")
                .replace('}', "\t} ");
            prop_assert_eq!(parse_nodes(&padded), Ok(forest));
        }

        #[test]
        fn prop_unbalanced_always_fails(text in "[a-c{},]{0,24}") {
            let opening = text.matches('{').count();
            let closing = text.matches('}').count();
            prop_assume!(opening != closing);
            prop_assert_eq!(
                parse_nodes(&text),
                Err(ParseError::Unbalanced { opening, closing })
            );
        }

        #[test]
        fn prop_emitted_names_are_trimmed_and_non_empty(text in "[a-c {},]{0,24}") {
            if let Ok(forest) = parse_nodes(&text) {
                for name in forest.names() {
                    prop_assert!(!name.is_empty());
                    prop_assert_eq!(name, name.trim());
                }
            }
        }
    }
}
