//! Nom parser for block-state descriptors.
//!
//! The host reports cell contents as strings of the form
//! `minecraft:oak_trapdoor[facing=north,half=bottom,open=true]`. Only the
//! block id and the property map matter here; the bracketed part is optional.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};
use std::collections::BTreeMap;

/// A parsed block-state descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    /// Namespaced block id, e.g. `minecraft:oak_trapdoor`.
    pub id: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    /// Parse a descriptor. Returns `None` when the text is not a block state.
    pub fn parse(input: &str) -> Option<Self> {
        match parse_block_state(input.trim()) {
            Ok((_, state)) => Some(state),
            Err(_) => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Boolean property; anything other than `true`/`false` reads as absent.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.property(key)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

fn parse_block_state(input: &str) -> IResult<&str, BlockState> {
    all_consuming(map(
        terminated(pair(block_id, opt(property_list)), multispace0),
        |(id, props)| BlockState {
            id: id.to_string(),
            properties: props
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        },
    ))(input)
}

/// `namespace:path`, or a bare path.
fn block_id(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '/' | '-'))(
        input,
    )
}

fn property_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        char('['),
        separated_list0(delimited(multispace0, char(','), multispace0), property),
        preceded(multispace0, char(']')),
    )(input)
}

fn property(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(multispace0, property_key),
        delimited(multispace0, char('='), multispace0),
        property_value,
    )(input)
}

fn property_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn property_value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_descriptor() {
        let state = BlockState::parse(
            "minecraft:oak_trapdoor[facing=north,half=bottom,open=true,powered=false,waterlogged=false]",
        )
        .unwrap();
        assert_eq!(state.id, "minecraft:oak_trapdoor");
        assert_eq!(state.property("facing"), Some("north"));
        assert_eq!(state.flag("open"), Some(true));
        assert_eq!(state.flag("powered"), Some(false));
        assert_eq!(state.properties.len(), 5);
    }

    #[test]
    fn parses_bare_id() {
        let state = BlockState::parse("minecraft:stone").unwrap();
        assert_eq!(state.id, "minecraft:stone");
        assert!(state.properties.is_empty());
        assert_eq!(state.flag("open"), None);
    }

    #[test]
    fn tolerates_spaces_inside_brackets() {
        let state = BlockState::parse("minecraft:iron_trapdoor[ open = false , half=top ]").unwrap();
        assert_eq!(state.flag("open"), Some(false));
        assert_eq!(state.property("half"), Some("top"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(BlockState::parse("").is_none());
        assert!(BlockState::parse("minecraft:oak_trapdoor[open=true").is_none());
        assert!(BlockState::parse("minecraft:oak_trapdoor[open]").is_none());
        assert!(BlockState::parse("two words").is_none());
    }

    #[test]
    fn non_boolean_flag_reads_as_absent() {
        let state = BlockState::parse("minecraft:oak_trapdoor[open=maybe]").unwrap();
        assert_eq!(state.flag("open"), None);
    }
}
