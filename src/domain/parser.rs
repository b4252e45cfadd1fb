//! Chain file parser.
//!
//! A chain file declares filters in the order they should run:
//!
//! ```text
//! // local checks first
//! Block:[]
//!
//! RickRoll:[
//!     pattern = dQw4w9WgXcQ
//!     shortener: "youtu\.be",
//! ]
//! ```
//!
//! Parsing is line-oriented and never rejects unrecognized text outside a
//! block, so prose and notes can live between declarations.

use std::fs;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use super::error::ParseError;
use super::types::FilterSpec;

/// Opens a block spanning several lines.
const BLOCK_OPEN: &str = ":[";

/// A complete declaration without parameters.
const EMPTY_BLOCK: &str = ":[]";

/// Characters trimmed from both ends of a parameter value.
const VALUE_TRIM: &[char] = &['"', '\'', ')'];

/// Parse a chain file from disk.
pub fn parse_file(path: &Path) -> Result<Vec<FilterSpec>, ParseError> {
    let source = fs::read_to_string(path).map_err(|source| ParseError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Parsing chain file: {}", path.display());
    parse_str(&source)
}

/// Parse chain declarations from in-memory text.
pub fn parse_str(source: &str) -> Result<Vec<FilterSpec>, ParseError> {
    parse_reader(source.as_bytes())
}

/// Parse chain declarations from any buffered reader.
///
/// Declarations are returned in the order their blocks close.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<FilterSpec>, ParseError> {
    let mut specs = Vec::new();
    let mut current: Option<FilterSpec> = None;

    for (index, line) in reader.lines().enumerate() {
        let raw = line?;
        let line = strip_comment(&raw).trim();
        if line.is_empty() {
            continue;
        }

        match current.take() {
            None => {
                if let Some(name) = line.strip_suffix(BLOCK_OPEN) {
                    current = Some(FilterSpec::new(declared_name(name, index, line)?));
                } else if let Some(name) = line.strip_suffix(EMPTY_BLOCK) {
                    specs.push(FilterSpec::new(declared_name(name, index, line)?));
                }
                // Anything else outside a block is free-form text.
            }
            Some(mut spec) => {
                if line.starts_with(']') {
                    specs.push(spec);
                    continue;
                }
                let (key, value) = split_param(line);
                if !key.is_empty() {
                    spec.params.insert(key.to_string(), value.to_string());
                }
                current = Some(spec);
            }
        }
    }

    if let Some(spec) = current {
        return Err(ParseError::UnterminatedBlock { name: spec.name });
    }

    debug!("Parsed {} filter declaration(s)", specs.len());
    Ok(specs)
}

/// Drop everything from the first `//` onward.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn declared_name(name: &str, index: usize, line: &str) -> Result<String, ParseError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::InvalidDeclaration {
            line: index + 1,
            text: line.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Split a parameter line into key and value.
///
/// `=` takes precedence over `:`; a line with neither becomes a key with an
/// empty value.
fn split_param(line: &str) -> (&str, &str) {
    let line = line.strip_suffix(',').unwrap_or(line);
    let (key, value) = match line.find('=').or_else(|| line.find(':')) {
        Some(idx) => (&line[..idx], &line[idx + 1..]),
        None => (line, ""),
    };
    (key.trim(), value.trim().trim_matches(VALUE_TRIM))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Params;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_single_block() {
        let specs = parse_str("RickRoll:[\n pattern = example\\.com\n]").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "RickRoll");
        assert_eq!(specs[0].params, params(&[("pattern", "example\\.com")]));
    }

    #[test]
    fn test_empty_block_form() {
        let specs = parse_str("Block:[]").unwrap();
        assert_eq!(specs, vec![FilterSpec::new("Block")]);
    }

    #[test]
    fn test_order_follows_block_close() {
        let source = "\
First:[]
Second:[
  a = 1
]
Third:[]
";
        let names: Vec<_> = parse_str(source)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_equals_and_colon_forms_are_equivalent() {
        let eq = parse_str("F:[\n key=value\n]").unwrap();
        let colon = parse_str("F:[\n key: value\n]").unwrap();
        assert_eq!(eq[0].params, colon[0].params);
    }

    #[test]
    fn test_equals_wins_over_colon() {
        let specs = parse_str("F:[\n ratio = 1:2\n]").unwrap();
        assert_eq!(specs[0].params["ratio"], "1:2");

        let specs = parse_str("F:[\n a:b = c\n]").unwrap();
        assert_eq!(specs[0].params["a:b"], "c");

        // Split on the first ':' when there is no '='
        let specs = parse_str("F:[\n ratio: 1:2\n]").unwrap();
        assert_eq!(specs[0].params["ratio"], "1:2");
    }

    #[test]
    fn test_comments_and_whitespace() {
        let source = "\
// leading comment
   Regex:[   // opener comment
      a = x   // trailing
      // standalone comment
   ]
";
        let specs = parse_str(source).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].params, params(&[("a", "x")]));
    }

    #[test]
    fn test_comment_marker_inside_value_is_stripped() {
        // Everything from the first `//` is a comment, even inside a value.
        let specs = parse_str("F:[\n url = https://evil.example\n]").unwrap();
        assert_eq!(specs[0].params["url"], "https:");
    }

    #[test]
    fn test_prose_outside_blocks_is_ignored() {
        let source = "\
This file configures the scanner.
Block:[]
random text: with colon
Other:[]
";
        let specs = parse_str(source).unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_value_trimming() {
        let source = "\
F:[
  a = \"quoted\",
  b = 'single'
  c = value)
  d = (paren
  e = \"'mixed')\"
]
";
        let specs = parse_str(source).unwrap();
        let p = &specs[0].params;
        assert_eq!(p["a"], "quoted");
        assert_eq!(p["b"], "single");
        assert_eq!(p["c"], "value");
        assert_eq!(p["d"], "(paren");
        assert_eq!(p["e"], "mixed");
    }

    #[test]
    fn test_bare_key_and_empty_key() {
        let specs = parse_str("F:[\n standalone\n = orphan\n]").unwrap();
        assert_eq!(specs[0].params, params(&[("standalone", "")]));
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let specs = parse_str("F:[\n k = 1\n k = 2\n]").unwrap();
        assert_eq!(specs[0].params, params(&[("k", "2")]));
    }

    #[test]
    fn test_close_bracket_prefix_closes_block() {
        let specs = parse_str("F:[\n k = 1\n], trailing\nG:[]").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].params.len(), 1);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_str("Block:[]\nGood:[\n]\nBroken:[\n k = v\n").unwrap_err();
        match err {
            ParseError::UnterminatedBlock { name } => assert_eq!(name, "Broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_name_is_invalid() {
        for source in [":[\n]", "  :[]", "// c\n   :["] {
            let err = parse_str(source).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidDeclaration { .. }),
                "{source:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_declaration_reports_line() {
        let err = parse_str("Block:[]\n\n :[\n]").unwrap_err();
        match err {
            ParseError::InvalidDeclaration { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let source = "A:[\n x = 1\n y: 2\n]\nB:[]\n";
        assert_eq!(parse_str(source).unwrap(), parse_str(source).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("\n\n   \n// only comments\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file(Path::new("/nonexistent/phishnet/bootstrap.fn")).unwrap_err();
        assert!(matches!(err, ParseError::ReadFile { .. }));
    }
}
