use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::lexer::{split_assignment, strip_comment, tokenize, unquote};
use crate::types::{
    Block, BlockKind, Diagnostic, DiagnosticKind, Module, ModuleCategory, SourceLocation,
};
use crate::value::coerce;

/// Blocks keyed by `(kind, name)`, in first-seen order. A repeated key is
/// merged into the stored block instead of being added again.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    blocks: Vec<Block>,
    index: HashMap<(BlockKind, String), usize>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `block`, merging it into an earlier one with the same key.
    /// Returns `true` when a merge happened.
    pub fn insert(&mut self, block: Block) -> bool {
        let key = (block.kind, block.name.clone());
        match self.index.get(&key) {
            Some(&slot) => {
                log::debug!(
                    "{}: merging {} {} into definition from {}",
                    block.location,
                    block.kind,
                    block.name,
                    self.blocks[slot].location
                );
                self.blocks[slot].merge(block);
                true
            }
            None => {
                self.index.insert(key, self.blocks.len());
                self.blocks.push(block);
                false
            }
        }
    }

    /// Merges every block of `other` in its order.
    pub fn extend(&mut self, other: BlockSet) {
        for block in other.blocks {
            self.insert(block);
        }
    }

    pub fn get(&self, kind: BlockKind, name: &str) -> Option<&Block> {
        self.index
            .get(&(kind, name.to_string()))
            .map(|&slot| &self.blocks[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

/// Output of parsing one input: merged blocks plus whatever went wrong.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub blocks: BlockSet,
    pub diagnostics: Vec<Diagnostic>,
}

enum Header<'a> {
    Open {
        kind: BlockKind,
        name: &'a str,
        parent: Option<&'a str>,
    },
    Malformed(BlockKind),
    None,
}

fn classify_header<'a>(line: &'a str, tokens: &[&'a str]) -> Header<'a> {
    let Some(first) = tokens.first() else {
        return Header::None;
    };
    let kind = BlockKind::lookup(first);
    if kind == BlockKind::Unknown || split_assignment(line).is_some() {
        return Header::None;
    }
    match (kind, tokens.len()) {
        (BlockKind::ObjectReskin, 3) => Header::Open {
            kind,
            name: unquote(tokens[1]),
            parent: Some(unquote(tokens[2])),
        },
        (BlockKind::ObjectReskin, _) => Header::Malformed(kind),
        (_, n) if n >= 2 => Header::Open {
            kind,
            name: unquote(tokens[1]),
            parent: None,
        },
        _ => Header::Malformed(kind),
    }
}

/// Line-oriented state machine: scanning for a header, or inside a block.
struct BlockParser<'a> {
    source: &'a str,
    current: Option<Block>,
    output: ParsedSource,
}

impl<'a> BlockParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            current: None,
            output: ParsedSource::default(),
        }
    }

    fn warn(&mut self, kind: DiagnosticKind, line: usize, message: String) {
        let location = SourceLocation::new(self.source, line);
        self.output
            .diagnostics
            .push(Diagnostic::new(kind, Some(location), message).emit());
    }

    fn feed(&mut self, line_no: usize, raw: &str) {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            return;
        }

        if self.current.is_some() {
            if line.eq_ignore_ascii_case("end") {
                if let Some(block) = self.current.take() {
                    self.output.blocks.insert(block);
                }
            } else {
                self.feed_body(line_no, line);
            }
            return;
        }

        let tokens = tokenize(line);
        match classify_header(line, &tokens) {
            Header::Open { kind, name, parent } => {
                let mut block =
                    Block::new(kind, name, SourceLocation::new(self.source, line_no));
                block.parent_name = parent.map(str::to_string);
                self.current = Some(block);
            }
            Header::Malformed(kind) => {
                let expected = if kind == BlockKind::ObjectReskin {
                    "a new name and a parent name"
                } else {
                    "a name"
                };
                self.warn(
                    DiagnosticKind::MalformedHeader,
                    line_no,
                    format!("{} header needs {}: `{}`", kind, expected, line),
                );
            }
            Header::None => {
                self.warn(
                    DiagnosticKind::UnexpectedLine,
                    line_no,
                    format!("Unexpected line outside of a block: `{}`", line),
                );
            }
        }
    }

    fn feed_body(&mut self, line_no: usize, line: &str) {
        let (key, value) = match split_assignment(line) {
            Some(pair) => pair,
            None => match line.split_once([' ', '\t']) {
                Some((key, rest)) => (key, rest.trim()),
                None => {
                    self.warn(
                        DiagnosticKind::MalformedProperty,
                        line_no,
                        format!("Property line has no value: `{}`", line),
                    );
                    return;
                }
            },
        };
        if key.is_empty() {
            self.warn(
                DiagnosticKind::MalformedProperty,
                line_no,
                format!("Property line has no key: `{}`", line),
            );
            return;
        }

        let category = ModuleCategory::lookup(key);
        if category != ModuleCategory::Unrecognized {
            match parse_module(category, value) {
                Some(module) => {
                    if let Some(block) = self.current.as_mut() {
                        block.modules.push(module);
                    }
                }
                None => self.warn(
                    DiagnosticKind::MalformedProperty,
                    line_no,
                    format!("{} declaration has no module name", category.keyword()),
                ),
            }
            return;
        }

        if let Some(block) = self.current.as_mut() {
            block.properties.insert(key, coerce(value));
        }
    }

    fn finish(mut self, last_line: usize) -> ParsedSource {
        if let Some(block) = self.current.take() {
            let message = format!(
                "{} {} is missing END before end of input",
                block.kind, block.name
            );
            self.output.blocks.insert(block);
            self.warn(DiagnosticKind::UnterminatedBlock, last_line, message);
        }
        self.output
    }
}

/// `<Payload> [ModuleTag_xx]` or `<Payload> [ModuleTag = xx]`. Without a tag
/// the whole value is the payload.
fn parse_module(category: ModuleCategory, value: &str) -> Option<Module> {
    let tokens = tokenize(value);
    let payload = *tokens.first()?;

    let tag_at = tokens
        .iter()
        .skip(1)
        .position(|t| t.to_ascii_lowercase().starts_with("moduletag"))
        .map(|i| i + 1);

    let module = match tag_at {
        Some(i) => {
            let marker = tokens[i];
            let tag = if marker.eq_ignore_ascii_case("moduletag") {
                tokens.get(i + 1).map(|t| unquote(t).to_string())
            } else {
                Some(marker.to_string())
            };
            Module {
                category,
                payload: unquote(payload).to_string(),
                tag,
            }
        }
        None => Module {
            category,
            payload: unquote(value).to_string(),
            tag: None,
        },
    };
    Some(module)
}

/// Parses in-memory INI text. `source` labels diagnostics and block locations.
pub fn parse_str(text: &str, source: &str) -> ParsedSource {
    let mut parser = BlockParser::new(source);
    let mut last_line = 0;
    for (i, line) in text.lines().enumerate() {
        last_line = i + 1;
        parser.feed(last_line, line);
    }
    parser.finish(last_line)
}

/// Reads an INI file as text. UTF-8 (with or without BOM) is tried first;
/// anything else is decoded as Windows-1252, which is what legacy game data
/// ships in.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::debug!("{:?} is not UTF-8, decoding as Windows-1252", path);
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

pub fn parse_file(path: &Path) -> Result<ParsedSource> {
    let text = read_source(path)?;
    Ok(parse_str(&text, &path.display().to_string()))
}
