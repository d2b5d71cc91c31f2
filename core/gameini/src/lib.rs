//! Parser for the block-structured INI dialect used by game object data.
//!
//! ```text
//! Object AmericaTankCrusader
//!     DisplayName = "Crusader"      ; comments run to end of line
//!     KindOf = VEHICLE SELECTABLE
//!     Behavior = AIUpdateInterface ModuleTag_03
//! End
//! ```
//!
//! Text goes through [`strip_comment`], [`tokenize`] and the block parser,
//! which produces [`Block`]s whose property values are typed by [`coerce`].

pub mod error;
pub mod lexer;
pub mod reader;
pub mod types;
pub mod value;
pub mod writer;

pub use error::{Error, Result};
pub use lexer::{split_assignment, strip_comment, tokenize};
pub use reader::{BlockSet, ParsedSource, parse_file, parse_str, read_source};
pub use types::{
    Block, BlockKind, Color, Coord, Diagnostic, DiagnosticKind, Module, ModuleCategory,
    Properties, SourceLocation, Value,
};
pub use value::{coerce, parse_bool, parse_float};
pub use writer::{render_value, write_block, write_blocks};
