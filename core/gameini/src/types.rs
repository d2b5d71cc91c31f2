use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A property value inferred from untyped INI text.
///
/// Only [`crate::coerce`] produces these; the variant is decided once and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    Color(Color),
    Coord(Coord),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_coord(&self) -> Option<Coord> {
        match self {
            Value::Coord(c) => Some(*c),
            _ => None,
        }
    }
}

/// Renders the value back to INI-style text. This is the only sanctioned
/// path between variants: callers that need a different type re-parse it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(true) => write!(f, "Yes"),
            Value::Bool(false) => write!(f, "No"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Color(c) => write!(f, "{}", c),
            Value::Coord(c) => write!(f, "{}", c),
        }
    }
}

/// `R:<0-255> G:<0-255> B:<0-255> [A:<0-255>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R:{} G:{} B:{} A:{}", self.r, self.g, self.b, self.a)
    }
}

/// `X:<float> Y:<float> [Z:<float>]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{} Y:{} Z:{}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    Object,
    ObjectReskin,
    Weapon,
    Armor,
    Locomotor,
    Upgrade,
    SpecialPower,
    CommandButton,
    CommandSet,
    ParticleSystem,
    FxList,
    GameData,
    PlayerTemplate,
    Science,
    Rank,
    Unknown,
}

impl BlockKind {
    pub const ALL: [BlockKind; 15] = [
        BlockKind::Object,
        BlockKind::ObjectReskin,
        BlockKind::Weapon,
        BlockKind::Armor,
        BlockKind::Locomotor,
        BlockKind::Upgrade,
        BlockKind::SpecialPower,
        BlockKind::CommandButton,
        BlockKind::CommandSet,
        BlockKind::ParticleSystem,
        BlockKind::FxList,
        BlockKind::GameData,
        BlockKind::PlayerTemplate,
        BlockKind::Science,
        BlockKind::Rank,
    ];

    /// Case-insensitive keyword lookup. Anything not in the table is `Unknown`.
    pub fn lookup(keyword: &str) -> BlockKind {
        static TABLE: OnceLock<HashMap<String, BlockKind>> = OnceLock::new();
        let table = TABLE.get_or_init(|| {
            BlockKind::ALL
                .iter()
                .map(|kind| (kind.keyword().to_ascii_lowercase(), *kind))
                .collect()
        });
        table
            .get(&keyword.to_ascii_lowercase())
            .copied()
            .unwrap_or(BlockKind::Unknown)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Object => "Object",
            BlockKind::ObjectReskin => "ObjectReskin",
            BlockKind::Weapon => "Weapon",
            BlockKind::Armor => "Armor",
            BlockKind::Locomotor => "Locomotor",
            BlockKind::Upgrade => "Upgrade",
            BlockKind::SpecialPower => "SpecialPower",
            BlockKind::CommandButton => "CommandButton",
            BlockKind::CommandSet => "CommandSet",
            BlockKind::ParticleSystem => "ParticleSystem",
            BlockKind::FxList => "FXList",
            BlockKind::GameData => "GameData",
            BlockKind::PlayerTemplate => "PlayerTemplate",
            BlockKind::Science => "Science",
            BlockKind::Rank => "Rank",
            BlockKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Keys inside a block that declare a sub-module instead of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleCategory {
    Behavior,
    Draw,
    Body,
    ClientUpdate,
    Locomotor,
    Unrecognized,
}

impl ModuleCategory {
    pub fn lookup(key: &str) -> ModuleCategory {
        static TABLE: OnceLock<HashMap<&'static str, ModuleCategory>> = OnceLock::new();
        let table = TABLE.get_or_init(|| {
            HashMap::from([
                ("behavior", ModuleCategory::Behavior),
                ("draw", ModuleCategory::Draw),
                ("body", ModuleCategory::Body),
                ("clientupdate", ModuleCategory::ClientUpdate),
                ("locomotor", ModuleCategory::Locomotor),
            ])
        });
        table
            .get(key.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(ModuleCategory::Unrecognized)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ModuleCategory::Behavior => "Behavior",
            ModuleCategory::Draw => "Draw",
            ModuleCategory::Body => "Body",
            ModuleCategory::ClientUpdate => "ClientUpdate",
            ModuleCategory::Locomotor => "Locomotor",
            ModuleCategory::Unrecognized => "Unrecognized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub category: ModuleCategory,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub source: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// Insertion-ordered property map. Keys keep the spelling of the line that
/// last wrote them; lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let folded = key.to_ascii_lowercase();
        match self.index.get(&folded) {
            Some(&slot) => {
                let entry = &mut self.entries[slot];
                entry.0 = key;
                Some(std::mem::replace(&mut entry.1, value))
            }
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index
            .get(&key.to_ascii_lowercase())
            .map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&key.to_ascii_lowercase())
    }

    /// First key of `keys` that is present, in the order given.
    pub fn first_of<'a>(&'a self, keys: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        keys.iter()
            .find_map(|key| self.get(key).map(|value| (*key, value)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Later wins: every key of `other` overwrites the same key here.
    pub fn merge(&mut self, other: Properties) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One parsed `Type Name ... END` unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub properties: Properties,
    pub modules: Vec<Module>,
    pub location: SourceLocation,
}

impl Block {
    pub fn new(kind: BlockKind, name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            name: name.into(),
            parent_name: None,
            properties: Properties::new(),
            modules: Vec::new(),
            location,
        }
    }

    /// Folds a later occurrence of the same `(kind, name)` into this block.
    /// Properties are overwritten key by key, modules are appended as-is.
    pub fn merge(&mut self, other: Block) {
        if other.parent_name.is_some() {
            self.parent_name = other.parent_name;
        }
        self.properties.merge(other.properties);
        self.modules.extend(other.modules);
    }

    pub fn modules_of(&self, category: ModuleCategory) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(move |m| m.category == category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    UnterminatedBlock,
    UnexpectedLine,
    MalformedHeader,
    MalformedProperty,
    MissingParent,
    DuplicateObject,
}

/// A recoverable problem found while parsing or resolving. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }

    /// Logs the diagnostic as a warning and hands it back for collection.
    pub fn emit(self) -> Self {
        log::warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}", loc, self.message),
            None => f.write_str(&self.message),
        }
    }
}
