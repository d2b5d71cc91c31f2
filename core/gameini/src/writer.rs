use crate::types::{Block, BlockKind, Module, Value};
use crate::value::coerce;

// --- Writing Logic (Blocks -> Text) ---

pub fn write_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> String {
    let mut output = String::new();
    for block in blocks {
        write_block(block, &mut output);
        output.push('\n');
    }
    output
}

pub fn write_block(block: &Block, output: &mut String) {
    match (&block.kind, &block.parent_name) {
        (BlockKind::ObjectReskin, Some(parent)) => {
            output.push_str(&format!("{} {} {}\n", block.kind, block.name, parent))
        }
        _ => output.push_str(&format!("{} {}\n", block.kind, block.name)),
    }

    for (key, value) in block.properties.iter() {
        output.push_str(&format!("  {} = {}\n", key, render_value(value)));
    }
    for module in &block.modules {
        output.push_str(&format!("  {}\n", render_module(module)));
    }
    output.push_str("End\n");
}

fn render_module(module: &Module) -> String {
    match &module.tag {
        Some(tag) if tag.to_ascii_lowercase().starts_with("moduletag") => {
            format!("{} = {} {}", module.category.keyword(), module.payload, tag)
        }
        Some(tag) => format!(
            "{} = {} ModuleTag = {}",
            module.category.keyword(),
            module.payload,
            tag
        ),
        None => format!("{} = {}", module.category.keyword(), module.payload),
    }
}

/// Renders a value so that parsing it again gives back the same variant
/// (percentages come back as plain floats).
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => render_string(s),
        Value::Float(v) => format!("{:?}", v),
        Value::List(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

fn render_string(s: &str) -> String {
    let needs_quotes =
        s.is_empty() || s.contains(';') || coerce(s) != Value::String(s.to_string());
    if needs_quotes {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}
