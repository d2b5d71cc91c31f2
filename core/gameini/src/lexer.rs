// Line-level lexing: comment stripping, tokenizing and `key = value` splitting.
// None of these can fail; odd quoting just leaves the quote state where the
// last `"` put it.

/// Cuts the line at the first `;` that is not inside a quoted span.
pub fn strip_comment(line: &str) -> &str {
    let mut quotes = 0usize;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quotes += 1,
            ';' if quotes % 2 == 0 => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Splits on space, tab and `=` outside quotes. Quoted spans stay whole,
/// quote characters included. Empty tokens are dropped.
pub fn tokenize(line: &str) -> Vec<&str> {
    split_outside_quotes(line, |c| c == ' ' || c == '\t' || c == '=')
}

/// Like [`tokenize`] but `=` is ordinary text.
pub fn split_words(text: &str) -> Vec<&str> {
    split_outside_quotes(text, |c| c == ' ' || c == '\t')
}

fn split_outside_quotes(line: &str, is_delimiter: impl Fn(char) -> bool) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            start.get_or_insert(i);
            continue;
        }
        if !in_quotes && is_delimiter(c) {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else {
            start.get_or_insert(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    tokens
}

/// Splits `key = value` at the first `=` outside quotes. Both halves are trimmed.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '=' if !in_quotes => return Some((line[..i].trim(), line[i + 1..].trim())),
            _ => {}
        }
    }
    None
}

/// True when `text` has a space or tab outside quoted spans.
pub fn has_unquoted_space(text: &str) -> bool {
    let mut in_quotes = false;
    text.chars().any(|c| {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        !in_quotes && (c == ' ' || c == '\t')
    })
}

/// Removes one pair of surrounding double quotes, if present.
pub fn unquote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}
