use crate::command::{Request, UpdateArgs};
use crate::model::value::FieldValue;

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

/// Outcome of parsing one console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Blank or all-whitespace input.
    Empty,
    /// `quit`: exit without further output.
    Quit,
    /// `EOF`: print one empty line, then exit.
    Eof,
    /// `help`, with an optional topic.
    Help(Option<String>),
    /// A recognized command under either grammar.
    Request(Request),
    /// Text outside both grammars.
    Unknown,
}

/// Diagnostic for a line outside both grammars.
pub fn unknown_syntax(line: &str) -> String {
    format!("** unknown syntax: {} **", line)
}

/// Parse one line. A leading known word selects the canonical grammar;
/// everything else is tried as a method call.
pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Empty;
    }
    let (first, rest) = split_word(line);
    match first {
        "quit" => ParsedLine::Quit,
        "EOF" => ParsedLine::Eof,
        "help" => {
            let (topic, _) = split_word(rest);
            ParsedLine::Help(optional(topic))
        }
        "create" | "show" | "destroy" | "update" | "all" | "count" => canonical(first, rest),
        _ => method_call(line),
    }
}

// ---------------------------------------------------------------------------
// Canonical grammar
// ---------------------------------------------------------------------------

/// `<verb> <type> [<id>] [<attr> <value>]`. Tokens beyond a verb's slots are
/// ignored.
fn canonical(verb: &str, rest: &str) -> ParsedLine {
    let (class_word, rest) = split_word(rest);
    let class = optional(class_word);
    let request = match verb {
        "create" => Request::Create { class },
        "all" => Request::All { class },
        "count" => Request::Count { class },
        "show" | "destroy" => {
            let (id_word, _) = split_word(rest);
            let id = optional(id_word);
            if verb == "show" {
                Request::Show { class, id }
            } else {
                Request::Destroy { class, id }
            }
        }
        "update" => {
            let (id_word, tail) = split_word(rest);
            let id = optional(id_word);
            match update_args_canonical(tail) {
                Some(args) => Request::Update { class, id, args },
                None => return ParsedLine::Unknown,
            }
        }
        _ => return ParsedLine::Unknown,
    };
    ParsedLine::Request(request)
}

/// Update tail in canonical form: `<attr> <value...>` or a mapping literal.
/// `None` means the mapping failed to parse and the line is unknown syntax.
fn update_args_canonical(tail: &str) -> Option<UpdateArgs> {
    let tail = tail.trim();
    if tail.starts_with('{') {
        return parse_mapping(tail).map(UpdateArgs::Map);
    }
    let (attr_word, value_text) = split_word(tail);
    let value = if value_text.is_empty() {
        None
    } else {
        Some(unquote(value_text))
    };
    Some(UpdateArgs::Pair {
        attr: optional(attr_word),
        value,
    })
}

// ---------------------------------------------------------------------------
// Method-call grammar
// ---------------------------------------------------------------------------

/// `<type>.<verb>(<args>)`. Anything off that shape is unknown syntax.
fn method_call(line: &str) -> ParsedLine {
    let dot = match line.find('.') {
        Some(pos) => pos,
        None => return ParsedLine::Unknown,
    };
    let open = match line.find('(') {
        Some(pos) => pos,
        None => return ParsedLine::Unknown,
    };
    if open < dot || !line.ends_with(')') {
        return ParsedLine::Unknown;
    }

    let class_text = &line[..dot];
    if !class_text.chars().all(|c| c.is_ascii_alphabetic()) {
        return ParsedLine::Unknown;
    }
    let class = optional(class_text);

    let verb = &line[dot + 1..open];
    let args = &line[open + 1..line.len() - 1];

    let request = match verb {
        "create" => Request::Create { class },
        "all" => Request::All { class },
        "count" => Request::Count { class },
        "show" => Request::Show {
            class,
            id: first_segment(args),
        },
        "destroy" => Request::Destroy {
            class,
            id: first_segment(args),
        },
        "update" => match update_args_method(args) {
            Some((id, args)) => Request::Update { class, id, args },
            None => return ParsedLine::Unknown,
        },
        _ => return ParsedLine::Unknown,
    };
    ParsedLine::Request(request)
}

/// First comma-separated segment of an argument list, unquoted. Empty
/// argument text yields `None`.
fn first_segment(args: &str) -> Option<String> {
    let first = split_segments(args).into_iter().next().unwrap_or("");
    let first = first.trim();
    if first.is_empty() {
        None
    } else {
        Some(unquote(first))
    }
}

/// Update arguments in method form: `<id>, <attr>, <value>` or
/// `<id>, {mapping}`. The comma before a mapping is optional. `None` means
/// unknown syntax.
fn update_args_method(args: &str) -> Option<(Option<String>, UpdateArgs)> {
    if let Some(open) = args.find('{') {
        let id_text = args[..open].trim().trim_end_matches(',').trim_end();
        let id = if id_text.is_empty() {
            None
        } else {
            Some(unquote(id_text))
        };
        let pairs = parse_mapping(&args[open..])?;
        return Some((id, UpdateArgs::Map(pairs)));
    }

    let mut parts = split_segments(args).into_iter();
    let mut next_part = || {
        parts
            .next()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(unquote)
    };
    let id = next_part();
    let attr = next_part();
    let value = next_part();
    Some((id, UpdateArgs::Pair { attr, value }))
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// Flat mapping literal, `{'key': literal, ...}`. Text after the closing
/// brace is ignored. `None` means the text is not a flat mapping of string
/// keys to scalar literals.
fn parse_mapping(text: &str) -> Option<Vec<(String, FieldValue)>> {
    let open = text.find('{')?;
    let close = open + text[open..].find('}')?;
    let inner = text[open + 1..close].trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    let mut pairs = Vec::new();
    for segment in split_segments(inner) {
        let colon = segment.find(':')?;
        let key = unquote(segment[..colon].trim());
        if key.is_empty() {
            return None;
        }
        let value = parse_literal(segment[colon + 1..].trim())?;
        pairs.push((key, value));
    }
    Some(pairs)
}

/// One scalar literal: quoted text, an integer, or a finite float.
fn parse_literal(text: &str) -> Option<FieldValue> {
    if is_quoted(text) {
        return Some(FieldValue::Text(text[1..text.len() - 1].to_string()));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(FieldValue::Int(n));
    }
    if let Ok(x) = text.parse::<f64>() {
        if x.is_finite() {
            return Some(FieldValue::Float(x));
        }
    }
    None
}

/// Split on commas that sit outside quoted runs. Either quote character
/// protects a run; quotes do not nest.
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                } else if c == ',' {
                    segments.push(&text[start..i]);
                    start = i + 1;
                }
            }
        }
    }
    segments.push(&text[start..]);
    segments
}

/// Split off the first whitespace-delimited word; both halves come back with
/// leading whitespace removed.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

/// Empty word to `None`.
fn optional(word: &str) -> Option<String> {
    if word.is_empty() {
        None
    } else {
        Some(word.to_string())
    }
}

/// Strip at most one layer of matching surrounding quotes.
fn unquote(text: &str) -> String {
    let text = text.trim();
    if is_quoted(text) {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn is_quoted(text: &str) -> bool {
    if text.len() < 2 {
        return false;
    }
    let bytes = text.as_bytes();
    let first = bytes[0];
    (first == b'\'' || first == b'"') && bytes[text.len() - 1] == first
}
