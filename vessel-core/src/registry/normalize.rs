use alloc::string::String;

// Punctuation that never needs surrounding whitespace.
const TIGHT: &[char] = &['<', '>', ',', '*', '&', '(', ')', '[', ']', ';', ':'];

/// Normalize a type name so that spellings of one type compare equal.
///
/// - runs of whitespace collapse to one space
/// - whitespace next to `< > , * & ( ) [ ] ; :` is removed
/// - a free-standing `const` qualifier is dropped, but `*const` is kept
///
/// ```ignore
/// assert_eq!(normalize_type_name("const Foo< i32 >"), "Foo<i32>");
/// assert_eq!(normalize_type_name("* const u8"), "*const u8");
/// ```
pub fn normalize_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev: Option<&str> = None;
    for token in tokenize(name) {
        if token == "const" && prev != Some("*") {
            continue;
        }
        if let Some(p) = prev {
            if !is_tight(p) && !is_tight(token) {
                out.push(' ');
            }
        }
        out.push_str(token);
        prev = Some(token);
    }
    out
}

fn is_tight(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if TIGHT.contains(&c))
}

/// Splits into identifier-ish words and single punctuation tokens, dropping whitespace.
fn tokenize(name: &str) -> impl Iterator<Item = &str> {
    let mut rest = name;
    core::iter::from_fn(move || {
        rest = rest.trim_start();
        let first = rest.chars().next()?;
        let end = if TIGHT.contains(&first) {
            first.len_utf8()
        } else {
            rest.find(|c: char| c.is_whitespace() || TIGHT.contains(&c))
                .unwrap_or(rest.len())
        };
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}
