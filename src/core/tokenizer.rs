use crate::core::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Word separators. Other Unicode whitespace is ordinary text.
const SEPARATORS: [char; 4] = [' ', '\t', '\r', '\n'];

/// Splits a command line into words, quoting like Python's POSIX `shlex`.
///
/// Quotes group text containing whitespace and may be glued to unquoted
/// text (`a"b c"d` is one word). A backslash escapes the next character
/// outside quotes; inside double quotes it only escapes `\` and `"`.
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty word) from no word at all
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('\\' | '"')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err(ShellError::Parse("No closing quotation".to_string())),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        in_word = true;
                    }
                    None => return Err(ShellError::Parse("No escaped character".to_string())),
                },
                c if SEPARATORS.contains(&c) => {
                    if in_word {
                        tokens.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(ShellError::Parse("No closing quotation".to_string()));
    }
    if in_word {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Best-effort split for peeking at a line before it is run. Falls back to
/// plain blank splitting instead of failing on an open quote.
pub fn tokenize_lenient(line: &str) -> Vec<String> {
    tokenize(line).unwrap_or_else(|_| {
        line.split(SEPARATORS)
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Quotes `word` so that `tokenize` gives it back as a single word.
pub fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && !word
            .chars()
            .any(|c| SEPARATORS.contains(&c) || matches!(c, '\'' | '"' | '\\'));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
