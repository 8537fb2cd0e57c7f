//! Tokenizer for the FEEL subset used by compiled decision tables.
//!
//! Identifiers may start with a digit (generated field ids such as
//! `1bb803c6`); a run of digits with at most one fractional part is a number.

use super::DecideError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Minus,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    DotDot,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, DecideError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let syntax = |message: String| DecideError::Syntax {
        expression: source.to_string(),
        message,
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '"' | '\'' => {
                let (s, next) = read_string(&chars, i)
                    .ok_or_else(|| syntax(format!("unterminated string at {}", i)))?;
                tokens.push(Token::Str(s));
                i = next;
            }
            '=' => {
                tokens.push(Token::Eq);
                i += if chars.get(i + 1) == Some(&'=') { 2 } else { 1 };
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::NotEq);
                i += 2;
            }
            '<' | '>' => {
                let with_eq = chars.get(i + 1) == Some(&'=');
                tokens.push(match (c, with_eq) {
                    ('<', true) => Token::LtEq,
                    ('<', false) => Token::Lt,
                    (_, true) => Token::GtEq,
                    (_, false) => Token::Gt,
                });
                i += if with_eq { 2 } else { 1 };
            }
            '.' if chars.get(i + 1) == Some(&'.') => {
                tokens.push(Token::DotDot);
                i += 2;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            c if is_word_char(c) => {
                let start = i;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
                // A fractional part only when a digit follows the dot, so `1..5` stays a range.
                let all_digits = chars[start..i].iter().all(char::is_ascii_digit);
                if all_digits
                    && chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(char::is_ascii_digit)
                {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let word: String = chars[start..i].iter().collect();
                let numeric = word.starts_with(|c: char| c.is_ascii_digit())
                    && word.chars().all(|c| c.is_ascii_digit() || c == '.');
                match word.parse::<f64>() {
                    Ok(n) if numeric => tokens.push(Token::Number(n)),
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            other => return Err(syntax(format!("unexpected character '{}' at {}", other, i))),
        }
    }
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Reads a quoted string starting at `start`; returns the unescaped text and
/// the index just past the closing quote.
fn read_string(chars: &[char], start: usize) -> Option<(String, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c if c == quote => return Some((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_identifiers() {
        assert_eq!(
            tokenize("1bb803c6=1").unwrap(),
            vec![
                Token::Ident("1bb803c6".into()),
                Token::Eq,
                Token::Number(1.0)
            ]
        );
    }

    #[test]
    fn ranges_and_decimals() {
        assert_eq!(
            tokenize("[1..2.5]").unwrap(),
            vec![
                Token::LBracket,
                Token::Number(1.0),
                Token::DotDot,
                Token::Number(2.5),
                Token::RBracket
            ]
        );
    }

    #[test]
    fn both_quote_styles() {
        assert_eq!(
            tokenize(r#"['a', "b"]"#).unwrap(),
            vec![
                Token::LBracket,
                Token::Str("a".into()),
                Token::Comma,
                Token::Str("b".into()),
                Token::RBracket
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        assert!(matches!(tokenize("\"abc"), Err(DecideError::Syntax { .. })));
    }
}
