use logos::Logos;

mod directive;
pub use directive::{DirectiveTokens, MacroTable};

/// Preprocessing tokens of a directive line
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
#[logos(skip r"\\\r?\n")]
pub enum Token {
    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("#")]
    Hash,

    /// End of directive: the newline that terminates a `#` line
    #[regex(r"\r?\n")]
    Eod,

    // Literals keep their source spelling, quotes included
    #[regex(r"\.?[0-9]([0-9a-zA-Z_.]|[eEpP][+-])*", |lex| lex.slice().to_string())]
    NumericLiteral(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    StringLiteral(String),

    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice().to_string())]
    CharLiteral(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Any other single punctuator character
    #[regex(r"[!$%&*+\-./:;<=>?@\[\]^`{|}~\\]", |lex| lex.slice().to_string())]
    Punct(String),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::NumericLiteral(_) | Token::StringLiteral(_) | Token::CharLiteral(_)
        )
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Token::Ident(_))
    }

    /// Source spelling of the token
    pub fn spelling(&self) -> &str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Hash => "#",
            Token::Eod => "\n",
            Token::NumericLiteral(s)
            | Token::StringLiteral(s)
            | Token::CharLiteral(s)
            | Token::Ident(s)
            | Token::Punct(s) => s,
            Token::LineComment | Token::BlockComment => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<TokenSpan, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let span = self.inner.span();

        match token {
            Ok(tok) => Some(Ok(TokenSpan { token: tok, span })),
            Err(_) => Some(Err(LexError::InvalidToken { span })),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Invalid token at {span:?}")]
    InvalidToken { span: std::ops::Range<usize> },
}

/// Token stream of the preprocessor as seen by pragma handlers.
///
/// Mirrors the operations a preprocessor offers while a directive is being
/// handled: peeking ahead without consuming, and consuming with or without
/// macro expansion. Once the end of the directive is reached every further
/// call yields [`Token::Eod`].
pub trait TokenSource {
    /// Returns the token `n` positions past the current one without consuming it.
    fn look_ahead(&mut self, n: usize) -> Token;

    /// Consumes the next token, expanding macros.
    fn lex(&mut self) -> Token;

    /// Consumes the next token without macro expansion.
    fn lex_unexpanded(&mut self) -> Token;
}

/// A `#pragma` directive found in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PragmaLine<'source> {
    /// Byte offset of the text following the `pragma` keyword
    pub offset: usize,
    /// Directive text following the `pragma` keyword, up to the first newline
    /// that is not escaped. Backslash-newline continuations are kept in place;
    /// the lexer skips them.
    pub text: &'source str,
}

/// Finds every `#pragma` directive of `source`, in order. Directives inside
/// block comments are ignored.
pub fn pragma_lines(source: &str) -> Vec<PragmaLine<'_>> {
    let mut lines = Vec::new();
    let mut in_block_comment = false;
    let mut start = 0;

    while start < source.len() {
        let end = logical_line_end(source, start);
        let line_start = start;
        let line = source[start..end].trim_end_matches('\r');
        start = end + 1;

        let was_in_block_comment = in_block_comment;
        let unterminated = scan_comments(line, &mut in_block_comment);
        let body = match unterminated {
            Some(open) => &line[..open],
            None => line,
        };
        // A comment carried over from earlier lines must close before a
        // directive can start
        let head = if was_in_block_comment {
            match body.find("*/") {
                Some(close) => &body[close + 2..],
                None => continue,
            }
        } else {
            body
        };

        let Some(rest) = head.trim_start().strip_prefix('#') else {
            continue;
        };
        let Some(after) = rest.trim_start().strip_prefix("pragma") else {
            continue;
        };
        if after.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            // `#pragmatic` and friends
            continue;
        }

        lines.push(PragmaLine {
            offset: line_start + (body.len() - after.len()),
            text: after,
        });
    }

    lines
}

// Index of the first newline at or after `from` not preceded by a backslash
fn logical_line_end(source: &str, from: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let before = &bytes[from..i];
            if !(before.ends_with(b"\\") || before.ends_with(b"\\\r")) {
                return i;
            }
        }
        i += 1;
    }
    bytes.len()
}

// Tracks block comments across `line`, skipping literals and `//` tails.
// Returns where a block comment that stays open past the line begins.
fn scan_comments(line: &str, in_block_comment: &mut bool) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut opened_at = None;
    let mut quote = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        if *in_block_comment {
            if b == b'*' && next == Some(b'/') {
                *in_block_comment = false;
                opened_at = None;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match (b, next) {
            (b'"' | b'\'', _) => quote = Some(b),
            (b'/', Some(b'/')) => break,
            (b'/', Some(b'*')) => {
                *in_block_comment = true;
                opened_at = Some(i);
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if *in_block_comment {
        opened_at
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pragma_tokens() {
        let source = "java_package_name(com.example)";
        let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap().token).collect();

        assert_eq!(tokens[0], Token::Ident("java_package_name".to_string()));
        assert_eq!(tokens[1], Token::LParen);
        assert_eq!(tokens[2], Token::Ident("com".to_string()));
        assert_eq!(tokens[3], Token::Punct(".".to_string()));
        assert_eq!(tokens[4], Token::Ident("example".to_string()));
        assert_eq!(tokens[5], Token::RParen);
    }

    #[test]
    fn test_literals_keep_spelling() {
        let source = r#"1 0x10 1.5e+3 "text" 'c'"#;
        let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap().token).collect();

        assert_eq!(tokens[0], Token::NumericLiteral("1".to_string()));
        assert_eq!(tokens[1], Token::NumericLiteral("0x10".to_string()));
        assert_eq!(tokens[2], Token::NumericLiteral("1.5e+3".to_string()));
        assert_eq!(tokens[3], Token::StringLiteral("\"text\"".to_string()));
        assert_eq!(tokens[4], Token::CharLiteral("'c'".to_string()));
        assert!(tokens.iter().all(Token::is_literal));
    }

    #[test]
    fn test_newline_ends_directive() {
        let source = "version(1) // trailing\nnext";
        let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap().token).collect();

        assert_eq!(tokens[3], Token::RParen);
        assert_eq!(tokens[4], Token::Eod);
        assert_eq!(tokens[5], Token::Ident("next".to_string()));
    }

    #[test]
    fn test_line_continuation_is_skipped() {
        let source = "version \\\n(1)";
        let tokens: Vec<_> = Lexer::new(source).map(|r| r.unwrap().token).collect();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], Token::LParen);
    }

    #[test]
    fn test_pragma_lines() {
        let source = "#pragma version(1)\nint x;\n  #  pragma rs_fp_full\n#pragmatic\n#define A 1\n";
        let lines = pragma_lines(source);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text.trim(), "version(1)");
        assert_eq!(lines[1].text.trim(), "rs_fp_full");
        assert_eq!(&source[lines[0].offset..lines[0].offset + 11], " version(1)");
    }

    #[test]
    fn test_pragma_lines_follow_continuations() {
        let source = "#pragma version \\\n(1)\nint x;\n#pragma a(\\\r\nb)\r\n";
        let lines = pragma_lines(source);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, " version \\\n(1)");
        assert_eq!(lines[1].text, " a(\\\r\nb)");
    }

    #[test]
    fn test_pragma_lines_skip_comments() {
        let source = "/*\n#pragma hidden(1)\n*/ #pragma shown(2)\n\
                      // #pragma line_comment(3)\n\
                      int s = \"/*\"; #pragma not_at_line_start(4)\n\
                      #pragma open(5) /* spans\n#pragma also_hidden(6)\n*/\n";
        let lines = pragma_lines(source);

        let texts: Vec<_> = lines.iter().map(|l| l.text.trim()).collect();
        assert_eq!(texts, vec!["shown(2)", "open(5)"]);
    }
}
