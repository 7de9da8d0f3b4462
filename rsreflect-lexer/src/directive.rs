// Token stream over a single preprocessor directive

use std::collections::{HashMap, VecDeque};

use crate::{LexError, Lexer, Token, TokenSource};

/// Object-like macros visible to a directive, as defined by the front end
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroTable {
    macros: HashMap<String, Vec<Token>>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `name` as `#define name replacement` would. A later definition
    /// replaces an earlier one.
    pub fn define(&mut self, name: &str, replacement: &str) {
        let tokens = Lexer::new(replacement)
            .filter_map(Result::ok)
            .map(|t| t.token)
            .take_while(|t| *t != Token::Eod)
            .collect();
        self.macros.insert(name.to_string(), tokens);
    }

    pub fn get(&self, name: &str) -> Option<&[Token]> {
        self.macros.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Buffered tokens of one directive line.
///
/// Supports object-like macros: [`TokenSource::lex`] replaces an identifier
/// naming a macro by its replacement list, [`TokenSource::lex_unexpanded`]
/// and [`TokenSource::look_ahead`] never expand. Replacement tokens are not
/// expanded again.
pub struct DirectiveTokens<'source> {
    lexer: Lexer<'source>,
    // (token, produced by a macro expansion)
    pending: VecDeque<(Token, bool)>,
    macros: MacroTable,
    consumed: usize,
    lexer_done: bool,
    errors: Vec<LexError>,
}

impl<'source> DirectiveTokens<'source> {
    pub fn new(text: &'source str) -> Self {
        Self::with_macros(text, MacroTable::new())
    }

    /// Token stream whose [`TokenSource::lex`] expands the macros of `macros`
    pub fn with_macros(text: &'source str, macros: MacroTable) -> Self {
        Self {
            lexer: Lexer::new(text),
            pending: VecDeque::new(),
            macros,
            consumed: 0,
            lexer_done: false,
            errors: Vec::new(),
        }
    }

    /// Defines an object-like macro, `#define name replacement`
    pub fn define(&mut self, name: &str, replacement: &str) {
        self.macros.define(name, replacement);
    }

    /// Number of tokens consumed so far
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// True once the end-of-directive token has been consumed
    pub fn at_end(&self) -> bool {
        self.lexer_done && self.pending.is_empty()
    }

    /// Characters the lexer could not tokenize; they are skipped
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn next_raw(&mut self) -> Token {
        if self.lexer_done {
            return Token::Eod;
        }
        loop {
            match self.lexer.next() {
                None => {
                    self.lexer_done = true;
                    return Token::Eod;
                }
                Some(Ok(spanned)) => {
                    if spanned.token == Token::Eod {
                        self.lexer_done = true;
                    }
                    return spanned.token;
                }
                Some(Err(err)) => self.errors.push(err),
            }
        }
    }

    fn fill(&mut self, n: usize) {
        while self.pending.len() <= n && !self.lexer_done {
            let token = self.next_raw();
            self.pending.push_back((token, false));
        }
    }

    fn pop(&mut self) -> Option<(Token, bool)> {
        self.fill(0);
        self.pending.pop_front()
    }
}

impl TokenSource for DirectiveTokens<'_> {
    fn look_ahead(&mut self, n: usize) -> Token {
        self.fill(n);
        self.pending
            .get(n)
            .map(|(token, _)| token.clone())
            .unwrap_or(Token::Eod)
    }

    fn lex(&mut self) -> Token {
        let mut taken = false;
        let token = loop {
            // Past the end of the directive
            let Some((token, from_expansion)) = self.pop() else {
                break Token::Eod;
            };
            taken = true;
            let replacement = match &token {
                Token::Ident(name) if !from_expansion => self.macros.get(name).map(<[Token]>::to_vec),
                _ => None,
            };
            let Some(replacement) = replacement else {
                break token;
            };
            for tok in replacement.into_iter().rev() {
                self.pending.push_front((tok, true));
            }
        };
        if taken {
            self.consumed += 1;
        }
        token
    }

    fn lex_unexpanded(&mut self) -> Token {
        match self.pop() {
            Some((token, _)) => {
                self.consumed += 1;
                token
            }
            None => Token::Eod,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_ahead_does_not_consume() {
        let mut tokens = DirectiveTokens::new("a ( b )");

        assert_eq!(tokens.look_ahead(0), Token::Ident("a".to_string()));
        assert_eq!(tokens.look_ahead(1), Token::LParen);
        assert_eq!(tokens.position(), 0);

        assert_eq!(tokens.lex_unexpanded(), Token::Ident("a".to_string()));
        assert_eq!(tokens.look_ahead(0), Token::LParen);
        assert_eq!(tokens.position(), 1);
    }

    #[test]
    fn test_end_of_directive_repeats() {
        let mut tokens = DirectiveTokens::new("a");

        assert_eq!(tokens.lex_unexpanded(), Token::Ident("a".to_string()));
        assert!(!tokens.at_end());
        assert_eq!(tokens.lex_unexpanded(), Token::Eod);
        assert!(tokens.at_end());
        assert_eq!(tokens.lex(), Token::Eod);
        assert_eq!(tokens.look_ahead(3), Token::Eod);
    }

    #[test]
    fn test_stops_at_first_newline() {
        let mut tokens = DirectiveTokens::new("a\nb");

        tokens.lex_unexpanded();
        assert_eq!(tokens.lex_unexpanded(), Token::Eod);
        assert_eq!(tokens.lex_unexpanded(), Token::Eod);
    }

    #[test]
    fn test_lex_expands_macros() {
        let mut tokens = DirectiveTokens::new("PKG )");
        tokens.define("PKG", "com example");

        assert_eq!(tokens.look_ahead(0), Token::Ident("PKG".to_string()));
        assert_eq!(tokens.lex(), Token::Ident("com".to_string()));
        assert_eq!(tokens.look_ahead(0), Token::Ident("example".to_string()));
        assert_eq!(tokens.position(), 1);
    }

    #[test]
    fn test_with_macros_uses_shared_table() {
        let mut macros = MacroTable::new();
        macros.define("PKG", "com");
        macros.define("PKG", "org");
        assert_eq!(macros.len(), 1);

        let mut tokens = DirectiveTokens::with_macros("PKG", macros);
        assert_eq!(tokens.lex(), Token::Ident("org".to_string()));
    }

    #[test]
    fn test_lex_unexpanded_keeps_macro_name() {
        let mut tokens = DirectiveTokens::new("PKG");
        tokens.define("PKG", "com");

        assert_eq!(tokens.lex_unexpanded(), Token::Ident("PKG".to_string()));
    }

    #[test]
    fn test_self_referential_macro_terminates() {
        let mut tokens = DirectiveTokens::new("X");
        tokens.define("X", "X");

        assert_eq!(tokens.lex(), Token::Ident("X".to_string()));
        assert_eq!(tokens.lex(), Token::Eod);
    }

    #[test]
    fn test_invalid_characters_are_recorded() {
        let mut tokens = DirectiveTokens::new("a \u{1} b");

        assert_eq!(tokens.lex_unexpanded(), Token::Ident("a".to_string()));
        assert_eq!(tokens.lex_unexpanded(), Token::Ident("b".to_string()));
        assert_eq!(tokens.errors().len(), 1);
    }
}
