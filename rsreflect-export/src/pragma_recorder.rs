//! Recording of `#pragma name(value)` directives.
//!
//! The recorder is driven by the preprocessor once per pragma whose name it
//! handles. A directive is recorded only when it has the complete
//! `name ( value )` or `name ( )` shape; anything else is dropped without a
//! diagnostic. Whatever the outcome, the handler consumes one more token
//! before returning so that the preprocessor resumes after the directive.

use rsreflect_lexer::{pragma_lines, DirectiveTokens, MacroTable, Token, TokenSource};

/// A recorded name/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaEntry {
    pub name: String,
    pub value: String,
}

/// Recorded pragmas in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PragmaList {
    entries: Vec<PragmaEntry>,
}

impl PragmaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, value: String) {
        self.entries.push(PragmaEntry { name, value });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PragmaEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PragmaEntry] {
        &self.entries
    }

    /// Value of the last pragma called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'l> IntoIterator for &'l PragmaList {
    type Item = &'l PragmaEntry;
    type IntoIter = std::slice::Iter<'l, PragmaEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct PragmaRecorder<'l> {
    pragmas: &'l mut PragmaList,
}

impl<'l> PragmaRecorder<'l> {
    pub fn new(pragmas: &'l mut PragmaList) -> Self {
        Self { pragmas }
    }

    /// Handles one pragma. `first` is the already consumed token following
    /// the `pragma` keyword.
    pub fn handle_pragma<S>(&mut self, pp: &mut S, first: &Token)
    where
        S: TokenSource + ?Sized,
    {
        match parse_name_value(pp, first) {
            Some((name, value)) => {
                log::trace!("pragma {}({})", name, value);
                self.pragmas.push(name, value);
            }
            None => log::trace!("dropping malformed pragma '{}'", first.spelling()),
        }

        pp.lex_unexpanded();
    }

    /// Runs the handler over the text of a directive following `pragma`
    pub fn record_directive(&mut self, text: &str) {
        self.record_directive_with(text, &MacroTable::new());
    }

    /// Like [`record_directive`](Self::record_directive), expanding `macros`
    /// where the handler consumes with expansion
    pub fn record_directive_with(&mut self, text: &str, macros: &MacroTable) {
        let mut tokens = DirectiveTokens::with_macros(text, macros.clone());
        let first = tokens.lex_unexpanded();
        self.handle_pragma(&mut tokens, &first);

        for err in tokens.errors() {
            log::debug!("skipped in pragma '{}': {}", text.trim(), err);
        }
    }
}

fn parse_name_value<S>(pp: &mut S, first: &Token) -> Option<(String, String)>
where
    S: TokenSource + ?Sized,
{
    let name = name_from_token(first)?;

    if pp.look_ahead(0) != Token::LParen {
        return None;
    }
    pp.lex_unexpanded();

    let next = pp.look_ahead(0);
    let value = value_from_token(&next)?;
    pp.lex();

    if next != Token::RParen {
        if pp.look_ahead(0) != Token::RParen {
            return None;
        }
        pp.lex_unexpanded();
    }

    Some((name, value))
}

fn name_from_token(token: &Token) -> Option<String> {
    if token.is_literal() || token.is_identifier() {
        Some(token.spelling().to_string())
    } else {
        None
    }
}

fn value_from_token(token: &Token) -> Option<String> {
    match token {
        Token::RParen => Some(String::new()),
        _ => name_from_token(token),
    }
}

/// Records every `#pragma` directive of `source` into `pragmas`, in order.
/// Returns the number of pragmas recorded.
pub fn scan_pragmas(source: &str, pragmas: &mut PragmaList) -> usize {
    scan_pragmas_with(source, &MacroTable::new(), pragmas)
}

/// [`scan_pragmas`] with the object-like macros defined by the front end
pub fn scan_pragmas_with(source: &str, macros: &MacroTable, pragmas: &mut PragmaList) -> usize {
    let before = pragmas.len();
    let mut recorder = PragmaRecorder::new(pragmas);
    for line in pragma_lines(source) {
        recorder.record_directive_with(line.text, macros);
    }
    pragmas.len() - before
}
