// Directive token streams built from source text

use rsreflect_lexer::{pragma_lines, DirectiveTokens, Token, TokenSource};

#[test]
fn test_each_pragma_line_is_its_own_stream() {
    let source = "#pragma version(1)\n#pragma rs_fp_relaxed\n";
    let lines = pragma_lines(source);

    let mut first = DirectiveTokens::new(lines[0].text);
    assert_eq!(first.lex_unexpanded(), Token::Ident("version".to_string()));
    assert_eq!(first.lex_unexpanded(), Token::LParen);
    assert_eq!(first.lex_unexpanded(), Token::NumericLiteral("1".to_string()));
    assert_eq!(first.lex_unexpanded(), Token::RParen);
    assert_eq!(first.lex_unexpanded(), Token::Eod);
    assert!(first.at_end());

    let mut second = DirectiveTokens::new(lines[1].text);
    assert_eq!(second.lex(), Token::Ident("rs_fp_relaxed".to_string()));
    assert_eq!(second.lex(), Token::Eod);
}

#[test]
fn test_look_ahead_past_end() {
    let mut tokens = DirectiveTokens::new("name ( value )");

    assert_eq!(tokens.look_ahead(3), Token::RParen);
    assert_eq!(tokens.look_ahead(4), Token::Eod);
    assert_eq!(tokens.look_ahead(10), Token::Eod);
    assert_eq!(tokens.position(), 0);
    assert!(!tokens.at_end());
}

#[test]
fn test_expansion_is_counted_once() {
    let mut tokens = DirectiveTokens::new("( PAIR )");
    tokens.define("PAIR", "a , b");

    assert_eq!(tokens.lex(), Token::LParen);
    assert_eq!(tokens.lex(), Token::Ident("a".to_string()));
    assert_eq!(tokens.lex(), Token::Comma);
    assert_eq!(tokens.lex(), Token::Ident("b".to_string()));
    assert_eq!(tokens.lex(), Token::RParen);
    assert_eq!(tokens.position(), 5);
}
