// tests/lexer_tests.rs

use lens_formula::ast::Token;
use lens_formula::lexer::Lexer;

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("(", Token::LParen),
        (")", Token::RParen),
        (",", Token::Comma),
        ("=", Token::Equals),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![("==", Token::EqEq), (">=", Token::GtEq), ("<=", Token::LtEq)];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_equals_followed_by_space_is_binding() {
    let mut lexer = Lexer::new("= =");
    assert_eq!(lexer.next_token().unwrap(), Token::Equals);
    assert_eq!(lexer.next_token().unwrap(), Token::Equals);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_integer() {
    let mut lexer = Lexer::new("42");
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(42));
}

#[test]
fn test_float() {
    let mut lexer = Lexer::new("2.75");
    assert!(matches!(lexer.next_token().unwrap(), Token::Float(n) if (n - 2.75).abs() < 1e-9));
}

#[test]
fn test_exponent() {
    let mut lexer = Lexer::new("1e3 2.5e-1");
    assert_eq!(lexer.next_token().unwrap(), Token::Float(1000.0));
    assert_eq!(lexer.next_token().unwrap(), Token::Float(0.25));
}

#[test]
fn test_dangling_exponent_is_identifier() {
    let mut lexer = Lexer::new("2e");
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(2));
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("e".to_string()));
}

#[test]
fn test_negative_number_is_two_tokens() {
    let mut lexer = Lexer::new("-5");
    assert_eq!(lexer.next_token().unwrap(), Token::Minus);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(5));
}

#[test]
fn test_integer_overflow() {
    let mut lexer = Lexer::new("99999999999999999999");
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid number"));
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_identifiers() {
    let test_cases = vec!["count", "cpu.usage", "@timestamp", "host_name2", "_private"];

    for input in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::Identifier(input.to_string()),
            "Failed for input: {}",
            input
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_single_and_double_quotes() {
    let mut lexer = Lexer::new(r#"'status:error' "1d""#);
    assert_eq!(lexer.next_token().unwrap(), Token::String("status:error".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::String("1d".to_string()));
}

#[test]
fn test_string_escapes() {
    let mut lexer = Lexer::new(r#"'it\'s' "say \"hi\"""#);
    assert_eq!(lexer.next_token().unwrap(), Token::String("it's".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::String("say \"hi\"".to_string()));
}

#[test]
fn test_other_quote_needs_no_escape() {
    let mut lexer = Lexer::new(r#""message:'timeout'""#);
    assert_eq!(lexer.next_token().unwrap(), Token::String("message:'timeout'".to_string()));
}

// ============================================================================
// Whole formulas
// ============================================================================

#[test]
fn test_formula_token_stream() {
    let mut lexer = Lexer::new("count(kql=\"status:error\") / count() * 100");
    let expected = vec![
        Token::Identifier("count".to_string()),
        Token::LParen,
        Token::Identifier("kql".to_string()),
        Token::Equals,
        Token::String("status:error".to_string()),
        Token::RParen,
        Token::Slash,
        Token::Identifier("count".to_string()),
        Token::LParen,
        Token::RParen,
        Token::Star,
        Token::Integer(100),
        Token::Eof,
    ];

    for token in expected {
        assert_eq!(lexer.next_token().unwrap(), token);
    }
}

#[test]
fn test_no_space_between_tokens() {
    let mut lexer = Lexer::new("sum(a)>=5");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("sum".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("a".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(5));
}

#[test]
fn test_spans() {
    let mut lexer = Lexer::new("sum( bytes )");
    let expected = vec![(0, 3), (3, 4), (5, 10), (11, 12), (12, 12)];

    for (start, end) in expected {
        let spanned = lexer.next_spanned().unwrap();
        assert_eq!((spanned.span.start, spanned.span.end), (start, end));
    }
}

// ============================================================================
// Error Cases
// ============================================================================

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new(r##"'hello"##);
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unterminated string"));
}

#[test]
fn test_unterminated_string_after_backslash() {
    let mut lexer = Lexer::new(r##"'hello\"##);
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unexpected end of input"));
}

#[test]
fn test_invalid_escape_sequence() {
    let mut lexer = Lexer::new(r#""hello\x""#);
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid escape sequence"));
}

#[test]
fn test_invalid_character() {
    let mut lexer = Lexer::new("#");
    let result = lexer.next_token();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unexpected character"));
}

#[test]
fn test_error_position() {
    let mut lexer = Lexer::new("count(#)");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position.offset, 6);
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 7);
    assert!(err.to_string().ends_with("at line 1, column 7"));
}

#[test]
fn test_error_position_on_second_line() {
    let mut lexer = Lexer::new("count()\n  + #");
    for _ in 0..4 {
        lexer.next_token().unwrap();
    }
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 5);
}
