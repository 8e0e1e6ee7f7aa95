//! Tests for move-token extraction from oracle replies.

use chess_oracle::{MoveToken, extract_move_token};

fn extracted(text: &str) -> Option<String> {
    extract_move_token(text).map(|t| t.as_str().to_string())
}

#[test]
fn test_bare_token() {
    assert_eq!(extracted("e2-e4").as_deref(), Some("e2-e4"));
}

#[test]
fn test_token_in_sentence() {
    assert_eq!(
        extracted("The best move is e2-e4 because...").as_deref(),
        Some("e2-e4")
    );
}

#[test]
fn test_resignation_has_no_token() {
    assert_eq!(extracted("I resign"), None);
}

#[test]
fn test_typical_model_replies() {
    let cases = [
        ("I recommend e7-e5 as a strong response", Some("e7-e5")),
        ("e7-e5", Some("e7-e5")),
        ("Move: g8-f6.", Some("g8-f6")),
        ("**d7-d5**", Some("d7-d5")),
        ("I'll play e7e5", None),
        ("Nf6", None),
        ("e5", None),
        ("start-end", None),
    ];

    for (reply, expected) in cases {
        assert_eq!(extracted(reply).as_deref(), expected, "reply: {reply:?}");
    }
}

#[test]
fn test_first_occurrence_wins_even_in_prose() {
    // The model mentions a diagonal before its actual move.
    assert_eq!(
        extracted("Along the a1-h8 diagonal, I play c7-c5").as_deref(),
        Some("a1-h8")
    );
}

#[test]
fn test_extraction_is_syntax_only() {
    // Not a real square, still a token.
    assert_eq!(extracted("try z9-q0").as_deref(), Some("z9-q0"));
}

#[test]
fn test_extraction_is_deterministic() {
    let reply = "Maybe b8-c6, or perhaps g8-f6";
    assert_eq!(extract_move_token(reply), extract_move_token(reply));
}

#[test]
fn test_parse_requires_whole_token() {
    assert!(MoveToken::parse("e2-e4").is_some());
    assert!(MoveToken::parse(" e2-e4").is_none());
    assert!(MoveToken::parse("play e2-e4").is_none());
    assert!(MoveToken::parse("e2-").is_none());
}

#[test]
fn test_non_ascii_letters_are_boundaries() {
    assert_eq!(extracted("走e2-e4").as_deref(), Some("e2-e4"));
    assert_eq!(extracted("Zug:ée7-e5").as_deref(), Some("e7-e5"));
    assert_eq!(extracted("e7-e5ü").as_deref(), Some("e7-e5"));
}

#[test]
fn test_deserialize_enforces_token_shape() {
    let token: MoveToken = serde_json::from_str("\"g1-f3\"").unwrap();
    assert_eq!(token.from_square(), "g1");
    assert_eq!(serde_json::to_string(&token).unwrap(), "\"g1-f3\"");

    for bad in ["\"x\"", "\"\"", "\"e2e4\"", "\"play e2-e4\""] {
        assert!(
            serde_json::from_str::<MoveToken>(bad).is_err(),
            "{bad} should not deserialize"
        );
    }
}
