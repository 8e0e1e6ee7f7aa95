//! Tests for the turn protocol between the human and the oracle.

use chess_oracle::{
    HumanTurn, Notification, OraclePrompt, OracleTurn, RecordingNotifier, SYSTEM_PERSONA,
    ScriptedOracle, TurnCoordinator, TurnError, TurnPhase, TurnReport,
};

const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const AFTER_E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const AFTER_E4_E5_FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";

fn coordinator() -> (TurnCoordinator, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let mut coordinator = TurnCoordinator::new(Box::new(notifier.clone()));
    coordinator.start();
    notifier.drain();
    (coordinator, notifier)
}

#[test]
fn test_start_leaves_idle_and_renders() {
    let notifier = RecordingNotifier::new();
    let mut coordinator = TurnCoordinator::new(Box::new(notifier.clone()));
    assert_eq!(coordinator.phase(), TurnPhase::Idle);

    coordinator.start();
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert!(
        notifier
            .drain()
            .contains(&Notification::BoardChanged(coordinator.board().render()))
    );
}

#[tokio::test]
async fn test_end_to_end_round() {
    let (mut coordinator, notifier) = coordinator();
    let oracle = ScriptedOracle::new(["I recommend e7-e5 as a strong response"]);

    let report = coordinator
        .play_turn("e2-e4", &oracle)
        .await
        .expect("human move accepted");

    match report {
        TurnReport::OracleReplied(OracleTurn::Applied { token, reply }) => {
            assert_eq!(token.as_str(), "e7-e5");
            assert_eq!(reply, "I recommend e7-e5 as a strong response");
        }
        other => panic!("unexpected report: {other:?}"),
    }

    assert_eq!(coordinator.board().current_position(), AFTER_E4_E5_FEN);
    let history: Vec<&str> = coordinator
        .board()
        .history()
        .iter()
        .map(|t| t.as_str())
        .collect();
    assert_eq!(history, ["e2-e4", "e7-e5"]);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert!(notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_prompt_carries_move_and_fen() {
    let (mut coordinator, _notifier) = coordinator();
    let oracle = ScriptedOracle::new(["e7-e5"]);

    coordinator.play_turn("e2-e4", &oracle).await.unwrap();

    let prompts = oracle.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].system(), SYSTEM_PERSONA);
    assert!(prompts[0].user().contains("e2-e4"));
    assert!(prompts[0].user().contains(AFTER_E4_FEN));
}

#[test]
fn test_prompt_at_initial_position_contains_initial_fen() {
    let token = chess_oracle::MoveToken::parse("e2-e4").unwrap();
    let prompt = OraclePrompt::after_human_move(&token, INITIAL_FEN);
    assert!(prompt.user().contains("e2-e4"));
    assert!(prompt.user().contains(INITIAL_FEN));
}

#[test]
fn test_bad_format_is_rejected_without_mutation() {
    let (mut coordinator, notifier) = coordinator();

    for raw in ["e2e4", "", "e2-e4-e5", "e2--e4", "--", "e2 e4", "resign"] {
        let result = coordinator.submit_human_move(raw);
        assert!(
            matches!(result, Err(TurnError::Format { .. })),
            "{raw:?} gave {result:?}"
        );
        assert_eq!(coordinator.board().current_position(), INITIAL_FEN);
        assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    }

    assert_eq!(notifier.alerts().len(), 7);
    assert!(notifier.alerts().iter().all(|a| a == "Invalid move format"));
}

#[test]
fn test_two_part_garbage_is_malformed() {
    let (mut coordinator, _notifier) = coordinator();

    let result = coordinator.submit_human_move("foo-bar");
    assert_eq!(
        result,
        Err(TurnError::MalformedToken {
            raw: "foo-bar".to_string()
        })
    );
    assert_eq!(coordinator.board().current_position(), INITIAL_FEN);
}

#[test]
fn test_illegal_human_move_is_rejected() {
    let (mut coordinator, notifier) = coordinator();

    let result = coordinator.submit_human_move("e2-e5");
    assert!(matches!(result, Err(TurnError::IllegalMove { .. })));
    assert_eq!(coordinator.board().current_position(), INITIAL_FEN);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert_eq!(notifier.alerts(), vec!["Invalid move: e2-e5".to_string()]);
}

#[test]
fn test_surrounding_whitespace_is_ignored() {
    let (mut coordinator, _notifier) = coordinator();
    let turn = coordinator.submit_human_move("  e2-e4\n").unwrap();
    assert!(matches!(turn, HumanTurn::OracleToMove(_)));
    assert_eq!(coordinator.board().history()[0].as_str(), "e2-e4");
}

#[test]
fn test_busy_while_awaiting_oracle() {
    let (mut coordinator, notifier) = coordinator();

    let turn = coordinator.submit_human_move("e2-e4").unwrap();
    assert!(matches!(turn, HumanTurn::OracleToMove(_)));
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingOracleResponse);
    notifier.drain();

    assert_eq!(coordinator.submit_human_move("d2-d4"), Err(TurnError::Busy));
    assert_eq!(coordinator.board().current_position(), AFTER_E4_FEN);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingOracleResponse);
    assert_eq!(notifier.alerts().len(), 1);

    let turn = coordinator.complete_oracle_turn(Ok("e7-e5".to_string()));
    assert!(turn.is_applied());
    assert!(coordinator.submit_human_move("d2-d4").is_ok());
}

#[test]
fn test_unparseable_reply_forfeits_silently() {
    let (mut coordinator, notifier) = coordinator();
    coordinator.submit_human_move("e2-e4").unwrap();
    notifier.drain();

    let turn = coordinator.complete_oracle_turn(Ok("I resign".to_string()));
    assert!(matches!(turn, OracleTurn::Unparseable { ref reply } if reply == "I resign"));
    assert_eq!(coordinator.board().current_position(), AFTER_E4_FEN);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert!(notifier.alerts().is_empty());
}

#[test]
fn test_illegal_oracle_move_is_rejected() {
    let (mut coordinator, notifier) = coordinator();
    coordinator.submit_human_move("e2-e4").unwrap();
    notifier.drain();

    let turn = coordinator.complete_oracle_turn(Ok("I play e2-e4 too".to_string()));
    assert!(matches!(turn, OracleTurn::Rejected { ref token, .. } if token.as_str() == "e2-e4"));
    assert_eq!(coordinator.board().current_position(), AFTER_E4_FEN);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert_eq!(notifier.alerts(), vec!["Invalid move: e2-e4".to_string()]);
}

#[tokio::test]
async fn test_unreachable_oracle_keeps_human_move() {
    let (mut coordinator, notifier) = coordinator();
    let oracle = ScriptedOracle::new(Vec::<String>::new()).then_fail("connection refused");

    let report = coordinator.play_turn("e2-e4", &oracle).await.unwrap();
    assert!(matches!(
        report,
        TurnReport::OracleReplied(OracleTurn::Unreachable(_))
    ));
    assert_eq!(coordinator.board().current_position(), AFTER_E4_FEN);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
    assert_eq!(notifier.alerts().len(), 1);
}

#[test]
fn test_reply_without_pending_call_is_ignored() {
    let (mut coordinator, _notifier) = coordinator();
    let turn = coordinator.complete_oracle_turn(Ok("e7-e5".to_string()));
    assert!(matches!(turn, OracleTurn::NotAwaiting));
    assert_eq!(coordinator.board().current_position(), INITIAL_FEN);
}

#[tokio::test]
async fn test_game_over_stops_the_loop() {
    let (mut coordinator, notifier) = coordinator();
    let oracle = ScriptedOracle::new(["e7-e5", "Checkmate: d8-h4"]);

    coordinator.play_turn("f2-f3", &oracle).await.unwrap();
    coordinator.play_turn("g2-g4", &oracle).await.unwrap();
    assert!(coordinator.board().is_game_over());
    notifier.drain();

    let result = coordinator.submit_human_move("a2-a3");
    assert_eq!(
        result,
        Err(TurnError::GameOver {
            outcome: "Black wins by checkmate".to_string()
        })
    );
    assert_eq!(coordinator.board().history().len(), 4);
}

#[tokio::test]
async fn test_human_checkmate_skips_oracle() {
    let (mut coordinator, _notifier) = coordinator();
    let oracle = ScriptedOracle::new(["f7-f6", "g7-g5"]);

    coordinator.play_turn("e2-e4", &oracle).await.unwrap();
    coordinator.play_turn("a2-a3", &oracle).await.unwrap();
    let report = coordinator.play_turn("d1-h5", &oracle).await.unwrap();

    match report {
        TurnReport::GameFinished { outcome } => assert_eq!(outcome, "White wins by checkmate"),
        other => panic!("unexpected report: {other:?}"),
    }
    assert_eq!(oracle.prompts().len(), 2);
    assert_eq!(coordinator.phase(), TurnPhase::AwaitingHumanInput);
}
