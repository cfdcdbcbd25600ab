use std::sync::Arc;

use serde_json::json;

use exam_core::model::{PartKey, QuestionId, QuestionStatus, SessionConfig, TestId};
use exam_core::time::fixed_now;
use services::{BackendClient, BackendConfig, Clock, SessionError, TestSession};

/// Part 1 served out of order, part 2 in order.
fn scrambled_payload() -> serde_json::Value {
    let question = |id: u64, number: u32| {
        json!({
            "id": id,
            "questionNumber": number,
            "correctAnswer": "A",
            "answers": [
                { "label": "A", "text": "a", "isCorrect": true },
                { "label": "B", "text": "b" }
            ]
        })
    };
    json!({
        "groupQuestions": [
            {
                "part": { "key": "part1" },
                "questions": [question(13, 3), question(11, 1), question(12, 2)]
            },
            {
                "part": { "key": "part2" },
                "questions": [question(24, 4), question(25, 5), question(26, 6)]
            }
        ]
    })
}

async fn started_session(server: &mockito::ServerGuard) -> TestSession {
    let backend = Arc::new(BackendClient::new(Some(BackendConfig::new(server.url()))));
    let config = SessionConfig::new(
        TestId::new("t1"),
        vec![PartKey::Photographs, PartKey::QuestionResponse],
        None,
    )
    .unwrap();
    TestSession::start(config, backend, Clock::fixed(fixed_now())).await
}

#[tokio::test]
async fn index_orders_questions_across_parts_despite_backend_order() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/test/t1")
        .with_status(200)
        .with_body(scrambled_payload().to_string())
        .expect_at_least(1)
        .create_async()
        .await;

    let session = started_session(&server).await;
    let numbers: Vec<u32> = session
        .question_index()
        .iter()
        .map(|entry| entry.display_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn jumping_switches_part_and_promotes_unseen_to_viewed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/test/t1")
        .with_status(200)
        .with_body(scrambled_payload().to_string())
        .expect_at_least(1)
        .create_async()
        .await;

    let mut session = started_session(&server).await;
    assert_eq!(session.current_part(), PartKey::Photographs);

    let part = session.jump_to_question(QuestionId::new(25)).unwrap();
    assert_eq!(part, PartKey::QuestionResponse);
    assert_eq!(session.current_part(), PartKey::QuestionResponse);

    let entry = session
        .question_index()
        .into_iter()
        .find(|entry| entry.id == QuestionId::new(25))
        .unwrap();
    assert_eq!(entry.status, QuestionStatus::Viewed);

    // jumping to an answered question does not demote its status
    session.select_answer(QuestionId::new(11), Some("A")).unwrap();
    session.jump_to_question(QuestionId::new(11)).unwrap();
    let entry = session
        .question_index()
        .into_iter()
        .find(|entry| entry.id == QuestionId::new(11))
        .unwrap();
    assert_eq!(entry.status, QuestionStatus::Answered);
}

#[tokio::test]
async fn long_press_toggles_the_review_mark() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/test/t1")
        .with_status(200)
        .with_body(scrambled_payload().to_string())
        .expect_at_least(1)
        .create_async()
        .await;

    let mut session = started_session(&server).await;
    session.toggle_marked(QuestionId::new(12)).unwrap();
    let status = session
        .question_index()
        .into_iter()
        .find(|entry| entry.id == QuestionId::new(12))
        .unwrap()
        .status;
    assert_eq!(status, QuestionStatus::MarkedForReview);

    session.toggle_marked(QuestionId::new(12)).unwrap();
    let status = session
        .question_index()
        .into_iter()
        .find(|entry| entry.id == QuestionId::new(12))
        .unwrap()
        .status;
    assert_eq!(status, QuestionStatus::Viewed);
}

#[tokio::test]
async fn teardown_stops_the_clock_and_rejects_further_writes() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/test/t1")
        .with_status(200)
        .with_body(scrambled_payload().to_string())
        .expect_at_least(1)
        .create_async()
        .await;

    let mut session = started_session(&server).await;
    session.teardown();

    assert!(!session.is_active());
    assert!(matches!(
        session.select_answer(QuestionId::new(11), Some("A")),
        Err(SessionError::Inactive)
    ));
    assert!(matches!(
        session.jump_to_question(QuestionId::new(11)),
        Err(SessionError::Inactive)
    ));
}
