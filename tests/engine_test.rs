//! Integration tests for the full submission pipeline: one completed quiz
//! in, persisted history plus consistent derived state out.

use quizcore::model::{Question, QuestionAttempt, QuestionOption, QuizMode};
use quizcore::question_bank::{QuestionBank, StaticQuestionBank};
use quizcore::{Engine, EngineConfig, QuizSubmission, SubmitError};
use tempfile::TempDir;

async fn test_engine() -> (Engine, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let config = EngineConfig::default().with_data_dir(dir.path());
    let engine = Engine::open(config).await.expect("engine");
    (engine, dir)
}

/// `correct` right answers then `wrong` misses, `ms_each` per question.
fn attempts(correct: u32, wrong: u32, ms_each: u64) -> Vec<QuestionAttempt> {
    let mut out = Vec::new();
    for i in 0..correct {
        out.push(QuestionAttempt {
            question_id: format!("c{i}"),
            selected_option_id: Some("right".to_string()),
            correct_option_id: "right".to_string(),
            time_spent_ms: ms_each,
            is_skipped: false,
        });
    }
    for i in 0..wrong {
        out.push(QuestionAttempt {
            question_id: format!("w{i}"),
            selected_option_id: Some("other".to_string()),
            correct_option_id: "right".to_string(),
            time_spent_ms: ms_each,
            is_skipped: false,
        });
    }
    out
}

fn submission(
    attempts: Vec<QuestionAttempt>,
    total_time_ms: u64,
    mode: QuizMode,
) -> QuizSubmission {
    QuizSubmission {
        attempts,
        total_time_ms,
        mode,
        subject_id: "math".to_string(),
        subject_title: "Mathematics".to_string(),
        topic_id: Some("algebra".to_string()),
        topic_title: "Algebra".to_string(),
        questions: vec![],
    }
}

#[tokio::test]
async fn end_to_end_first_submission() {
    let (engine, _dir) = test_engine().await;

    // 5/5 correct, 50 seconds, practice, medium difficulty, fresh profile.
    let outcome = engine
        .submit_quiz_result(submission(attempts(5, 0, 10_000), 50_000, QuizMode::Practice))
        .await
        .unwrap();

    assert_eq!(outcome.result.score, 100.0);
    assert_eq!(outcome.result.correct_count, 5);
    assert_eq!(outcome.result.total_count, 5);

    // 50 base + 20 perfect + 5 speed (10 s/question under the 15 s bar).
    assert_eq!(outcome.xp.xp_gained, 75);
    assert_eq!(outcome.xp.new_xp, 75);
    assert_eq!(outcome.xp.old_level, 1);
    assert!(!outcome.xp.leveled_up);

    let unlocked: Vec<&str> = outcome.unlocked.iter().map(|a| a.id.as_str()).collect();
    assert!(unlocked.contains(&"first_quiz"));
    assert!(unlocked.contains(&"perfect_score"));

    let history = engine.quiz_history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.result.id);

    let profile = engine.user_profile().await;
    assert_eq!(profile.stats.total_quizzes, 1);
    assert_eq!(profile.stats.correct_answers, 5);
    assert_eq!(profile.stats.streak, 1, "first quiz starts the streak");
    assert_eq!(profile.stats.weekly_quizzes, 1);
    assert_eq!(engine.current_streak().await, 1);

    let subject = engine.subject_analytics("math").await.unwrap();
    assert_eq!(subject.total_quizzes, 1);
    assert_eq!(subject.average_score, 100.0);
    assert_eq!(subject.avg_time_per_question_ms, 10_000.0);

    let topic = engine.topic_analytics("algebra").await.unwrap();
    assert_eq!(topic.total_quizzes, 1);

    let q = engine.question_analytics("c0").await.unwrap();
    assert_eq!(q.total_attempts, 1);
    assert_eq!(q.difficulty_rating, 1);
}

#[tokio::test]
async fn history_appends_exactly_one_and_never_mutates_prior_entries() {
    let (engine, _dir) = test_engine().await;

    engine
        .submit_quiz_result(submission(attempts(4, 1, 8_000), 40_000, QuizMode::Practice))
        .await
        .unwrap();
    let after_first = engine.quiz_history().await;
    assert_eq!(after_first.len(), 1);

    engine
        .submit_quiz_result(submission(attempts(2, 3, 8_000), 40_000, QuizMode::Test))
        .await
        .unwrap();
    let after_second = engine.quiz_history().await;

    assert_eq!(after_second.len(), 2);
    // Newest first; the prior entry is byte-stable at the back.
    assert_eq!(after_second[1], after_first[0]);
    assert_eq!(after_second[0].score, 40.0);
}

#[tokio::test]
async fn empty_attempts_are_rejected() {
    let (engine, _dir) = test_engine().await;
    let err = engine
        .submit_quiz_result(submission(vec![], 0, QuizMode::Practice))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::EmptyAttempts));
    assert!(engine.quiz_history().await.is_empty(), "nothing persisted");
}

#[tokio::test]
async fn attempts_must_reference_the_supplied_catalog() {
    let (engine, _dir) = test_engine().await;
    let mut sub = submission(attempts(1, 0, 5_000), 5_000, QuizMode::Practice);
    sub.questions = vec![Question {
        id: "some-other-question".to_string(),
        text: "?".to_string(),
        options: vec![QuestionOption {
            id: "right".to_string(),
            text: "yes".to_string(),
        }],
        correct_option_id: "right".to_string(),
        explanation: None,
        difficulty: None,
        tags: vec![],
    }];

    let err = engine.submit_quiz_result(sub).await.unwrap_err();
    assert!(matches!(err, SubmitError::UnknownQuestion { .. }));
}

#[tokio::test]
async fn bank_served_quiz_flows_through_the_pipeline() {
    let (engine, _dir) = test_engine().await;

    let questions: Vec<Question> = (0..5)
        .map(|i| Question {
            id: format!("q{i}"),
            text: format!("Question {i}?"),
            options: vec![
                QuestionOption {
                    id: "a".to_string(),
                    text: "Yes".to_string(),
                },
                QuestionOption {
                    id: "b".to_string(),
                    text: "No".to_string(),
                },
            ],
            correct_option_id: "a".to_string(),
            explanation: None,
            difficulty: None,
            tags: vec![],
        })
        .collect();
    let bank = StaticQuestionBank::new().with_topic("algebra", questions);

    // The quiz screen fetches its questions, records one attempt per
    // question, and hands both back to the engine.
    let served = bank.fetch_questions("algebra", 5).await.unwrap();
    let attempts: Vec<QuestionAttempt> = served
        .iter()
        .map(|q| QuestionAttempt {
            question_id: q.id.clone(),
            selected_option_id: Some(q.correct_option_id.clone()),
            correct_option_id: q.correct_option_id.clone(),
            time_spent_ms: 12_000,
            is_skipped: false,
        })
        .collect();

    let mut sub = submission(attempts, 60_000, QuizMode::Practice);
    sub.questions = served;

    let outcome = engine.submit_quiz_result(sub).await.unwrap();
    assert_eq!(outcome.result.score, 100.0);
    assert_eq!(engine.quiz_history().await.len(), 1);
}

#[tokio::test]
async fn per_mode_accuracy_tracks_each_mode_independently() {
    let (engine, _dir) = test_engine().await;

    engine
        .submit_quiz_result(submission(attempts(5, 0, 20_000), 100_000, QuizMode::Practice))
        .await
        .unwrap();
    engine
        .submit_quiz_result(submission(attempts(3, 2, 20_000), 100_000, QuizMode::Test))
        .await
        .unwrap();

    let stats = engine.user_profile().await.stats;
    assert_eq!(stats.practice_quizzes, 1);
    assert_eq!(stats.test_quizzes, 1);
    assert_eq!(stats.practice_accuracy, 100.0);
    assert_eq!(stats.test_accuracy, 60.0);
    // Overall accuracy derives from cumulative totals: 8 of 10.
    assert_eq!(stats.overall_accuracy, 80.0);
}

#[tokio::test]
async fn xp_accumulates_and_levels_up() {
    let (engine, _dir) = test_engine().await;
    let perfect = || submission(attempts(5, 0, 10_000), 50_000, QuizMode::Practice);

    let first = engine.submit_quiz_result(perfect()).await.unwrap();
    assert_eq!(first.xp.new_xp, 75);
    assert!(!first.xp.leveled_up);

    let second = engine.submit_quiz_result(perfect()).await.unwrap();
    assert_eq!(second.xp.old_xp, 75);
    assert_eq!(second.xp.new_xp, 150);
    assert_eq!(second.xp.new_level, 2);
    assert!(second.xp.leveled_up);

    let profile = engine.user_profile().await;
    assert_eq!(profile.level, 2);
    assert_eq!(profile.level_progress, 50);
}

#[tokio::test]
async fn achievements_stay_unlocked_with_stable_timestamps() {
    let (engine, _dir) = test_engine().await;
    let sub = || submission(attempts(5, 0, 10_000), 50_000, QuizMode::Practice);

    engine.submit_quiz_result(sub()).await.unwrap();
    let first_quiz = engine
        .user_profile()
        .await
        .awards
        .into_iter()
        .find(|a| a.id == "first_quiz")
        .unwrap();
    assert!(first_quiz.unlocked);
    let stamped = first_quiz.unlocked_at.unwrap();

    let outcome = engine.submit_quiz_result(sub()).await.unwrap();
    assert!(
        !outcome.unlocked.iter().any(|a| a.id == "first_quiz"),
        "an unlocked award is never reported again"
    );
    let still = engine
        .user_profile()
        .await
        .awards
        .into_iter()
        .find(|a| a.id == "first_quiz")
        .unwrap();
    assert!(still.unlocked);
    assert_eq!(still.unlocked_at.unwrap(), stamped);
}

#[tokio::test]
async fn listeners_fire_once_per_submission_until_unregistered() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let (engine, _dir) = test_engine().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let id = engine.register_analytics_listener(move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    let sub = || submission(attempts(3, 2, 8_000), 40_000, QuizMode::Practice);
    engine.submit_quiz_result(sub()).await.unwrap();
    engine.submit_quiz_result(sub()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    assert!(engine.unregister_analytics_listener(id));
    engine.submit_quiz_result(sub()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn difficult_questions_rank_misses_first() {
    let (engine, _dir) = test_engine().await;

    // c0/c1 always right, w0 always wrong, across three quizzes.
    for _ in 0..3 {
        engine
            .submit_quiz_result(submission(attempts(2, 1, 9_000), 27_000, QuizMode::Practice))
            .await
            .unwrap();
    }

    let ranked = engine.most_difficult_questions(10).await;
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].question_id, "w0");
    assert_eq!(ranked[0].difficulty_rating, 5);
    assert_eq!(ranked[0].total_attempts, 3);
    assert!(ranked[1..].iter().all(|q| q.difficulty_rating == 1));
}

#[tokio::test]
async fn weekly_stats_cover_recent_submissions() {
    let (engine, _dir) = test_engine().await;

    engine
        .submit_quiz_result(submission(attempts(4, 1, 10_000), 50_000, QuizMode::Practice))
        .await
        .unwrap();
    engine
        .submit_quiz_result(submission(attempts(5, 0, 10_000), 50_000, QuizMode::Test))
        .await
        .unwrap();

    let week = engine.weekly_stats().await;
    assert_eq!(week.quizzes, 2);
    assert_eq!(week.questions, 10);
    assert_eq!(week.correct, 9);
    assert_eq!(week.active_days, 1);
    assert!(week.subjects.contains("math"));
}

#[tokio::test]
async fn improved_topics_surface_after_four_results() {
    let (engine, _dir) = test_engine().await;

    // Two weak quizzes then two strong ones on the same topic.
    for (correct, wrong) in [(1u32, 4u32), (2, 3), (4, 1), (5, 0)] {
        engine
            .submit_quiz_result(submission(
                attempts(correct, wrong, 10_000),
                50_000,
                QuizMode::Practice,
            ))
            .await
            .unwrap();
    }

    let improved = engine.most_improved_topics(5).await;
    assert_eq!(improved.len(), 1);
    assert_eq!(improved[0].topic_id, "algebra");
    assert_eq!(improved[0].older_avg, 30.0);
    assert_eq!(improved[0].newer_avg, 90.0);
}
