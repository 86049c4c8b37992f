use time::OffsetDateTime;
use uuid::Uuid;

use academy_core::db::{
    Course, CourseLevel, Learner, NewCourseLevel, NewCourse, ProgressUpdate, UpdateCourse,
};
use academy_core::engine::{
    check_and_promote, LevelCatalog, MemoryStore, ProgressionService, ProgressionStore,
};
use academy_core::EngineError;

fn learner(tenant_id: Uuid) -> Learner {
    let now = OffsetDateTime::now_utc();
    Learner {
        id: Uuid::new_v4(),
        tenant_id,
        first_name: "Amina".to_string(),
        last_name: "Odhiambo".to_string(),
        date_of_birth: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn level_spec(modules: i32, artifacts: i32, score: i32, confirm: bool) -> NewCourseLevel {
    NewCourseLevel {
        name: format!("Level requiring {} modules", modules),
        description: None,
        learning_outcomes: None,
        required_modules_count: modules,
        required_artifacts_count: artifacts,
        required_assessment_score: score,
        requires_teacher_confirmation: confirm,
    }
}

async fn seed_course(
    store: &mut MemoryStore,
    specs: Vec<NewCourseLevel>,
) -> (Course, Vec<CourseLevel>) {
    LevelCatalog::create_course(
        store,
        NewCourse {
            name: "Robotics".to_string(),
            description: None,
            tenant_id: None,
            is_active: Some(true),
            levels: specs,
        },
    )
    .await
    .expect("seed course")
}

fn update(modules: Option<i32>, artifacts: Option<i32>, score: Option<i32>) -> ProgressUpdate {
    ProgressUpdate {
        modules_completed: modules,
        artifacts_submitted: artifacts,
        assessment_score: score,
        teacher_confirmed: None,
    }
}

#[tokio::test]
async fn robotics_three_level_walkthrough() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) = seed_course(
        &mut store,
        vec![
            level_spec(3, 4, 70, false),
            level_spec(3, 4, 70, false),
            level_spec(3, 4, 70, false),
        ],
    )
    .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .expect("enroll");
    assert_eq!(enrollment.current_level_id, Some(levels[0].id));
    assert!(enrollment.completed_at.is_none());

    // Enrollment starts with a fresh record on level 1
    let record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .expect("level 1 record");
    assert_eq!(record.modules_completed, 0);
    assert_eq!(record.artifacts_submitted, 0);
    assert_eq!(record.assessment_score, 0);
    assert!(!record.teacher_confirmed);

    // Level 1 -> 2
    let outcome = ProgressionService::update_progress(
        &mut store,
        record.id,
        update(Some(3), Some(4), Some(75)),
    )
    .await
    .unwrap();
    assert!(outcome.promoted);
    assert!(outcome.progress.completed);
    assert!(outcome.progress.completed_at.is_some());

    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));

    let level2_record = store
        .progress_for_level(enrollment.id, levels[1].id)
        .await
        .unwrap()
        .expect("level 2 record created on promotion");
    assert_eq!(level2_record.modules_completed, 0);
    assert!(!level2_record.completed);

    // Level 2 -> 3
    let outcome = ProgressionService::update_progress(
        &mut store,
        level2_record.id,
        update(Some(3), Some(4), Some(75)),
    )
    .await
    .unwrap();
    assert!(outcome.promoted);

    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[2].id));

    // Level 3 completes the course; the pointer stays on the final level
    let level3_record = store
        .progress_for_level(enrollment.id, levels[2].id)
        .await
        .unwrap()
        .unwrap();
    let outcome = ProgressionService::update_progress(
        &mut store,
        level3_record.id,
        update(Some(3), Some(4), Some(75)),
    )
    .await
    .unwrap();
    assert!(outcome.promoted);

    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[2].id));
    assert!(enrollment.completed_at.is_some());
}

#[tokio::test]
async fn redundant_check_after_completion_is_a_noop() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) = seed_course(&mut store, vec![level_spec(1, 1, 50, false)]).await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();

    let outcome =
        ProgressionService::update_progress(&mut store, record.id, update(Some(1), Some(1), Some(80)))
            .await
            .unwrap();
    assert!(outcome.promoted);

    let after_first = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    let completed_at = after_first.completed_at.expect("course completed");
    let record_completed_at = store
        .fetch_progress(record.id)
        .await
        .unwrap()
        .unwrap()
        .completed_at
        .expect("record completed");

    // A second check reports no event and moves no timestamps
    let promoted = check_and_promote(&mut store, enrollment.id).await.unwrap();
    assert!(!promoted);

    let after_second = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(after_second.completed_at, Some(completed_at));
    assert_eq!(after_second.current_level_id, Some(levels[0].id));
    let record_after = store.fetch_progress(record.id).await.unwrap().unwrap();
    assert_eq!(record_after.completed_at, Some(record_completed_at));
}

#[tokio::test]
async fn teacher_confirmation_gates_promotion() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) =
        seed_course(&mut store, vec![level_spec(2, 1, 60, true), level_spec(2, 1, 60, false)])
            .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();

    // Numeric thresholds met, confirmation missing: no promotion
    let outcome =
        ProgressionService::update_progress(&mut store, record.id, update(Some(2), Some(1), Some(90)))
            .await
            .unwrap();
    assert!(!outcome.promoted);
    assert!(!outcome.progress.completed);

    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[0].id));

    // Confirmation alone now unlocks the level
    let outcome = ProgressionService::confirm_completion(&mut store, record.id)
        .await
        .unwrap();
    assert!(outcome.promoted);
    assert!(outcome.progress.completed);

    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));
}

#[tokio::test]
async fn level_pointer_never_moves_backwards() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) =
        seed_course(&mut store, vec![level_spec(2, 2, 50, false), level_spec(5, 5, 90, false)])
            .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let level1_record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();

    ProgressionService::update_progress(&mut store, level1_record.id, update(Some(2), Some(2), Some(60)))
        .await
        .unwrap();
    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));

    // Lowering level-1 counters afterwards does not demote
    let outcome = ProgressionService::update_progress(
        &mut store,
        level1_record.id,
        update(Some(0), Some(0), None),
    )
    .await
    .unwrap();
    assert!(!outcome.promoted);
    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));

    // Neither does an incomplete update on the current level
    let level2_record = store
        .progress_for_level(enrollment.id, levels[1].id)
        .await
        .unwrap()
        .unwrap();
    ProgressionService::update_progress(&mut store, level2_record.id, update(Some(1), None, None))
        .await
        .unwrap();
    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));
}

#[tokio::test]
async fn assessment_score_keeps_the_best_value() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) = seed_course(&mut store, vec![level_spec(10, 10, 95, false)]).await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();

    let outcome = ProgressionService::update_progress(&mut store, record.id, update(None, None, Some(80)))
        .await
        .unwrap();
    assert_eq!(outcome.progress.assessment_score, 80);

    // A worse retake does not lower the stored score
    let outcome = ProgressionService::update_progress(&mut store, record.id, update(None, None, Some(60)))
        .await
        .unwrap();
    assert_eq!(outcome.progress.assessment_score, 80);

    // Module and artifact counts replace as reported, even when lower
    let outcome = ProgressionService::update_progress(&mut store, record.id, update(Some(4), None, None))
        .await
        .unwrap();
    assert_eq!(outcome.progress.modules_completed, 4);
    let outcome = ProgressionService::update_progress(&mut store, record.id, update(Some(2), None, None))
        .await
        .unwrap();
    assert_eq!(outcome.progress.modules_completed, 2);
}

#[tokio::test]
async fn reenrollment_preserves_position_and_progress() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) =
        seed_course(&mut store, vec![level_spec(1, 1, 10, false), level_spec(3, 3, 70, false)])
            .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let level1_record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();

    // Advance to level 2 and accumulate partial progress there
    ProgressionService::update_progress(&mut store, level1_record.id, update(Some(1), Some(1), Some(50)))
        .await
        .unwrap();
    let level2_record = store
        .progress_for_level(enrollment.id, levels[1].id)
        .await
        .unwrap()
        .unwrap();
    ProgressionService::update_progress(&mut store, level2_record.id, update(Some(2), Some(1), None))
        .await
        .unwrap();

    // Withdraw
    let mut withdrawn = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    withdrawn.is_active = false;
    store.save_enrollment(&withdrawn).await.unwrap();

    // Re-enrolling the same pair reactivates instead of duplicating
    let reactivated =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    assert_eq!(reactivated.id, enrollment.id);
    assert!(reactivated.is_active);
    assert_eq!(reactivated.current_level_id, Some(levels[1].id));

    let preserved = store
        .progress_for_level(enrollment.id, levels[1].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(preserved.modules_completed, 2);
    assert_eq!(preserved.artifacts_submitted, 1);
}

#[tokio::test]
async fn enrolling_twice_returns_the_same_enrollment() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, _) = seed_course(&mut store, vec![level_spec(1, 1, 10, false)]).await;

    let first =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    let second =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn course_without_levels_enrolls_nowhere() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, _) = seed_course(&mut store, Vec::new()).await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    assert_eq!(enrollment.current_level_id, None);

    let promoted = check_and_promote(&mut store, enrollment.id).await.unwrap();
    assert!(!promoted);
}

#[tokio::test]
async fn unknown_learner_or_course_is_not_found() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, _) = seed_course(&mut store, vec![level_spec(1, 1, 10, false)]).await;

    let err =
        ProgressionService::create_or_reactivate_enrollment(&mut store, Uuid::new_v4(), course.id)
            .await
            .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, Uuid::new_v4())
            .await
            .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn progress_projection_lists_every_level_in_order() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) = seed_course(
        &mut store,
        vec![
            level_spec(1, 1, 10, false),
            level_spec(2, 2, 50, false),
            level_spec(3, 3, 70, false),
        ],
    )
    .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();

    let entries = ProgressionService::get_enrollment_progress(&mut store, enrollment.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.iter().map(|e| e.level.level_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(entries[0].progress.is_some());
    assert!(entries[1].progress.is_none());
    assert!(entries[2].progress.is_none());
    assert_eq!(entries[0].completion_percentage, 0);

    // Complete level 1 and the projection follows
    let record = store
        .progress_for_level(enrollment.id, levels[0].id)
        .await
        .unwrap()
        .unwrap();
    ProgressionService::update_progress(&mut store, record.id, update(Some(1), Some(1), Some(20)))
        .await
        .unwrap();

    let entries = ProgressionService::get_enrollment_progress(&mut store, enrollment.id)
        .await
        .unwrap();
    assert_eq!(entries[0].completion_percentage, 100);
    assert!(entries[1].progress.is_some());

    let completed = ProgressionService::get_completed_levels(&mut store, enrollment.id)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].0.level_number, 1);
}

#[tokio::test]
async fn catalog_renumbers_levels_sequentially() {
    let mut store = MemoryStore::new();
    let (course, levels) = seed_course(
        &mut store,
        vec![level_spec(1, 1, 10, false), level_spec(2, 2, 20, false)],
    )
    .await;
    assert_eq!(
        levels.iter().map(|l| l.level_number).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let replaced = LevelCatalog::replace_levels(
        &mut store,
        course.id,
        vec![
            level_spec(5, 5, 50, false),
            level_spec(6, 6, 60, false),
            level_spec(7, 7, 70, true),
        ],
    )
    .await
    .unwrap();
    assert_eq!(
        replaced.iter().map(|l| l.level_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let listed = LevelCatalog::levels_for_course(&mut store, course.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[2].required_modules_count, 7);
}

#[tokio::test]
async fn level_set_is_frozen_once_enrolled() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, _) = seed_course(&mut store, vec![level_spec(1, 1, 10, false)]).await;

    ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
        .await
        .unwrap();

    let err = LevelCatalog::replace_levels(&mut store, course.id, vec![level_spec(9, 9, 90, false)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::IntegrityViolation(_)));
}

#[tokio::test]
async fn catalog_edits_metadata_and_scopes_listing_by_tenant() {
    let mut store = MemoryStore::new();
    let tenant = Uuid::new_v4();

    let (global_course, _) = seed_course(&mut store, vec![level_spec(1, 1, 10, false)]).await;
    let (scoped_course, _) = LevelCatalog::create_course(
        &mut store,
        NewCourse {
            name: "Coding Foundations".to_string(),
            description: None,
            tenant_id: Some(tenant),
            is_active: Some(true),
            levels: vec![level_spec(1, 1, 10, false)],
        },
    )
    .await
    .unwrap();

    // The tenant sees global courses plus its own; outsiders only global
    let visible = LevelCatalog::list_courses(&mut store, Some(tenant))
        .await
        .unwrap();
    assert_eq!(visible.len(), 2);
    let visible = LevelCatalog::list_courses(&mut store, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, global_course.id);

    let updated = LevelCatalog::update_course(
        &mut store,
        scoped_course.id,
        UpdateCourse {
            name: Some("Coding Foundations II".to_string()),
            description: Some("Intermediate track".to_string()),
            is_active: Some(false),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Coding Foundations II");
    assert!(!updated.is_active);

    // Deactivated courses drop out of the listing
    let visible = LevelCatalog::list_courses(&mut store, Some(tenant))
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
}

#[tokio::test]
async fn zero_threshold_level_promotes_on_first_check() {
    let mut store = MemoryStore::new();
    let learner_id = store.add_learner(learner(Uuid::new_v4()));
    let (course, levels) =
        seed_course(&mut store, vec![level_spec(0, 0, 0, false), level_spec(1, 1, 10, false)])
            .await;

    let enrollment =
        ProgressionService::create_or_reactivate_enrollment(&mut store, learner_id, course.id)
            .await
            .unwrap();
    // Creation itself never promotes
    assert_eq!(enrollment.current_level_id, Some(levels[0].id));

    let promoted = check_and_promote(&mut store, enrollment.id).await.unwrap();
    assert!(promoted);
    let enrollment = store.fetch_enrollment(enrollment.id).await.unwrap().unwrap();
    assert_eq!(enrollment.current_level_id, Some(levels[1].id));
}
