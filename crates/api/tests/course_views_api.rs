//! Integration tests for the aggregate course reads: the nested tree
//! used by the studio and the student viewer, and the sales page
//! payload. Prerequisite entities are created via the repository layer.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use etude_core::content::BlockContent;
use etude_core::types::DbId;
use etude_db::models::course::CreateCourse;
use etude_db::models::lesson::{CreateLesson, UpdateLesson};
use etude_db::models::section::CreateSection;
use etude_db::repositories::{ContentBlockRepo, CourseRepo, LessonRepo, SectionRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_course(pool: &PgPool, title: &str) -> DbId {
    CourseRepo::create(
        pool,
        &CreateCourse {
            title: title.to_string(),
            description: None,
            thumbnail_url: None,
            published: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn setup_section(pool: &PgPool, course_id: DbId, title: &str) -> DbId {
    SectionRepo::create(
        pool,
        course_id,
        &CreateSection {
            title: title.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn setup_lesson(pool: &PgPool, section_id: DbId, title: &str) -> DbId {
    LessonRepo::create(
        pool,
        section_id,
        &CreateLesson {
            title: title.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Patch one lesson through the repository (publish state, video,
/// duration). `None` fields are left untouched.
async fn patch_lesson(pool: &PgPool, section_id: DbId, lesson_id: DbId, input: UpdateLesson) {
    LessonRepo::update(pool, section_id, lesson_id, &input)
        .await
        .unwrap()
        .unwrap();
}

fn publish() -> UpdateLesson {
    UpdateLesson {
        title: None,
        is_published: Some(true),
        is_free_preview: None,
        video_id: None,
        duration_secs: None,
    }
}

// ---------------------------------------------------------------------------
// Test: GET /courses/{id}/tree returns the nested hierarchy in order
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tree_returns_nested_hierarchy_in_order(pool: PgPool) {
    let course_id = setup_course(&pool, "Guitar 101").await;
    let basics = setup_section(&pool, course_id, "Basics").await;
    setup_section(&pool, course_id, "Chords").await;

    let holding = setup_lesson(&pool, basics, "Holding the Guitar").await;
    setup_lesson(&pool, basics, "Tuning").await;

    ContentBlockRepo::create(&pool, holding, &BlockContent::empty("text").unwrap())
        .await
        .unwrap();
    ContentBlockRepo::create(&pool, holding, &BlockContent::empty("video").unwrap())
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{course_id}/tree")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    // The course is flattened into the root of the tree.
    assert_eq!(json["title"], "Guitar 101");

    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["title"], "Basics");
    assert_eq!(sections[1]["title"], "Chords");
    assert_eq!(sections[1]["lessons"], serde_json::json!([]));

    let lessons = sections[0]["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["title"], "Holding the Guitar");
    assert_eq!(lessons[1]["title"], "Tuning");

    let blocks = lessons[0]["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["type"], "text");
    assert_eq!(blocks[1]["type"], "video");
    assert_eq!(lessons[1]["blocks"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Test: ?published_only=true drops draft lessons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tree_published_only_filters_drafts(pool: PgPool) {
    let course_id = setup_course(&pool, "Course").await;
    let section_id = setup_section(&pool, course_id, "Module").await;
    let live = setup_lesson(&pool, section_id, "Live").await;
    setup_lesson(&pool, section_id, "Draft").await;
    patch_lesson(&pool, section_id, live, publish()).await;

    // The authoring view sees everything.
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/courses/{course_id}/tree")).await;
    let json = body_json(response).await;
    assert_eq!(json["sections"][0]["lessons"].as_array().unwrap().len(), 2);

    // The student view sees only published lessons.
    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/courses/{course_id}/tree?published_only=true"),
    )
    .await;
    let json = body_json(response).await;
    let lessons = json["sections"][0]["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0]["title"], "Live");
}

// ---------------------------------------------------------------------------
// Test: lessons with videos get a resolved embed_url when configured
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tree_resolves_embed_url_when_library_configured(pool: PgPool) {
    let course_id = setup_course(&pool, "Course").await;
    let section_id = setup_section(&pool, course_id, "Module").await;
    let with_video = setup_lesson(&pool, section_id, "With video").await;
    setup_lesson(&pool, section_id, "Without video").await;
    patch_lesson(
        &pool,
        section_id,
        with_video,
        UpdateLesson {
            title: None,
            is_published: None,
            is_free_preview: None,
            video_id: Some("vid-9".to_string()),
            duration_secs: None,
        },
    )
    .await;

    let mut config = common::test_config();
    config.bunny.library_id = Some("lib-42".to_string());
    config.bunny.api_key = Some("key-secret".to_string());

    let app = common::build_test_app_with(pool.clone(), config);
    let response = get(app, &format!("/api/v1/courses/{course_id}/tree")).await;
    let json = body_json(response).await;
    let lessons = json["sections"][0]["lessons"].as_array().unwrap();
    assert_eq!(
        lessons[0]["embed_url"],
        "https://iframe.mediadelivery.net/embed/lib-42/vid-9"
    );
    assert_eq!(lessons[1]["embed_url"], serde_json::Value::Null);

    // Without a configured library the id stays unresolved.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{course_id}/tree")).await;
    let json = body_json(response).await;
    assert_eq!(
        json["sections"][0]["lessons"][0]["embed_url"],
        serde_json::Value::Null
    );
}

// ---------------------------------------------------------------------------
// Test: unknown course id returns 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tree_for_unknown_course_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{}/tree", DbId::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: GET /courses/{id}/sales aggregates plans and curriculum stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sales_page_aggregates_plans_and_stats(pool: PgPool) {
    let course_id = setup_course(&pool, "Piano Pro").await;
    let filled = setup_section(&pool, course_id, "Filled").await;
    setup_section(&pool, course_id, "Empty").await;

    for (title, duration) in [("One", 300), ("Two", 240)] {
        let lesson_id = setup_lesson(&pool, filled, title).await;
        patch_lesson(
            &pool,
            filled,
            lesson_id,
            UpdateLesson {
                title: None,
                is_published: None,
                is_free_preview: None,
                video_id: None,
                duration_secs: Some(duration),
            },
        )
        .await;
    }

    for (title, price, popular) in [("Basic", 4900, false), ("Pro", 9900, true)] {
        let app = common::build_test_app(pool.clone());
        post_json(
            app,
            &format!("/api/v1/courses/{course_id}/plans"),
            serde_json::json!({"title": title, "price_cents": price, "is_popular": popular}),
        )
        .await;
    }

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{course_id}/sales")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["course"]["title"], "Piano Pro");

    let plans = json["plans"].as_array().unwrap();
    assert_eq!(plans[0]["title"], "Pro");
    assert_eq!(plans[1]["title"], "Basic");

    let curriculum = json["curriculum"].as_array().unwrap();
    assert_eq!(curriculum.len(), 2);
    assert_eq!(curriculum[0]["title"], "Filled");
    assert_eq!(curriculum[0]["lesson_count"], 2);
    assert_eq!(curriculum[0]["total_duration_secs"], 540);
    assert_eq!(curriculum[1]["lesson_count"], 0);
    assert_eq!(curriculum[1]["total_duration_secs"], 0);
}

// ---------------------------------------------------------------------------
// Test: the seeded demo course is browsable end to end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seed_course_is_browsable(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/courses").await;
    let json = body_json(response).await;
    let course = json
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["title"] == "Piano Masterclass: From Zero to Hero")
        .expect("seed course missing")
        .clone();
    let course_id = course["id"].as_str().unwrap();

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{course_id}/tree")).await;
    let json = body_json(response).await;

    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections[0]["title"], "Module 1: Getting Started");

    let lessons = sections[0]["lessons"].as_array().unwrap();
    assert_eq!(lessons[0]["title"], "1.1 How to Sit at the Piano");
    assert_eq!(lessons[0]["is_free_preview"], true);

    let blocks = lessons[0]["blocks"].as_array().unwrap();
    let kinds: Vec<_> = blocks.iter().map(|b| b["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, ["video", "text", "sheet_music"]);
    assert_eq!(blocks[0]["content"]["video_id"], "demo-video-id");
}
