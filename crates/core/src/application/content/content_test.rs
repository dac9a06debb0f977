//! Unit tests for content use cases (repositories mocked)

use super::*;
use crate::domain::{FieldKind, Media, PageRequest};
use crate::port::content_repository::MockContentRepository;
use crate::port::id_provider::testing::SequentialIds;
use crate::port::media_repository::MockMediaRepository;
use crate::port::time_provider::testing::ManualClock;
use serde_json::json;

const NOW: i64 = 1_700_000_000_000;

fn service(repo: MockContentRepository, media: MockMediaRepository) -> ContentService {
    ContentService::new(
        Arc::new(repo),
        Arc::new(media),
        Arc::new(SequentialIds::default()),
        Arc::new(ManualClock::new(NOW)),
    )
}

fn entry(id: &str, title: &str, slug: &str) -> Content {
    Content {
        id: id.to_string(),
        content_type: "blogs".to_string(),
        title: title.to_string(),
        slug: slug.to_string(),
        description: None,
        fields: vec![],
        status: ContentStatus::Draft,
        metadata: ContentMetadata {
            author: Some("author@example.com".to_string()),
            ..Default::default()
        },
        media: vec![],
        created_at: 1,
        updated_at: 1,
    }
}

fn media(id: &str) -> Media {
    Media {
        id: id.to_string(),
        filename: "a.png".to_string(),
        original_name: "a.png".to_string(),
        storage_key: "media/a.png".to_string(),
        url: "http://cdn/a.png".to_string(),
        size: 10,
        mime_type: "image/png".to_string(),
        width: Some(1),
        height: Some(1),
        uploaded_by: "u1".to_string(),
        created_at: 1,
        updated_at: 1,
    }
}

#[tokio::test]
async fn test_create_requires_title() {
    let svc = service(MockContentRepository::new(), MockMediaRepository::new());
    let err = svc
        .create(
            "blogs",
            ContentInput {
                title: Some("   ".into()),
                ..Default::default()
            },
            "a@b.c",
        )
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "Title is required");
}

#[tokio::test]
async fn test_create_rejects_bad_type_name() {
    let svc = service(MockContentRepository::new(), MockMediaRepository::new());
    let err = svc
        .create(
            "Blogs; DROP",
            ContentInput {
                title: Some("x".into()),
                ..Default::default()
            },
            "a@b.c",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(_)));
}

#[tokio::test]
async fn test_unregistered_type_is_accepted_without_field_checks() {
    let mut repo = MockContentRepository::new();
    repo.expect_slug_exists().returning(|_, _| Ok(false));
    repo.expect_insert().times(1).returning(|_| Ok(()));

    let svc = service(repo, MockMediaRepository::new());
    let content = svc
        .create(
            "recipes",
            ContentInput {
                title: Some("Pancakes".into()),
                status: Some(ContentStatus::Published),
                fields: Some(vec![ContentField {
                    key: "servings".into(),
                    value: json!("four"),
                    kind: FieldKind::Text,
                }]),
                ..Default::default()
            },
            "a@b.c",
        )
        .await
        .unwrap();

    assert_eq!(content.content_type, "recipes");
    assert_eq!(content.slug, "pancakes");
}

#[tokio::test]
async fn test_create_suffixes_taken_slug_and_sets_author() {
    let mut repo = MockContentRepository::new();
    repo.expect_slug_exists()
        .withf(|slug, _| slug == "hello-world")
        .returning(|_, _| Ok(true));
    repo.expect_slug_exists()
        .withf(|slug, _| slug == format!("hello-world-{}", NOW))
        .returning(|_, _| Ok(false));
    repo.expect_insert().times(1).returning(|_| Ok(()));

    let svc = service(repo, MockMediaRepository::new());
    let content = svc
        .create(
            "blogs",
            ContentInput {
                title: Some("Hello World".into()),
                metadata: Some(ContentMetadata {
                    author: Some("spoofed@example.com".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            "editor@example.com",
        )
        .await
        .unwrap();

    assert_eq!(content.slug, format!("hello-world-{}", NOW));
    assert_eq!(content.status, ContentStatus::Draft);
    assert_eq!(content.metadata.author.as_deref(), Some("editor@example.com"));
    assert_eq!(content.created_at, NOW);
}

#[tokio::test]
async fn test_publishing_enforces_required_fields() {
    let mut repo = MockContentRepository::new();
    repo.expect_slug_exists().returning(|_, _| Ok(false));
    repo.expect_insert().returning(|_| Ok(()));
    let svc = service(repo, MockMediaRepository::new());

    // Draft without required fields is fine
    svc.create(
        "team",
        ContentInput {
            title: Some("Asha".into()),
            ..Default::default()
        },
        "a@b.c",
    )
    .await
    .unwrap();

    let err = svc
        .create(
            "team",
            ContentInput {
                title: Some("Asha".into()),
                status: Some(ContentStatus::Published),
                fields: Some(vec![ContentField::new("name", json!("Asha"), FieldKind::Text)]),
                ..Default::default()
            },
            "a@b.c",
        )
        .await
        .unwrap_err();
    assert!(err.public_message().contains("Position/Role is required"));
}

#[tokio::test]
async fn test_number_range_checked_on_drafts() {
    let svc = service(MockContentRepository::new(), MockMediaRepository::new());
    let err = svc
        .create(
            "testimonials",
            ContentInput {
                title: Some("Great".into()),
                fields: Some(vec![ContentField::new("rating", json!(9), FieldKind::Number)]),
                ..Default::default()
            },
            "a@b.c",
        )
        .await
        .unwrap_err();
    assert!(err.public_message().contains("Rating must be at most 5"));
}

#[tokio::test]
async fn test_update_title_regenerates_slug() {
    let mut repo = MockContentRepository::new();
    repo.expect_find_by_id()
        .returning(|_, _| Ok(Some(entry("c1", "Old", "old"))));
    repo.expect_slug_exists()
        .withf(|slug, excluding| slug == "new-title" && excluding.as_deref() == Some("c1"))
        .returning(|_, _| Ok(false));
    repo.expect_update()
        .withf(|c| c.slug == "new-title" && c.updated_at == NOW)
        .times(1)
        .returning(|_| Ok(()));

    let svc = service(repo, MockMediaRepository::new());
    let update = svc
        .update(
            "blogs",
            "c1",
            ContentPatch {
                title: Some("New Title".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(update.content.title, "New Title");
    assert_eq!(update.updated_fields, vec!["title", "slug"]);
    // Author is kept
    assert_eq!(
        update.content.metadata.author.as_deref(),
        Some("author@example.com")
    );
}

#[tokio::test]
async fn test_update_explicit_slug_conflict() {
    let mut repo = MockContentRepository::new();
    repo.expect_find_by_id()
        .returning(|_, _| Ok(Some(entry("c1", "Old", "old"))));
    repo.expect_slug_exists().returning(|_, _| Ok(true));

    let svc = service(repo, MockMediaRepository::new());
    let err = svc
        .update(
            "blogs",
            "c1",
            ContentPatch {
                slug: Some("Taken Slug".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_missing_entry() {
    let mut repo = MockContentRepository::new();
    repo.expect_find_by_id().returning(|_, _| Ok(None));

    let svc = service(repo, MockMediaRepository::new());
    let err = svc
        .update("blogs", "nope", ContentPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "Content not found");
}

#[tokio::test]
async fn test_get_resolves_media() {
    let mut repo = MockContentRepository::new();
    repo.expect_find_by_id().returning(|_, _| {
        let mut c = entry("c1", "With media", "with-media");
        c.media = vec!["m1".into(), "m2".into()];
        Ok(Some(c))
    });
    let mut media_repo = MockMediaRepository::new();
    media_repo
        .expect_find_by_ids()
        .withf(|ids| ids.len() == 2)
        .returning(|_| Ok(vec![media("m1")]));

    let svc = service(repo, media_repo);
    let view = svc.get("blogs", "c1").await.unwrap();
    assert_eq!(view.media.len(), 1);
    assert_eq!(view.media[0].id, "m1");
}

#[tokio::test]
async fn test_homepage_missing() {
    let mut repo = MockContentRepository::new();
    repo.expect_first_published()
        .withf(|t| t == HOMEPAGE_TYPE)
        .returning(|_| Ok(None));

    let svc = service(repo, MockMediaRepository::new());
    let err = svc.homepage().await.unwrap_err();
    assert_eq!(err.public_message(), "Homepage content not found");
}

#[tokio::test]
async fn test_public_list_forces_published() {
    let mut repo = MockContentRepository::new();
    repo.expect_list()
        .withf(|f| f.status == Some(ContentStatus::Published))
        .returning(|_| Ok((vec![entry("c1", "A", "a")], 1)));

    let svc = service(repo, MockMediaRepository::new());
    let page = svc
        .public_list(ContentFilter::new("blogs", PageRequest::new(None, None, 20)))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].slug, "a");
}
