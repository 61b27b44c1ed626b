use chrono::{Duration, Utc};

use hapa_api::domain::types::{MediaType, PostMetrics};
use hapa_api::error::ApiError;
use hapa_api::usecase::post::{
    CreatePostInput, CreatePostUseCase, DeletePostUseCase, GetPostUseCase,
    ListVenuePostsUseCase, TogglePostLikeUseCase, TrackPostViewUseCase,
};
use hapa_domain::id::{PostId, UserId};

use crate::helpers::{MockPostRepo, MockVenueRepo, test_post, test_venue};

fn create_input(owner: &str, media_type: Option<&str>, media_url: Option<&str>) -> CreatePostInput {
    CreatePostInput {
        owner_id: UserId::from(owner),
        media_type: media_type.map(str::to_owned),
        media_url: media_url.map(str::to_owned),
        caption: Some("Live band tonight".to_owned()),
    }
}

// ── CreatePostUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_publish_post_on_owner_venue_with_ttl() {
    let venue = test_venue("owner-1");
    let posts = MockPostRepo::empty();
    let stored = posts.posts_handle();
    let usecase = CreatePostUseCase {
        venues: MockVenueRepo::new(vec![venue.clone()]),
        posts,
        ttl: Duration::hours(24),
    };

    let post = usecase
        .execute(create_input("owner-1", Some("video"), Some("https://cdn.example/v.mp4")))
        .await
        .unwrap();

    assert_eq!(post.venue_id, venue.id);
    assert_eq!(post.media_type, MediaType::Video);
    assert_eq!(post.caption.as_deref(), Some("Live band tonight"));
    assert_eq!(post.metrics, PostMetrics::default());
    assert_eq!(post.expires_at - post.created_at, Duration::hours(24));
    assert_eq!(stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_unknown_media_type() {
    let posts = MockPostRepo::empty();
    let stored = posts.posts_handle();
    let usecase = CreatePostUseCase {
        venues: MockVenueRepo::new(vec![test_venue("owner-1")]),
        posts,
        ttl: Duration::hours(24),
    };

    let result = usecase
        .execute(create_input("owner-1", Some("gif"), Some("https://cdn.example/a.gif")))
        .await;

    assert!(
        matches!(result, Err(ApiError::Validation(ref m)) if m.contains("media_type")),
        "expected Validation, got {result:?}"
    );
    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_require_media_url() {
    let usecase = CreatePostUseCase {
        venues: MockVenueRepo::new(vec![test_venue("owner-1")]),
        posts: MockPostRepo::empty(),
        ttl: Duration::hours(24),
    };

    let result = usecase
        .execute(create_input("owner-1", Some("image"), Some("  ")))
        .await;

    assert!(matches!(result, Err(ApiError::Validation(_))), "got {result:?}");
}

#[tokio::test]
async fn should_reject_post_from_owner_without_venue() {
    let usecase = CreatePostUseCase {
        venues: MockVenueRepo::new(vec![test_venue("owner-1")]),
        posts: MockPostRepo::empty(),
        ttl: Duration::hours(24),
    };

    let result = usecase
        .execute(create_input("owner-2", Some("image"), Some("https://cdn.example/a.jpg")))
        .await;

    assert!(
        matches!(result, Err(ApiError::Validation(ref m)) if m == "No venue found for this owner"),
        "expected Validation, got {result:?}"
    );
}

// ── ListVenuePostsUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_live_posts_newest_first() {
    let venue = test_venue("owner-1");
    let older = test_post(venue.id, Duration::hours(5));
    let newer = test_post(venue.id, Duration::hours(1));
    let expired = test_post(venue.id, Duration::hours(30));
    let elsewhere = test_post(test_venue("owner-2").id, Duration::hours(1));
    let usecase = ListVenuePostsUseCase {
        posts: MockPostRepo::new(vec![older.clone(), expired, newer.clone(), elsewhere]),
    };

    let views = usecase.execute(venue.id, None).await.unwrap();

    let ids: Vec<PostId> = views.iter().map(|v| v.post.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert!(views.iter().all(|v| !v.is_liked));
}

#[tokio::test]
async fn should_flag_posts_liked_by_viewer() {
    let venue = test_venue("owner-1");
    let liked = test_post(venue.id, Duration::hours(2));
    let other = test_post(venue.id, Duration::hours(1));
    let usecase = ListVenuePostsUseCase {
        posts: MockPostRepo::new(vec![liked.clone(), other.clone()]).with_like(liked.id, "fan-1"),
    };

    let views = usecase
        .execute(venue.id, Some(&UserId::from("fan-1")))
        .await
        .unwrap();

    let flag = |id: PostId| views.iter().find(|v| v.post.id == id).unwrap().is_liked;
    assert!(flag(liked.id));
    assert!(!flag(other.id));

    let anonymous = usecase.execute(venue.id, None).await.unwrap();
    assert!(anonymous.iter().all(|v| !v.is_liked));
}

// ── GetPostUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_post_with_venue_even_when_expired() {
    let venue = test_venue("owner-1");
    let expired = test_post(venue.id, Duration::hours(48));
    let usecase = GetPostUseCase {
        venues: MockVenueRepo::new(vec![venue.clone()]),
        posts: MockPostRepo::new(vec![expired.clone()]).with_like(expired.id, "fan-1"),
    };

    let detail = usecase
        .execute(expired.id, Some(&UserId::from("fan-1")))
        .await
        .unwrap();

    assert_eq!(detail.post.post.id, expired.id);
    assert!(detail.post.is_liked);
    assert!(!detail.post.post.is_live_at(Utc::now()));
    assert_eq!(detail.venue.map(|v| v.id), Some(venue.id));
}

#[tokio::test]
async fn should_return_post_not_found_for_unknown_post() {
    let usecase = GetPostUseCase {
        venues: MockVenueRepo::empty(),
        posts: MockPostRepo::empty(),
    };

    let result = usecase.execute(PostId::generate(), None).await;

    assert!(matches!(result, Err(ApiError::PostNotFound)), "got {result:?}");
}

// ── TogglePostLikeUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_like_then_unlike_post() {
    let post = test_post(test_venue("owner-1").id, Duration::hours(1));
    let posts = MockPostRepo::new(vec![post.clone()]).with_like(post.id, "fan-2");
    let usecase = TogglePostLikeUseCase { posts };
    let fan = UserId::from("fan-1");

    let liked = usecase.execute(post.id, &fan).await.unwrap();
    assert_eq!(liked.likes, 2);

    let unliked = usecase.execute(post.id, &fan).await.unwrap();
    assert_eq!(unliked.likes, 1);
}

#[tokio::test]
async fn should_return_post_not_found_when_liking_unknown_post() {
    let usecase = TogglePostLikeUseCase {
        posts: MockPostRepo::empty(),
    };

    let result = usecase.execute(PostId::generate(), &UserId::from("fan-1")).await;

    assert!(matches!(result, Err(ApiError::PostNotFound)), "got {result:?}");
}

// ── TrackPostViewUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_record_post_view_with_viewer() {
    let posts = MockPostRepo::empty();
    let views = std::sync::Arc::clone(&posts.views);
    let usecase = TrackPostViewUseCase { posts };
    let id = PostId::generate();

    assert!(usecase.execute(id, Some(&UserId::from("fan-1"))).await);
    assert!(usecase.execute(id, None).await);

    let recorded = views.lock().unwrap();
    assert_eq!(
        *recorded,
        vec![(id, Some(UserId::from("fan-1"))), (id, None)]
    );
}

#[tokio::test]
async fn should_report_failed_post_view_as_false() {
    let posts = MockPostRepo {
        fail_tracking: true,
        ..MockPostRepo::empty()
    };
    let usecase = TrackPostViewUseCase { posts };

    assert!(!usecase.execute(PostId::generate(), None).await);
}

// ── DeletePostUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_venue_owner_delete_post() {
    let venue = test_venue("owner-1");
    let post = test_post(venue.id, Duration::hours(1));
    let posts = MockPostRepo::new(vec![post.clone()]);
    let stored = posts.posts_handle();
    let usecase = DeletePostUseCase {
        venues: MockVenueRepo::new(vec![venue]),
        posts,
    };

    usecase
        .execute(&UserId::from("owner-1"), post.id)
        .await
        .unwrap();

    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_forbid_deleting_post_of_another_venue() {
    let venue = test_venue("owner-1");
    let post = test_post(venue.id, Duration::hours(1));
    let posts = MockPostRepo::new(vec![post.clone()]);
    let stored = posts.posts_handle();
    let usecase = DeletePostUseCase {
        venues: MockVenueRepo::new(vec![venue, test_venue("owner-2")]),
        posts,
    };

    let result = usecase.execute(&UserId::from("owner-2"), post.id).await;

    assert!(matches!(result, Err(ApiError::PostNotOwned)), "got {result:?}");
    assert_eq!(stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_return_post_not_found_when_deleting_unknown_post() {
    let usecase = DeletePostUseCase {
        venues: MockVenueRepo::new(vec![test_venue("owner-1")]),
        posts: MockPostRepo::empty(),
    };

    let result = usecase
        .execute(&UserId::from("owner-1"), PostId::generate())
        .await;

    assert!(matches!(result, Err(ApiError::PostNotFound)), "got {result:?}");
}
