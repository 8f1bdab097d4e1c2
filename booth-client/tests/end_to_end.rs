//! # End-to-End Kiosk Tests
//!
//! Drive the client against a mock backend through the two visitor flows:
//! submit-and-wait, and a gallery refreshing underneath the viewer.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use booth_client::{lock_feed, PhotoPayload};
use booth_core::{BoothConfig, GalleryFeed, JobState, ResultView};
use common::{gallery_body, MockBackend};
use serde_json::json;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn names(feed: &GalleryFeed) -> Vec<&str> {
    feed.order().iter().map(|image| image.name.as_str()).collect()
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn submit_then_poll_goes_straight_from_loading_to_completed() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rooms/main/jobs"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({ "id": 17, "status": "processing" })),
        )
        .expect(1)
        .mount(&backend.server)
        .await;
    backend
        .serve_get(
            "/api/rooms/main/jobs/17",
            json!({ "id": 17, "status": "processing" }),
            1,
        )
        .await;
    backend
        .serve_get(
            "/api/rooms/main/jobs/17",
            json!({
                "id": 17,
                "status": "completed",
                "result_url": "/static/results/17.jpg",
                "download_url": "/download/17",
                "qr_url": "/static/qr/17.png",
                "error_message": null
            }),
            u64::MAX,
        )
        .await;

    let photo = PhotoPayload::new(b"photo".to_vec(), "image/jpeg");
    let created = backend
        .client
        .submit("main", photo, 1)
        .await
        .expect("job created");
    assert_eq!(created.initial_state, JobState::Processing);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let errors = Arc::new(AtomicU32::new(0));
    let error_count = Arc::clone(&errors);
    let handle = backend.client.start_polling(
        "main",
        created.reference(),
        Duration::from_millis(50),
        move |status| {
            let _ = tx.send(status.view());
        },
        move |_| {
            error_count.fetch_add(1, Ordering::SeqCst);
        },
    );

    let mut views = Vec::new();
    while let Ok(Some(view)) = timeout(Duration::from_secs(5), rx.recv()).await {
        let terminal = view.is_terminal();
        views.push(view);
        if terminal {
            break;
        }
    }
    handle.stop().await;

    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(
        views,
        vec![
            ResultView::Loading,
            ResultView::Completed {
                result_url: "/static/results/17.jpg".into(),
                download_url: "/download/17".into(),
                qr_url: "/static/qr/17.png".into(),
            },
        ]
    );
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn gallery_refresh_keeps_order_until_membership_changes() {
    let backend = MockBackend::start().await;
    let route = "/api/rooms/main/jobs/gallery";
    backend.serve_get(route, gallery_body(&["x", "y", "z"]), 1).await;
    backend.serve_get(route, gallery_body(&["z", "y", "x"]), 1).await;
    backend.serve_get(route, gallery_body(&["x", "y"]), 1).await;

    let mut feed = GalleryFeed::with_seed(&BoothConfig::default(), 1);

    let first = backend.client.refresh("main").await.expect("first refresh");
    assert!(feed.apply_refresh(first));
    assert_eq!(names(&feed), ["x", "y", "z"]);

    let reordered = backend.client.refresh("main").await.expect("second refresh");
    assert!(!feed.apply_refresh(reordered));
    assert_eq!(names(&feed), ["x", "y", "z"]);

    let shrunk = backend.client.refresh("main").await.expect("third refresh");
    assert!(feed.apply_refresh(shrunk));
    assert_eq!(names(&feed), ["x", "y"]);
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn gallery_loop_survives_failures_and_settles_on_latest_set() {
    let backend = MockBackend::start().await;
    let route = "/api/rooms/main/jobs/gallery";
    backend.serve_get(route, gallery_body(&["x", "y", "z"]), 1).await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    backend.serve_get(route, gallery_body(&["x", "y"]), u64::MAX).await;

    let feed = Arc::new(Mutex::new(GalleryFeed::with_seed(&BoothConfig::default(), 1)));
    let handle = backend.client.start_gallery_refresh(
        "main",
        Arc::clone(&feed),
        Duration::from_millis(30),
        |_| {},
    );

    let settled = timeout(Duration::from_secs(5), async {
        loop {
            if lock_feed(&feed).len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    handle.stop().await;

    assert!(settled.is_ok(), "gallery never picked up the shrunk set");
    let feed = lock_feed(&feed);
    assert_eq!(names(&feed), ["x", "y"]);
    assert!(feed.last_error().is_none());
}
