//! Feed fetcher tests: rendering and last-request-wins.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use piata_core::listing::{FeedCategory, FeedImage, FeedListing, FeedUser};
use piata_widgets::feed::{FeedFetcher, FeedSource, FeedState};
use piata_widgets::messages;
use piata_widgets::{WidgetConfig, WidgetError};
use scraper::{Html, Selector};
use tokio::sync::{oneshot, Mutex};

type Reply = Result<Vec<FeedListing>, WidgetError>;

/// Each request takes the next queued receiver and waits on it.
#[derive(Default)]
struct QueuedSource {
    replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl QueuedSource {
    async fn push(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().await.push_back(rx);
        tx
    }
}

#[async_trait]
impl FeedSource for QueuedSource {
    async fn listings(&self) -> Reply {
        let rx = self.replies.lock().await.pop_front().expect("queued reply");
        rx.await.map_err(|_| WidgetError::Parse("dropped".into()))?
    }
}

/// Answers immediately.
struct Ready(Vec<FeedListing>);

#[async_trait]
impl FeedSource for Ready {
    async fn listings(&self) -> Reply {
        Ok(self.0.clone())
    }
}

fn listing(id: i64, title: &str, price: Option<f64>) -> FeedListing {
    FeedListing {
        id,
        title: title.to_string(),
        description: "Good condition".to_string(),
        price,
        currency: "RON".to_string(),
        location: "Cluj".to_string(),
        user: FeedUser {
            username: "ion".to_string(),
        },
        category: FeedCategory {
            name: "Sport".to_string(),
        },
        images: vec![FeedImage {
            image: "bike.jpg".to_string(),
            is_main: true,
        }],
    }
}

fn config() -> Arc<WidgetConfig> {
    Arc::new(WidgetConfig::default())
}

fn prices(html: &str) -> Vec<String> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse(".listing-price").unwrap();
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

#[tokio::test]
async fn test_loaded_cards_show_prices() {
    let feed = FeedFetcher::new(
        Ready(vec![listing(1, "Bike", None), listing(2, "Phone", Some(500.0))]),
        config(),
    );
    assert!(feed.mount().await);

    let html = feed.render().await;
    assert_eq!(prices(&html), vec!["Free", "500 RON"]);

    let document = Html::parse_fragment(&html);
    let link = Selector::parse(r#"a.view-details[href="/listing/2/"]"#).unwrap();
    assert_eq!(document.select(&link).count(), 1);
    let avatar = Selector::parse("img.avatar").unwrap();
    assert_eq!(
        document.select(&avatar).next().unwrap().value().attr("src"),
        Some("https://avatar.letters.to/ion")
    );
}

#[tokio::test]
async fn test_empty_feed() {
    let feed = FeedFetcher::new(Ready(vec![]), config());
    feed.mount().await;

    assert_eq!(feed.state().await, FeedState::Empty);
    let html = feed.render().await;
    assert!(html.contains(messages::FEED_EMPTY_TITLE));
    assert!(html.contains(messages::FEED_EMPTY_HINT));
}

#[tokio::test]
async fn test_refresh_before_mount_does_nothing() {
    let feed = FeedFetcher::new(Ready(vec![listing(1, "Bike", None)]), config());
    assert!(!feed.refresh().await);
    assert_eq!(feed.state().await, FeedState::Loading);
    assert!(feed.render().await.contains(messages::FEED_LOADING));
}

#[tokio::test]
async fn test_latest_request_wins() {
    let source = QueuedSource::default();
    let slow = source.push().await;
    let fast = source.push().await;
    let feed = FeedFetcher::new(source, config());

    fast.send(Err(WidgetError::Status {
        status: 500,
        message: "Database unavailable".into(),
    }))
    .unwrap();

    let newer = async {
        tokio::task::yield_now().await;
        let applied = feed.refresh().await;
        slow.send(Ok(vec![listing(1, "Stale", Some(1.0))])).unwrap();
        applied
    };
    let (first, second) = tokio::join!(feed.mount(), newer);

    assert!(!first);
    assert!(second);
    assert_eq!(
        feed.state().await,
        FeedState::Error("Database unavailable".into())
    );
    assert!(feed
        .render()
        .await
        .contains("Error: Database unavailable"));
}

#[tokio::test]
async fn test_unmount_discards_in_flight_result() {
    let source = QueuedSource::default();
    let reply = source.push().await;
    let feed = FeedFetcher::new(source, config());

    let driver = async {
        tokio::task::yield_now().await;
        feed.unmount().await;
        reply.send(Ok(vec![listing(1, "Late", None)])).unwrap();
    };
    let (applied, ()) = tokio::join!(feed.mount(), driver);

    assert!(!applied);
    assert_eq!(feed.state().await, FeedState::Loading);
}

#[tokio::test]
async fn test_transport_failure_uses_generic_message() {
    let source = QueuedSource::default();
    drop(source.push().await);
    let feed = FeedFetcher::new(source, config());

    feed.mount().await;
    assert_eq!(
        feed.state().await,
        FeedState::Error(messages::FEED_FETCH_FAILED.into())
    );
}
