mod common;

use std::sync::Arc;
use std::time::Duration;

use bookdesk::api::books::BookQuery;
use bookdesk::api::borrows::MyBorrowQuery;
use bookdesk::api::categories::CategoryQuery;
use bookdesk::api::PageQuery;
use bookdesk::gateway::{Location, Notice, RequestError, NETWORK_FAILURE, SESSION_EXPIRED_NOTICE};
use bookdesk::session::state::{Credential, Identity, Role, SessionState};
use bookdesk::session::storage::MemoryStorage;
use bookdesk::session::LOGIN_NOTICE;
use common::{Backend, Console, ADMIN_TOKEN};

async fn logged_in(backend: &Backend) -> Console {
    let console = Console::open(&backend.api_url(), MemoryStorage::default());
    console.client.login("admin", "admin123").await.unwrap();
    assert_eq!(console.notices.take(), vec![Notice::info(LOGIN_NOTICE)]);
    console
}

#[tokio::test]
async fn test_list_books_unwraps_envelope() {
    let backend = Backend::start().await;
    let console = logged_in(&backend).await;

    let query = BookQuery {
        page: PageQuery::new(1, 10),
        ..Default::default()
    };
    let page = console.client.list_books(&query).await.unwrap();
    assert_eq!(page.total, 42);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].price, 25.0);

    let seen = backend
        .state
        .seen()
        .into_iter()
        .find(|seen| seen.path == "/api/v1/books")
        .unwrap();
    let mut params: Vec<_> = seen.query.split('&').collect();
    params.sort();
    assert_eq!(params, vec!["page=1", "page_size=10"]);
    assert_eq!(
        seen.authorization.as_deref(),
        Some(format!("Bearer {ADMIN_TOKEN}").as_str())
    );
    assert!(console.notices.all().is_empty());
    backend.stop().await;
}

#[tokio::test]
async fn test_payload_without_envelope() {
    let backend = Backend::start().await;
    let console = logged_in(&backend).await;

    let page = console
        .client
        .list_categories(&CategoryQuery::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[1].name, "Science");
    backend.stop().await;
}

#[tokio::test]
async fn test_application_failure_keeps_session() {
    let backend = Backend::start().await;
    let console = logged_in(&backend).await;
    let before = console.client.session().snapshot();

    let err = console.client.borrow_statistics().await.unwrap_err();
    assert_eq!(
        err,
        RequestError::Application {
            code: 500,
            message: String::from("busy"),
        }
    );
    assert_eq!(console.client.session().snapshot(), before);
    assert_eq!(console.location(), Location::Home);
    assert_eq!(console.notices.all(), vec![Notice::error("busy")]);
    backend.stop().await;
}

#[tokio::test]
async fn test_not_found_uses_detail() {
    let backend = Backend::start().await;
    let console = logged_in(&backend).await;

    let err = console.client.get_book(404).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "Book not found");
    assert!(console.client.session().is_authenticated());
    backend.stop().await;
}

#[tokio::test]
async fn test_unauthorized_expires_session() {
    let backend = Backend::start().await;
    let console = logged_in(&backend).await;

    let err = console
        .client
        .my_borrows(&MyBorrowQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err, RequestError::SessionExpired(String::from("expired")));
    assert_eq!(console.client.session().snapshot(), SessionState::default());
    assert_eq!(console.location(), Location::Login);
    assert_eq!(
        console.notices.all(),
        vec![Notice::error(SESSION_EXPIRED_NOTICE)]
    );
    backend.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unauthorized_redirects_once() {
    let backend = Backend::start().await;
    let console = Arc::new(logged_in(&backend).await);

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let console = Arc::clone(&console);
            tokio::spawn(async move {
                console
                    .client
                    .my_borrows(&MyBorrowQuery::default())
                    .await
            })
        })
        .collect();

    for task in tasks {
        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_session_expired());
    }

    assert_eq!(console.client.session().snapshot(), SessionState::default());
    assert_eq!(console.router.redirects(), 1);
    assert_eq!(backend.state.count("/api/v1/borrows/my"), 8);
    backend.stop().await;
}

#[tokio::test]
async fn test_network_failure() {
    let addr = common::closed_addr();
    let api_url = format!("http://{addr}/api/v1");
    let console = Console::open(&api_url, MemoryStorage::default());

    let err = console
        .client
        .list_books(&BookQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport { status: None, .. }));
    assert_eq!(console.notices.all(), vec![Notice::error(NETWORK_FAILURE)]);
    assert_eq!(console.router.redirects(), 0);
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let (listener, addr) = common::silent_listener();
    let api_url = format!("http://{addr}/api/v1");
    let state = SessionState::authenticated(
        Credential {
            token: String::from("stored-token"),
            expires_at: None,
        },
        Identity {
            id: 1,
            username: String::from("admin"),
            email: String::from("admin@library.local"),
            role: Role::Admin,
        },
    );
    let console = Console::open_with_timeout(
        &api_url,
        MemoryStorage::with_state(state.clone()),
        Duration::from_millis(200),
    );

    let err = console
        .client
        .list_books(&BookQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport { status: None, .. }));
    assert!(err.message().contains("timed out"), "{err}");
    assert_eq!(console.notices.all(), vec![Notice::error(NETWORK_FAILURE)]);
    assert_eq!(console.client.session().snapshot(), state);
    assert_eq!(console.location(), Location::Home);
    drop(listener);
}
