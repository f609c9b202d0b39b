#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, fs, process};

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use bookdesk::client::Client;
use bookdesk::gateway::{
    Gateway, GatewayBuilder, Location, Navigator, Notice, Notifier, Router,
};
use bookdesk::session::storage::SessionStorage;
use bookdesk::session::Session;
use serde_json::{json, Value};

pub const ADMIN_TOKEN: &str = "admin-token";

/// What the fake backend saw of one request.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    seen: Mutex<Vec<Seen>>,
}

impl BackendState {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.seen().iter().filter(|seen| seen.path == path).count()
    }

    fn record(&self, req: &HttpRequest) {
        let authorization = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        self.seen.lock().unwrap().push(Seen {
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            authorization,
        });
    }
}

/// A stand-in for the library service, listening on an ephemeral port.
pub struct Backend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
    handle: ServerHandle,
}

impl Backend {
    pub async fn start() -> Backend {
        let state = Arc::new(BackendState::default());
        let data = web::Data::from(state.clone());

        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::scope("/api/v1")
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/me", web::get().to(me))
                    .route("/books", web::get().to(list_books))
                    .route("/books/{id}", web::get().to(get_book))
                    .route("/categories", web::get().to(list_categories))
                    .route("/borrows/my", web::get().to(revoked))
                    .route("/borrows/statistics", web::get().to(busy)),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        tokio::spawn(server);

        Backend {
            addr,
            state,
            handle,
        }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A listener that completes connections but never answers. Requests to it
/// hang until the listener is dropped.
pub fn silent_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn is_admin(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {ADMIN_TOKEN}").as_str())
}

fn envelope(data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({"code": 200, "message": "success", "data": data}))
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({"detail": "Could not validate credentials"}))
}

fn book(id: u64) -> Value {
    json!({
        "id": id,
        "isbn": format!("97800000000{id:02}"),
        "title": format!("Book {id}"),
        "author": "Anonymous",
        "price": "25.00",
        "total_stock": 2,
        "available_stock": 1,
        "borrow_count": 0,
        "status": "available",
        "created_at": "2024-03-01T10:00:00",
        "updated_at": "2024-03-01T10:00:00",
    })
}

async fn login(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<BackendState>,
) -> HttpResponse {
    state.record(&req);
    if body["username"] == "admin" && body["password"] == "admin123" {
        return envelope(json!({
            "access_token": ADMIN_TOKEN,
            "token_type": "bearer",
            "expires_in": 86400,
        }));
    }
    HttpResponse::Unauthorized().json(json!({"detail": "Incorrect username or password"}))
}

async fn me(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    if !is_admin(&req) {
        return unauthorized();
    }
    envelope(json!({
        "id": 1,
        "username": "admin",
        "email": "admin@library.local",
        "full_name": "Administrator",
        "role": "admin",
        "status": "active",
    }))
}

async fn list_books(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    if !is_admin(&req) {
        return unauthorized();
    }
    envelope(json!({
        "items": (1..=10).map(book).collect::<Vec<_>>(),
        "total": 42,
        "page": 1,
        "page_size": 10,
        "total_pages": 5,
    }))
}

async fn get_book(
    req: HttpRequest,
    path: web::Path<u64>,
    state: web::Data<BackendState>,
) -> HttpResponse {
    state.record(&req);
    let id = path.into_inner();
    if id > 42 {
        return HttpResponse::NotFound().json(json!({"detail": "Book not found"}));
    }
    envelope(book(id))
}

/// Answers without the envelope, like the backend's paginated listings.
async fn list_categories(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    HttpResponse::Ok().json(json!({
        "items": [
            {"id": 1, "name": "Fiction", "sort_order": 0, "is_active": true},
            {"id": 2, "name": "Science", "sort_order": 1, "is_active": true},
        ],
        "total": 2,
        "page": 1,
        "page_size": 10,
        "total_pages": 1,
    }))
}

async fn revoked(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    HttpResponse::Unauthorized().json(json!({"code": 401, "message": "expired"}))
}

async fn busy(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    state.record(&req);
    HttpResponse::Ok().json(json!({"code": 500, "message": "busy"}))
}

#[derive(Default)]
pub struct Notices(Mutex<Vec<Notice>>);

impl Notices {
    pub fn all(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }

    /// Returns the notices so far and forgets them.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

/// A client wired to `api_url` with observable side effects.
pub struct Console {
    pub client: Client,
    pub router: Arc<Router>,
    pub notices: Arc<Notices>,
}

impl Console {
    pub fn open(api_url: &str, storage: impl SessionStorage + 'static) -> Console {
        Console::open_with_timeout(api_url, storage, GatewayBuilder::DEFAULT_TIMEOUT)
    }

    pub fn open_with_timeout(
        api_url: &str,
        storage: impl SessionStorage + 'static,
        timeout: Duration,
    ) -> Console {
        let session = Arc::new(Session::open(storage).unwrap());
        let router = Arc::new(Router::for_session(&session));
        let notices = Arc::new(Notices::default());
        let gateway = Gateway::builder(api_url, session)
            .navigator(router.clone())
            .notifier(notices.clone())
            .timeout(timeout)
            .build()
            .unwrap();
        Console {
            client: Client::new(gateway),
            router,
            notices,
        }
    }

    pub fn location(&self) -> Location {
        self.router.current()
    }
}

/// A fresh path for a session file, removed if it already exists.
pub fn session_file(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("bookdesk-{}-{name}.json", process::id()));
    let _ = fs::remove_file(&path);
    path
}
