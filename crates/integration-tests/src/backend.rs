//! An in-memory stand-in for the App Shop REST backend.
//!
//! Serves the endpoints both binaries call, wrapped in the backend's
//! `{message, data}` envelope, and records what it was sent.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Password accepted for every known account.
pub const PASSWORD: &str = "secret";

/// A shopper with a default address and no back-office permissions.
pub const SHOPPER: &str = "shopper@example.com";

/// Staff member who may view, create and rename roles.
pub const STAFF: &str = "staff@example.com";

/// Staff member who may only open the dashboard.
pub const VIEWER: &str = "viewer@example.com";

/// Everything the fake has received, plus switches to make it misbehave.
#[derive(Debug, Default)]
pub struct Recorded {
    /// Bodies of `POST /orders`, stored with their `_id` and `status`.
    pub orders: Vec<Value>,
    /// Number of `GET /orders/me` calls that reached the backend.
    pub order_list_calls: usize,
    /// Roles, in creation order.
    pub roles: Vec<Value>,
    /// Number of `GET /roles` calls that reached the backend.
    pub role_list_calls: usize,
    /// Answer `GET /payment-type` with a 500.
    pub fail_payment_types: bool,
    /// Answer `PUT /roles/{id}` with a 500 and no message.
    pub fail_role_updates: bool,
}

type Shared = Arc<Mutex<Recorded>>;

/// A running fake backend. The server task lives as long as the runtime.
pub struct FakeBackend {
    base_url: Url,
    recorded: Shared,
}

impl FakeBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let recorded: Shared = Arc::new(Mutex::new(Recorded {
            roles: vec![role_json("r1", "Admin", &["ADMIN.GRANTED"])],
            ..Recorded::default()
        }));

        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/products/public", get(products))
            .route("/products/public/slug/{slug}", get(product_by_slug))
            .route("/payment-type", get(payment_types))
            .route("/delivery-type", get(delivery_types))
            .route("/city", get(cities))
            .route("/orders", post(create_order))
            .route("/orders/me", get(my_orders))
            .route("/orders/me/{id}", get(my_order))
            .route("/orders/me/cancel/{id}", post(cancel_order))
            .route("/roles", get(list_roles).post(create_role))
            .route("/roles/{id}", get(get_role).put(update_role))
            .with_state(Arc::clone(&recorded));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).unwrap(),
            recorded,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Inspect or adjust what the backend holds.
    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

fn envelope(status: StatusCode, message: &str, data: Value) -> Response {
    (status, Json(json!({ "message": message, "typeError": "", "data": data }))).into_response()
}

fn ok(data: Value) -> Response {
    envelope(StatusCode::OK, "Success", data)
}

fn unauthorized() -> Response {
    envelope(StatusCode::UNAUTHORIZED, "Unauthorized", Value::Null)
}

fn token_for(email: &str) -> String {
    format!("token-{email}")
}

/// The account behind the bearer token, if any.
fn caller(headers: &HeaderMap) -> Option<&'static str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    [SHOPPER, STAFF, VIEWER]
        .into_iter()
        .find(|email| token == token_for(email))
}

fn role_json(id: &str, name: &str, permissions: &[&str]) -> Value {
    json!({
        "_id": id,
        "name": name,
        "permissions": permissions,
        "createdAt": "2024-05-01T12:00:00.000Z",
    })
}

fn user_json(email: &str) -> Value {
    let (id, permissions, addresses) = match email {
        SHOPPER => (
            "u-shopper",
            vec!["BASIC.PUBLIC"],
            json!([{
                "firstName": "An",
                "middleName": "Van",
                "lastName": "Nguyen",
                "address": "1 Trang Tien",
                "city": "c1",
                "phoneNumber": "0900000000",
                "isDefault": true,
            }]),
        ),
        STAFF => (
            "u-staff",
            vec![
                "DASHBOARD",
                "SYSTEM.ROLE.VIEW",
                "SYSTEM.ROLE.CREATE",
                "SYSTEM.ROLE.UPDATE",
            ],
            json!([]),
        ),
        _ => ("u-viewer", vec!["DASHBOARD"], json!([])),
    };

    json!({
        "_id": id,
        "email": email,
        "firstName": "An",
        "lastName": "Nguyen",
        "role": { "_id": format!("role-{id}"), "name": "Role", "permissions": permissions },
        "addresses": addresses,
    })
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    let known = [SHOPPER, STAFF, VIEWER].contains(&body.email.as_str());
    if !known || body.password != PASSWORD {
        return unauthorized();
    }
    ok(json!({
        "user": user_json(&body.email),
        "access_token": token_for(&body.email),
    }))
}

async fn me(headers: HeaderMap) -> Response {
    match caller(&headers) {
        Some(email) => ok(user_json(email)),
        None => unauthorized(),
    }
}

fn tea() -> Value {
    json!({
        "_id": "p1",
        "name": "Tea",
        "slug": "tea",
        "price": 100_000,
        "discount": 10,
        "image": "",
        "countInStock": 5,
        "description": "Green tea",
    })
}

async fn products() -> Response {
    ok(json!({ "products": [tea()], "totalPage": 1, "totalCount": 1 }))
}

async fn product_by_slug(Path(slug): Path<String>) -> Response {
    if slug == "tea" {
        ok(tea())
    } else {
        envelope(StatusCode::NOT_FOUND, "Product not found", Value::Null)
    }
}

async fn payment_types(State(recorded): State<Shared>) -> Response {
    if recorded.lock().unwrap().fail_payment_types {
        return envelope(StatusCode::INTERNAL_SERVER_ERROR, "Boom", Value::Null);
    }
    ok(json!({ "paymentTypes": [{ "_id": "pay1", "name": "Cash on delivery" }] }))
}

async fn delivery_types() -> Response {
    ok(json!({
        "deliveryTypes": [
            { "_id": "d1", "name": "Standard", "price": 30_000 },
            { "_id": "d2", "name": "Express", "price": 50_000 },
        ]
    }))
}

async fn cities() -> Response {
    ok(json!({ "cities": [{ "_id": "c1", "name": "Ha Noi" }] }))
}

async fn create_order(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    let id = format!("o{}", recorded.orders.len() + 1);
    let mut order = body;
    order["_id"] = json!(id);
    order["status"] = json!(0);
    order["createdAt"] = json!("2024-05-01T12:00:00.000Z");
    recorded.orders.push(order);
    envelope(StatusCode::CREATED, "Created", json!({ "_id": id }))
}

async fn my_orders(State(recorded): State<Shared>, headers: HeaderMap) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    recorded.order_list_calls += 1;
    let count = recorded.orders.len();
    ok(json!({ "orders": recorded.orders, "totalPage": 1, "totalCount": count }))
}

async fn my_order(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let recorded = recorded.lock().unwrap();
    match recorded.orders.iter().find(|order| order["_id"] == id.as_str()) {
        Some(order) => ok(order.clone()),
        None => envelope(StatusCode::NOT_FOUND, "Order not found", Value::Null),
    }
}

/// Only orders waiting for payment (0) or delivery (1) can be cancelled.
async fn cancel_order(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    let Some(order) = recorded.orders.iter_mut().find(|order| order["_id"] == id.as_str()) else {
        return envelope(StatusCode::NOT_FOUND, "Order not found", Value::Null);
    };
    if !matches!(order["status"].as_u64(), Some(0 | 1)) {
        return envelope(
            StatusCode::BAD_REQUEST,
            "Order can no longer be cancelled",
            Value::Null,
        );
    }
    order["status"] = json!(3);
    ok(order.clone())
}

#[derive(Deserialize)]
struct RoleQuery {
    #[serde(default)]
    search: String,
}

async fn list_roles(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<RoleQuery>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    recorded.role_list_calls += 1;
    let roles: Vec<Value> = recorded
        .roles
        .iter()
        .filter(|role| {
            role["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&query.search.to_lowercase()))
        })
        .cloned()
        .collect();
    let count = roles.len();
    ok(json!({ "roles": roles, "totalPage": 1, "totalCount": count }))
}

async fn get_role(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let recorded = recorded.lock().unwrap();
    match recorded.roles.iter().find(|role| role["_id"] == id.as_str()) {
        Some(role) => ok(role.clone()),
        None => envelope(StatusCode::NOT_FOUND, "Role not found", Value::Null),
    }
}

#[derive(Deserialize)]
struct RoleBody {
    name: String,
    #[serde(default)]
    permissions: Vec<String>,
}

fn name_taken(recorded: &Recorded, name: &str, except: Option<&str>) -> bool {
    recorded.roles.iter().any(|role| {
        role["name"].as_str().is_some_and(|n| n.eq_ignore_ascii_case(name))
            && except.is_none_or(|id| role["_id"] != id)
    })
}

async fn create_role(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<RoleBody>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    if name_taken(&recorded, &body.name, None) {
        return envelope(StatusCode::CONFLICT, "Role name already exists", Value::Null);
    }
    let id = format!("r{}", recorded.roles.len() + 1);
    let permissions: Vec<&str> = body.permissions.iter().map(String::as_str).collect();
    let role = role_json(&id, &body.name, &permissions);
    recorded.roles.push(role.clone());
    envelope(StatusCode::CREATED, "Created", role)
}

async fn update_role(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RoleBody>,
) -> Response {
    if caller(&headers).is_none() {
        return unauthorized();
    }
    let mut recorded = recorded.lock().unwrap();
    if recorded.fail_role_updates {
        return envelope(StatusCode::INTERNAL_SERVER_ERROR, "", Value::Null);
    }
    if name_taken(&recorded, &body.name, Some(&id)) {
        return envelope(StatusCode::CONFLICT, "Role name already exists", Value::Null);
    }
    match recorded.roles.iter_mut().find(|role| role["_id"] == id.as_str()) {
        Some(role) => {
            role["name"] = Value::String(body.name);
            ok(role.clone())
        }
        None => envelope(StatusCode::NOT_FOUND, "Role not found", Value::Null),
    }
}
