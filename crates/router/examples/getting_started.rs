use std::collections::HashMap;

use http::StatusCode;
use micro_router::{ErrorPayload, HttpError, Json, RequestContext, Router, RouterBuilder, Server, handlers};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize, Serialize, Debug)]
struct Item {
    name: String,
    price: u32,
}

#[derive(Deserialize, Debug)]
struct Paging {
    page: Option<u32>,
}

fn log_request(ctx: &mut RequestContext<'_>) {
    info!(method = %ctx.method(), path = ctx.path(), "handle request");
}

fn require_token(ctx: &mut RequestContext<'_>) {
    let token = ctx
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    match token {
        Some(token) => ctx.set("token", token),
        None => ctx.error(HttpError::unauthorized(None).with_message("missing bearer token")),
    }
}

fn list_items(ctx: &mut RequestContext<'_>) {
    let page = ctx.query_as::<Paging>().ok().and_then(|paging| paging.page).unwrap_or(1);
    ctx.send(HashMap::from([("page", page)]));
}

fn get_item(ctx: &mut RequestContext<'_>) {
    let id = ctx.param("id").unwrap_or_default().to_owned();
    ctx.send(Json(Item { name: format!("item {id}"), price: 100 }));
}

fn create_item(ctx: &mut RequestContext<'_>) {
    match ctx.json::<Item>() {
        Ok(item) => ctx.send_with_status(Json(item), StatusCode::CREATED),
        Err(e) => {
            let mut payload = ErrorPayload::new();
            payload.insert("reason".into(), e.to_string().into());
            ctx.error(HttpError::bad_request(Some(payload)));
        }
    }
}

#[tokio::main]
async fn main() {
    let items = RouterBuilder::group("/api", handlers![log_request, require_token])
        .get("/items", handlers![list_items])
        .get("/items/{id}", handlers![get_item])
        .post("/items", handlers![create_item]);

    let router = Router::builder()
        .get("/", handlers![|ctx| ctx.send("try GET /api/items with an authorization header")])
        .use_group(items)
        .build()
        .unwrap();

    Server::builder().router(router).address("127.0.0.1:3000").build().unwrap().start().await.unwrap();
}
