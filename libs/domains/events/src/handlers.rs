//! HTTP handlers for the events API

use crate::models::{Event, EventSummary, TypeCount, VisitorCount, VisitorId};
use crate::service::EventService;
use axum::Json;
use axum::extract::FromRef;
use axum::http::StatusCode;
use axum_helpers::{AppError, RouteContext, RouteTableBuilder};
use serde_json::Value;
use std::sync::Arc;

/// Events router state
pub type EventsState = Arc<EventService>;

/// Add the event routes to `builder`, in matching order.
pub fn register<S>(builder: RouteTableBuilder<S>) -> RouteTableBuilder<S>
where
    S: Clone + Send + Sync + 'static,
    EventsState: FromRef<S>,
{
    builder
        .post("/api/events/:name", record_event::<S>)
        .post("/api/visitors", mint_visitor::<S>)
        .get("/api/types", list_types::<S>)
        .get("/api/visitors", list_visitors::<S>)
        .get("/api/visitors/:visitor", visitor_events::<S>)
        .get("/api/events/:name", typed_events::<S>)
        .get("/api/meta", meta::<S>)
        .get("/api/download", download::<S>)
}

fn events<S>(ctx: &RouteContext<S>) -> EventsState
where
    EventsState: FromRef<S>,
{
    EventsState::from_ref(&ctx.state)
}

/// Ingest one event of the type named in the path
pub async fn record_event<S>(
    mut ctx: RouteContext<S>,
) -> Result<(StatusCode, Json<Event>), AppError>
where
    EventsState: FromRef<S>,
{
    let name = ctx.param("name")?.to_string();
    let body: Value = ctx.json().await?;
    let event = events(&ctx).record(&name, body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn mint_visitor<S>(ctx: RouteContext<S>) -> Result<Json<VisitorId>, AppError>
where
    EventsState: FromRef<S>,
{
    Ok(Json(events(&ctx).mint_visitor()))
}

pub async fn list_types<S>(ctx: RouteContext<S>) -> Result<Json<Vec<TypeCount>>, AppError>
where
    EventsState: FromRef<S>,
{
    Ok(Json(events(&ctx).type_counts().await?))
}

pub async fn list_visitors<S>(ctx: RouteContext<S>) -> Result<Json<Vec<VisitorCount>>, AppError>
where
    EventsState: FromRef<S>,
{
    Ok(Json(events(&ctx).visitor_counts().await?))
}

pub async fn visitor_events<S>(ctx: RouteContext<S>) -> Result<Json<Vec<Event>>, AppError>
where
    EventsState: FromRef<S>,
{
    let visitor = ctx.param("visitor")?.to_string();
    Ok(Json(events(&ctx).events_by_visitor(&visitor).await?))
}

pub async fn typed_events<S>(ctx: RouteContext<S>) -> Result<Json<Vec<Event>>, AppError>
where
    EventsState: FromRef<S>,
{
    let name = ctx.param("name")?.to_string();
    Ok(Json(events(&ctx).events_by_name(&name).await?))
}

pub async fn meta<S>(ctx: RouteContext<S>) -> Result<Json<EventSummary>, AppError>
where
    EventsState: FromRef<S>,
{
    Ok(Json(events(&ctx).summary().await?))
}

/// Entire event log as a JSON array
pub async fn download<S>(ctx: RouteContext<S>) -> Result<Json<Vec<Event>>, AppError>
where
    EventsState: FromRef<S>,
{
    Ok(Json(events(&ctx).download().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryEventRepository;
    use crate::schema::EventSchema;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::{Dispatcher, RouteTable};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let state: EventsState = Arc::new(EventService::new(
            InMemoryEventRepository::new(),
            EventSchema::bundled().unwrap(),
        ));
        let table = register(RouteTable::builder()).build().unwrap();
        Dispatcher::new(table, state).into_axum_router()
    }

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_record_and_query() {
        let app = app();

        let (status, created) = send(
            &app,
            "POST",
            "/api/events/pageview",
            Some(json!({"visitor": "v1", "url": "/"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "pageview");
        assert_eq!(created["visitor"], "v1");
        assert_eq!(created["payload"], json!({"url": "/"}));

        let (status, listed) = send(&app, "GET", "/api/events/pageview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (_, by_visitor) = send(&app, "GET", "/api/visitors/v1", None).await;
        assert_eq!(by_visitor[0]["id"], created["id"]);

        let (_, types) = send(&app, "GET", "/api/types", None).await;
        assert_eq!(types, json!([{"name": "pageview", "count": 1}]));

        let (_, meta) = send(&app, "GET", "/api/meta", None).await;
        assert_eq!(meta, json!({"events": 1, "types": ["pageview"], "visitors": ["v1"]}));
    }

    #[tokio::test]
    async fn test_rejected_events_are_not_stored() {
        let app = app();

        let bad_visitor = Some(json!({"visitor": 5}));
        let (status, body) = send(&app, "POST", "/api/events/click", bad_visitor).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad visitor");

        let missing_url = Some(json!({"visitor": "v1"}));
        let (status, body) = send(&app, "POST", "/api/events/pageview", missing_url).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad payload");

        let (_, download) = send(&app, "GET", "/api/download", None).await;
        assert_eq!(download, json!([]));
    }

    #[tokio::test]
    async fn test_mint_visitor() {
        let (status, body) = send(&app(), "POST", "/api/visitors", None).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_percent_encoded_visitor_is_decoded() {
        let app = app();
        send(&app, "POST", "/api/events/click", Some(json!({"visitor": "a b"}))).await;

        let (_, events) = send(&app, "GET", "/api/visitors/a%20b", None).await;
        assert_eq!(events.as_array().unwrap().len(), 1);
    }
}
