use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;

fn test_config(upstream: &MockServer) -> AppConfig {
    AppConfig {
        portal_api_url: upstream.uri(),
        portal_api_key: "test-api-key".to_string(),
        slot_fetch_page_size: 1000,
    }
}

fn create_test_app(config: &AppConfig) -> Router {
    appointment_routes(Arc::new(config.clone()))
}

/// First weekday strictly after today, so the resolver keeps it.
fn next_weekday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

fn appointment_json(id: Uuid, status: &str, start: DateTime<Utc>) -> Value {
    json!({
        "id": id,
        "patient": { "id": Uuid::new_v4(), "name": "Maria Silva" },
        "schedule": {
            "id": Uuid::new_v4(),
            "initialHour": start.to_rfc3339(),
            "finalHour": (start + Duration::minutes(30)).to_rfc3339()
        },
        "description": "Consulta de rotina",
        "status": status
    })
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_merges_appointments_with_their_ratings() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let rated_id = Uuid::new_v4();
    let unrated_id = Uuid::new_v4();
    let start = Utc::now() + Duration::days(5);

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [
                    appointment_json(rated_id, "Concluído", start),
                    appointment_json(unrated_id, "Agendado", start)
                ],
                "page": 1,
                "pageSize": 10,
                "totalCount": 2,
                "totalPages": 1
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": Uuid::new_v4(), "appointment": { "id": rated_id }, "score": 5 }
            ]
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["rating"]["score"], 5);
    assert!(items[1]["rating"].is_null());
    // Pre-formatted slot start for the list view.
    assert!(items[0]["scheduledFor"].as_str().unwrap().contains(" às "));
}

#[tokio::test]
async fn list_survives_a_failed_ratings_fetch() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [appointment_json(Uuid::new_v4(), "Agendado", Utc::now() + Duration::days(3))],
                "page": 1,
                "pageSize": 10,
                "totalCount": 1,
                "totalPages": 1
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["items"][0]["rating"].is_null());
}

#[tokio::test]
async fn booking_resolves_the_slot_and_creates_the_appointment() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let practitioner_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let day = next_weekday();

    Mock::given(method("GET"))
        .and(path("/schedules/filtered"))
        .and(query_param("practitionerId", practitioner_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [{
                    "id": Uuid::new_v4(),
                    "initialHour": format!("{}T14:00:00Z", day),
                    "finalHour": format!("{}T14:30:00Z", day)
                }],
                "page": 1,
                "pageSize": 1000,
                "totalCount": 1,
                "totalPages": 1
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": appointment_json(Uuid::new_v4(), "Agendado", Utc::now() + Duration::days(7))
        })))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "patientId": patient_id,
        "practitionerId": practitioner_id,
        "date": day.to_string(),
        "hour": "14:00",
        "description": "Primeira consulta"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["appointment"]["status"], "Agendado");
}

#[tokio::test]
async fn booking_an_hour_the_practitioner_does_not_offer_is_a_bad_request() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let practitioner_id = Uuid::new_v4();
    let day = next_weekday();

    Mock::given(method("GET"))
        .and(path("/schedules/filtered"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [{
                    "id": Uuid::new_v4(),
                    "initialHour": format!("{}T14:00:00Z", day),
                    "finalHour": format!("{}T14:30:00Z", day)
                }],
                "page": 1,
                "pageSize": 1000,
                "totalCount": 1,
                "totalPages": 1
            }
        })))
        .mount(&mock_server)
        .await;

    let request_body = json!({
        "patientId": Uuid::new_v4(),
        "practitionerId": practitioner_id,
        "date": day.to_string(),
        "hour": "15:00"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json")
        .body(Body::from(request_body.to_string()))
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelling_far_enough_ahead_succeeds() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let appointment_id = Uuid::new_v4();
    let start = Utc::now() + Duration::days(5);

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": appointment_json(appointment_id, "Agendado", start)
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": appointment_json(appointment_id, "Cancelado", start)
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri(&format!("/{}/cancel", appointment_id))
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["appointment"]["status"], "Cancelado");
}

#[tokio::test]
async fn cancelling_inside_the_notice_window_is_a_bad_request() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": appointment_json(appointment_id, "Agendado", Utc::now() + Duration::days(1))
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri(&format!("/{}/cancel", appointment_id))
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rating_a_completed_appointment_creates_the_rating() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": appointment_json(appointment_id, "Concluído", Utc::now() - Duration::days(3))
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "id": Uuid::new_v4(),
                "appointment": { "id": appointment_id },
                "score": 5,
                "comment": "Excelente"
            }
        })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri(&format!("/{}/rating", appointment_id))
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "score": 5, "comment": "Excelente" }).to_string()))
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["rating"]["score"], 5);
}

#[tokio::test]
async fn rating_a_scheduled_appointment_is_a_bad_request() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": appointment_json(appointment_id, "Agendado", Utc::now() + Duration::days(3))
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri(&format!("/{}/rating", appointment_id))
        .header("authorization", "Bearer test-token")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "score": 5 }).to_string()))
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_appointment_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/appointments/{}", appointment_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .method("GET")
        .uri(&format!("/{}", appointment_id))
        .header("authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();

    let response = create_test_app(&config).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
