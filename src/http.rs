use crate::backend::StorageBackend;
use crate::error::BookingError;
use crate::timeslots::{day_schedule, find_slot, BookingDay, SlotView};
use crate::types::{BookingRecord, BookingTable, ContactDetails};
use crate::AppState;
use axum::extract::Path;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRequest {
    #[serde(with = "crate::types::slot_time")]
    slot_time: DateTime<Utc>,
    #[serde(flatten)]
    details: ContactDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DayInfo {
    day: BookingDay,
    label: String,
    date: NaiveDate,
}

pub fn create_app<T: StorageBackend>(state: AppState<T>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/days", get(get_days))
        .route("/days/:day/slots", get(get_slots::<T>))
        .route("/bookings", get(get_bookings::<T>))
        .route("/book", post(book_timeslot::<T>))
        .with_state(state)
        .layer(cors)
}

pub async fn start_server<T: StorageBackend>(state: AppState<T>, port: u16) -> io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(address = %listener.local_addr()?, "Serving booking API");
    axum::serve(listener, create_app(state)).await
}

async fn get_days() -> impl IntoResponse {
    let today = Local::now().date_naive();
    let days: Vec<DayInfo> = BookingDay::ALL
        .into_iter()
        .map(|day| DayInfo {
            day,
            label: day.label().into(),
            date: day.date(today),
        })
        .collect();
    Json(days)
}

async fn get_slots<T: StorageBackend>(
    State(state): State<AppState<T>>,
    Path(day): Path<String>,
) -> Result<Json<Vec<SlotView>>, (StatusCode, String)> {
    let day: BookingDay = day
        .parse()
        .map_err(|err| (StatusCode::NOT_FOUND, format!("{err}")))?;
    let date = day.date(Local::now().date_naive());
    let table = state.booking_store.load();
    Ok(Json(day_schedule(date, &Local, &table)))
}

async fn get_bookings<T: StorageBackend>(State(state): State<AppState<T>>) -> Json<BookingTable> {
    Json(state.booking_store.load())
}

async fn book_timeslot<T: StorageBackend>(
    State(state): State<AppState<T>>,
    Json(booking): Json<BookingRequest>,
) -> Result<Json<BookingRecord>, (StatusCode, String)> {
    if let Err(err) = booking.details.validate() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string()));
    }

    // only slots offered on one of the bookable days can be booked
    let today = Local::now().date_naive();
    let selector = booking.slot_time.timestamp_millis().to_string();
    let slot_time = BookingDay::ALL
        .into_iter()
        .find_map(|day| find_slot(day.date(today), &Local, &selector).ok())
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("No bookable slot starts at {selector}"),
            )
        })?;

    match state.booking_store.book_slot(&slot_time, booking.details) {
        Ok(record) => Ok(Json(record)),
        Err(err) => Err(booking_error_response(err)),
    }
}

fn booking_error_response(err: BookingError) -> (StatusCode, String) {
    match err {
        BookingError::SlotAlreadyBooked(_) => (StatusCode::CONFLICT, err.to_string()),
        err => {
            error!(%err, "Booking was not persisted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Booking was not saved: {err}"),
            )
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::booking_store::{BookingStore, DEFAULT_STORAGE_KEY};
    use crate::testutils::MockStorage;
    use crate::timeslots::{day_slots, slot_key};
    use reqwest::Client;
    use std::sync::atomic::Ordering;
    use test_case::test_case;
    use tokio::task::JoinHandle;

    async fn init() -> (JoinHandle<()>, MockStorage, String) {
        let mock_storage = MockStorage::new();
        let state = AppState {
            booking_store: BookingStore::new(mock_storage.clone(), DEFAULT_STORAGE_KEY),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            axum::serve(listener, create_app(state)).await.unwrap();
        });
        (server, mock_storage, address)
    }

    fn tomorrows_slots() -> Vec<DateTime<Local>> {
        day_slots(BookingDay::Tomorrow.date(Local::now().date_naive()), &Local)
    }

    fn booking_request(slot_time: DateTime<Utc>, name: &str, email: &str, phone: &str) -> BookingRequest {
        BookingRequest {
            slot_time,
            details: ContactDetails {
                name: name.into(),
                email: email.into(),
                phone_number: phone.into(),
            },
        }
    }

    #[tokio::test]
    async fn test_get_days() {
        let (server, _, address) = init().await;

        let response = Client::new()
            .get(format!("{address}/days"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());

        let days: Vec<DayInfo> = response.json().await.unwrap();
        let labels: Vec<&str> = days.iter().map(|day| day.label.as_str()).collect();
        assert_eq!(labels, ["Today", "Tomorrow", "Day After Tomorrow"]);
        assert_eq!(days[2].date, days[0].date + chrono::Days::new(2));

        server.abort();
    }

    #[tokio::test]
    async fn test_book_and_list_slots() {
        let (server, mock_storage, address) = init().await;
        let slot_time = tomorrows_slots()[1].with_timezone(&Utc);

        let client = Client::new();
        let response = client
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, "A", "a@x.com", "123"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
        let record: BookingRecord = response.json().await.unwrap();
        assert_eq!(record.slot_time, slot_time);
        assert_eq!(mock_storage.0.calls_to_set_item.load(Ordering::SeqCst), 1);

        let slots: Vec<SlotView> = client
            .get(format!("{address}/days/tomorrow/slots"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let booked: Vec<DateTime<Utc>> = slots
            .iter()
            .filter(|slot| slot.booked)
            .map(|slot| slot.slot_time)
            .collect();
        assert_eq!(booked, [slot_time]);

        let bookings: serde_json::Value = client
            .get(format!("{address}/bookings"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(bookings[slot_key(&slot_time)]["name"], "A");

        // the same slot can't be booked twice
        let response = client
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, "B", "b@x.com", "456"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), StatusCode::CONFLICT.as_u16());
        assert_eq!(mock_storage.0.calls_to_set_item.load(Ordering::SeqCst), 1);

        server.abort();
    }

    #[tokio::test]
    async fn test_book_with_iso_slot_time() {
        let (server, _, address) = init().await;
        let slot_time = tomorrows_slots()[2].with_timezone(&Utc);

        let response = Client::new()
            .post(format!("{address}/book"))
            .json(&serde_json::json!({
                "slotTime": slot_time.to_rfc3339(),
                "name": "A",
                "email": "a@x.com",
                "phoneNumber": "(555) 123-4567",
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
        let record: BookingRecord = response.json().await.unwrap();
        assert_eq!(record.slot_time, slot_time);
        server.abort();
    }

    #[test_case("", "a@x.com", "123")]
    #[test_case("A", "", "123")]
    #[test_case("A", "a-at-x.com", "123")]
    #[test_case("A", "a@x.com", "")]
    #[tokio::test]
    async fn test_reject_invalid_details(name: &str, email: &str, phone: &str) {
        let (server, mock_storage, address) = init().await;
        let slot_time = tomorrows_slots()[0].with_timezone(&Utc);

        let response = Client::new()
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, name, email, phone))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.status().as_u16(),
            StatusCode::UNPROCESSABLE_ENTITY.as_u16()
        );
        assert_eq!(mock_storage.0.calls_to_get_item.load(Ordering::SeqCst), 0);
        assert_eq!(mock_storage.0.calls_to_set_item.load(Ordering::SeqCst), 0);
        server.abort();
    }

    #[tokio::test]
    async fn test_reject_unknown_slot() {
        let (server, mock_storage, address) = init().await;
        let slot_time = tomorrows_slots()[0].with_timezone(&Utc) + chrono::Duration::minutes(30);

        let response = Client::new()
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, "A", "a@x.com", "123"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());
        assert_eq!(mock_storage.0.calls_to_set_item.load(Ordering::SeqCst), 0);
        server.abort();
    }

    #[tokio::test]
    async fn test_unknown_day() {
        let (server, _, address) = init().await;

        let response = Client::new()
            .get(format!("{address}/days/yesterday/slots"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());
        server.abort();
    }

    #[tokio::test]
    async fn test_write_failure() {
        let (server, mock_storage, address) = init().await;
        mock_storage.fail_writes();
        let slot_time = tomorrows_slots()[0].with_timezone(&Utc);

        let response = Client::new()
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, "A", "a@x.com", "123"))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.status().as_u16(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        );
        assert!(mock_storage.0.items.lock().unwrap().is_empty());
        server.abort();
    }

    #[tokio::test]
    async fn test_corrupt_store() {
        let (server, mock_storage, address) = init().await;
        mock_storage.insert_raw(DEFAULT_STORAGE_KEY, "[1, 2");
        let client = Client::new();

        let bookings: BookingTable = client
            .get(format!("{address}/bookings"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(bookings.is_empty());

        let slot_time = tomorrows_slots()[0].with_timezone(&Utc);
        let response = client
            .post(format!("{address}/book"))
            .json(&booking_request(slot_time, "A", "a@x.com", "123"))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status().as_u16(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        );
        assert_eq!(
            mock_storage.0.items.lock().unwrap()[DEFAULT_STORAGE_KEY],
            "[1, 2"
        );
        server.abort();
    }
}
