//! HTTP handlers for the `/contacts` resource.
//!
//! # Responsibility
//! - Validate request bodies before any service call.
//! - Map each service outcome to a status code and envelope.
//!
//! # Invariants
//! - Body and query rejections never reach the service; they go to the
//!   boundary translator as validation failures.
//! - Persistence failures are not rendered here; they escape to the
//!   boundary translator with a generic message.

use crate::envelope::{ApiFailure, Envelope};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contacts_core::{
    parse_contact_id, Contact, CreateContactInput, ServiceError, UpdateContactInput,
};
use log::error;
use serde::Deserialize;
use serde_json::json;

const EMAIL_MUST_BE_UNIQUE: &str = "Email must be unique";

/// Use case a handler is serving; selects route-specific wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

pub async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}

pub async fn list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiFailure::from(rejection).into_response(),
    };

    match state.run(move |service| service.list(query.search.as_deref())).await {
        Ok(contacts) => Envelope::success(
            StatusCode::OK,
            "Contacts retrieved successfully",
            contacts,
        )
        .into_response(),
        Err(err) => service_failure(Operation::List, err),
    }
}

pub async fn get_contact(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let id = match parse_contact_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return service_failure(Operation::Get, err),
    };

    match state.run(move |service| service.get(id)).await {
        Ok(contact) => contact_response(StatusCode::OK, "Contact retrieved successfully", contact),
        Err(err) => service_failure(Operation::Get, err),
    }
}

pub async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<CreateContactInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return ApiFailure::from(rejection).into_response(),
    };
    if let Err(err) = input.validate() {
        return ApiFailure::validation(err.messages()).into_response();
    }

    match state.run(move |service| service.create(&input)).await {
        Ok(contact) => {
            contact_response(StatusCode::CREATED, "Contact created successfully", contact)
        }
        Err(err) => service_failure(Operation::Create, err),
    }
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateContactInput>, JsonRejection>,
) -> Response {
    let id = match parse_contact_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return service_failure(Operation::Update, err),
    };
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return ApiFailure::from(rejection).into_response(),
    };
    if let Err(err) = input.validate() {
        return ApiFailure::validation(err.messages()).into_response();
    }

    match state.run(move |service| service.update(id, &input)).await {
        Ok(contact) => contact_response(StatusCode::OK, "Contact updated successfully", contact),
        Err(err) => service_failure(Operation::Update, err),
    }
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_contact_id(&raw_id) {
        Ok(id) => id,
        Err(err) => return service_failure(Operation::Delete, err),
    };

    match state.run(move |service| service.delete(id)).await {
        Ok(contact) => contact_response(StatusCode::OK, "Contact deleted successfully", contact),
        Err(err) => service_failure(Operation::Delete, err),
    }
}

/// Fallback for paths outside the route table.
pub async fn route_not_found(method: Method, uri: Uri) -> Response {
    ApiFailure::new(
        StatusCode::NOT_FOUND,
        format!("Cannot {method} {}", uri.path()),
    )
    .into_response()
}

fn contact_response(status: StatusCode, message: &str, contact: Contact) -> Response {
    Envelope::success(status, message, contact).into_response()
}

fn service_failure(operation: Operation, err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(errors) => {
            Envelope::<Contact>::failure(StatusCode::BAD_REQUEST, "Validation failed")
                .with_errors(errors.into_iter().map(|error| error.message).collect())
                .into_response()
        }
        ServiceError::NotFound(_) => {
            let message = err.to_string();
            Envelope::<Contact>::failure(StatusCode::NOT_FOUND, message.clone())
                .with_error(message)
                .into_response()
        }
        ServiceError::BadInput(detail) => {
            Envelope::<Contact>::failure(StatusCode::BAD_REQUEST, "Invalid contact ID")
                .with_error(detail)
                .into_response()
        }
        ServiceError::Conflict(_) if operation == Operation::Create => Envelope::<Contact>::failure(
            StatusCode::CONFLICT,
            "Contact with this email already exists",
        )
        .with_errors(vec![EMAIL_MUST_BE_UNIQUE.to_string()])
        .into_response(),
        ServiceError::Conflict(_) => {
            Envelope::<Contact>::failure(StatusCode::CONFLICT, "Email already in use")
                .with_error(EMAIL_MUST_BE_UNIQUE)
                .into_response()
        }
        ServiceError::Persistence(_) => {
            error!(
                "event=contact_{} module=http status=error error_code=persistence_failed",
                operation.as_str()
            );
            ApiFailure::from(err).into_response()
        }
    }
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}
