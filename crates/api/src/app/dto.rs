//! Request DTOs and the response envelope.
//!
//! Field names are camelCase on the wire. Legacy spellings from older clients
//! (`name`/`date`/`organizer` for expos) are accepted as aliases.

use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventsphere_auth::{NewUser, Role, UserProfile, UserUpdate};
use eventsphere_core::time::{lenient, lenient_opt};
use eventsphere_core::{ChatId, ExhibitorApplicationId, ExpoId, SessionId, UserId};
use eventsphere_expo::{ApplicationStatus, CompanyProfile, ExpoPatch, ExpoStatus, NewExpo, NewSession};

/// Success envelope: `{ "message": ..., "status": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T> {
    pub message: &'a str,
    pub status: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(status: StatusCode, message: &str, data: T) -> axum::response::Response {
    (
        status,
        Json(Envelope {
            message,
            status: true,
            data,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl SignupRequest {
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            password: self.password,
            role: self.role.unwrap_or(Role::Attendee),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(body: UpdateUserRequest) -> Self {
        UserUpdate {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Expos & schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpoRequest {
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "date", deserialize_with = "lenient")]
    pub start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub theme: String,
    pub max_exhibitors: u32,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ExpoStatus>,
    #[serde(default, alias = "organizer")]
    pub organizer_id: Option<UserId>,
}

impl CreateExpoRequest {
    /// The caller becomes the organizer unless one is named explicitly.
    pub fn into_new_expo(self, caller: UserId) -> NewExpo {
        NewExpo {
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            location: self.location,
            theme: self.theme,
            max_exhibitors: self.max_exhibitors,
            registration_deadline: self.registration_deadline,
            status: self.status,
            organizer_id: Some(self.organizer_id.unwrap_or(caller)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpoRequest {
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "date", deserialize_with = "lenient_opt")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub max_exhibitors: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<ExpoStatus>,
    #[serde(default, alias = "organizer")]
    pub organizer_id: Option<UserId>,
}

impl From<UpdateExpoRequest> for ExpoPatch {
    fn from(body: UpdateExpoRequest) -> Self {
        ExpoPatch {
            title: body.title,
            description: body.description,
            start_date: body.start_date,
            end_date: body.end_date,
            location: body.location,
            theme: body.theme,
            max_exhibitors: body.max_exhibitors,
            registration_deadline: body.registration_deadline,
            status: body.status,
            organizer_id: body.organizer_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "lenient")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub max_attendees: Option<u32>,
}

impl From<CreateSessionRequest> for NewSession {
    fn from(body: CreateSessionRequest) -> Self {
        NewSession {
            title: body.title,
            description: body.description,
            start_time: body.start_time,
            end_time: body.end_time,
            speaker: body.speaker,
            location: body.location,
            category: body.category,
            max_attendees: body.max_attendees,
        }
    }
}

/// Optional body for acting on behalf of another user; defaults to the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnBehalfRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRegisterRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub expo_id: ExpoId,
    #[serde(default)]
    pub sessions: Vec<SessionId>,
}

// ---------------------------------------------------------------------------
// Exhibitor applications
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitorRequestBody {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub expo_id: ExpoId,
    pub company_name: String,
    #[serde(default)]
    pub company_description: String,
    #[serde(flatten)]
    pub profile: CompanyProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitorRequestsQuery {
    pub expo_id: Option<ExpoId>,
    pub status: Option<ApplicationStatus>,
}

/// Approve/reject payload; the application must belong to the given expo and user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub request_id: ExhibitorApplicationId,
    pub expo_id: ExpoId,
    pub user_id: UserId,
}

// ---------------------------------------------------------------------------
// Floor plans
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFloorPlanRequest {
    pub rows: u32,
    pub cols: u32,
    pub base_price: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveBoothRequest {
    #[serde(default)]
    pub exhibitor_id: Option<UserId>,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub expo_id: ExpoId,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQuery {
    pub expo_id: Option<ExpoId>,
    pub user_id: Option<UserId>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub user_id1: UserId,
    pub user_id2: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: ChatId,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn expo_request_accepts_legacy_field_names() {
        let body: CreateExpoRequest = serde_json::from_value(json!({
            "name": "Tech Expo",
            "date": "2025-06-01",
            "endDate": "2025-06-03T18:00:00Z",
            "maxExhibitors": 20,
            "organizer": UserId::new(),
        }))
        .unwrap();
        assert_eq!(body.title, "Tech Expo");
        assert!(body.end_date.is_some());
        assert!(body.organizer_id.is_some());
        assert_eq!(body.description, "");
    }

    #[test]
    fn bad_dates_fail_deserialization() {
        let res = serde_json::from_value::<CreateExpoRequest>(json!({
            "title": "x",
            "startDate": "someday",
            "maxExhibitors": 1,
        }));
        assert!(res.is_err());
    }

    #[test]
    fn exhibitor_request_flattens_company_profile() {
        let body: ExhibitorRequestBody = serde_json::from_value(json!({
            "expoId": ExpoId::new(),
            "companyName": "Acme",
            "website": "https://acme.test",
            "products": ["rockets"],
        }))
        .unwrap();
        assert_eq!(body.profile.website.as_deref(), Some("https://acme.test"));
        assert_eq!(body.profile.products, vec!["rockets".to_string()]);
        assert!(body.user_id.is_none());
    }

    #[test]
    fn chat_request_uses_numbered_user_fields() {
        let (a, b) = (UserId::new(), UserId::new());
        let body: CreateChatRequest =
            serde_json::from_value(json!({ "userId1": a, "userId2": b })).unwrap();
        assert_eq!((body.user_id1, body.user_id2), (a, b));
    }
}
