//! Account HTTP handlers: registration, login, profiles and administration.
//!
//! ```text
//! POST   /api/auth/register
//! POST   /api/auth/login
//! GET    /api/auth/me
//! PATCH  /api/auth/profile
//! GET    /api/auth/users?role=MUNICIPALITY        (admin)
//! POST   /api/auth/users/{id}/verify              (admin)
//! DELETE /api/auth/users/{id}                     (admin)
//! POST   /api/auth/municipality                   (admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AuthSession, CreateMunicipalityAccountRequest, RegisterRequest};
use crate::domain::{
    CredentialsValidationError, Email, Error, FullName, Jurisdiction, LoginCredentials,
    NewPassword, ProfileUpdate, Role, User, UserId, UserValidationError, validate_phone,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_optional_value, parse_uuid,
};

/// Registration payload for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub municipality: Option<String>,
    pub ward: Option<String>,
}

/// Login payload for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: String,
    pub password: String,
}

/// Partial profile update; omitted fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateBody {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub citizenship_document: Option<String>,
}

/// Payload for creating a municipality staff account.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityAccountBody {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub municipality: String,
    pub ward: String,
}

/// Query string for `GET /api/auth/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Restrict to one role: `USER`, `MUNICIPALITY` or `ADMIN`.
    pub role: Option<String>,
}

/// Public view of an account. Password hashes never leave the domain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[schema(example = "USER")]
    pub role: String,
    pub is_verified: bool,
    pub municipality: Option<String>,
    pub ward: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub citizenship_document: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            full_name: user.full_name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            is_verified: user.is_verified(),
            municipality: user.municipality().map(str::to_owned),
            ward: user.ward().map(str::to_owned),
            phone: user.phone().map(str::to_owned),
            profile_picture: user.profile_picture().map(str::to_owned),
            citizenship_document: user.citizenship_document().map(str::to_owned),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseBody {
    pub token: String,
    pub user: UserBody,
}

impl From<AuthSession> for AuthResponseBody {
    fn from(session: AuthSession) -> Self {
        Self {
            user: UserBody::from(&session.user),
            token: session.token,
        }
    }
}

fn user_field(error: &UserValidationError) -> FieldName {
    match error {
        UserValidationError::EmptyFullName | UserValidationError::FullNameTooLong { .. } => {
            FieldName::new("fullName")
        }
        UserValidationError::InvalidEmail => FieldName::new("email"),
        UserValidationError::InvalidPhone => FieldName::new("phone"),
        UserValidationError::UnknownRole => FieldName::new("role"),
        UserValidationError::MissingJurisdiction => FieldName::new("municipality"),
        UserValidationError::EmptyId | UserValidationError::InvalidId => FieldName::new("id"),
    }
}

fn user_error(error: UserValidationError) -> Error {
    invalid_field(user_field(&error), error)
}

fn credentials_error(error: CredentialsValidationError) -> Error {
    match error {
        CredentialsValidationError::User(inner) => user_error(inner),
        CredentialsValidationError::EmptyEmail => invalid_field(FieldName::new("email"), error),
        other => invalid_field(FieldName::new("password"), other),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

fn parse_register(body: RegisterRequestBody) -> Result<RegisterRequest, Error> {
    Ok(RegisterRequest {
        full_name: FullName::new(&body.full_name).map_err(user_error)?,
        email: Email::new(&body.email).map_err(user_error)?,
        password: NewPassword::new(&body.password).map_err(credentials_error)?,
        phone: validate_phone(body.phone.as_deref()).map_err(user_error)?,
        municipality: non_blank(body.municipality),
        ward: non_blank(body.ward),
    })
}

fn parse_profile_update(body: ProfileUpdateBody) -> Result<ProfileUpdate, Error> {
    let full_name = body
        .full_name
        .as_deref()
        .map(FullName::new)
        .transpose()
        .map_err(user_error)?;
    Ok(ProfileUpdate {
        full_name,
        phone: validate_phone(body.phone.as_deref()).map_err(user_error)?,
        profile_picture: non_blank(body.profile_picture),
        citizenship_document: non_blank(body.citizenship_document),
    })
}

fn parse_municipality_account(
    body: MunicipalityAccountBody,
) -> Result<CreateMunicipalityAccountRequest, Error> {
    let jurisdiction = Jurisdiction::new(&body.municipality, &body.ward)
        .map_err(|error| invalid_field(FieldName::new("municipality"), error))?;
    Ok(CreateMunicipalityAccountRequest {
        full_name: FullName::new(&body.full_name).map_err(user_error)?,
        email: Email::new(&body.email).map_err(user_error)?,
        password: NewPassword::new(&body.password).map_err(credentials_error)?,
        phone: validate_phone(body.phone.as_deref()).map_err(user_error)?,
        jurisdiction,
    })
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(UserId::from_uuid)
}

/// Create a citizen account and return a token for it.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = AuthResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_register(payload.into_inner())?;
    let session = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(AuthResponseBody::from(session)))
}

/// Exchange email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Login success", body = AuthResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid password", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<AuthResponseBody>> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&body.email, &body.password).map_err(credentials_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(AuthResponseBody::from(session)))
}

/// Current account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("BearerAuth" = []))
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<UserBody>> {
    let user = state.accounts_query.me(caller.actor()).await?;
    Ok(web::Json(UserBody::from(&user)))
}

/// Update the caller's own profile.
#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Updated account", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile",
    security(("BearerAuth" = []))
)]
#[patch("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<ProfileUpdateBody>,
) -> ApiResult<web::Json<UserBody>> {
    let update = parse_profile_update(payload.into_inner())?;
    let user = state
        .accounts
        .update_profile(caller.actor(), update)
        .await?;
    Ok(web::Json(UserBody::from(&user)))
}

/// List accounts, optionally filtered by role.
#[utoipa::path(
    get,
    path = "/api/auth/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = [UserBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrator access required", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "listUsers",
    security(("BearerAuth" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<UserBody>>> {
    let role: Option<Role> = parse_optional_value(query.role.as_deref(), FieldName::new("role"))?;
    let users = state
        .accounts_query
        .list_users(caller.actor(), role)
        .await?;
    Ok(web::Json(users.iter().map(UserBody::from).collect()))
}

/// Mark an account as verified. Repeating the call is a no-op.
#[utoipa::path(
    post,
    path = "/api/auth/users/{id}/verify",
    params(("id" = String, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Verified account", body = UserBody),
        (status = 403, description = "Administrator access required", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "verifyUser",
    security(("BearerAuth" = []))
)]
#[post("/users/{id}/verify")]
pub async fn verify_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserBody>> {
    let user_id = parse_user_id(&path)?;
    let user = state.accounts.verify_user(caller.actor(), user_id).await?;
    Ok(web::Json(UserBody::from(&user)))
}

/// Delete an account and everything it owns.
#[utoipa::path(
    delete,
    path = "/api/auth/users/{id}",
    params(("id" = String, Path, description = "Account identifier")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Administrators cannot delete themselves", body = ErrorSchema),
        (status = 403, description = "Administrator access required", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "deleteUser",
    security(("BearerAuth" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path)?;
    state.accounts.delete_user(caller.actor(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Create a verified municipality staff account.
#[utoipa::path(
    post,
    path = "/api/auth/municipality",
    request_body = MunicipalityAccountBody,
    responses(
        (status = 201, description = "Staff account created", body = UserBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Administrator access required", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "createMunicipalityAccount",
    security(("BearerAuth" = []))
)]
#[post("/municipality")]
pub async fn create_municipality_account(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<MunicipalityAccountBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_municipality_account(payload.into_inner())?;
    let user = state
        .accounts
        .create_municipality_account(caller.actor(), request)
        .await?;
    Ok(HttpResponse::Created().json(UserBody::from(&user)))
}

/// Register the `/auth` scope.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me)
            .service(update_profile)
            .service(list_users)
            .service(verify_user)
            .service(delete_user)
            .service(create_municipality_account),
    );
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
