//! Conversions between wire messages and use case DTOs.

use chrono::{DateTime, Utc};
use prost_types::{FieldMask, Timestamp};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    UserChanges, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, STATUS_ACTIVE, STATUS_INACTIVE,
    STATUS_SUSPENDED,
};
use proto::user::v1 as pb;

use crate::usecase::{CreateUserDto, FilterDto, ListUsersDto, UpdateUserDto, UserDto};

pub fn timestamp(at: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

fn status_to_proto(status: &str) -> pb::UserStatus {
    match status {
        STATUS_ACTIVE => pb::UserStatus::Active,
        STATUS_INACTIVE => pb::UserStatus::Inactive,
        STATUS_SUSPENDED => pb::UserStatus::Suspended,
        _ => pb::UserStatus::Unspecified,
    }
}

pub fn user_to_proto(user: &UserDto) -> pb::User {
    pb::User {
        id: user.id.to_string(),
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.full_name.clone(),
        is_active: user.is_active,
        is_admin: user.is_admin,
        status: status_to_proto(&user.status) as i32,
        created_at: Some(timestamp(user.created_at)),
        updated_at: Some(timestamp(user.updated_at)),
        deleted_at: user.deleted_at.map(timestamp),
    }
}

/// New users are active and non-admin unless the request says otherwise.
pub fn create_request_to_dto(req: pb::CreateUserRequest) -> CreateUserDto {
    CreateUserDto {
        email: req.email,
        username: req.username,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        is_active: req.is_active.unwrap_or(true),
        is_admin: req.is_admin.unwrap_or(false),
    }
}

/// With an update mask only the listed paths are taken; without one every
/// field present on the request is. `is_active` and `is_admin` are ignored.
pub fn update_request_to_dto(req: pb::UpdateUserRequest) -> AppResult<UpdateUserDto> {
    let id = Uuid::parse_str(&req.id).map_err(|_| AppError::invalid_argument("invalid user ID"))?;

    let changes = match &req.update_mask {
        Some(FieldMask { paths }) => {
            let wants = |field: &str| paths.iter().any(|p| p == field);
            UserChanges {
                email: req.email.clone().filter(|_| wants("email")),
                username: req.username.clone().filter(|_| wants("username")),
                first_name: req.first_name.clone().filter(|_| wants("first_name")),
                last_name: req.last_name.clone().filter(|_| wants("last_name")),
            }
        }
        None => UserChanges {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    };

    Ok(UpdateUserDto { id, changes })
}

pub fn filter_to_dto(filter: pb::ListUsersFilter) -> FilterDto {
    FilterDto {
        email: filter.email,
        username: filter.username,
        is_active: filter.is_active,
        is_admin: filter.is_admin,
    }
}

/// `(page, page_size)` with defaults for missing or non-positive values and
/// the page size capped.
pub fn pagination(req: Option<&pb::PaginationRequest>) -> (i64, i64) {
    let mut page = DEFAULT_PAGE as i64;
    let mut page_size = DEFAULT_PAGE_SIZE as i64;

    if let Some(p) = req {
        if p.page > 0 {
            page = i64::from(p.page);
        }
        if p.page_size > 0 {
            page_size = i64::from(p.page_size);
        }
        page_size = page_size.min(MAX_PAGE_SIZE as i64);
    }

    (page, page_size)
}

fn clamp_i32(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub fn pagination_to_proto(list: &ListUsersDto) -> pb::PaginationResponse {
    pb::PaginationResponse {
        page: clamp_i32(list.page),
        page_size: clamp_i32(list.page_size),
        total_items: clamp_i32(list.total_items),
        total_pages: clamp_i32(list.total_pages),
        has_next: list.has_next(),
        has_previous: list.has_previous(),
    }
}

pub fn users_to_proto(list: &ListUsersDto) -> Vec<pb::User> {
    list.users.iter().map(user_to_proto).collect()
}
