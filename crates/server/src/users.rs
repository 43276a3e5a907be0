use api_types::user::{UserListResponse, UserNew, UserUpdate, UserView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewUserCmd, UpdateUserCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{role_in, role_out},
    server::ServerState,
};

fn map_user(user: User) -> UserView {
    UserView {
        id: user.id,
        company_id: user.company_id,
        name: user.name,
        email: user.email,
        role: role_out(user.role),
        manager_id: user.manager_id,
        is_manager_approver: user.is_manager_approver,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserListResponse>, ServerError> {
    let users = state
        .engine
        .users(user.id)
        .await?
        .into_iter()
        .map(map_user)
        .collect();
    Ok(Json(UserListResponse { users }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let cmd = NewUserCmd {
        name: payload.name,
        email: payload.email,
        role: role_in(payload.role),
        manager_id: payload.manager_id,
        is_manager_approver: payload.is_manager_approver,
    };
    let created = state.engine.new_user(user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(map_user(created))))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let manager_id = match (payload.manager_id, payload.clear_manager) {
        (Some(_), true) => {
            return Err(ServerError::Generic(
                "manager_id and clear_manager are mutually exclusive".to_string(),
            ));
        }
        (Some(id), false) => Some(Some(id)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let cmd = UpdateUserCmd {
        role: payload.role.map(role_in),
        manager_id,
        is_manager_approver: payload.is_manager_approver,
    };
    let updated = state.engine.update_user(user.id, user_id, cmd).await?;
    Ok(Json(map_user(updated)))
}
