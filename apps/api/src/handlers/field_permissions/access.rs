use super::*;

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<CheckPermissionRequest>,
) -> ApiResult<Json<CheckPermissionResponse>> {
    let table_id = TableId::new(table_id)?;
    let allowed = state
        .field_permission_service
        .check_permission(
            &user,
            &table_id,
            payload.field_id.as_str(),
            payload.role.as_str(),
            payload.action.as_str(),
        )
        .await?;

    Ok(Json(CheckPermissionResponse { allowed }))
}

pub async fn field_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<FieldAccessResponse>> {
    let table_id = TableId::new(table_id)?;
    let access = state
        .field_permission_service
        .actor_field_access(&user, &table_id)
        .await?;

    Ok(Json(FieldAccessResponse::from(access)))
}
