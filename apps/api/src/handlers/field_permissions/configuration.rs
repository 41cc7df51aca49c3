use super::*;

pub async fn list_field_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<Vec<FieldPermissionResponse>>> {
    let table_id = TableId::new(table_id)?;
    let entries = state
        .field_permission_service
        .get_field_permissions(&user, &table_id)
        .await?
        .into_iter()
        .map(FieldPermissionResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn set_field_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<SetFieldPermissionRequest>,
) -> ApiResult<Json<FieldPermissionResponse>> {
    let table_id = TableId::new(table_id)?;
    let field_override = state
        .field_permission_service
        .set_field_permission(&user, &table_id, FieldPermissionChange::from(payload))
        .await?;

    Ok(Json(FieldPermissionResponse::from(field_override)))
}

pub async fn batch_set_field_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<BatchSetFieldPermissionsRequest>,
) -> ApiResult<Json<Vec<FieldPermissionResponse>>> {
    let table_id = TableId::new(table_id)?;
    let changes: Vec<FieldPermissionChange> = payload
        .permissions
        .into_iter()
        .map(FieldPermissionChange::from)
        .collect();

    let overrides = state
        .field_permission_service
        .batch_set_field_permissions(&user, &table_id, &changes)
        .await?;

    Ok(overrides_response(overrides))
}

pub async fn reset_field_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
) -> ApiResult<Json<RemovedFieldPermissionsResponse>> {
    let table_id = TableId::new(table_id)?;
    let removed = state
        .field_permission_service
        .reset_field_permissions(&user, &table_id)
        .await?;

    Ok(Json(RemovedFieldPermissionsResponse { removed }))
}

pub async fn clear_field_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<ClearFieldPermissionsRequest>,
) -> ApiResult<Json<Vec<FieldPermissionResponse>>> {
    let table_id = TableId::new(table_id)?;
    let roles = payload
        .roles
        .unwrap_or_default()
        .iter()
        .map(|role| Role::from_str(role))
        .collect::<AppResult<Vec<Role>>>()?;

    let overrides = state
        .field_permission_service
        .clear_field_permissions(&user, &table_id, &roles)
        .await?;

    Ok(overrides_response(overrides))
}

pub async fn apply_permission_template_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<ApplyPermissionTemplateRequest>,
) -> ApiResult<Json<Vec<FieldPermissionResponse>>> {
    let table_id = TableId::new(table_id)?;
    let template = PermissionTemplate::from_str(payload.template.as_str())?;

    let overrides = state
        .field_permission_service
        .apply_permission_template(&user, &table_id, template)
        .await?;

    Ok(overrides_response(overrides))
}

pub async fn set_action_for_all_fields_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(table_id): Path<String>,
    Json(payload): Json<SetActionForAllFieldsRequest>,
) -> ApiResult<Json<Vec<FieldPermissionResponse>>> {
    let table_id = TableId::new(table_id)?;
    let role = Role::from_str(payload.role.as_str())?;
    let action = FieldAction::from_str(payload.action.as_str())?;

    let overrides = state
        .field_permission_service
        .set_action_for_all_fields(&user, &table_id, role, action, payload.allowed)
        .await?;

    Ok(overrides_response(overrides))
}

pub async fn remove_field_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((table_id, field_id)): Path<(String, String)>,
) -> ApiResult<Json<RemovedFieldPermissionsResponse>> {
    let table_id = TableId::new(table_id)?;
    let field_id = FieldId::new(field_id)?;

    let removed = state
        .field_permission_service
        .remove_field_permissions(&user, &table_id, &field_id)
        .await?;

    Ok(Json(RemovedFieldPermissionsResponse { removed }))
}
