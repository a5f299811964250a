use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

mod common;

use common::User;

#[tokio::test]
async fn default_roles_are_seeded() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Roles").await?;

    let (status, body) = owner.get(&format!("/api/teams/{}/roles", team)).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|roles| roles.iter().filter_map(|r| r["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Administrator", "Editor", "Viewer"]);
    Ok(())
}

#[tokio::test]
async fn invalid_permission_keys_are_field_errors() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Bad Keys").await?;

    let (status, body) = owner
        .post(
            &format!("/api/teams/{}/roles", team),
            json!({ "name": "Broken", "permissions": ["articles:fly"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["permissions"].is_string());
    Ok(())
}

#[tokio::test]
async fn role_crud_round_trip() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Role Crud").await?;

    let (status, body) = owner
        .post(
            &format!("/api/teams/{}/roles", team),
            json!({ "name": "Publisher", "permissions": ["articles:read", "articles:publish"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let role_id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = owner
        .put(
            &format!("/api/teams/{}/roles/{}", team, role_id),
            json!({ "name": "Publisher", "description": "Ships articles", "permissions": ["articles:*"] }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Ships articles");

    let (status, _) = owner.delete(&format!("/api/teams/{}/roles/{}", team, role_id)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = owner.get(&format!("/api/teams/{}/roles/{}", team, role_id)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn editors_cannot_manage_roles() -> Result<()> {
    let owner = User::new("Owner").await?;
    let editor = User::new("Editor").await?;
    let team = owner.create_team("Escalation").await?;
    owner.add_member(&team, &editor, &["Editor"]).await?;

    let (status, _) = editor
        .post(
            &format!("/api/teams/{}/roles", team),
            json!({ "name": "Sneaky", "full_access": true }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
