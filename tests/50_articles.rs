use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::User;

#[tokio::test]
async fn publish_lifecycle() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Articles").await?;
    let articles = format!("/api/teams/{}/articles", team);

    let (status, body) = owner.post(&articles, json!({ "title": "Hello World" })).await?;
    assert_eq!(status, StatusCode::CREATED);
    let hello = body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["data"]["slug"], "hello-world");
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["author_id"], owner.id.to_string());

    // Derived slugs are made unique, explicit ones conflict.
    let (_, body) = owner.post(&articles, json!({ "title": "Hello World" })).await?;
    assert_ne!(body["data"]["slug"], "hello-world");
    let (status, _) = owner
        .post(&articles, json!({ "title": "Other", "slug": "hello-world" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = owner.post(&format!("{}/{}/publish", articles, hello), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "published");
    assert!(body["data"]["published_at"].is_string());

    let (status, body) = owner.post(&format!("{}/{}/unpublish", articles, hello), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");
    assert!(body["data"]["published_at"].is_null());
    Ok(())
}

#[tokio::test]
async fn listing_and_find() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Article Find").await?;
    let articles = format!("/api/teams/{}/articles", team);

    let mut ids = Vec::new();
    for title in ["Alpha", "Beta", "Gamma"] {
        let (_, body) = owner.post(&articles, json!({ "title": title })).await?;
        ids.push(body["data"]["id"].as_str().unwrap_or_default().to_string());
    }
    owner.post(&format!("{}/{}/publish", articles, ids[1]), json!({})).await?;

    let (status, body) = owner.get(&format!("{}?status=published", articles)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "beta");

    let (status, body) = owner
        .post(
            &format!("/api/teams/{}/find/articles", team),
            json!({ "where": { "title": { "$in": ["Alpha", "Gamma"] } }, "limit": 1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

    let (status, body) = owner
        .post(
            &format!("/api/teams/{}/find/articles", team),
            json!({ "where": { "title": { "$bogus": 1 } } }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn trash_restore_and_purge() -> Result<()> {
    let owner = User::new("Owner").await?;
    let team = owner.create_team("Article Purge").await?;
    let articles = format!("/api/teams/{}/articles", team);

    let (_, body) = owner.post(&articles, json!({ "title": "Linked" })).await?;
    let article_id = body["data"]["id"].clone();
    let linked = format!("{}/{}", articles, article_id.as_str().unwrap_or_default());
    owner.post(&format!("{}/publish", linked), json!({})).await?;

    let link = json!({ "label": "Read", "link": { "type": "article", "article_id": article_id } });
    let (status, _) = owner
        .post(&format!("/api/teams/{}/navigation/main/items", team), link)
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    // Purging requires the article to be trashed first.
    let (status, _) = owner.delete(&linked).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = owner.post(&format!("{}/trash", linked), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["trashed_at"].is_string());

    let (_, body) = owner.get(&articles).await?;
    assert_eq!(body["data"]["total"], 0);

    let (status, body) = owner.post(&format!("{}/restore", linked), json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["trashed_at"].is_null());

    owner.post(&format!("{}/trash", linked), json!({})).await?;
    let (status, body) = owner.delete(&linked).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["links_removed"], 1);

    let (_, body) = owner.get(&format!("/api/teams/{}/navigation/main", team)).await?;
    assert_eq!(body["data"]["items"], Value::Array(Vec::new()));
    Ok(())
}
