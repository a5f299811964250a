#![allow(dead_code)]

use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cms_api_rust::auth::{encode_token, Claims};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

// The server runs under a small shell that kills it once its stdin closes.
// The shared server lives in a static and is never dropped, so closing the
// pipe when the test binary exits is what stops it.
const GUARD_SCRIPT: &str = "\"$0\" & server=$!; read _; kill $server";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
    guard: Option<ChildStdin>,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(GUARD_SCRIPT)
            .arg(env!("CARGO_BIN_EXE_cms-api-rust"))
            .env("APP_ENV", "development")
            .env("PORT", port.to_string())
            .env("CMS_JWT_SECRET", SECRET)
            .env_remove("CMS_SEED_FILE")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().context("failed to spawn server binary")?;
        let guard = child.stdin.take();

        Ok(Self {
            port,
            base_url,
            child,
            guard,
        })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        drop(self.guard.take());
        let _ = self.child.wait();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A caller with its own identity and bearer token.
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl User {
    pub async fn new(name: &str) -> Result<Self> {
        let server = ensure_server().await?;
        let id = Uuid::new_v4();
        let email = format!("{}-{}@example.com", name.to_lowercase(), id.simple());
        let claims = Claims::with_expiry(id, email.clone(), name, 1);
        let token = encode_token(&claims, SECRET)?;

        Ok(Self {
            id,
            email,
            name: name.to_string(),
            token,
            base_url: server.base_url.clone(),
            http: reqwest::Client::new(),
        })
    }

    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::DELETE, path, None).await
    }

    /// Create a team with a unique name; returns its slug.
    pub async fn create_team(&self, name: &str) -> Result<String> {
        let unique = format!("{} {}", name, &Uuid::new_v4().simple().to_string()[..8]);
        let (status, body) = self.post("/api/teams", serde_json::json!({ "name": unique })).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "team create failed: {} {}", status, body);
        body["data"]["slug"]
            .as_str()
            .map(str::to_string)
            .context("team slug missing")
    }

    /// Id of the team role with this name.
    pub async fn role_id(&self, team: &str, name: &str) -> Result<String> {
        let (_, body) = self.get(&format!("/api/teams/{}/roles", team)).await?;
        body["data"]
            .as_array()
            .and_then(|roles| roles.iter().find(|role| role["name"] == name))
            .and_then(|role| role["id"].as_str())
            .map(str::to_string)
            .with_context(|| format!("no role {}", name))
    }

    /// Add `other` to `team` with the named roles.
    pub async fn add_member(&self, team: &str, other: &User, roles: &[&str]) -> Result<()> {
        let mut role_ids = Vec::new();
        for role in roles {
            role_ids.push(self.role_id(team, role).await?);
        }
        let (status, body) = self
            .post(
                &format!("/api/teams/{}/members", team),
                serde_json::json!({
                    "user_id": other.id,
                    "email": other.email,
                    "display_name": other.name,
                    "role_ids": role_ids,
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "add member failed: {} {}", status, body);
        Ok(())
    }
}
