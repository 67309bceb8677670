//! Test doubles: a loopback HTTP responder for real reqwest round trips and
//! an identity provider that always says yes.

use chrono::{Duration, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::auth::jwt::unsigned_token;
use crate::auth::{
    AuthError, AuthGrant, FederatedCredential, IdentityProvider, ProfileChanges, TokenGrant,
};

/// Accept a single connection on a loopback port, answer it with `status`
/// (e.g. `"404 Not Found"`) and a JSON `body`, and hand back the raw request.
pub(crate) async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let (base, requests) = serve(status, body, 1).await;
    let handle = tokio::spawn(async move { requests.await.unwrap().remove(0) });
    (base, handle)
}

/// Like [`serve_once`], for `connections` requests that all get the same answer.
pub(crate) async fn serve(
    status: &str,
    body: &str,
    connections: usize,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let mut requests = Vec::with_capacity(connections);
        for _ in 0..connections {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Identity provider that signs anyone in and always refreshes successfully.
pub(crate) struct StubIdentity;

#[async_trait::async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        self.sign_in_with_password(email, password).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthGrant, AuthError> {
        Ok(AuthGrant {
            uid: "uid-stub".to_string(),
            email: email.to_string(),
            display_name: Some("Ada".to_string()),
            photo_url: None,
            id_token: fresh_token(),
            refresh_token: "rt-stub".to_string(),
        })
    }

    async fn sign_in_with_idp(
        &self,
        _credential: &FederatedCredential,
    ) -> Result<AuthGrant, AuthError> {
        self.sign_in_with_password("fed@example.org", "").await
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AuthError> {
        Ok(TokenGrant {
            id_token: fresh_token(),
            refresh_token: None,
        })
    }

    async fn update_profile(
        &self,
        _id_token: &str,
        _changes: &ProfileChanges,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

fn fresh_token() -> String {
    unsigned_token((Utc::now() + Duration::hours(1)).timestamp())
}
