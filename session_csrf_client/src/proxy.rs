use std::sync::Arc;

use headers::{Cookie, HeaderMapExt};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde::Deserialize;

use super::errors::ClientError;

pub const DEFAULT_CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
pub const DEFAULT_CSRF_HEADER_NAME: &str = "x-xsrf-token";

const LANDING_ROUTE: &str = "/";

#[derive(Deserialize)]
struct LogoutBody {
    redirect: String,
}

#[derive(Deserialize)]
struct UserStatusBody {
    authenticated: bool,
    user: Option<String>,
}

/// Client-side session agent.
///
/// Cookies live in a shared jar, so the session cookie and the CSRF cookie
/// follow whatever the server last issued. Redirects are not followed; the
/// caller sees the `3xx` response and its cookies.
pub struct SessionProxy {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    csrf_cookie_name: String,
    csrf_header_name: String,
    authenticated: bool,
    user: Option<String>,
    route: String,
}

impl SessionProxy {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_names(base_url, DEFAULT_CSRF_COOKIE_NAME, DEFAULT_CSRF_HEADER_NAME)
    }

    /// Same as [`SessionProxy::new`] for servers that rename the CSRF cookie or header.
    pub fn with_names(
        base_url: &str,
        csrf_cookie_name: &str,
        csrf_header_name: &str,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Url(e.to_string()))?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url,
            csrf_cookie_name: csrf_cookie_name.to_string(),
            csrf_header_name: csrf_header_name.to_string(),
            authenticated: false,
            user: None,
            route: LANDING_ROUTE.to_string(),
        })
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Route the UI should currently show
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Current CSRF cookie value, as the server last issued it.
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base_url)?;
        cookie_value(cookies, &self.csrf_cookie_name)
    }

    /// Replaces the local login state with what the server reports.
    pub async fn refresh(&mut self) -> Result<bool, ClientError> {
        let response = self.send(Method::GET, "/user").await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let body: UserStatusBody = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.authenticated = body.authenticated;
        self.user = body.user;
        Ok(self.authenticated)
    }

    /// Sends a request relative to the base URL.
    ///
    /// State-changing methods carry the CSRF cookie value in the CSRF header.
    /// The response is returned whatever its status.
    pub async fn send(&self, method: Method, path: &str) -> Result<Response, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Url(e.to_string()))?;

        let mut request = self.client.request(method.clone(), url);
        if !method.is_safe() {
            match self.csrf_token() {
                Some(token) => request = request.header(self.csrf_header_name.as_str(), token),
                None => tracing::debug!("No CSRF cookie to echo for {} {}", method, path),
            }
        }

        Ok(request.send().await?)
    }

    /// Logs out.
    ///
    /// The local state is cleared whatever the outcome: an uncertain logout
    /// must not leave the UI claiming to be logged in. On failure the route
    /// falls back to `/` and the error is returned for diagnostics.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = self.request_logout().await;

        self.authenticated = false;
        self.user = None;

        match result {
            Ok(landing) => {
                self.route = landing;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Logout failed, continuing as logged out: {}", e);
                self.route = LANDING_ROUTE.to_string();
                Err(e)
            }
        }
    }

    async fn request_logout(&self) -> Result<String, ClientError> {
        let response = self.send(Method::POST, "/logout").await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let body: LogoutBody = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(body.redirect)
    }
}

fn cookie_value(cookies: HeaderValue, name: &str) -> Option<String> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, cookies);
    headers
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(name).map(str::to_string))
}
