use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use products_hr::{
    HrModule,
    employee::Employee,
    forms::{FormErrors, LoginForm, SignupForm},
};
use serde::Serialize;
use time::Duration as TimeDuration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    graphql::SchemaType,
    session::{Session, SessionHandle, SessionLookup, SessionStore},
};

const SESSION_COOKIE: &str = "__Host-dayflow_session";

#[derive(Clone)]
pub struct AppState {
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
    pub hr: Arc<HrModule>,
    pub sessions: SessionStore,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "dayflow server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    let cors = CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin);
    // Credentials cannot be combined with a wildcard origin.
    if origins.is_empty() {
        cors
    } else {
        cors.allow_credentials(true)
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(login_handler))
        .route("/signup", post(signup_handler))
        .route("/logout", post(logout_handler))
        .route("/graphql", post(graphql_handler))
        .route_service("/graphql/ws", GraphQLSubscription::new(state.schema.clone()))
        .route("/graphiql", get(graphiql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Any non-empty credentials are accepted. A login id or email that matches
/// the roster signs in as that employee, anything else as the default viewer.
async fn login_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<LoginForm>,
) -> HttpResult<(PrivateCookieJar, StatusCode)> {
    form.validate().map_err(HttpError::form)?;
    tokio::time::sleep(state.config.login_delay).await;
    let viewer = find_employee(state.hr.employees(), &form.login_id)
        .map(|e| e.id.clone())
        .unwrap_or_else(|| state.config.default_viewer.clone());
    let jar = start_session(&state, jar, viewer).await;
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn signup_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Json(form): Json<SignupForm>,
) -> HttpResult<(PrivateCookieJar, StatusCode)> {
    form.validate().map_err(HttpError::form)?;
    tokio::time::sleep(state.config.signup_delay).await;
    info!(
        company = %form.company_name,
        strength = form.password_strength(),
        "signup accepted"
    );
    let viewer = state.config.default_viewer.clone();
    let jar = start_session(&state, jar, viewer).await;
    Ok((jar, StatusCode::NO_CONTENT))
}

fn find_employee<'e>(employees: &'e [Employee], login: &str) -> Option<&'e Employee> {
    let login = login.trim();
    employees
        .iter()
        .find(|e| e.login_id.eq_ignore_ascii_case(login) || e.email.eq_ignore_ascii_case(login))
}

async fn start_session(state: &AppState, jar: PrivateCookieJar, viewer: String) -> PrivateCookieJar {
    let session = Session::new(&state.hr, viewer.clone(), state.config.default_role);
    let session_id = state.sessions.create(session).await;
    info!(%viewer, role = %state.config.default_role, "session started");
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(state.sessions.ttl().num_seconds()))
        .build();
    jar.add(cookie)
}

async fn logout_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> HttpResult<(PrivateCookieJar, StatusCode)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
            if state.sessions.remove(&session_id).await {
                let active = state.sessions.len().await;
                info!(active, "session ended");
            }
        }
    }
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn graphql_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: GraphQLRequest,
) -> HttpResult<GraphQLResponse> {
    let session = load_session(&state, &jar).await?;
    let req = request.into_inner().data(session);
    let response = state.schema.execute(req).await;
    Ok(GraphQLResponse::from(response))
}

async fn graphiql_handler() -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    )
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

async fn load_session(state: &AppState, jar: &PrivateCookieJar) -> HttpResult<SessionHandle> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| HttpError::new(StatusCode::UNAUTHORIZED, "missing session"))?;
    let session_id = Uuid::parse_str(cookie.value())
        .map_err(|_| HttpError::new(StatusCode::UNAUTHORIZED, "invalid session"))?;
    match state.sessions.get(&session_id).await {
        SessionLookup::Active(handle) => Ok(handle),
        SessionLookup::Expired => Err(HttpError::new(StatusCode::UNAUTHORIZED, "session expired")),
        SessionLookup::Missing => Err(HttpError::new(StatusCode::UNAUTHORIZED, "session not found")),
    }
}

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
    fields: Option<FormErrors>,
}

impl HttpError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            fields: None,
        }
    }

    fn form(errors: FormErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: errors.to_string(),
            fields: Some(errors),
        }
    }
}

#[derive(Serialize)]
struct FormErrorBody {
    errors: FormErrors,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self.fields {
            Some(errors) => (self.status, Json(FormErrorBody { errors })).into_response(),
            None => (self.status, self.message).into_response(),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::graphql::{GraphqlData, build_schema};

    fn state() -> AppState {
        state_with(AppConfig::for_tests())
    }

    fn state_with(config: AppConfig) -> AppState {
        let hr = Arc::new(HrModule::seeded(config.dataset));
        let schema = build_schema(GraphqlData {
            hr: hr.clone(),
            leave_allowance: config.leave_allowance,
        });
        AppState {
            schema,
            cookie_key: config.cookie_key.clone(),
            sessions: SessionStore::new(config.session_ttl),
            hr,
            config: Arc::new(config),
        }
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let raw = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let router = build_router(state());
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn blank_login_lists_every_field() {
        let router = build_router(state());
        let response = router
            .oneshot(json_request("/login", json!({"loginId": "", "password": " "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"errors": {
                "loginId": "Login ID or Email is required",
                "password": "Password is required"
            }})
        );
    }

    #[tokio::test]
    async fn graphql_requires_a_session() {
        let router = build_router(state());
        let response = router
            .oneshot(json_request("/graphql", json!({"query": "{ viewer { role } }"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_then_query_then_logout() {
        let state = state();
        let router = build_router(state.clone());

        let login = router
            .clone()
            .oneshot(json_request(
                "/login",
                json!({"loginId": "dsjodo20220002", "password": "secret"}),
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::NO_CONTENT);
        let cookie = session_cookie(&login);
        assert_eq!(state.sessions.len().await, 1);

        let mut query = json_request("/graphql", json!({"query": "{ viewer { employeeId role } }"}));
        query
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = router.clone().oneshot(query).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["data"],
            json!({"viewer": {"employeeId": "EMP002", "role": "ADMIN"}})
        );

        let mut logout = Request::post("/logout").body(Body::empty()).unwrap();
        logout
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = router.clone().oneshot(logout).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len().await, 0);

        let mut again = json_request("/graphql", json!({"query": "{ viewer { role } }"}));
        again
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = router.oneshot(again).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized() {
        let mut config = AppConfig::for_tests();
        config.session_ttl = chrono::Duration::zero();
        let state = state_with(config);
        let router = build_router(state.clone());

        let login = router
            .clone()
            .oneshot(json_request("/login", json!({"loginId": "EMP", "password": "x"})))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::NO_CONTENT);
        let cookie = session_cookie(&login);

        let mut query = json_request("/graphql", json!({"query": "{ viewer { role } }"}));
        query
            .headers_mut()
            .insert(header::COOKIE, cookie.parse().unwrap());
        let response = router.oneshot(query).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn signup_with_all_fields_starts_a_session() {
        let router = build_router(state());
        let response = router
            .oneshot(json_request(
                "/signup",
                json!({
                    "companyName": "Dayflow",
                    "name": "New Hire",
                    "email": "new@dayflow.example",
                    "phone": "123",
                    "password": "Secret1!",
                    "confirmPassword": "Secret1!"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
