use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use placement_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placement_backend=info,tower_http=info".into()),
        )
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route(
            "/api/auth/me",
            get(routes::auth::me)
                .layer(axum::middleware::from_fn(auth::require_bearer_auth)),
        )
        .route(
            "/api/auth/complete-onboarding",
            post(routes::auth::complete_onboarding)
                .layer(axum::middleware::from_fn(auth::require_bearer_auth)),
        );

    let admin_api = Router::new()
        .route(
            "/api/admin/users",
            get(routes::admin::list_users).post(routes::admin::create_user),
        )
        .route(
            "/api/admin/users/bulk-create",
            post(routes::admin::bulk_create_users),
        )
        .route("/api/admin/users/export", get(routes::admin::export_users))
        .route(
            "/api/admin/users/:id",
            get(routes::admin::get_user).delete(routes::admin::delete_user),
        )
        .route(
            "/api/admin/skills",
            get(routes::admin::list_skills).post(routes::admin::create_skill),
        )
        .route(
            "/api/admin/skills/:id",
            patch(routes::admin::update_skill).delete(routes::admin::delete_skill),
        )
        .route(
            "/api/admin/skills/:id/bulk-marks-upload",
            post(routes::admin::bulk_marks_upload),
        )
        .route(
            "/api/admin/categories",
            get(routes::admin::list_categories).post(routes::admin::create_category),
        )
        .route(
            "/api/admin/categories/:id",
            patch(routes::admin::update_category).delete(routes::admin::delete_category),
        )
        .route(
            "/api/admin/settings/subskill-limit",
            get(routes::admin::get_subskill_limit).put(routes::admin::set_subskill_limit),
        )
        .route(
            "/api/admin/email-templates/:key",
            get(routes::admin::get_email_template).put(routes::admin::set_email_template),
        )
        .route("/api/admin/dashboard", get(routes::admin::dashboard))
        .layer(axum::middleware::from_fn(auth::require_admin));

    let school_api = Router::new()
        .route(
            "/api/school/profile",
            get(routes::school::get_profile).patch(routes::school::update_profile),
        )
        .route(
            "/api/school/jobs",
            get(routes::school::list_jobs).post(routes::school::create_job),
        )
        .route(
            "/api/school/jobs/:id",
            get(routes::school::get_job)
                .patch(routes::school::update_job)
                .delete(routes::school::delete_job),
        )
        .route(
            "/api/school/jobs/:id/status",
            post(routes::school::set_job_status),
        )
        .route(
            "/api/school/jobs/:id/applicants",
            get(routes::school::job_applicants),
        )
        .route(
            "/api/school/applicants/:id",
            get(routes::school::get_applicant),
        )
        .route(
            "/api/school/applications/:id/status",
            post(routes::school::update_application_status),
        )
        .route(
            "/api/school/applications/:id/schedule",
            post(routes::school::schedule_interview),
        )
        .layer(axum::middleware::from_fn(auth::require_school));

    let student_api = Router::new()
        .route("/api/student/dashboard", get(routes::student::dashboard))
        .route("/api/student/jobs", get(routes::student::browse_jobs))
        .route("/api/student/jobs/:id", get(routes::student::get_job))
        .route("/api/student/jobs/:id/apply", post(routes::student::apply))
        .route(
            "/api/student/applications",
            get(routes::student::list_applications),
        )
        .route(
            "/api/student/profile",
            get(routes::student::get_profile).patch(routes::student::update_profile),
        )
        .route(
            "/api/student/assessments",
            get(routes::student::list_assessments),
        )
        .layer(axum::middleware::from_fn(auth::require_student));

    let shared_api = Router::new()
        .route(
            "/api/notifications",
            get(routes::notifications::list).post(routes::notifications::create),
        )
        .route(
            "/api/notifications/:id/mark-as-read",
            post(routes::notifications::mark_as_read),
        )
        .route(
            "/api/help",
            get(routes::help::list).post(routes::help::create),
        )
        .route("/api/help/:id/resolve", patch(routes::help::resolve))
        .route("/api/upload/profile-image", post(routes::uploads::profile_image))
        .route("/api/upload/resume", post(routes::uploads::resume))
        .route("/api/upload/certificate", post(routes::uploads::certificate))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let uploads_dir = config.uploads_dir.clone();
    info!("Serving uploads from: {}", uploads_dir);

    let app = base_routes
        .merge(auth_api)
        .merge(admin_api)
        .merge(school_api)
        .merge(student_api)
        .merge(shared_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_dir),
        )
        .with_state(app_state)
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
