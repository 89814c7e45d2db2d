//! REST surface over the project store.
//!
//! | Method | Path             | Reply                      |
//! |--------|------------------|----------------------------|
//! | GET    | `/projects`      | every project, by id       |
//! | POST   | `/projects`      | created project, 201       |
//! | PUT    | `/projects/{id}` | updated project            |
//! | DELETE | `/projects/{id}` | `{ "success": true }`      |

mod error;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{get, put},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::{self, Database};
use crate::models::{NewProject, Project, ProjectFields};

pub use error::ApiError;

pub async fn list_projects(State(db): State<Database>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = db.list_projects().await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(db): State<Database>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let Json(payload) = payload?;
    let fields = payload.validate()?;

    let project = db.create_project(&fields).await?;
    tracing::info!(id = project.id, title = %project.title, "project created");

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectFields>, JsonRejection>,
) -> Result<Json<Project>, ApiError> {
    let Path(id) = id?;
    let Json(fields) = payload?;

    let project = db
        .update_project(id, &fields)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    tracing::info!(id, finished = project.finished, "project updated");

    Ok(Json(project))
}

/// Deleting an id that does not exist still succeeds
pub async fn delete_project(
    State(db): State<Database>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let removed = db.delete_project(id).await?;
    if removed == 0 {
        tracing::debug!(id, "delete matched no project");
    } else {
        tracing::info!(id, "project deleted");
    }

    Ok(Json(json!({ "success": true })))
}

pub fn router(db: Database) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", put(update_project).delete(delete_project))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

/// Open the store and serve the API until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let db = db::init(config).await?;
    tracing::info!(database = config.database_url(), "project store ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "project API listening");

    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("project API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Serve a fresh in-memory store on an ephemeral port, returning its base URL
#[cfg(test)]
pub(crate) async fn spawn_test_server() -> String {
    serve_database(Database::in_memory().await.unwrap()).await
}

#[cfg(test)]
async fn serve_database(db: Database) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(db)).await.unwrap();
    });

    format!("http://{addr}")
}
