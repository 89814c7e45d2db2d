use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{NewProject, Project, ProjectFields};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API replied {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("project {0} is not on the board")]
    UnknownProject(i64),
}

/// The four calls the dashboard makes against the project API
#[allow(async_fn_in_trait)]
pub trait ProjectApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError>;
    async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError>;
    async fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<Project, ClientError>;
    async fn delete_project(&self, id: i64) -> Result<(), ClientError>;
}

/// HTTP client for a running project API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn project_url(&self, id: i64) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }
}

/// Turn a non-2xx reply into `ClientError::Api`, keeping the `{ error }` message
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(ClientError::Api { status, message })
}

impl ProjectApi for ApiClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        let response = self.http.get(self.projects_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
        let response = self.http.post(self.projects_url()).json(project).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<Project, ClientError> {
        let response = self.http.put(self.project_url(id)).json(fields).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
        let response = self.http.delete(self.project_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::spawn_test_server;

    fn website() -> NewProject {
        NewProject {
            title: Some("Website".into()),
            deadline: Some("2024-12-01".into()),
            person: Some("Alice".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn round_trips_against_a_live_api() {
        let api = ApiClient::new(spawn_test_server().await);

        let created = api.create_project(&website()).await.unwrap();
        assert_eq!(created.id, 1);

        let fields = ProjectFields {
            finished: true,
            ..created.fields()
        };
        let updated = api.update_project(created.id, &fields).await.unwrap();
        assert!(updated.finished);
        assert_eq!(api.list_projects().await.unwrap(), vec![updated]);

        api.delete_project(created.id).await.unwrap();
        assert!(api.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let api = ApiClient::new(spawn_test_server().await);

        let err = api.create_project(&NewProject::default()).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Missing required fields: title, deadline, person");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = api
            .update_project(5, &website().validate().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:1");
        let err = api.list_projects().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
