use crate::client::{ClientError, ProjectApi};
use crate::models::{self, ClientSummary, NewProject, Project, ProjectFields};

/// The dashboard's snapshot of every project, kept in step with the API.
///
/// The snapshot only changes after the API confirms a call, so a failed
/// call leaves it exactly as it was. Mutations take `&mut self`; two of them
/// can never be in flight on the same board.
pub struct ProjectBoard<A> {
    api: A,
    projects: Vec<Project>,
}

impl<A: ProjectApi> ProjectBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            projects: Vec::new(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn clients(&self) -> Vec<ClientSummary> {
        models::summarize_clients(&self.projects)
    }

    /// Replace the snapshot with the API's full list
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let projects = self
            .api
            .list_projects()
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "failed to load projects"))?;

        tracing::debug!(count = projects.len(), "project list refreshed");
        self.projects = projects;
        Ok(())
    }

    /// Create a project and append the API's copy of it
    pub async fn add(&mut self, project: NewProject) -> Result<&Project, ClientError> {
        let created = self
            .api
            .create_project(&project)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "failed to create project"))?;

        tracing::debug!(id = created.id, "project added to board");
        self.projects.push(created);
        Ok(&self.projects[self.projects.len() - 1])
    }

    /// Flip `finished` on a project already on the board
    pub async fn toggle_finish(&mut self, id: i64) -> Result<&Project, ClientError> {
        let index = self
            .position(id)
            .ok_or(ClientError::UnknownProject(id))
            .inspect_err(|err| tracing::warn!(error = %err, "cannot toggle project"))?;

        let current = &self.projects[index];
        let fields = ProjectFields {
            finished: !current.finished,
            ..current.fields()
        };
        let updated = self
            .api
            .update_project(id, &fields)
            .await
            .inspect_err(|err| tracing::warn!(id, error = %err, "failed to update project"))?;

        self.projects[index] = updated;
        Ok(&self.projects[index])
    }

    /// Delete a project and drop it from the board
    pub async fn remove(&mut self, id: i64) -> Result<(), ClientError> {
        self.api
            .delete_project(id)
            .await
            .inspect_err(|err| tracing::warn!(id, error = %err, "failed to delete project"))?;

        self.projects.retain(|p| p.id != id);
        Ok(())
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqwest::StatusCode;

    use super::*;
    use crate::api::spawn_test_server;
    use crate::client::ApiClient;

    /// Keeps projects in memory and can be told to fail every call
    #[derive(Default)]
    struct FakeApi {
        rows: Mutex<Vec<Project>>,
        next_id: Mutex<i64>,
        failing: Mutex<bool>,
        calls: Mutex<usize>,
    }

    impl FakeApi {
        fn fail(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn begin(&self) -> Result<(), ClientError> {
            *self.calls.lock().unwrap() += 1;
            if *self.failing.lock().unwrap() {
                Err(ClientError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Database error".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl ProjectApi for &FakeApi {
        async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
            self.begin()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create_project(&self, project: &NewProject) -> Result<Project, ClientError> {
            self.begin()?;
            let fields = project.clone().validate().map_err(|err| ClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            })?;
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let created = Project {
                id: *next_id,
                title: fields.title,
                description: fields.description,
                deadline: fields.deadline,
                person: fields.person,
                client: fields.client,
                contact: fields.contact,
                achievements: fields.achievements,
                price: fields.price,
                finished: fields.finished,
            };
            self.rows.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<Project, ClientError> {
            self.begin()?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(ClientError::Api {
                    status: StatusCode::NOT_FOUND,
                    message: format!("Project {id} not found"),
                })?;
            row.finished = fields.finished;
            row.title = fields.title.clone();
            Ok(row.clone())
        }

        async fn delete_project(&self, id: i64) -> Result<(), ClientError> {
            self.begin()?;
            self.rows.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    fn draft(title: &str, client: &str, contact: &str) -> NewProject {
        NewProject {
            title: Some(title.into()),
            deadline: Some("2024-12-01".into()),
            person: Some("Alice".into()),
            client: Some(client.into()),
            contact: Some(contact.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_appends_the_confirmed_record() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);

        let added = board.add(draft("Website", "", "")).await.unwrap().clone();
        assert_eq!(added.id, 1);
        assert_eq!(added.description, "");
        assert_eq!(board.projects(), &[added]);
    }

    #[tokio::test]
    async fn refresh_replaces_the_snapshot() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);
        board.add(draft("Local", "", "")).await.unwrap();

        api.rows.lock().unwrap().clear();
        board.refresh().await.unwrap();
        assert!(board.projects().is_empty());
    }

    #[tokio::test]
    async fn toggle_finish_replaces_the_entry_in_place() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);
        board.add(draft("First", "", "")).await.unwrap();
        board.add(draft("Second", "", "")).await.unwrap();

        let toggled = board.toggle_finish(1).await.unwrap();
        assert!(toggled.finished);
        assert!(board.projects()[0].finished);
        assert_eq!(board.projects()[0].title, "First");
        assert!(!board.projects()[1].finished);

        board.toggle_finish(1).await.unwrap();
        assert!(!board.projects()[0].finished);
    }

    #[tokio::test]
    async fn toggle_of_unknown_project_makes_no_call() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);

        let err = board.toggle_finish(9).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownProject(9)));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn remove_drops_the_entry() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);
        board.add(draft("First", "", "")).await.unwrap();
        board.add(draft("Second", "", "")).await.unwrap();

        board.remove(1).await.unwrap();
        let titles: Vec<&str> = board.projects().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Second"]);
    }

    #[tokio::test]
    async fn failed_calls_leave_the_snapshot_alone() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);
        board.add(draft("Website", "", "")).await.unwrap();
        let before = board.projects().to_vec();

        api.fail(true);
        assert!(board.refresh().await.is_err());
        assert!(board.add(draft("Other", "", "")).await.is_err());
        assert!(board.toggle_finish(1).await.is_err());
        assert!(board.remove(1).await.is_err());
        assert_eq!(board.projects(), before.as_slice());
    }

    #[tokio::test]
    async fn rejected_draft_is_not_added() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);

        assert!(board.add(NewProject::default()).await.is_err());
        assert!(board.projects().is_empty());
    }

    #[tokio::test]
    async fn derived_views_follow_the_snapshot() {
        let api = FakeApi::default();
        let mut board = ProjectBoard::new(&api);
        board.add(draft("One", "Acme", "a@x")).await.unwrap();
        board.add(draft("Two", "Acme", "")).await.unwrap();
        board.add(draft("Three", "Beta", "b@x")).await.unwrap();

        let clients = board.clients();
        assert_eq!(clients.len(), 2);
        assert_eq!((clients[0].name.as_str(), clients[0].project_count), ("Acme", 2));
        assert_eq!(clients[0].contact, "a@x");

        board.remove(3).await.unwrap();
        assert_eq!(board.clients().len(), 1);
        assert_eq!(board.projects().len(), 2);
    }

    #[tokio::test]
    async fn board_stays_in_step_with_a_live_api() {
        let base = spawn_test_server().await;
        let mut board = ProjectBoard::new(ApiClient::new(base.clone()));
        board.refresh().await.unwrap();
        assert!(board.projects().is_empty());

        let id = board.add(draft("Website", "Acme", "a@x")).await.unwrap().id;
        board.toggle_finish(id).await.unwrap();

        let mut other = ProjectBoard::new(ApiClient::new(base));
        other.refresh().await.unwrap();
        assert_eq!(other.projects(), board.projects());
        assert!(other.projects()[0].finished);

        board.remove(id).await.unwrap();
        other.refresh().await.unwrap();
        assert!(other.projects().is_empty());
    }
}
