use super::Project;

/// A client as seen through the projects that name it. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSummary {
    pub name: String,
    pub contact: String,
    pub project_count: usize,
}

/// Group projects by non-empty client name, in order of first appearance.
///
/// The contact is the first non-empty one seen among that client's projects.
pub fn summarize(projects: &[Project]) -> Vec<ClientSummary> {
    let mut clients: Vec<ClientSummary> = Vec::new();

    for project in projects.iter().filter(|p| !p.client.is_empty()) {
        match clients.iter_mut().find(|c| c.name == project.client) {
            Some(client) => {
                client.project_count += 1;
                if client.contact.is_empty() {
                    client.contact = project.contact.clone();
                }
            }
            None => clients.push(ClientSummary {
                name: project.client.clone(),
                contact: project.contact.clone(),
                project_count: 1,
            }),
        }
    }

    clients
}
