use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use timesheet_core::grid::WeekWindow;
use timesheet_core::models::{
    CreateEntryCommand, EntryId, Phase, PhaseId, Project, ProjectId, Task, TimeEntry,
};
use timesheet_core::{BackendError, DateKey, TimesheetBackend};

use crate::dto::{
    CreateEntryRequest, CreatedEntryDto, PhaseListDto, ProjectListDto, TaskListDto,
    TimesheetListDto,
};

/// REST adapter for the timesheet service, authenticated with a static
/// bearer token.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<&str>) -> anyhow::Result<Self> {
        // A trailing slash keeps any path prefix when joining endpoints.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid API URL: {}", base_url))?;
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BackendError::request(format!("failed to build URL for {path}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, call_name: &str) -> Result<Response, BackendError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BackendError::request(format!("failed to call {call_name}: {e}")))?;
        check_status(response.status(), call_name)?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T, BackendError> {
        let response = self.send(request, call_name).await?;
        response.json::<T>().await.map_err(|e| {
            BackendError::invalid_response(format!("failed to parse {call_name} response: {e}"))
        })
    }
}

fn check_status(status: StatusCode, call_name: &str) -> Result<(), BackendError> {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(BackendError::Unauthorized);
    }
    if !status.is_success() {
        return Err(BackendError::request(format!("{call_name} returned {status}")));
    }
    Ok(())
}

#[async_trait]
impl TimesheetBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_week_entries(&self, window: WeekWindow) -> Result<Vec<TimeEntry>, BackendError> {
        let from = DateKey::new(window.monday()).to_string();
        let to = DateKey::new(window.sunday()).to_string();
        let list: TimesheetListDto = self
            .get_json(
                self.client
                    .get(self.endpoint("api/timesheets")?)
                    .query(&[("from", &from), ("to", &to)]),
                "GET /api/timesheets",
            )
            .await?;

        let entries = list
            .timesheets
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                TimeEntry::try_from(row)
                    .inspect_err(|error| warn!(id, %error, "skipping malformed timesheet row"))
                    .ok()
            })
            .collect();
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn fetch_active_projects(&self) -> Result<Vec<Project>, BackendError> {
        let list: ProjectListDto = self
            .get_json(
                self.client.get(self.endpoint("api/projects")?),
                "GET /api/projects",
            )
            .await?;
        Ok(list.projects.into_iter().map(Project::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_phases(&self, project: ProjectId) -> Result<Vec<Phase>, BackendError> {
        let list: PhaseListDto = self
            .get_json(
                self.client
                    .get(self.endpoint(&format!("api/projects/{project}/phases"))?),
                "GET /api/projects/{id}/phases",
            )
            .await?;
        Ok(list.phases.into_iter().map(Phase::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_tasks(&self, phase: PhaseId) -> Result<Vec<Task>, BackendError> {
        let list: TaskListDto = self
            .get_json(
                self.client
                    .get(self.endpoint(&format!("api/phases/{phase}/tasks"))?),
                "GET /api/phases/{id}/tasks",
            )
            .await?;
        Ok(list.tasks.into_iter().map(Task::from).collect())
    }

    #[instrument(skip(self, command), fields(date = %command.date))]
    async fn submit_entry(&self, command: &CreateEntryCommand) -> Result<EntryId, BackendError> {
        let created: CreatedEntryDto = self
            .get_json(
                self.client
                    .post(self.endpoint("api/timesheets")?)
                    .json(&CreateEntryRequest::from(command)),
                "POST /api/timesheets",
            )
            .await?;
        Ok(EntryId::new(created.id))
    }
}
