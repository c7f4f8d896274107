use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::PlannerConfig;
use crate::core::error::PlannerError;
use crate::db::{Task, TeamMember};
use crate::planner::SprintPlanner;
use crate::planning::AllocationRequest;
use crate::prediction::features::parse_date;


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct SprintIdParams {
    #[schemars(description = "Sprint UUID")]
    pub sprint_id: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct PageParams {
    #[schemars(description = "Rows to skip (default: 0)")]
    pub skip: Option<usize>,
    #[schemars(description = "Max rows (default: 100)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct CreateSprintParams {
    #[schemars(description = "First day of the sprint, YYYY-MM-DD")]
    pub start_date: String,
    #[schemars(description = "Last day of the sprint, YYYY-MM-DD (not before start_date)")]
    pub end_date: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Task title")]
    pub title: String,
    #[schemars(description = "Optional longer description")]
    pub description: Option<String>,
    #[schemars(description = "Estimated effort in hours (>= 0)")]
    pub estimated_hours: f64,
    #[schemars(description = "Whether the task is already done (default: false)")]
    pub completed: Option<bool>,
    #[schemars(description = "Sprint UUID the task belongs to")]
    pub sprint_id: Option<String>,
    #[schemars(description = "User story UUID the task belongs to")]
    pub user_story_id: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct CreateUserStoryParams {
    #[schemars(description = "Story text, e.g. 'As a user I want ...'")]
    pub story: String,
    #[schemars(description = "Sprint UUID the story is planned into")]
    pub sprint_id: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ListUserStoriesParams {
    #[schemars(description = "Only stories of this sprint (ignores paging)")]
    pub sprint_id: Option<String>,
    #[schemars(description = "Rows to skip (default: 0)")]
    pub skip: Option<usize>,
    #[schemars(description = "Max rows (default: 100)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct MemberParams {
    #[schemars(description = "Display name")]
    pub name: String,
    #[schemars(description = "Skill labels, e.g. ['rust', 'sql']")]
    pub skills: Vec<String>,
    #[schemars(description = "Remaining capacity in hours")]
    pub available_hours: f64,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct UpdateMemberParams {
    #[schemars(description = "Team member UUID")]
    pub member_id: String,
    #[schemars(description = "Display name")]
    pub name: String,
    #[schemars(description = "Skill labels")]
    pub skills: Vec<String>,
    #[schemars(description = "Remaining capacity in hours")]
    pub available_hours: f64,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct MemberIdParams {
    #[schemars(description = "Team member UUID")]
    pub member_id: String,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AllocationTaskParams {
    #[schemars(description = "Task UUID")]
    pub task_id: String,
    #[schemars(description = "Skills a member must have to take the task")]
    pub required_skills: Vec<String>,
    #[schemars(description = "Estimated effort in hours")]
    pub estimated_hours: f64,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AllocationMemberParams {
    #[schemars(description = "Team member UUID")]
    pub id: String,
    #[schemars(description = "Display name")]
    pub name: String,
    #[schemars(description = "Skill labels")]
    pub skills: Vec<String>,
    #[schemars(description = "Remaining capacity in hours")]
    pub available_hours: f64,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AllocateTasksParams {
    #[schemars(description = "Tasks to allocate, in priority order")]
    pub tasks: Vec<AllocationTaskParams>,
    #[schemars(
        description = "Team snapshot in preference order. Omit to allocate against the stored team and persist the reduced capacities"
    )]
    pub team_members: Option<Vec<AllocationMemberParams>>,
}


#[derive(Clone)]
pub struct SprintPlannerMcpServer {
    planner: Arc<SprintPlanner>,
    tool_router: ToolRouter<Self>,
}

impl SprintPlannerMcpServer {

    pub fn new(planner: SprintPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
            tool_router: Self::tool_router(),
        }
    }


    fn convert_error(err: PlannerError) -> McpError {
        match err {
            PlannerError::NotFound(msg) => McpError::resource_not_found(msg, None),
            PlannerError::Validation(msg) => McpError::invalid_params(msg, None),
            err @ PlannerError::DivisionUndefined(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            other => McpError::internal_error(other.to_string(), None),
        }
    }


    fn parse_id(raw: &str, field: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(raw.trim()).map_err(|e| {
            McpError::invalid_params(format!("{field} is not a valid UUID: {e}"), None)
        })
    }

    fn parse_optional_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, McpError> {
        raw.map(|r| Self::parse_id(r, field)).transpose()
    }


    fn result_to_json<T: Serialize>(result: T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl SprintPlannerMcpServer {

    #[tool(description = "Create a sprint. Returns: {id, start_date, end_date}")]
    async fn create_sprint(
        &self,
        Parameters(params): Parameters<CreateSprintParams>,
    ) -> Result<CallToolResult, McpError> {
        let start = parse_date(&params.start_date).map_err(Self::convert_error)?;
        let end = parse_date(&params.end_date).map_err(Self::convert_error)?;

        let sprint = self
            .planner
            .create_sprint(start, end)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&sprint)
    }


    #[tool(description = "List sprints with paging. Returns: [{id, start_date, end_date}]")]
    async fn list_sprints(
        &self,
        Parameters(params): Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprints = self
            .planner
            .list_sprints(params.skip, params.limit)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&sprints)
    }


    #[tool(description = "Create a task, optionally inside a sprint and user story. Returns the stored task")]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut task = Task::new(params.title, params.estimated_hours)
            .completed(params.completed.unwrap_or(false));
        task.description = params.description;
        task.sprint_id = Self::parse_optional_id(params.sprint_id.as_deref(), "sprint_id")?;
        task.user_story_id =
            Self::parse_optional_id(params.user_story_id.as_deref(), "user_story_id")?;

        let task = self.planner.create_task(task).await.map_err(Self::convert_error)?;
        info!("📝 Task created: {}", task.id);
        Self::result_to_json(&task)
    }


    #[tool(description = "List tasks with paging. Returns: [{id, title, estimated_hours, completed, ...}]")]
    async fn list_tasks(
        &self,
        Parameters(params): Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let tasks = self
            .planner
            .list_tasks(params.skip, params.limit)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&tasks)
    }


    #[tool(description = "Create a user story, optionally planned into a sprint. Returns: {id, story, sprint_id}")]
    async fn create_user_story(
        &self,
        Parameters(params): Parameters<CreateUserStoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprint_id = Self::parse_optional_id(params.sprint_id.as_deref(), "sprint_id")?;
        let story = self
            .planner
            .create_user_story(params.story, sprint_id)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&story)
    }


    #[tool(description = "List user stories, either all (paged) or those of one sprint. Returns: [{id, story, sprint_id}]")]
    async fn list_user_stories(
        &self,
        Parameters(params): Parameters<ListUserStoriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let stories = match Self::parse_optional_id(params.sprint_id.as_deref(), "sprint_id")? {
            Some(sprint_id) => self.planner.user_stories_for_sprint(sprint_id).await,
            None => self.planner.list_user_stories(params.skip, params.limit).await,
        }
        .map_err(Self::convert_error)?;
        Self::result_to_json(&stories)
    }


    #[tool(description = "Add a team member. Returns: {id, name, skills, available_hours}")]
    async fn create_member(
        &self,
        Parameters(params): Parameters<MemberParams>,
    ) -> Result<CallToolResult, McpError> {
        let member = self
            .planner
            .create_member(TeamMember::new(params.name, params.skills, params.available_hours))
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&member)
    }


    #[tool(description = "List team members with paging. Returns: [{id, name, skills, available_hours}]")]
    async fn list_members(
        &self,
        Parameters(params): Parameters<PageParams>,
    ) -> Result<CallToolResult, McpError> {
        let members = self
            .planner
            .list_members(params.skip, params.limit)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&members)
    }


    #[tool(description = "Replace a team member's name, skills and capacity. Returns the updated member")]
    async fn update_member(
        &self,
        Parameters(params): Parameters<UpdateMemberParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = Self::parse_id(&params.member_id, "member_id")?;
        let skills: BTreeSet<String> = params.skills.into_iter().collect();
        let member = self
            .planner
            .update_member(id, params.name, skills, params.available_hours)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&member)
    }


    #[tool(description = "Remove a team member. Returns the deleted member")]
    async fn delete_member(
        &self,
        Parameters(params): Parameters<MemberIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = Self::parse_id(&params.member_id, "member_id")?;
        let member = self.planner.delete_member(id).await.map_err(Self::convert_error)?;
        Self::result_to_json(&member)
    }


    #[tool(description = "Greedy first-fit allocation of tasks to members by skills and remaining hours. Returns: {results: [{task_id, assigned_member_id, message}], members}")]
    async fn allocate_tasks(
        &self,
        Parameters(params): Parameters<AllocateTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let requests = params
            .tasks
            .into_iter()
            .map(|t| -> Result<AllocationRequest, McpError> {
                Ok(AllocationRequest::new(
                    Self::parse_id(&t.task_id, "task_id")?,
                    t.required_skills,
                    t.estimated_hours,
                ))
            })
            .collect::<Result<Vec<_>, McpError>>()?;

        let batch = match params.team_members {
            Some(members) => {
                let members = members
                    .into_iter()
                    .map(|m| -> Result<TeamMember, McpError> {
                        Ok(TeamMember {
                            id: Self::parse_id(&m.id, "team_members.id")?,
                            name: m.name,
                            skills: m.skills.into_iter().collect(),
                            available_hours: m.available_hours,
                        })
                    })
                    .collect::<Result<Vec<_>, McpError>>()?;
                self.planner
                    .allocate_tasks(&requests, members)
                    .map_err(Self::convert_error)?
            }
            None => self
                .planner
                .allocate_team(&requests)
                .await
                .map_err(Self::convert_error)?,
        };

        let allocated = batch.results.iter().filter(|r| r.is_allocated()).count();
        if allocated < batch.results.len() {
            warn!(
                "⚠️ {} of {} tasks could not be allocated",
                batch.results.len() - allocated,
                batch.results.len()
            );
        } else {
            info!("✅ Allocated all {} tasks", allocated);
        }

        Self::result_to_json(&batch)
    }


    #[tool(description = "Sprint performance metrics. Returns: {sprint_id, total_tasks, completed_tasks, total_estimated_hours, completed_estimated_hours, completion_rate, sprint_progress}")]
    async fn sprint_metrics(
        &self,
        Parameters(params): Parameters<SprintIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprint_id = Self::parse_id(&params.sprint_id, "sprint_id")?;
        info!("📊 Metrics for sprint {}", sprint_id);

        let metrics = self
            .planner
            .performance_metrics(sprint_id)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&metrics)
    }


    #[tool(description = "Burn-down series for a sprint, one point per day. Returns: {total_hours, completed_hours, points: [{date, ideal_remaining_hours, actual_remaining_hours}]}")]
    async fn burn_down(
        &self,
        Parameters(params): Parameters<SprintIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprint_id = Self::parse_id(&params.sprint_id, "sprint_id")?;
        let series = self
            .planner
            .burn_down(sprint_id)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&series)
    }


    #[tool(description = "Predict the sprint's completion rate and suggest changes. Returns: {sprint_id, features, predicted_completion_rate, recommendations}")]
    async fn optimize_sprint(
        &self,
        Parameters(params): Parameters<SprintIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let sprint_id = Self::parse_id(&params.sprint_id, "sprint_id")?;
        info!("🔮 Optimizing sprint {}", sprint_id);

        let result = self
            .planner
            .optimize_sprint(sprint_id)
            .await
            .map_err(Self::convert_error)?;
        Self::result_to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for SprintPlannerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "sprint-planner".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Sprint planning backend. Manage sprints, tasks, user stories and team members, \
                 allocate tasks with allocate_tasks, inspect progress with sprint_metrics and \
                 burn_down, and use optimize_sprint for a predicted completion rate."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new("config://sprint-planner", "sprint-planner-config".to_string())
                    .no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            "config://sprint-planner" => {
                let config = self.planner.config();
                let content = serde_json::to_string_pretty(&json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "model_path": config.model_path,
                    "analytics": config.analytics,
                    "prediction": config.prediction,
                    "store": config.store,
                }))
                .unwrap_or_default();

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing Sprint Planner MCP Server...");

    let config = match std::env::var("SPRINT_PLANNER_CONFIG") {
        Ok(path) => PlannerConfig::load(path)?,
        Err(_) => PlannerConfig::from_env(),
    };
    let planner = SprintPlanner::from_config(config)?;

    info!("✅ Sprint Planner MCP Server ready");
    match &planner.config().model_path {
        Some(path) => info!("   🤖 Model: {}", path.display()),
        None => warn!("   🤖 No model configured, optimize_sprint will fail"),
    }

    let server = SprintPlannerMcpServer::new(planner);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
