//! Orchestrates a full extraction, reconciliation and linking run.

mod config;
mod error;

pub use config::RunnerConfig;
pub use error::RunnerError;

use crate::config::{load_config_file, FileConfig, JiraSettings};
use crate::event::EventContext;
use crate::github::{
    self, list_open_issues, mirror_issue, splice_linked_issues, standardize_title,
    update_pull_request, ExistingIssue, MirrorStatus, PrUpdateStatus, PullRequestInfo, RepoRef,
};
use crate::jira::{apply_transition_plan, JiraClient, TransitionPlan, TransitionStatus};
use crate::keys::{ExtractedKeys, KeyExtractor, KeySources};
use crate::outputs::ActionOutputs;
use crate::reconcile::{IssueReconciler, IssueRecord, Reconciliation};
use crate::summary::{IssueOutcome, RunSummary};
use crate::templates::TemplateRenderer;
use futures::stream::{self, StreamExt};
use octocrab::Octocrab;
use tracing::{info, warn};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Counts and statuses.
    pub summary: RunSummary,
    /// Keys found in each source.
    pub keys: ExtractedKeys,
    /// Resolved issues, in candidate order.
    pub records: Vec<IssueRecord>,
    /// Per-issue transition and mirroring outcomes.
    pub outcomes: Vec<IssueOutcome>,
    /// Step outputs.
    pub outputs: ActionOutputs,
}

/// GitHub access, present when a token and repository are configured.
struct GitHubContext {
    octocrab: Octocrab,
    repo: RepoRef,
}

/// Orchestrates a full linking run.
pub struct Runner {
    config: RunnerConfig,
    file: FileConfig,
    event: EventContext,
    jira: JiraClient,
    github: Option<GitHubContext>,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if configuration is missing or invalid, or a
    /// client cannot be built.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let file = load_config_file(config.config_path())?.unwrap_or_default();
        let settings = JiraSettings::resolve(config.jira(), Some(&file))?;
        let jira = JiraClient::new(settings)?;
        let renderer = TemplateRenderer::new(&file)?;

        let event = match config.event() {
            Some(event) => event.clone(),
            None => EventContext::from_env()?,
        };

        let github = match (config.github_token(), config.repository()) {
            (Some(token), Some(repo)) => Some(GitHubContext {
                octocrab: github::build_client(token)?,
                repo: repo.parse()?,
            }),
            (Some(_), None) => {
                warn!("GitHub token given without a repository, GitHub features disabled");
                None
            }
            _ => None,
        };

        Ok(Self {
            config,
            file,
            event,
            jira,
            github,
            renderer,
        })
    }

    /// Executes the full flow and writes the step outputs.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Output`] if the outputs cannot be written.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let report = self.execute().await?;
        let target = report.outputs.emit()?;
        info!(destination = ?target, count = report.outputs.len(), "Wrote step outputs");
        Ok(report.summary)
    }

    /// Executes the full flow without writing outputs.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] if rendering or output assembly fails.
    pub async fn execute(&self) -> Result<RunReport, RunnerError> {
        let mut summary = RunSummary::new(self.config.dry_run());

        let pull_request = self.pull_request().await;
        let sources = self.gather_sources(pull_request.as_ref()).await;
        let keys = KeyExtractor::new(self.config.key_pattern()).extract_all(&sources);
        info!(
            count = keys.combined.len(),
            issues = %keys.combined.to_comma_delimited(),
            "Extracted candidate keys"
        );

        let reconciliation = self.reconcile(&keys).await;
        summary.record_reconciliation(keys.combined.len(), &reconciliation);
        let mut records = reconciliation.records;

        let mut outcomes: Vec<IssueOutcome> = records
            .iter()
            .map(|record| IssueOutcome::new(record.key.clone()))
            .collect();
        self.transition_issues(&mut records, &mut outcomes).await;
        self.mirror_issues(&mut records, &mut outcomes).await;
        for outcome in &outcomes {
            summary.record_outcome(outcome);
        }

        let list = self
            .renderer
            .render_issue_list(&records, |record| self.jira.browse_url(&record.key))?;
        let notes = if records.is_empty() {
            String::new()
        } else {
            self.renderer.render_release_notes(&list)?
        };

        let (pr_status, title) = match &pull_request {
            Some(pr) => self.update_pull_request(pr, &records, &list).await,
            None => (PrUpdateStatus::NotApplicable, None),
        };
        summary.pull_request = pr_status;

        let outputs = self.build_outputs(&keys, &records, notes, title)?;

        Ok(RunReport {
            summary,
            keys,
            records,
            outcomes,
            outputs,
        })
    }

    /// The pull request in scope: from the event, else fetched by number.
    async fn pull_request(&self) -> Option<PullRequestInfo> {
        if let Some(pr) = self.event.pull_request() {
            return Some(pr);
        }

        let number = self.config.pr_number()?;
        let Some(gh) = &self.github else {
            warn!(pr = number, "Pull request number given without GitHub access, ignoring");
            return None;
        };

        match github::fetch_pull_request(&gh.octocrab, &gh.repo, number).await {
            Ok(pr) => Some(pr),
            Err(e) => {
                warn!(pr = number, error = %e, "Failed to read pull request");
                None
            }
        }
    }

    async fn gather_sources(&self, pull_request: Option<&PullRequestInfo>) -> KeySources {
        let string = self
            .config
            .string()
            .or(self.file.string.as_deref())
            .map(str::to_string);
        let title = self
            .config
            .title()
            .map(str::to_string)
            .or_else(|| pull_request.map(|pr| pr.title.clone()));
        let head_ref = self
            .config
            .head_ref()
            .map(str::to_string)
            .or_else(|| pull_request.and_then(|pr| pr.head_ref.clone()))
            .or_else(|| self.event.head_ref());

        let base_ref = pull_request
            .and_then(|pr| pr.base_ref.clone())
            .or_else(|| self.event.base_ref());
        info!(head_ref = ?head_ref, base_ref = ?base_ref, "Resolved refs");

        let mut commits = self.event.payload.commits.clone();
        if let (Some(pr), Some(gh)) = (pull_request, &self.github) {
            match github::list_pull_request_commits(&gh.octocrab, &gh.repo, pr.number).await {
                Ok(pr_commits) => commits.extend(pr_commits),
                Err(e) => warn!(pr = pr.number, error = %e, "Failed to list commits"),
            }
        }

        KeySources {
            string,
            title,
            head_ref,
            commits,
            include_merge_messages: self.config.include_merge_messages(),
        }
    }

    async fn reconcile(&self, keys: &ExtractedKeys) -> Reconciliation {
        let mut reconciler = IssueReconciler::new(self.jira.clone())
            .with_fix_version_override(self.config.fix_versions().cloned());
        if let Some(limit) = self.config.concurrency() {
            reconciler = reconciler.with_concurrency(limit);
        }

        let reconciliation = reconciler.reconcile(&keys.combined).await;
        for key in &reconciliation.not_found {
            info!(key = %key, "Issue not found in Jira, dropping");
        }
        for failed in &reconciliation.failed {
            warn!(key = %failed.key, error = %failed.error, "Failed to fetch issue");
        }
        reconciliation
    }

    async fn transition_issues(&self, records: &mut [IssueRecord], outcomes: &mut [IssueOutcome]) {
        let Some(target) = self.config.transitions().select(&self.event) else {
            return;
        };
        let chain = self
            .config
            .transition_chain()
            .or(self.file.transition_chain.as_deref());
        let plan = TransitionPlan::from_chain_str(chain, target);
        info!(steps = ?plan.steps(), "Planned Jira transitions");

        if self.config.dry_run() {
            for record in records.iter() {
                println!(
                    "[DRY RUN] Would transition {} through: {}",
                    record.key,
                    plan.steps().join(" -> ")
                );
            }
            return;
        }

        let limit = self.config.concurrency().unwrap_or(records.len()).max(1);
        let statuses: Vec<TransitionStatus> = stream::iter(records.iter_mut())
            .map(|record| apply_transition_plan(&self.jira, record, &plan))
            .buffered(limit)
            .collect()
            .await;

        for (outcome, status) in outcomes.iter_mut().zip(statuses) {
            outcome.transition = Some(status);
        }
    }

    async fn mirror_issues(&self, records: &mut [IssueRecord], outcomes: &mut [IssueOutcome]) {
        if !self.config.generate_github_issues() {
            return;
        }
        let Some(gh) = &self.github else {
            warn!("GitHub issue mirroring needs a token and repository, skipping");
            return;
        };

        let mut existing: Vec<ExistingIssue> = if self.config.dry_run() {
            Vec::new()
        } else {
            match list_open_issues(&gh.octocrab, &gh.repo).await {
                Ok(issues) => issues,
                Err(e) => {
                    warn!(error = %e, "Failed to list open issues");
                    for outcome in outcomes.iter_mut() {
                        outcome.mirror = Some(MirrorStatus::Failed {
                            error: e.to_string(),
                        });
                    }
                    return;
                }
            }
        };

        for (record, outcome) in records.iter_mut().zip(outcomes.iter_mut()) {
            let url = self.jira.browse_url(&record.key);
            let rendered = self
                .renderer
                .render_issue_title(record, &url)
                .and_then(|title| Ok((title, self.renderer.render_issue_body(record, &url)?)));
            let (title, body) = match rendered {
                Ok(rendered) => rendered,
                Err(e) => {
                    outcome.mirror = Some(MirrorStatus::Failed {
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if self.config.dry_run() {
                println!("[DRY RUN] Would create or update GitHub issue: \"{title}\"");
                outcome.mirror = Some(MirrorStatus::Skipped {
                    reason: "dry run".to_string(),
                });
                continue;
            }

            let status =
                mirror_issue(&gh.octocrab, &gh.repo, &mut existing, &record.key, &title, &body)
                    .await;
            record.github_number = status.number().or(record.github_number);
            outcome.mirror = Some(status);
        }
    }

    /// Updates the linked issue section and, if enabled, the title.
    ///
    /// Returns the update status and the standardized title text.
    async fn update_pull_request(
        &self,
        pr: &PullRequestInfo,
        records: &[IssueRecord],
        list: &str,
    ) -> (PrUpdateStatus, Option<String>) {
        if records.is_empty() {
            return (
                PrUpdateStatus::Skipped {
                    reason: "no linked issues".to_string(),
                },
                None,
            );
        }

        let standard = if self.config.standardize_pr_title() {
            let keys: Vec<_> = records.iter().map(|record| record.key.clone()).collect();
            let standard = standardize_title(&pr.title, &keys);
            if standard.is_none() {
                warn!(title = %pr.title, "Pull request title has no leading issue keys");
            }
            standard
        } else {
            None
        };
        let text = standard.as_ref().map(|s| s.text.clone());
        let new_title = standard
            .map(|s| s.title)
            .filter(|title| *title != pr.title.trim());

        let body = splice_linked_issues(&pr.body, list);

        let Some(gh) = &self.github else {
            return (
                PrUpdateStatus::Skipped {
                    reason: "no GitHub access".to_string(),
                },
                text,
            );
        };

        if self.config.dry_run() {
            println!("[DRY RUN] Would update pull request #{}", pr.number);
            if let Some(title) = &new_title {
                println!("  Title: {title}");
            }
            for line in body.lines().take(10) {
                println!("    {line}");
            }
            return (
                PrUpdateStatus::Skipped {
                    reason: "dry run".to_string(),
                },
                text,
            );
        }

        let status = match update_pull_request(
            &gh.octocrab,
            &gh.repo,
            pr.number,
            new_title.as_deref(),
            &body,
        )
        .await
        {
            Ok(()) => PrUpdateStatus::Updated {
                number: pr.number,
                title_changed: new_title.is_some(),
            },
            Err(e) => {
                warn!(pr = pr.number, error = %e, "Failed to update pull request");
                PrUpdateStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        (status, text)
    }

    fn build_outputs(
        &self,
        keys: &ExtractedKeys,
        records: &[IssueRecord],
        notes: String,
        title: Option<String>,
    ) -> Result<ActionOutputs, RunnerError> {
        let mut outputs = ActionOutputs::new();
        outputs.set("string_issues", keys.from_string.to_comma_delimited())?;
        outputs.set("title_issues", keys.from_title.to_comma_delimited())?;
        outputs.set("ref_issues", keys.from_ref.to_comma_delimited())?;
        outputs.set("commit_issues", keys.from_commits.to_comma_delimited())?;
        outputs.set("issues", keys.combined.to_comma_delimited())?;
        outputs.set(
            "resolved_issues",
            records
                .iter()
                .map(|record| record.key.as_str())
                .collect::<Vec<_>>()
                .join(","),
        )?;
        outputs.set("notes", notes)?;
        if let Some(title) = title {
            outputs.set("title", title)?;
        }
        if self.config.fix_versions().is_some() {
            for record in records {
                outputs.set(
                    format!("{}_fixVersions", record.key),
                    record.fix_versions.join(","),
                )?;
            }
        }
        Ok(outputs)
    }
}
