use std::sync::Arc;

use anyhow::Result;
use application::lag_rule_editor::LagRuleEditor;
use application::lag_rule_lookup::LagRuleLookup;
use application::lag_rule_query_service::LagRuleQueryService;
use application::lag_rule_registry::LagRuleRegistry;
use application::lag_rule_view::{LagRuleRow, LagRuleTable};
use domain::lag_alert::entity::{LagAlertRule, LagRuleDraft, LagRuleEdit, LagRuleId};
use domain::lag_alert::query::LagRuleQuery;
use infrastructure::config::RegistryConfig;
use ports::secondary::lag_rule_store::LagRuleStore;

use crate::cli::OutputFormat;

/// Services wired against one store, plus the listing settings the
/// commands need.
pub struct RuleServices {
    registry: LagRuleRegistry,
    query: LagRuleQueryService,
    editor: LagRuleEditor,
    lookup: LagRuleLookup,
    default_page_size: usize,
    owner_width: usize,
}

impl RuleServices {
    pub fn new(store: Arc<dyn LagRuleStore>, config: &RegistryConfig) -> Self {
        Self {
            registry: LagRuleRegistry::new(Arc::clone(&store))
                .with_threshold_policy(config.threshold_policy()),
            query: LagRuleQueryService::new(Arc::clone(&store))
                .with_max_page_size(config.listing.max_page_size),
            editor: LagRuleEditor::new(Arc::clone(&store)),
            lookup: LagRuleLookup::new(store),
            default_page_size: config.listing.default_page_size,
            owner_width: config.listing.owner_display_width,
        }
    }
}

// ── Create ──────────────────────────────────────────────────────────────

pub fn cmd_create(
    services: &RuleServices,
    draft: &LagRuleDraft,
    output: OutputFormat,
) -> Result<LagRuleId> {
    let id = services.registry.create(draft)?;

    if output == OutputFormat::Json {
        let rule = services.lookup.find_by_id(id)?;
        println!("{}", serde_json::to_string_pretty(&rule)?);
    } else {
        println!("Created rule {id}.");
    }
    Ok(id)
}

// ── List ────────────────────────────────────────────────────────────────

pub struct ListArgs {
    pub cluster: String,
    pub search: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
    pub echo: u64,
}

pub fn cmd_list(services: &RuleServices, args: ListArgs, output: OutputFormat) -> Result<()> {
    let table = list_table(services, args)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    if table.rows.is_empty() {
        println!("No lag rules found.");
    } else {
        print!("{}", format_rows(&table.rows));
    }
    println!(
        "Showing {} of {} matching ({} in cluster).",
        table.rows.len(),
        table.display_records,
        table.total_records
    );
    Ok(())
}

fn list_table(services: &RuleServices, args: ListArgs) -> Result<LagRuleTable> {
    let limit = args.limit.unwrap_or(services.default_page_size);
    let mut query = LagRuleQuery::new(args.cluster, args.offset, limit);
    if let Some(search) = args.search {
        query = query.with_search(search);
    }

    let page = services.query.list(&query)?;
    Ok(LagRuleTable::from_page(
        args.echo,
        &page,
        services.owner_width,
    ))
}

const NAME_COLUMN_WIDTH: usize = 24;

fn format_rows(rows: &[LagRuleRow]) -> String {
    let mut out = format!(
        "{:<8}  {:<24}  {:<24}  {:>12}  {:<33}  {:<12}\n",
        "ID", "GROUP", "TOPIC", "THRESHOLD", "OWNER", "MODIFIED"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<8}  {:<24}  {:<24}  {:>12}  {:<33}  {:<12}\n",
            row.id.0,
            truncate(&row.group, NAME_COLUMN_WIDTH),
            truncate(&row.topic, NAME_COLUMN_WIDTH),
            row.lag_threshold,
            row.owner,
            format_timestamp(row.modified_at_ns),
        ));
    }
    out
}

// ── Show ────────────────────────────────────────────────────────────────

pub fn cmd_show(
    services: &RuleServices,
    cluster: &str,
    id: LagRuleId,
    output: OutputFormat,
) -> Result<()> {
    let rule = services.lookup.find_in_cluster(cluster, id)?;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rule)?);
        return Ok(());
    }

    print!("{}", format_rule(&rule));
    Ok(())
}

fn format_rule(rule: &LagAlertRule) -> String {
    format!(
        "Rule {}\n  Cluster:    {}\n  Group:      {}\n  Topic:      {}\n  Threshold:  {}\n  Owner:      {}\n  Created:    {}\n  Modified:   {}\n",
        rule.id,
        rule.cluster,
        rule.group,
        rule.topic,
        rule.lag_threshold,
        rule.owner,
        format_timestamp(rule.created_at_ns),
        format_timestamp(rule.modified_at_ns),
    )
}

// ── Update / Delete ─────────────────────────────────────────────────────

pub fn cmd_update(
    services: &RuleServices,
    cluster: &str,
    id: LagRuleId,
    edit: &LagRuleEdit,
    output: OutputFormat,
) -> Result<()> {
    services.editor.update_by_id(cluster, id, edit)?;

    if output == OutputFormat::Json {
        let rule = services.lookup.find_by_id(id)?;
        println!("{}", serde_json::to_string_pretty(&rule)?);
    } else {
        println!("Updated rule {id}.");
    }
    Ok(())
}

pub fn cmd_delete(services: &RuleServices, cluster: &str, id: LagRuleId) -> Result<()> {
    services.editor.delete_by_id(cluster, id)?;
    println!("Deleted rule {id}.");
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Fit `s` into `max` characters, ending with `...` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Whole seconds since the Unix epoch.
fn format_timestamp(ns: u64) -> String {
    format!("{}", ns / 1_000_000_000)
}
