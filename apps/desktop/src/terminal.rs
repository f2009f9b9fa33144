//! Terminal stand-ins for the table, the edit dialog and the notice banner.

use async_trait::async_trait;
use client_core::{EditDialog, EntitySchema, Notice, RecordFields, RowAction, TableRow};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Renders rows as a plain aligned table with the schema's column labels.
pub fn format_table(schema: EntitySchema, rows: &[TableRow]) -> String {
    let mut out = format!(
        "{:<38} {:<20} {:<20} actions\n",
        "key", schema.name_label, schema.detail_label
    );
    for row in rows {
        let actions: Vec<&str> = row
            .controls
            .iter()
            .map(|control| match control.action {
                RowAction::Edit => "edit",
                RowAction::Delete => "delete",
            })
            .collect();
        out.push_str(&format!(
            "{:<38} {:<20} {:<20} {}\n",
            row.key.to_string(),
            row.fields.name,
            row.fields.detail,
            actions.join(",")
        ));
    }
    if rows.is_empty() {
        out.push_str("(no records)\n");
    }
    out
}

pub fn print_notice(notice: &Notice) {
    eprintln!("[{}] {}", notice.raised_at().format("%H:%M:%S"), notice.summary());
}

/// Edit dialog driven by command-line overrides, falling back to stdin prompts.
///
/// A prompt answered with an empty line keeps the current value; end of input
/// dismisses the dialog.
pub struct PromptDialog {
    name: Option<String>,
    detail: Option<String>,
}

impl PromptDialog {
    pub fn new(name: Option<String>, detail: Option<String>) -> Self {
        Self { name, detail }
    }
}

#[async_trait]
impl EditDialog for PromptDialog {
    async fn edit(&self, schema: EntitySchema, current: &RecordFields) -> Option<RecordFields> {
        let mut input = BufReader::new(io::stdin());
        let name = match &self.name {
            Some(name) => name.clone(),
            None => prompt(&mut input, schema.name_label, &current.name).await?,
        };
        let detail = match &self.detail {
            Some(detail) => detail.clone(),
            None => prompt(&mut input, schema.detail_label, &current.detail).await?,
        };
        Some(RecordFields::new(name, detail))
    }
}

async fn prompt(
    input: &mut BufReader<io::Stdin>,
    label: &str,
    current: &str,
) -> Option<String> {
    let mut stdout = io::stdout();
    stdout
        .write_all(format!("{label} [{current}]: ").as_bytes())
        .await
        .ok()?;
    stdout.flush().await.ok()?;

    let mut line = String::new();
    if input.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let line = line.trim_end_matches(['\r', '\n']);
    Some(if line.is_empty() {
        current.to_string()
    } else {
        line.to_string()
    })
}
