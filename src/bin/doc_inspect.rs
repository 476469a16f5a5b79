use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use link_inbox::config;
use link_inbox::docs::count::count_checked_titles;
use link_inbox::docs::model::TextStyle;
use link_inbox::docs::{DocsClient, DocsService};

#[derive(Parser, Debug)]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Document to inspect; defaults to google.document_id
    #[arg(long)]
    document_id: Option<String>,
}

fn style_flags(style: Option<&TextStyle>) -> String {
    let Some(style) = style else {
        return "-".to_string();
    };
    let mut flags = String::new();
    if style.bold == Some(true) {
        flags.push('B');
    }
    if style.italic == Some(true) {
        flags.push('I');
    }
    if style.strikethrough == Some(true) {
        flags.push('S');
    }
    if flags.is_empty() {
        flags.push('-');
    }
    flags
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = config::load(Some(&args.config))?;
    let google = cfg.require_google()?;
    let document_id = args
        .document_id
        .unwrap_or_else(|| google.document_id.clone());
    let client = DocsClient::new(google.access_token.clone())?;

    let doc = client.get_document(&document_id).await?;
    println!(
        "Document: {} ({})",
        doc.title.as_deref().unwrap_or("<untitled>"),
        document_id
    );
    println!("Append index: {}", doc.append_index());
    for el in doc.content().unwrap_or_default() {
        let Some(para) = el.paragraph.as_ref() else {
            continue;
        };
        let list_id = para
            .bullet
            .as_ref()
            .and_then(|b| b.list_id.as_deref())
            .unwrap_or("-");
        println!(
            "[{}..{}] list={}",
            el.start_index.unwrap_or_default(),
            el.end_index.unwrap_or_default(),
            list_id
        );
        for run in para
            .elements
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|e| e.text_run.as_ref())
        {
            println!(
                "    {:<3} {:?}",
                style_flags(run.text_style.as_ref()),
                run.content.as_deref().unwrap_or("")
            );
        }
    }
    println!("Checked: {}", count_checked_titles(doc.content()));
    Ok(())
}
