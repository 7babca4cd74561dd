//! `lexiflow analyze`: run the text analyzer locally, no database needed.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use lexiflow_core::analysis::TextAnalyzer;
use lexiflow_types::analysis::{Candidate, WordAnalysis};

use crate::http::handlers::analyze::{AnalyzeRequest, analyze_text};

pub async fn handle_analyze(
    text: String,
    language: String,
    max_candidates: Option<usize>,
    show_words: bool,
    json: bool,
) -> Result<()> {
    let analyzer = TextAnalyzer::new();
    let (_, response) = analyze_text(
        &analyzer,
        AnalyzeRequest {
            text,
            language,
            max_candidates,
        },
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(error) = response.error {
        bail!(error);
    }

    println!();
    if response.candidates.is_empty() {
        println!("  {}", style("No vocabulary candidates found.").dim());
    } else {
        println!("{}", candidates_table(&response.candidates));
    }

    if show_words {
        println!();
        println!("{}", words_table(&response.words));
    }

    println!();
    println!(
        "  {} words, {} candidates",
        response.words.len(),
        response.candidates.len()
    );
    println!();
    Ok(())
}

fn candidates_table(candidates: &[Candidate]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#"),
            Cell::new("Word").fg(Color::Cyan),
            Cell::new("Normalized"),
            Cell::new("POS"),
            Cell::new("Freq"),
        ]);

    for (i, c) in candidates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&c.word),
            Cell::new(&c.normalized_form),
            Cell::new(c.part_of_speech),
            Cell::new(c.frequency),
        ]);
    }
    table
}

fn words_table(words: &[WordAnalysis]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Idx"),
            Cell::new("Form").fg(Color::Cyan),
            Cell::new("Lemma"),
            Cell::new("POS"),
        ]);

    for w in words {
        table.add_row(vec![
            Cell::new(w.index),
            Cell::new(&w.form),
            Cell::new(w.lemma.as_deref().unwrap_or("-")),
            Cell::new(
                w.part_of_speech
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "function".to_string()),
            ),
        ]);
    }
    table
}
