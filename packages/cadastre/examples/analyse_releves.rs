//! Analyse de relevés de propriété - Reference Driver
//!
//! Runs the full pipeline over documents from disk using the Gemini
//! collaborators: extraction → filter → aggregation → synthesis, then writes
//! the consolidated lots as an XLSX workbook next to the current directory.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example analyse_releves -- CN releve_1.pdf releve_2.html
//! ```
//!
//! An optional plan whitelist can be passed through `PLAN_FILTER`
//! (comma-separated, e.g. `PLAN_FILTER="032, 44"`).

use cadastre::{
    export_filename, write_xlsx, AnalysisPipeline, AnalysisRequest, GeminiClient,
    GeminiCredentials, RunLog, SourceDocument, SynthesisOutcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let section = match args.next() {
        Some(section) => section,
        None => {
            eprintln!("usage: analyse_releves <SECTION> <fichier>...");
            std::process::exit(2);
        }
    };

    let mut documents = Vec::new();
    for path in args {
        documents.push(SourceDocument::from_path(&path)?);
    }
    if documents.is_empty() {
        eprintln!("Veuillez fournir au moins un fichier à analyser.");
        std::process::exit(2);
    }

    let credentials = GeminiCredentials::from_env()
        .ok_or("variable d'environnement GEMINI_API_KEY manquante")?;
    let client = GeminiClient::new(credentials);
    let pipeline = AnalysisPipeline::new(client.clone(), client);

    let plan_filter = std::env::var("PLAN_FILTER").unwrap_or_default();
    let request = AnalysisRequest::new(&section).with_plan_filter(plan_filter);

    let mut log = RunLog::new();
    let report = pipeline.analyze(&documents, &request, &mut log).await?;

    for group in report.groups.values() {
        println!("Section {} / Plan {}", group.section, group.plan);
        for lot in &group.lots {
            println!(
                "  Lot {:<8} quote-part(s): {:<20} propriétaires: {}",
                lot.lot,
                lot.quote_part_display,
                lot.owners.len()
            );
        }
    }
    println!(
        "\n{} lots uniques dans {} groupe(s) ({} lignes brutes, {} après filtrage)",
        report.lots.len(),
        report.groups.len(),
        report.raw_count,
        report.filtered_count
    );

    match &report.synthesis {
        SynthesisOutcome::Completed(text) => println!("\n--- Synthèse ---\n{text}"),
        SynthesisOutcome::Failed(reason) => eprintln!("\nSynthèse indisponible: {reason}"),
        SynthesisOutcome::Skipped => {}
    }

    if !report.lots.is_empty() {
        let filename = export_filename(chrono::Utc::now().date_naive());
        write_xlsx(&report.lots, &filename)?;
        println!("\nExport écrit: {filename}");
    }

    Ok(())
}
