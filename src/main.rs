use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use maki_patcher::{
    interface_equivalent_translations, load_from_path, PatchEngine, TranslateOutcome,
};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "maki-patcher")]
#[command(about = "Applies Maki macro translations back into a C source tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the source tree being patched
    input_src_dir: PathBuf,

    /// Path to the Maki analysis results (JSON)
    maki_results_path: PathBuf,

    /// Destination root for the patched tree
    translation_output_dir: PathBuf,

    /// Report every macro processed, not just warnings
    #[arg(short, long)]
    verbose: bool,

    /// Show a unified diff for each patched file
    #[arg(long)]
    diff: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Normalize like the analysis does: absolute paths, symlinks left
    // alone, so containment checks compare like with like.
    let src_root = std::path::absolute(&cli.input_src_dir).with_context(|| {
        format!(
            "cannot resolve input source directory {}",
            cli.input_src_dir.display()
        )
    })?;
    let results_path = std::path::absolute(&cli.maki_results_path).with_context(|| {
        format!(
            "cannot resolve analysis results path {}",
            cli.maki_results_path.display()
        )
    })?;

    let data = load_from_path(&results_path)?;
    let translations = interface_equivalent_translations(&data);

    if cli.verbose {
        println!("Source tree: {}", src_root.display());
        println!(
            "Analysis results: {} ({} macros)",
            results_path.display(),
            translations.len()
        );
        println!();
    }

    let mut engine = PatchEngine::new(&src_root, &cli.translation_output_dir);
    let outcomes = engine.apply(&translations)?;

    let mut translated = 0;
    let mut untranslated = 0;
    let mut outside_tree = 0;

    for outcome in &outcomes {
        match outcome {
            TranslateOutcome::Applied { name, file, line } => {
                translated += 1;
                if cli.verbose {
                    println!(
                        "{} {}: translated at {}:{}",
                        "✓".green(),
                        name,
                        file.display(),
                        line
                    );
                }
            }
            TranslateOutcome::Untranslated { name } => {
                untranslated += 1;
                if cli.verbose {
                    println!("{} {}: no translation available", "⊘".cyan(), name);
                }
            }
            TranslateOutcome::OutsideTree { name, file } => {
                outside_tree += 1;
                eprintln!(
                    "{}",
                    format!(
                        "Warning: skipping {} because {} is not in the source directory {}",
                        name,
                        file.display(),
                        src_root.display()
                    )
                    .yellow()
                );
            }
        }
    }

    if cli.diff {
        for buffer in engine.buffers() {
            let before = fs::read_to_string(buffer.source_path()).with_context(|| {
                format!("cannot re-read {} for diff", buffer.source_path().display())
            })?;
            let after = buffer.contents();
            if before != after {
                display_diff(buffer.source_path(), &before, &after);
            }
        }
    }

    let written = engine.flush()?;

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} translated", format!("{}", translated).green());
    println!(
        "  {} without translation",
        format!("{}", untranslated).cyan()
    );
    println!(
        "  {} outside source tree",
        format!("{}", outside_tree).yellow()
    );
    println!("  {} files written", format!("{}", written.len()).bold());

    Ok(())
}

/// Helper: Show unified diff between original and patched content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
