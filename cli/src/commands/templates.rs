use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use templates::{LoadOptions, LoadReport, RecordKind, Repository, TemplateDatabase};

#[derive(Args)]
pub struct SourceArgs {
    /// INI file or directory searched recursively
    path: PathBuf,
    /// Loader options JSON file
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum TemplatesCommands {
    /// Load templates and dump the repository as JSON
    Dump {
        #[command(flatten)]
        source: SourceArgs,
        /// Output JSON file (optional, defaults to printing to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print one record as JSON
    Show {
        #[command(flatten)]
        source: SourceArgs,
        /// Record id
        id: String,
        /// Record kind: object, weapon or armor
        #[arg(short, long, default_value = "object")]
        kind: String,
    },
    /// List object ids matching every given filter
    List {
        #[command(flatten)]
        source: SourceArgs,
        /// Only objects of this side
        #[arg(long)]
        side: Option<String>,
        /// Only objects carrying this KindOf flag
        #[arg(long)]
        kind_of: Option<String>,
        /// Only buildable objects with a nonzero cost
        #[arg(long)]
        buildable: bool,
    },
}

pub fn handle(cmd: &TemplatesCommands) -> Result<()> {
    match cmd {
        TemplatesCommands::Dump { source, output } => templates_dump(source, output),
        TemplatesCommands::Show { source, id, kind } => templates_show(source, id, kind),
        TemplatesCommands::List {
            source,
            side,
            kind_of,
            buildable,
        } => templates_list(source, side.as_deref(), kind_of.as_deref(), *buildable),
    }
}

/// Where progress and report lines go. When JSON is printed to stdout they
/// go to the log (stderr) so the JSON stays parseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Stdout,
    Log,
}

impl Status {
    fn for_output(json_on_stdout: bool) -> Self {
        if json_on_stdout {
            Status::Log
        } else {
            Status::Stdout
        }
    }

    fn line(self, text: &str) {
        match self {
            Status::Stdout => println!("{}", text),
            Status::Log => log::info!("{}", text),
        }
    }
}

fn load(source: &SourceArgs, status: Status) -> Result<Repository> {
    let options = match &source.options {
        Some(p) => LoadOptions::from_json_file(p)
            .with_context(|| format!("Failed to load options from {:?}", p))?,
        None => LoadOptions::default(),
    };
    let mut db = TemplateDatabase::new(options);

    let report = if source.path.is_dir() {
        status.line(&format!("Loading templates from {:?}", source.path));
        db.load_directory_with_progress(&source.path, |p| {
            status.line(&format!(
                "  [{}/{}] {} ({} blocks)",
                p.index, p.total, p.source, p.blocks
            ));
        })?
    } else {
        db.load_file(&source.path)?
    };
    for line in report_lines(&source.path, &report) {
        status.line(&line);
    }
    Ok(db.into_repository())
}

fn report_lines(path: &Path, report: &LoadReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Loaded {} files from {:?}: {} objects, {} weapons, {} armors, {} other blocks",
        report.sources.len(),
        path,
        report.objects,
        report.weapons,
        report.armors,
        report.generic_blocks
    )];
    if report.inherited_fields > 0 {
        lines.push(format!(
            "Inherited {} fields from parent templates.",
            report.inherited_fields
        ));
    }
    if !report.diagnostics.is_empty() {
        lines.push(format!("{} warnings:", report.diagnostics.len()));
        lines.extend(report.diagnostics.iter().map(|d| format!("  {}", d)));
    }
    lines
}

pub fn templates_dump(source: &SourceArgs, output: &Option<PathBuf>) -> Result<()> {
    let status = Status::for_output(output.is_none());
    let repo = load(source, status)?;
    let json = serde_json::to_string_pretty(&repo)?;
    match output {
        Some(out_path) => {
            fs::write(out_path, json)
                .with_context(|| format!("Failed to write output JSON to {:?}", out_path))?;
            status.line(&format!("Wrote repository to {:?}", out_path));
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn templates_show(source: &SourceArgs, id: &str, kind: &str) -> Result<()> {
    let kind: RecordKind = kind.parse()?;
    let repo = load(source, Status::for_output(true))?;
    let Some(record) = repo.lookup(kind, id) else {
        bail!("No {} named `{}`", kind, id);
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn templates_list(
    source: &SourceArgs,
    side: Option<&str>,
    kind_of: Option<&str>,
    buildable: bool,
) -> Result<()> {
    let repo = load(source, Status::Stdout)?;
    let matches = repo.objects_where(|o| {
        side.is_none_or(|s| o.side.eq_ignore_ascii_case(s))
            && kind_of.is_none_or(|k| o.has_kind_of(k))
            && (!buildable || (o.buildable && o.build_cost > 0))
    });
    for object in &matches {
        println!("{}", object.id);
    }
    println!("{} matching objects", matches.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &Path) -> SourceArgs {
        SourceArgs {
            path: path.to_path_buf(),
            options: None,
        }
    }

    #[test]
    fn test_status_keeps_stdout_for_json() {
        assert_eq!(Status::for_output(true), Status::Log);
        assert_eq!(Status::for_output(false), Status::Stdout);
    }

    #[test]
    fn test_report_lines_list_warnings() {
        let mut repo = Repository::new();
        let report = templates::load_text(
            &mut repo,
            "ObjectReskin Ghost Nowhere\nEnd\n",
            "ghost.ini",
            &LoadOptions::default(),
        );
        let lines = report_lines(Path::new("data"), &report);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("1 objects"));
        assert_eq!(lines[1], "1 warnings:");
        assert!(lines[2].starts_with("  ghost.ini:1"));
    }

    #[test]
    fn test_dump_writes_only_json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        fs::write(
            temp_dir.path().join("units.ini"),
            "Object Ranger\n  BuildCost = 225\nEnd\n",
        )?;
        let out = temp_dir.path().join("repo.json");

        templates_dump(&source(temp_dir.path()), &Some(out.clone()))?;

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
        assert_eq!(json["objects"]["Ranger"]["build_cost"], 225);
        Ok(())
    }
}
