use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use vd2svg::{Conversion, Vd2Svg, Vd2SvgError, find_project_vectors, gallery_page};

#[derive(Debug, Parser)]
#[command(
    name = "vd2svg",
    version,
    about = "Convert Android VectorDrawable and adaptive-icon XML to SVG"
)]
struct Args {
    /// Input vector XML files, `-` for stdin. With no inputs, the project
    /// tree is searched for vector resources.
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Resource root to resolve references against (repeatable).
    #[arg(short = 'r', long = "res", value_name = "DIR")]
    res: Vec<PathBuf>,

    /// Output file for one input (`-` for stdout), or directory for many.
    /// Defaults to writing an .svg next to each input.
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    out: Option<PathBuf>,

    /// Collect all results into one HTML gallery page.
    #[arg(long = "html", value_name = "FILE", conflicts_with = "out")]
    html: Option<PathBuf>,

    /// Project directory searched when no inputs are given.
    #[arg(long = "project", value_name = "DIR", default_value = ".")]
    project: PathBuf,

    /// Suppress warning output.
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            eprintln!("[vd2svg] {} document(s) failed", failed);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("[vd2svg] error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<usize, Vd2SvgError> {
    let engine = Vd2Svg::builder()
        .resource_roots(args.res.iter().cloned())
        .build();

    if args.inputs.iter().any(|input| input == "-") {
        if args.inputs.len() > 1 {
            return Err(Vd2SvgError::InvalidInput(
                "stdin (`-`) cannot be combined with file inputs".to_string(),
            ));
        }
        return convert_stdin(args, &engine);
    }

    let files: Vec<PathBuf> = if args.inputs.is_empty() {
        find_project_vectors(&args.project)
            .into_iter()
            .map(|(vector, _)| vector)
            .collect()
    } else {
        args.inputs.iter().map(PathBuf::from).collect()
    };
    if files.is_empty() {
        return Err(Vd2SvgError::InvalidInput(format!(
            "no vector documents found under {}",
            args.project.display()
        )));
    }

    let results = engine.convert_batch(&files);
    let mut failed = 0usize;
    let mut gallery_entries: Vec<(String, String)> = Vec::new();
    for (path, result) in &results {
        match result {
            Ok(conversion) => {
                report_warnings(args, &display_name(path), conversion);
                if args.html.is_some() {
                    gallery_entries.push((display_name(path), conversion.svg.clone()));
                } else {
                    write_svg(args, path, &conversion.svg, results.len())?;
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("[vd2svg] {}: {}", path.display(), err);
            }
        }
    }
    if let Some(html_path) = &args.html {
        write_output(html_path, &gallery_page(&gallery_entries))?;
    }
    Ok(failed)
}

fn convert_stdin(args: &Args, engine: &Vd2Svg) -> Result<usize, Vd2SvgError> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    match engine.convert_str(&text, None) {
        Ok(conversion) => {
            report_warnings(args, "stdin", &conversion);
            if let Some(html_path) = &args.html {
                let entries = vec![("stdin".to_string(), conversion.svg)];
                write_output(html_path, &gallery_page(&entries))?;
            } else {
                match &args.out {
                    Some(path) => write_output(path, &conversion.svg)?,
                    None => io::stdout().write_all(conversion.svg.as_bytes())?,
                }
            }
            Ok(0)
        }
        Err(err) => {
            eprintln!("[vd2svg] stdin: {}", err);
            Ok(1)
        }
    }
}

fn write_svg(args: &Args, input: &Path, svg: &str, total: usize) -> Result<(), Vd2SvgError> {
    let target = match &args.out {
        None => input.with_extension("svg"),
        Some(out) if total == 1 => out.clone(),
        Some(out) => out.join(svg_name(input)),
    };
    write_output(&target, svg)
}

fn write_output(path: &Path, content: &str) -> Result<(), Vd2SvgError> {
    if path == Path::new("-") {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

fn svg_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("out");
    PathBuf::from(format!("{}.svg", stem))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn report_warnings(args: &Args, name: &str, conversion: &Conversion) {
    if args.quiet {
        return;
    }
    for warning in &conversion.warnings {
        eprintln!("[vd2svg][{}] {}: {}", warning.kind, name, warning.message);
    }
}
