use anyhow::{bail, Context, Result};
use clap::Parser;
use cssprune_lib::{
    collect_classes_from_many, extract_for_classes, CollectOptions, ExtractOptions, FilterOptions,
    DEFAULT_MAX_INPUT_BYTES,
};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cssprune")]
#[command(about = "Keep only the CSS rules used by a set of HTML pages")]
struct Args {
    /// Stylesheet to filter. May be omitted together with --list-classes.
    css: Option<PathBuf>,

    /// HTML file whose classes are kept. Repeat for several pages.
    #[arg(long = "html", required = true)]
    html: Vec<PathBuf>,

    /// Where to write the filtered stylesheet.
    #[arg(short, long, default_value = "extracted.css")]
    output: PathBuf,

    /// Write the filtered stylesheet to standard output instead of a file.
    #[arg(long)]
    stdout: bool,

    /// Print the collected class names.
    #[arg(long)]
    list_classes: bool,

    /// Fail when the HTML needed any error recovery.
    #[arg(long)]
    strict_html: bool,

    /// Re-parse the filtered stylesheet and fail if it is not valid CSS.
    #[arg(long)]
    verify: bool,

    /// Reject inputs larger than this many bytes (0 disables the limit).
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_BYTES)]
    max_input_bytes: usize,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> ExtractOptions {
        let max_input_bytes = match self.max_input_bytes {
            0 => None,
            limit => Some(limit),
        };
        ExtractOptions {
            collect: CollectOptions {
                max_input_bytes,
                strict: self.strict_html,
            },
            filter: FilterOptions {
                max_input_bytes,
                verify_output: self.verify,
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let options = args.options();

    let pages = args
        .html
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Error reading HTML file {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let classes = collect_classes_from_many(&pages[..], &options.collect)
        .context("Failed to parse HTML and extract classes")?;
    log::info!(
        "found {} classes in {} HTML file(s)",
        classes.len(),
        pages.len()
    );

    if args.list_classes {
        print!("{}", classes);
        println!("{} classes", classes.len());
    }

    let css_path = match &args.css {
        Some(path) => path,
        None if args.list_classes => return Ok(()),
        None => bail!("no stylesheet given; pass a CSS file or use --list-classes"),
    };
    let css = fs::read_to_string(css_path)
        .with_context(|| format!("Error reading CSS file {}", css_path.display()))?;

    let filtered = extract_for_classes(&css, &classes, &options)
        .with_context(|| format!("Failed to extract CSS rules from {}", css_path.display()))?;

    if args.stdout {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", filtered)?;
    } else {
        fs::write(&args.output, format!("{}\n", filtered))
            .with_context(|| format!("Error writing {}", args.output.display()))?;
        println!(
            "Extracted {} of {} bytes for {} classes into {}",
            filtered.len(),
            css.len(),
            classes.len(),
            args.output.display()
        );
    }
    Ok(())
}

fn main() {
    // parse the args given in terminal
    let args: Args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{OsStr, OsString};

    #[test]
    fn test_args_map_onto_options() {
        let args = Args::parse_from([
            "cssprune",
            "site.css",
            "--html",
            "a.html",
            "--html",
            "b.html",
            "--verify",
            "--max-input-bytes",
            "0",
        ]);
        assert_eq!(args.html.len(), 2);
        assert_eq!(args.output, PathBuf::from("extracted.css"));
        let options = args.options();
        assert_eq!(options.collect.max_input_bytes, None);
        assert!(options.filter.verify_output);
        assert!(!options.collect.strict);
    }

    #[test]
    fn test_css_is_optional() {
        let args = Args::parse_from(["cssprune", "--html", "a.html", "--list-classes", "-vv"]);
        assert!(args.css.is_none());
        assert_eq!(args.verbose, 2);
    }

    fn args(parts: &[&OsStr]) -> Args {
        let mut argv = vec![OsString::from("cssprune")];
        argv.extend(parts.iter().map(|p| p.to_os_string()));
        Args::parse_from(argv)
    }

    #[test]
    fn test_run_writes_filtered_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("page.html");
        let css = dir.path().join("site.css");
        let output = dir.path().join("extracted.css");
        fs::write(&html, r#"<div class="card"><p class="lead">x</p></div>"#).unwrap();
        fs::write(
            &css,
            ".card { padding: 1em; }\n.unused { color: red; }\n.lead { font-weight: bold; }\n",
        )
        .unwrap();

        let args = args(&[
            css.as_os_str(),
            OsStr::new("--html"),
            html.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ]);
        run(&args).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            ".card { padding: 1em; }\n\n.lead { font-weight: bold; }\n"
        );
    }

    #[test]
    fn test_list_classes_without_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("page.html");
        fs::write(&html, r#"<span class="b a"></span>"#).unwrap();

        let listing = args(&[OsStr::new("--html"), html.as_os_str(), OsStr::new("--list-classes")]);
        assert!(run(&listing).is_ok());

        let missing_css = args(&[OsStr::new("--html"), html.as_os_str()]);
        assert!(run(&missing_css).is_err());
    }

    #[test]
    fn test_missing_html_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("absent.html");
        let err = run(&args(&[OsStr::new("--html"), html.as_os_str(), OsStr::new("--list-classes")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Error reading HTML file"));
    }
}
