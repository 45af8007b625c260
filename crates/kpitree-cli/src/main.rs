use kpitree_core::{
    Category, Document, LayoutConfig, LayoutEdge, LayoutEngine, LayoutMode, LayoutRequest,
    select_subgraph,
};
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(kpitree_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<kpitree_core::Error> for CliError {
    fn from(value: kpitree_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Select,
    Prune,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    config: Option<String>,
    pretty: bool,
    lenient: bool,
    mode: LayoutMode,
    focus: Option<String>,
    island: Option<String>,
    manual: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SelectOut<'a> {
    focus: &'a str,
    /// `None` when the focus id is not in the tree; everything is kept then.
    role: Option<Category>,
    nodes: Vec<&'a str>,
    edges: Vec<LayoutEdge>,
}

fn usage() -> &'static str {
    "kpitree\n\
\n\
USAGE:\n\
  kpitree [layout] [--mode hierarchical|radial] [--focus <id>] [--island <id>] [--manual] [--config <path>] [--lenient] [--pretty] [--out <path>] [<path>|-]\n\
  kpitree select --focus <id> [--lenient] [--pretty] [--out <path>] [<path>|-]\n\
  kpitree prune [--lenient] [--pretty] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the document is read from stdin.\n\
  - layout prints `{ nodes, edges }`; pinned positions from the document always win.\n\
  - --focus filters the hierarchical view; --island picks the top metric shown in radial mode.\n\
  - --manual skips computed placement and uses staggered defaults for unpinned nodes.\n\
  - --config reads a JSON layout config; only the fields it names change.\n\
  - --lenient skips malformed entries instead of failing.\n\
  - prune drops positions of ids that are no longer in the tree and prints the document.\n\
  - Set KPITREE_LOG (e.g. `debug`) to see log output on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "select" => args.command = Command::Select,
            "prune" => args.command = Command::Prune,
            "--pretty" => args.pretty = true,
            "--lenient" => args.lenient = true,
            "--manual" => args.manual = true,
            "--mode" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.mode = mode
                    .parse::<LayoutMode>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--focus" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.focus = Some(id.clone());
            }
            "--island" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.island = Some(id.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if matches!(args.command, Command::Select) && args.focus.is_none() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_document(text: &str, lenient: bool) -> Result<Document, CliError> {
    if lenient {
        let value: Value = serde_json::from_str(text)?;
        Ok(Document::from_value_lenient(&value))
    } else {
        Ok(Document::from_json_str(text)?)
    }
}

fn load_config(path: Option<&str>) -> Result<LayoutConfig, CliError> {
    match path {
        None => Ok(LayoutConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(LayoutConfig::from_json_str(&text)?)
        }
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Some(path) => std::fs::write(path, text)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("KPITREE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // Fails only when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut document = read_document(&text, args.lenient)?;

    match args.command {
        Command::Layout => {
            let config = load_config(args.config.as_deref())?;
            let engine = LayoutEngine::new(config);
            let request = LayoutRequest {
                mode: args.mode,
                focus_id: args.focus,
                island_root_id: args.island,
                manual_positioning: args.manual,
            };
            let result = engine.layout_document(&document, &request);
            tracing::info!(
                nodes = result.nodes.len(),
                edges = result.edges.len(),
                "layout written"
            );
            write_json(&result, args.pretty, args.out.as_deref())
        }
        Command::Select => {
            let focus = args.focus.as_deref().unwrap_or_default();
            let hierarchy = &document.hierarchy;
            let keep = select_subgraph(hierarchy, focus);
            let walk = hierarchy.walk();

            let out = SelectOut {
                focus,
                role: kpitree_core::classify(hierarchy, focus).map(|r| r.category()),
                nodes: match &keep {
                    Some(keep) => keep.ordered_ids(hierarchy),
                    None => walk.iter().map(|n| n.id).collect(),
                },
                edges: walk
                    .iter()
                    .filter_map(|n| n.parent.map(|p| (p, n.id)))
                    .filter(|(p, c)| keep.as_ref().is_none_or(|k| k.keeps_edge(p, c)))
                    .map(|(p, c)| LayoutEdge::between(p, c))
                    .collect(),
            };
            write_json(&out, args.pretty, args.out.as_deref())
        }
        Command::Prune => {
            let dropped = document.prune();
            for id in &dropped {
                tracing::info!(id = %id, "dropped stale position");
            }
            write_json(&document, args.pretty, args.out.as_deref())
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
