use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use funpy::diagnostics::{render_error, CompileError};
use funpy::manifest::{self, Overrides};

#[derive(Parser)]
#[command(name = "funpyc", version, about = "Compile functional IR to Python")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); FUNPY_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CodegenArgs {
    /// Entry-point function called by the launcher ("" disables the launcher)
    #[arg(long)]
    entry: Option<String>,
    /// Leave out the runtime helper preamble
    #[arg(long)]
    no_preamble: bool,
    /// Lower declarations on N threads
    #[arg(short, long)]
    jobs: Option<usize>,
}

impl CodegenArgs {
    fn overrides(&self) -> Overrides {
        Overrides { entry: self.entry.clone(), no_preamble: self.no_preamble, jobs: self.jobs }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an IR file (JSON or FPIR) to a Python module
    Compile {
        /// IR file path
        file: PathBuf,
        /// Output path. If omitted, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        codegen: CodegenArgs,
    },
    /// Compile an IR file and run it with Python
    Run {
        /// IR file path
        file: PathBuf,
        /// Python interpreter to use
        #[arg(long, default_value = "python3")]
        python: String,
        #[command(flatten)]
        codegen: CodegenArgs,
    },
    /// Convert JSON IR to the FPIR binary container
    Pack {
        /// JSON IR file path
        file: PathBuf,
        /// Output path (.fpir)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print decoded IR as JSON
    Dump {
        /// IR file path (JSON or FPIR)
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "funpy=debug,funpyc=debug",
        _ => "funpy=trace,funpyc=trace",
    };
    let filter = EnvFilter::try_from_env("FUNPY_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Print `err` and exit. JSON sources are re-read so decode errors can point
/// into the text.
fn fail(file: &Path, err: CompileError) -> ! {
    let source = match &err {
        CompileError::Decode { line: Some(_), .. } => std::fs::read_to_string(file).ok(),
        _ => None,
    };
    render_error(source.as_deref(), &file.to_string_lossy(), &err);
    std::process::exit(1);
}

fn input_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn compile(file: &Path, codegen: &CodegenArgs) -> Result<String, CompileError> {
    let options = manifest::resolve_options(&input_dir(file), &codegen.overrides())?;
    funpy::compile_file(file, &options)
}

fn read_program(file: &Path) -> Result<funpy::ir::Program, CompileError> {
    let bytes = std::fs::read(file)
        .map_err(|e| CompileError::io(format!("could not read IR file: {e}"), file.to_path_buf()))?;
    funpy::decode_program(&bytes)
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), CompileError> {
    std::fs::write(path, contents)
        .map_err(|e| CompileError::io(format!("could not write output: {e}"), path.to_path_buf()))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile { file, output, codegen } => {
            let module = compile(&file, &codegen).unwrap_or_else(|err| fail(&file, err));
            match output {
                Some(path) => {
                    if let Err(err) = write_output(&path, module.as_bytes()) {
                        fail(&file, err);
                    }
                }
                None => print!("{module}"),
            }
        }
        Commands::Run { file, python, codegen } => {
            let module = compile(&file, &codegen).unwrap_or_else(|err| fail(&file, err));

            let tmp = std::env::temp_dir().join(format!("funpy_run_{}.py", std::process::id()));
            if let Err(err) = write_output(&tmp, module.as_bytes()) {
                fail(&file, err);
            }

            let status = std::process::Command::new(&python)
                .arg(&tmp)
                .status()
                .unwrap_or_else(|e| {
                    eprintln!("error: could not run {python}: {e}");
                    let _ = std::fs::remove_file(&tmp);
                    std::process::exit(1);
                });

            let _ = std::fs::remove_file(&tmp);

            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
        Commands::Pack { file, output } => {
            let program = read_program(&file).unwrap_or_else(|err| fail(&file, err));
            let bytes = funpy::binary::serialize_program(&program)
                .map_err(CompileError::from)
                .unwrap_or_else(|err| fail(&file, err));
            if let Err(err) = write_output(&output, &bytes) {
                fail(&file, err);
            }
            eprintln!("packed {} declaration(s) into {}", program.decls.len(), output.display());
        }
        Commands::Dump { file } => {
            let program = read_program(&file).unwrap_or_else(|err| fail(&file, err));
            match serde_json::to_string_pretty(&program) {
                Ok(json) => println!("{json}"),
                Err(e) => fail(&file, CompileError::internal(format!("could not print IR: {e}"))),
            }
        }
    }
}
