// Apply property commands to a model and print the resulting codes

use spline_model::{cli, Result};
use std::io::{Read, Write};

const USAGE: &str = "usage: get_prop [-v] [-xml] [-in <file>] <inputFile>...";

struct Config {
	verbose: bool,
	xml: bool,
	commands: Option<String>,
	inputs: Vec<String>,
}

impl Config {
	fn from_args(args: &[String]) -> Option<Self> {
		let mut config = Config { verbose: false, xml: false, commands: None, inputs: Vec::new() };
		let mut iter = args.iter();
		while let Some(arg) = iter.next() {
			match arg.as_str() {
				"-v" => config.verbose = true,
				"-xml" => config.xml = true,
				"-in" => config.commands = Some(iter.next()?.clone()),
				s if s.starts_with('-') => return None,
				s => config.inputs.push(s.to_string()),
			}
		}
		if config.inputs.is_empty() {
			return None
		}
		Some(config)
	}
}

fn run(config: &Config) -> Result<()> {
	let (mut model, _) = cli::load_model(&config.inputs)?;
	let stdout = std::io::stdout();
	let mut os = stdout.lock();
	if config.verbose {
		let summary = model.topology()?.summary();
		writeln!(os, "Number of patches: {}", model.numb_patches())?;
		writeln!(os, "Number of vertices: {}", summary.vertices)?;
		writeln!(os, "Number of lines: {} ({} non-degenerate)", summary.lines, summary.non_degenerate_lines)?;
		writeln!(os, "Number of faces: {} ({} non-degenerate)", summary.faces, summary.non_degenerate_faces)?;
		writeln!(os, "Number of volumes: {}", summary.volumes)?;
	}

	let input = match &config.commands {
		Some(path) => std::fs::read_to_string(path)?,
		None => {
			let mut s = String::new();
			std::io::stdin().read_to_string(&mut s)?;
			s
		}
	};
	model.read_model_properties(&input)?;
	if config.xml {
		model.write_model_xml_properties(&mut os)?;
	} else {
		model.write_model_properties(&mut os)?;
	}
	Ok(())
}

fn main() {
	let args = std::env::args().skip(1).collect::<Vec<_>>();
	let Some(config) = Config::from_args(&args) else {
		eprintln!("{}", USAGE);
		std::process::exit(2);
	};
	cli::init_logging(config.verbose);
	if let Err(e) = run(&config) {
		eprintln!("get_prop: {}", e);
		std::process::exit(1);
	}
}
