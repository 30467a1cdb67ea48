// Global numbering of a multi-patch model, written as a gno stream

use log::info;
use spline_model::{cli, Result};
use std::io::Write;

const USAGE: &str = "usage: gpm [-v] [-json] [-o <out>] <inputFile>...";

struct Config {
	verbose: bool,
	json: bool,
	out: Option<String>,
	inputs: Vec<String>,
}

impl Config {
	fn from_args(args: &[String]) -> Option<Self> {
		let mut config = Config { verbose: false, json: false, out: None, inputs: Vec::new() };
		let mut iter = args.iter();
		while let Some(arg) = iter.next() {
			match arg.as_str() {
				"-v" => config.verbose = true,
				"-json" => config.json = true,
				"-o" => config.out = Some(iter.next()?.clone()),
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
	let (mut model, changed) = cli::load_model(&config.inputs)?;
	if changed {
		let mut file = std::fs::File::create("reparameterized.g2")?;
		model.write_splines(&mut file)?;
		info!("left-handed patches fixed, model written to reparameterized.g2");
	}
	let num = model.generate_global_numbers()?;
	info!("{} patches, {} global indices", num.numb_patches(), num.count);

	let mut os: Box<dyn Write> = match &config.out {
		Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
		None => Box::new(std::io::stdout().lock()),
	};
	if config.json {
		model.save_numbering_json(&mut os)?;
		writeln!(os)?;
	} else {
		model.write_global_number_ordering(&mut os)?;
	}
	os.flush()?;
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
		eprintln!("gpm: {}", e);
		std::process::exit(1);
	}
}
