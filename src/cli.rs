//! Bits shared by the command-line tools

use log::{LevelFilter, Log, Metadata, Record};

use crate::{Result, SplineModel};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record) {
		if self.enabled(record.metadata()) {
			eprintln!("[{}] {}", record.level(), record.args());
		}
	}

	fn flush(&self) {}
}

/// Log to stderr, at debug level when `verbose`
pub fn init_logging(verbose: bool) {
	// a second call keeps the first logger
	if log::set_logger(&LOGGER).is_ok() {
		log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });
	}
}

/// Read all spline files into one model, make it right-handed and build
/// its topology. Returns whether any patch was reparameterized.
pub fn load_model(files: &[String]) -> Result<(SplineModel, bool)> {
	let mut model = SplineModel::new();
	for file in files {
		model.load_splines(file, false)?;
	}
	let changed = model.enforce_right_hand_system()?;
	model.build_topology()?;
	Ok((model, changed))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_load_model_missing_file() {
		assert!(matches!(load_model(&["/nonexistent/model.g2".to_string()]), Err(crate::Error::Io(_))));
	}
}
