mod replay;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use midicontrols_comm::CommSession;
use midicontrols_core::{Config, SurfaceDriver, WidgetRegistry, XTouchMini};

const USAGE: &str = "usage: midicontrols [-v|--verbose] [--config <file>] (--dump | --replay <file|->)";

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("midicontrols")
        .join("midicontrols.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path).unwrap_or_else(|_| {
        File::create("/tmp/midicontrols.log").expect("Cannot create log file")
    });

    WriteLogger::init(log_level, simplelog::Config::default(), log_file)
        .expect("Failed to initialize logger");

    log::info!("midicontrols starting (log level: {:?})", log_level);
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let flag_value = |flag: &str| {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    };
    let config = match flag_value("--config") {
        Some(path) => Config::load_from(std::path::Path::new(&path)),
        None => Config::load(),
    };

    let mut registry = WidgetRegistry::new();
    let mini = XTouchMini::build(&mut registry, &config);
    let driver = SurfaceDriver::new(mini.map.clone());
    let mut session = CommSession::new(registry, &config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.iter().any(|a| a == "--dump") {
        replay::write_messages(&mut out, &session.open_all())?;
        return out.flush();
    }

    let Some(source) = flag_value("--replay") else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let input: Box<dyn BufRead> = if source == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&source)?))
    };
    replay::write_messages(&mut out, &session.open_all())?;
    let stats = replay::run(input, &mut out, &mut session, &driver)?;
    log::info!("replayed {} line(s), {} rejected", stats.lines, stats.rejected);
    if stats.rejected > 0 {
        eprintln!("{} of {} line(s) could not be parsed", stats.rejected, stats.lines);
    }
    out.flush()
}
