use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;

use sat_o_scope::config::Config;
use sat_o_scope::geo::{
    footprint_with_step, lat_lon_to_locator, locator_to_lat_lon, position_at, Observer,
};
use sat_o_scope::predict::{predict_mutual_passes, ElementCatalog, Pass};
use sat_o_scope::tracker::{
    LogListener, SessionRunner, SharedSession, SystemClock, TrackingSession,
};
use sat_o_scope::web::{run_server, AppState};

#[derive(Parser)]
#[command(name = "sat-o-scope")]
#[command(about = "Amateur satellite tracking and pass prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracking session and the HTTP API
    Serve {
        #[arg(short, long, default_value = "sat-o-scope.yaml")]
        config: String,
    },
    /// Track the configured satellites, logging positions until Ctrl-C
    Track {
        #[arg(short, long, default_value = "sat-o-scope.yaml")]
        config: String,
    },
    /// List upcoming passes over the station
    Passes {
        #[arg(short, long, default_value = "sat-o-scope.yaml")]
        config: String,
        #[arg(short, long)]
        satellite: Option<String>,
        #[arg(long, default_value_t = 24.0)]
        hours: f64,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// List passes visible from the station and a second locator at once
    Mutual {
        #[arg(short, long, default_value = "sat-o-scope.yaml")]
        config: String,
        #[arg(short, long)]
        satellite: String,
        #[arg(short, long)]
        locator: String,
        #[arg(long, default_value_t = 24.0)]
        hours: f64,
    },
    /// Print the current footprint of a satellite as JSON
    Footprint {
        #[arg(short, long, default_value = "sat-o-scope.yaml")]
        config: String,
        #[arg(short, long)]
        satellite: String,
        #[arg(long)]
        min_elevation: Option<f64>,
    },
    /// Print the centre of a Maidenhead grid square
    Locator { locator: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => with_config(&config, serve),
        Commands::Track { config } => with_config(&config, track),
        Commands::Passes {
            config,
            satellite,
            hours,
            min_elevation,
        } => with_config(&config, |config| {
            passes(config, satellite.as_deref(), hours, min_elevation)
        }),
        Commands::Mutual {
            config,
            satellite,
            locator,
            hours,
        } => with_config(&config, |config| mutual(config, &satellite, &locator, hours)),
        Commands::Footprint {
            config,
            satellite,
            min_elevation,
        } => with_config(&config, |config| footprint(config, &satellite, min_elevation)),
        Commands::Locator { locator } => {
            init_logging("info");
            locator_center(&locator)
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn with_config(path: &str, command: impl FnOnce(Config) -> ExitCode) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_level);
    command(config)
}

fn load_catalog(config: &Config) -> Option<ElementCatalog> {
    let mut catalog = ElementCatalog::new();
    match catalog.load_dir(&config.elements.folder) {
        Ok(_) if catalog.is_empty() => {
            eprintln!(
                "No element sets found in {}",
                config.elements.folder.display()
            );
            None
        }
        Ok(_) => Some(catalog),
        Err(e) => {
            eprintln!("Error loading elements: {}", e);
            None
        }
    }
}

fn load_observer(config: &Config) -> Option<Observer> {
    match config.observer() {
        Ok(o) => Some(o),
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

fn build_session(config: &Config) -> Option<TrackingSession> {
    let catalog = load_catalog(config)?;
    let observer = load_observer(config)?;
    let mut session = TrackingSession::new(catalog, observer, config.session_settings());

    let now = Utc::now();
    for name in &config.tracking.selected {
        if let Err(e) = session.select(name, now) {
            log::warn!("Not tracking {}: {}", name, e);
        }
    }
    Some(session)
}

fn runtime() -> Option<tokio::runtime::Runtime> {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => Some(rt),
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            None
        }
    }
}

fn serve(config: Config) -> ExitCode {
    let Some(session) = build_session(&config) else {
        return ExitCode::FAILURE;
    };
    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    rt.block_on(async {
        let clock = Arc::new(SystemClock);
        let session: SharedSession = Arc::new(Mutex::new(session));
        let mut runner = SessionRunner::new(session.clone(), clock.clone());
        if let Err(e) = runner.start() {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }

        let state = AppState::new(session, clock);
        let result = run_server(&config.web.bind, state).await;
        runner.stop().await;

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Server error: {}", e);
                ExitCode::FAILURE
            }
        }
    })
}

fn track(config: Config) -> ExitCode {
    let Some(session) = build_session(&config) else {
        return ExitCode::FAILURE;
    };
    if session.selection().is_empty() {
        eprintln!("Nothing to track: set tracking.selected in the config");
        return ExitCode::FAILURE;
    }
    let Some(rt) = runtime() else {
        return ExitCode::FAILURE;
    };

    rt.block_on(async {
        let session: SharedSession = Arc::new(Mutex::new(session.with_listener(LogListener)));
        let mut runner = SessionRunner::new(session, Arc::new(SystemClock));
        if let Err(e) = runner.start() {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }

        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {}", e);
        }
        runner.stop().await;
        ExitCode::SUCCESS
    })
}

/// Prediction window of `hours` starting at `start`.
fn window(start: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    if !(hours.is_finite() && hours > 0.0) {
        eprintln!("--hours must be positive");
        return None;
    }
    let end = Duration::try_seconds((hours * 3600.0) as i64)
        .and_then(|span| start.checked_add_signed(span));
    if end.is_none() {
        eprintln!("--hours {} is too large", hours);
    }
    end
}

fn passes(
    config: Config,
    satellite: Option<&str>,
    hours: f64,
    min_elevation: Option<f64>,
) -> ExitCode {
    let start = Utc::now();
    let (Some(catalog), Some(observer), Some(end)) =
        (load_catalog(&config), load_observer(&config), window(start, hours))
    else {
        return ExitCode::FAILURE;
    };
    let settings = config.session_settings();
    let min_elevation = min_elevation.unwrap_or(settings.min_elevation_deg);

    let satellites = match satellite {
        Some(name) => match catalog.get(name) {
            Some(sat) => vec![sat],
            None => {
                eprintln!("Satellite not in catalog: {}", name);
                return ExitCode::FAILURE;
            }
        },
        None => catalog.satellites().cloned().collect(),
    };

    let mut all: Vec<Pass> = Vec::new();
    for sat in &satellites {
        all.extend(settings.pass_search.predict(
            sat.as_ref(),
            sat.name(),
            &observer,
            start,
            end,
            min_elevation,
        ));
    }
    all.sort_by_key(|p| p.start);

    match lat_lon_to_locator(observer.latitude_deg, observer.longitude_deg, 6) {
        Ok(locator) => println!("{} passes over {} in the next {} h", all.len(), locator, hours),
        Err(_) => println!("{} passes in the next {} h", all.len(), hours),
    }
    for pass in &all {
        println!(
            "  {:<24} {} - {}  ({:>3} min)  max el {:5.1} at {}",
            pass.satellite,
            pass.start.format("%Y-%m-%d %H:%M:%S"),
            pass.end.format("%H:%M:%S"),
            pass.duration().num_minutes(),
            pass.max_elevation_deg,
            pass.max_elevation_at.format("%H:%M:%S"),
        );
    }
    ExitCode::SUCCESS
}

fn mutual(config: Config, satellite: &str, locator: &str, hours: f64) -> ExitCode {
    let start = Utc::now();
    let (Some(catalog), Some(observer), Some(end)) =
        (load_catalog(&config), load_observer(&config), window(start, hours))
    else {
        return ExitCode::FAILURE;
    };
    let remote = match Observer::from_locator(locator, None) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(sat) = catalog.get(satellite) else {
        eprintln!("Satellite not in catalog: {}", satellite);
        return ExitCode::FAILURE;
    };

    let settings = config.session_settings();
    let windows = predict_mutual_passes(
        sat.as_ref(),
        sat.name(),
        &observer,
        &remote,
        start,
        end,
        settings.min_elevation_deg,
        &settings.pass_search,
    );

    println!("{} mutual windows with {}", windows.len(), locator);
    for m in &windows {
        println!(
            "  {} - {}  ({:>3} min)  max el {:5.1} / {:5.1}",
            m.start.format("%Y-%m-%d %H:%M:%S"),
            m.end.format("%H:%M:%S"),
            m.duration().num_minutes(),
            m.max_elevation_a_deg,
            m.max_elevation_b_deg,
        );
    }
    ExitCode::SUCCESS
}

fn footprint(config: Config, satellite: &str, min_elevation: Option<f64>) -> ExitCode {
    let Some(catalog) = load_catalog(&config) else {
        return ExitCode::FAILURE;
    };
    let Some(sat) = catalog.get(satellite) else {
        eprintln!("Satellite not in catalog: {}", satellite);
        return ExitCode::FAILURE;
    };

    let settings = config.session_settings();
    let min_elevation = min_elevation.unwrap_or(settings.min_elevation_deg);
    let footprint = position_at(&sat, Utc::now())
        .and_then(|p| footprint_with_step(&p, min_elevation, settings.footprint_step_deg));

    match footprint.map(|fp| serde_json::to_string_pretty(&fp)) {
        Some(Ok(json)) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            eprintln!("Error encoding footprint: {}", e);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("No footprint for {} right now", satellite);
            ExitCode::FAILURE
        }
    }
}

fn locator_center(locator: &str) -> ExitCode {
    match locator_to_lat_lon(locator) {
        Ok(center) => {
            println!("{:.6}, {:.6}", center.latitude_deg, center.longitude_deg);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_the_requested_hours() {
        let start = Utc::now();
        assert_eq!(window(start, 24.0), Some(start + Duration::hours(24)));
        assert_eq!(window(start, 0.5), Some(start + Duration::minutes(30)));
    }

    #[test]
    fn window_rejects_unusable_hours() {
        let start = Utc::now();
        assert_eq!(window(start, -1.0), None);
        assert_eq!(window(start, f64::NAN), None);
        assert_eq!(window(start, 1e13), None);
        assert_eq!(window(start, 1e300), None);
        assert_eq!(window(DateTime::<Utc>::MAX_UTC - Duration::hours(1), 2.0), None);
    }
}
