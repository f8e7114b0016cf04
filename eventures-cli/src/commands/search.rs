//! `eventures search` - run a map session against an events file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use eventures::logging::init_logging;
use eventures::markers::MarkerId;
use eventures::session::{RenderFrame, SearchOutcome, SessionHandle};
use eventures::source::EventSource;
use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::error::CliError;
use crate::source::JsonFileEventSource;
use crate::viewpoint::Viewpoint;

/// One user action applied after the search loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NavStep {
    /// Focus the next marker
    #[value(alias = "n")]
    Next,
    /// Focus the previous marker
    #[value(alias = "p")]
    Previous,
    /// Load the next page of results
    #[value(alias = "np")]
    NextPage,
    /// Load the previous page of results
    #[value(alias = "pp")]
    PreviousPage,
}

/// Arguments for `eventures search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// JSON file holding the events
    pub events: PathBuf,

    /// Search text; empty matches every event
    #[arg(long, short, default_value = "")]
    pub query: String,

    /// Page to load first
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Results per page (overrides config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Navigation steps to apply in order, e.g. `n,n,p,next-page`
    #[arg(long, value_enum, value_delimiter = ',')]
    pub nav: Vec<NavStep>,

    /// Marker id to click after navigating
    #[arg(long)]
    pub click: Option<u32>,

    /// Zoom steps around the focused marker; negative zooms out
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub zoom: i32,

    /// Print session counters at the end
    #[arg(long)]
    pub stats: bool,
}

/// Run the search command.
pub fn run(args: SearchArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let _log_guard = init_logging(&config.logging_config())?;

    let mut session_config = config.session_config();
    if let Some(page_size) = args.page_size {
        session_config = session_config.with_page_size(page_size);
    }

    let source = Arc::new(JsonFileEventSource::open(&args.events)?);
    info!(
        path = %source.path().display(),
        events = source.event_count(),
        query = %args.query,
        "Starting search"
    );

    let handle = SessionHandle::new(Arc::clone(&source), session_config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let outcome = handle.search(&args.query, args.page).await;
        report_outcome("search", &outcome)?;

        for step in &args.nav {
            apply_step(&handle, *step).await?;
        }

        if let Some(id) = args.click {
            let id = MarkerId(id);
            match handle.resolve_click(id) {
                Some(index) => println!("click {}: focused marker #{}", id, index),
                None => println!("click {}: no such marker", id),
            }
        }

        let frame = handle.frame();
        print_frame(&frame, args.zoom);

        let has_next = handle.has_next_page().await?;
        let previous = handle.with_session(|session| session.previous_page());
        let current = handle.with_session(|session| session.pages().current_page());
        println!();
        println!("Page {}", current);
        println!(
            "  previous: {}",
            previous.map_or("none".to_string(), |page| format!("page {}", page))
        );
        println!(
            "  next:     {}",
            has_next.map_or("none".to_string(), |page| format!("page {}", page))
        );

        if args.stats {
            println!();
            println!("{}", handle.metrics());
            println!("source fetches: {}", source.calls());
        }

        Ok::<(), CliError>(())
    })
}

async fn apply_step<S: EventSource + ?Sized>(
    handle: &SessionHandle<S>,
    step: NavStep,
) -> Result<(), CliError> {
    debug!(?step, "Applying navigation step");
    match step {
        NavStep::Next => print_focus("next", handle.step_next()),
        NavStep::Previous => print_focus("previous", handle.step_previous()),
        NavStep::NextPage => report_outcome("next page", &handle.next_page().await)?,
        NavStep::PreviousPage => report_outcome("previous page", &handle.previous_page().await)?,
    }
    Ok(())
}

fn print_focus(action: &str, focus: Option<usize>) {
    match focus {
        Some(index) => println!("{}: focused marker #{}", action, index),
        None => println!("{}: nothing to focus", action),
    }
}

/// Print an outcome; a source failure on the initial load is an error.
fn report_outcome(action: &str, outcome: &SearchOutcome) -> Result<(), CliError> {
    match outcome {
        SearchOutcome::Loaded {
            page,
            points,
            dropped,
        } => {
            println!("{}: page {} loaded, {} markers", action, page, points);
            if *dropped > 0 {
                println!("  {} events skipped for bad coordinates", dropped);
            }
        }
        SearchOutcome::Empty { page, dropped } => {
            println!("{}: page {} has no events to show", action, page);
            if *dropped > 0 {
                println!("  {} events skipped for bad coordinates", dropped);
            }
        }
        SearchOutcome::NoSuchPage => println!("{}: no such page", action),
        SearchOutcome::Superseded => println!("{}: superseded", action),
        SearchOutcome::Unavailable(e) => {
            if action == "search" {
                return Err(CliError::Source(e.clone()));
            }
            println!("{}: {}", action, e);
        }
    }
    Ok(())
}

fn print_frame(frame: &RenderFrame, zoom: i32) {
    println!();
    println!("Markers");
    println!("=======");

    if frame.markers.is_empty() {
        println!("  (none)");
    }

    for (id, point) in frame.markers.entries() {
        let marker = if frame.focus == Some(id.index()) { ">" } else { " " };
        let badge = point
            .badge()
            .map(|count| format!("  [{}]", count))
            .unwrap_or_default();
        println!(
            "{} {:>4}  lat {:<12} lng {:<12}{}",
            marker,
            id.to_string(),
            point.lat_text,
            point.lng_text,
            badge
        );
    }

    let mut view = frame
        .focus_point()
        .map(|point| Viewpoint::focused_on(point.point))
        .unwrap_or_else(Viewpoint::initial);
    for _ in 0..zoom.unsigned_abs() {
        view = if zoom > 0 { view.zoom_in() } else { view.zoom_out() };
    }

    println!();
    println!("View: {}", view);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SearchArgs,
    }

    #[test]
    fn test_parse_nav_steps() {
        let cli = TestCli::try_parse_from([
            "eventures",
            "events.json",
            "--query",
            "jazz",
            "--nav",
            "n,p,next-page,pp",
            "--click",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.args.query, "jazz");
        assert_eq!(
            cli.args.nav,
            vec![
                NavStep::Next,
                NavStep::Previous,
                NavStep::NextPage,
                NavStep::PreviousPage
            ]
        );
        assert_eq!(cli.args.click, Some(3));
        assert_eq!(cli.args.page, 0);
    }

    #[test]
    fn test_parse_negative_zoom() {
        let cli = TestCli::try_parse_from(["eventures", "events.json", "--zoom", "-2"]).unwrap();
        assert_eq!(cli.args.zoom, -2);
    }

    #[test]
    fn test_rejects_unknown_step() {
        assert!(TestCli::try_parse_from(["eventures", "events.json", "--nav", "sideways"]).is_err());
    }

    #[test]
    fn test_report_outcome_fails_only_on_initial_search() {
        let failure = SearchOutcome::Unavailable(eventures::source::SourceError::Unavailable(
            "down".to_string(),
        ));
        assert!(report_outcome("search", &failure).is_err());
        assert!(report_outcome("next page", &failure).is_ok());
        assert!(report_outcome("search", &SearchOutcome::NoSuchPage).is_ok());
    }
}
