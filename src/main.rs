use anyhow::{Context, Result};
use log::info;

use persuasion::overlay::SubtitleBar;
use persuasion::scenario::{self, Scenario};
use persuasion::{DialogueSession, Settings, UiMessage};

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info   # refresh summaries
    //   RUST_LOG=debug  # + per-topic decisions
    //   RUST_LOG=trace  # + condition walk details
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let scenario = match args.get(1) {
        Some(path) => Scenario::load(path).context(
            "Usage: predictable-persuasion [scenario.json] [settings.json]\n\
             \n\
             Without arguments the built-in city gate scenario runs with default settings.",
        )?,
        None => scenario::city_gate_scenario(),
    };

    let settings = match args.get(2) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    println!("Speech skill : {}", scenario.host.player.speech);
    println!(
        "Speaker      : {}",
        scenario
            .host
            .speaker
            .as_ref()
            .map_or("(none)", |s| s.name.as_str())
    );
    println!("Subtitles    : {:?}", settings.show_subtitles);

    run(&scenario, settings);
    Ok(())
}

/// Open the menu, show the annotated topic list, highlight each entry once,
/// then close the menu.
fn run(scenario: &Scenario, settings: Settings) {
    let mut session = DialogueSession::new(settings);
    let mut lines = scenario.lines();

    session.handle_message(UiMessage::Show, &mut lines, &scenario.host);

    println!("\n========================================");
    println!("             TOPIC LIST");
    println!("========================================");

    let overlay = session.overlay();
    let mut subtitles = SubtitleBar::new(session.settings().colors.regular_new);

    for line in &lines {
        let color = overlay
            .text_color(&line.text, true)
            .map_or_else(|| "default".to_string(), |c| c.to_string());
        println!("  [{color:>7}] {}", line.text);

        if subtitles.highlight(&overlay, &line.text) && !subtitles.text.is_empty() {
            println!("              \"{}\"", subtitles.text);
        }
    }

    println!("========================================\n");

    session.handle_message(UiMessage::Hide, &mut lines, &scenario.host);
    info!("Session closed");
}
