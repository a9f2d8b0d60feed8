//! Maneki CLI
//!
//! Usage:
//!   maneki --simulate                       # Scripted walk-up scenario
//!   maneki --simulate --strategy aggressive # Same, beckoning at the edges
//!   maneki --serve                          # HTTP API server
//!   maneki --simulate --json                # JSON snapshot per tick

use clap::Parser;
use colored::Colorize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use maneki::core::{
    run_server, BehaviorController, BlinkSynthesizer, ControllerConfig, LipSyncSynthesizer,
    Strategy,
};
use maneki::types::{
    ActionId, AnimationSink, DetectionBox, ExpressionSink, HandFrame, Landmark, LookAtSink,
    MessageSink,
};
use maneki::{VERSION, WAVE_LANDMARK_INDEX};

#[derive(Parser, Debug)]
#[command(
    name = "maneki",
    version = VERSION,
    about = "Maneki - perceptual behavior engine for interactive avatars",
    long_about = "Maneki turns person detections and hand gestures into avatar behavior:\n\
                  who to look at, when to greet, wave back, or beckon.\n\n\
                  Modes:\n  \
                  --simulate  Run a scripted visitor scenario against console sinks\n  \
                  --serve     HTTP API server mode\n\n\
                  Strategies:\n  \
                  selective   - greet people who dwell for 2 seconds\n  \
                  aggressive  - beckon people entering the frame edges\n  \
                  hybrid      - both"
)]
struct Args {
    /// Run the scripted simulation scenario
    #[arg(short = 'm', long)]
    simulate: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Behavior strategy: selective, aggressive, or hybrid
    #[arg(long, default_value = "selective")]
    strategy: String,

    /// Run detection every Nth frame
    #[arg(long, default_value_t = 1)]
    frame_skip: u32,

    /// Pretend the beckon animation clip is missing
    #[arg(long)]
    no_beckon: bool,

    /// Also run the lip-sync scheduler during the simulation
    #[arg(long)]
    lipsync: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.serve {
        run_serve(&args).await;
    } else {
        // Default to the simulation when no mode is given
        run_simulate(&args).await;
    }
}

// =============================================================================
// CONSOLE SINKS
// =============================================================================

/// Prints animation commands instead of driving a rig
struct ConsoleAnimationSink;

impl AnimationSink for ConsoleAnimationSink {
    fn play_action(&self, action: ActionId) {
        match action {
            ActionId::Idle => println!("{}", format!("  ▶ play {}", action).dimmed()),
            _ => println!("{}", format!("  ▶ play {}", action).green().bold()),
        }
    }

    fn stop_action(&self, action: ActionId) {
        println!("{}", format!("  ■ stop {}", action).dimmed());
    }
}

/// Prints on-screen messages
struct ConsoleMessageSink;

impl MessageSink for ConsoleMessageSink {
    fn show(&self, text: &str, duration: Duration) {
        println!(
            "{}",
            format!("  💬 \"{}\" ({:.1}s)", text, duration.as_secs_f64()).cyan()
        );
    }

    fn hide(&self) {
        println!("{}", "  💬 (hidden)".dimmed());
    }
}

/// Prints one line when an expression channel starts moving. Per-frame
/// weights would drown the scenario output, so only the rising edge shows.
#[derive(Default)]
struct ConsoleExpressionSink {
    last: Mutex<HashMap<String, f32>>,
}

impl ExpressionSink for ConsoleExpressionSink {
    fn set_value(&self, channel: &str, weight: f32) {
        let mut last = self.last.lock().unwrap();
        let prev = last.insert(channel.to_string(), weight).unwrap_or(0.0);
        if prev == 0.0 && weight > 0.0 {
            println!("{}", format!("  ✨ {}", channel).dimmed());
        }
    }
}

/// Prints look-at targets, skipping repeats of "forward"
struct ConsoleLookAtSink {
    verbose: bool,
}

impl LookAtSink for ConsoleLookAtSink {
    fn look_at(&self, target: Option<[f64; 3]>) {
        if !self.verbose {
            return;
        }
        match target {
            Some([x, y, z]) => {
                println!("{}", format!("  👁 look at ({x:.2}, {y:.2}, {z:.2})").dimmed())
            }
            None => println!("{}", "  👁 look forward".dimmed()),
        }
    }
}

// =============================================================================
// SIMULATION
// =============================================================================

/// Scripted scenario: a visitor walks in from the frame edge, dwells near the
/// center, waves, and leaves. Runs in real time against console sinks.
async fn run_simulate(args: &Args) {
    let strategy: Strategy = match args.strategy.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    print_header(&format!("Simulation ({})", strategy), args.no_color);

    let config = ControllerConfig {
        strategy,
        frame_skip: args.frame_skip,
        beckon_available: !args.no_beckon,
        ..ControllerConfig::default()
    };
    let mut controller = BehaviorController::new(
        config,
        Arc::new(ConsoleAnimationSink),
        Arc::new(ConsoleMessageSink),
        Arc::new(ConsoleLookAtSink { verbose: false }),
    );

    // Autonomous facial motion runs alongside the scenario
    let expression = Arc::new(ConsoleExpressionSink::default());
    let blink = BlinkSynthesizer::new(expression.clone());
    if let Err(e) = blink.start() {
        eprintln!("blink disabled: {}", e);
    }
    let lipsync = if args.lipsync {
        let synth = LipSyncSynthesizer::new(expression.clone());
        if let Err(e) = synth.start() {
            eprintln!("lip-sync disabled: {}", e);
        }
        Some(synth)
    } else {
        None
    };

    let tick = Duration::from_millis(100);

    // Phase 1: visitor enters at the left edge and crosses toward the center
    phase("Visitor enters from the left", args);
    for step in 0..10u32 {
        let x = 20.0 + step as f64 * 26.0;
        drive(&mut controller, &[DetectionBox::new(x, 160.0, 60.0, 120.0)], &[], args);
        tokio::time::sleep(tick).await;
    }

    // Phase 2: visitor stands near the center long enough to be greeted
    phase("Visitor dwells near the center", args);
    for _ in 0..25u32 {
        drive(
            &mut controller,
            &[DetectionBox::new(290.0, 160.0, 60.0, 120.0)],
            &[],
            args,
        );
        tokio::time::sleep(tick).await;
    }

    // Phase 3: visitor waves an open palm
    phase("Visitor waves", args);
    for step in 0..35u32 {
        let hand = waving_hand(step);
        drive(
            &mut controller,
            &[DetectionBox::new(290.0, 160.0, 60.0, 120.0)],
            &[hand],
            args,
        );
        tokio::time::sleep(tick).await;
    }

    // Phase 4: visitor leaves; tracking evicts after the timeout
    phase("Visitor leaves", args);
    for _ in 0..10u32 {
        drive(&mut controller, &[], &[], args);
        tokio::time::sleep(tick).await;
    }

    blink.stop();
    if let Some(synth) = lipsync {
        let _ = synth.stop().await;
    }

    println!();
    println!("Final: {}", controller.snapshot().to_terminal_string());
}

/// One simulated camera tick: detections, gestures, gaze, and a status line
fn drive(
    controller: &mut BehaviorController,
    detections: &[DetectionBox],
    hands: &[HandFrame],
    args: &Args,
) {
    let now = Instant::now();
    if controller.begin_frame() {
        controller.ingest_detections(detections, now);
    }
    if !hands.is_empty() {
        controller.ingest_gestures(hands, now);
    }
    controller.update_gaze();

    if args.json {
        println!(
            "{}",
            serde_json::to_string(&controller.snapshot()).unwrap_or_default()
        );
    }
}

/// Synthetic open-palm hand oscillating horizontally, one sample per tick
fn waving_hand(step: u32) -> HandFrame {
    let x = 0.5 + 0.1 * (step as f64 * 1.2).sin();
    let landmarks = (0..=WAVE_LANDMARK_INDEX)
        .map(|_| Landmark { x, y: 0.4 })
        .collect();
    HandFrame {
        handedness: "Right".to_string(),
        landmarks,
        gesture_label: "Open_Palm".to_string(),
        gesture_score: 0.9,
    }
}

fn phase(label: &str, args: &Args) {
    println!();
    if args.no_color {
        println!("== {} ==", label);
    } else {
        println!("{}", format!("== {} ==", label).bold());
    }
}

fn print_header(mode: &str, no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Maneki v{} - {}", VERSION, mode);
        println!("========================================");
    } else {
        println!("{}", "════════════════════════════════════════".bold());
        println!("{}", format!("  Maneki v{} - {}", VERSION, mode).bold());
        println!("{}", "════════════════════════════════════════".bold());
    }
    println!();
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    print_header("API Server", args.no_color);

    if let Err(e) = run_server(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
