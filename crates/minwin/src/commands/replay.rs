use clap::Args;
use serde::Serialize;

use minwin_core::{
    MessageCode, MessagePump, PlatformCall, PollOutcome, PumpState, PumpStats, ScriptedPlatform,
    WindowResult,
};

#[derive(Args)]
pub struct ReplayArgs {
    /// Messages to queue, in order (e.g. PAINT, WM_CLOSE, 0x0010)
    pub messages: Vec<String>,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Make window class registration fail
    #[arg(long)]
    pub fail_register: bool,
    /// Make window creation fail
    #[arg(long)]
    pub fail_create: bool,
}

/// What happened to a scripted message sequence.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub dispatched: Vec<String>,
    /// Terminal message that stopped the pump, if any.
    pub stopped_at: Option<String>,
    /// State once the queue was drained, before replay closed the window.
    pub drained_state: PumpState,
    /// State after cleanup. Always `Stopped` for a started pump.
    pub state: PumpState,
    /// True when the queue ran dry with the window still open and replay
    /// closed it.
    pub closed_by_replay: bool,
    /// Messages left in the queue after cleanup, including the QUIT
    /// posted when the window was destroyed.
    pub left_in_queue: Vec<String>,
    pub unregistered: usize,
    pub stats: PumpStats,
    pub calls: Vec<PlatformCall>,
}

pub fn execute(args: &ReplayArgs) {
    let report = match replay(args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Dispatched:   {}", list(&report.dispatched));
    println!(
        "Stopped at:   {}",
        report.stopped_at.as_deref().unwrap_or("(queue drained)")
    );
    if report.closed_by_replay {
        println!("Drained:      {:?}, window closed by replay", report.drained_state);
    }
    println!("State:        {:?}", report.state);
    println!("Left queued:  {}", list(&report.left_in_queue));
    println!("Unregistered: {}", report.unregistered);
    println!(
        "Polls:        {} ({} idle)",
        report.stats.polls, report.stats.idle_polls
    );
}

fn list(codes: &[String]) -> String {
    if codes.is_empty() {
        "(none)".to_string()
    } else {
        codes.join(", ")
    }
}

/// Brings up a scripted window, drains the queue once, then stops the
/// pump so the report includes cleanup.
pub fn replay(args: &ReplayArgs) -> WindowResult<ReplayReport> {
    let codes = args
        .messages
        .iter()
        .map(|m| MessageCode::parse(m).ok_or_else(|| format!("unknown message code: {m}")))
        .collect::<Result<Vec<_>, _>>()?;

    let mut platform = ScriptedPlatform::with_codes(&codes);
    platform.fail_register = args.fail_register;
    platform.fail_create = args.fail_create;

    let mut pump = MessagePump::new(platform, super::load_config().window);
    pump.start()?;

    let mut stopped_at = None;
    loop {
        match pump.poll() {
            PollOutcome::Dispatched { .. } => continue,
            PollOutcome::Stopped { code } => {
                stopped_at = Some(code.to_string());
                break;
            }
            PollOutcome::Idle => break,
        }
    }

    let drained_state = pump.state();
    let stats = pump.stats();
    pump.stop();

    let platform = pump.platform();
    Ok(ReplayReport {
        dispatched: platform
            .dispatched_codes()
            .iter()
            .map(ToString::to_string)
            .collect(),
        stopped_at,
        drained_state,
        state: pump.state(),
        closed_by_replay: drained_state == PumpState::Running,
        left_in_queue: platform
            .pending_codes()
            .iter()
            .map(ToString::to_string)
            .collect(),
        unregistered: platform.count(|c| matches!(c, PlatformCall::UnregisterClass { .. })),
        stats,
        calls: platform.calls().to_vec(),
    })
}
