use clap::{Args, Parser, Subcommand};
use gedbg_core::breakpoints::{CmdBreakpoints, GeBreakpoints};
use gedbg_core::cmd::describe;
use gedbg_core::config::{LIST_BASE, POLL_INTERVAL_MS};
use gedbg_core::log::{self, Level};
use gedbg_core::mem::GeMemory;
use gedbg_core::replay::Replay;
use gedbg_core::stepping::SteppingLock;
use gedbg_core::{BreakMode, Debugger, Error, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gedbg", version = "0.1.0",
    about = "Step through a recorded GE display list", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log level (off, trace, debug, info, warn, error), defaults to $GEDBG_LOG or info
    #[arg(long, global = true)]
    log: Option<Level>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a raw display list dump through the debugger
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the little-endian command word dump
    path: PathBuf,
    /// Guest address the list is loaded at
    #[arg(long, default_value_t = LIST_BASE, value_parser = parse_u32)]
    base: u32,
    /// Number of times the list is replayed, one frame each
    #[arg(short, long, default_value_t = 1)]
    frames: u64,
    /// Prim restriction rule, e.g. "1-5,!3"
    #[arg(short, long)]
    restrict: Option<String>,
    /// Initial break mode (op, draw, tex, nontex, frame, vsync, prim, curve, count)
    #[arg(short = 'b', long = "break")]
    break_mode: Option<BreakMode>,
    /// Break at this prim index, implies `--break count`
    #[arg(long)]
    count: Option<i32>,
    /// Count relative to the current prim
    #[arg(long, requires = "count")]
    relative: bool,
    /// Breakpoint on a command address
    #[arg(long = "bp", value_parser = parse_u32)]
    bps: Vec<u32>,
    /// Breakpoint on a command code
    #[arg(long = "cmd-bp", value_parser = parse_u32)]
    cmd_bps: Vec<u32>,
    /// Prompt for a command at each halt instead of continuing
    #[arg(short, long)]
    interactive: bool,
}

fn parse_u32(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli
        .log
        .or_else(|| std::env::var("GEDBG_LOG").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(Level::Info);
    log::log_init(level);

    match cli.command {
        Commands::Run(args) => cmd_run(args),
    }
}

fn lock(dbg: &Mutex<Debugger>) -> MutexGuard<'_, Debugger> {
    dbg.lock().unwrap_or_else(|e| e.into_inner())
}

/// What the user asked for at a halt.
#[derive(Debug, PartialEq)]
enum Command {
    Mode(BreakMode),
    Count(i32, bool),
    Restrict(String),
    Info,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".to_string());
    };
    let command = match head {
        "c" | "continue" => Command::Mode(BreakMode::None),
        "s" | "step" => Command::Mode(BreakMode::SingleOp),
        "d" => Command::Mode(BreakMode::SingleDraw),
        "p" => Command::Mode(BreakMode::Primitive),
        "f" => Command::Mode(BreakMode::Frame),
        "v" => Command::Mode(BreakMode::Vsync),
        "t" => Command::Mode(BreakMode::TextureChange),
        "count" => {
            let value = words
                .next()
                .and_then(|w| w.parse::<i32>().ok())
                .ok_or("usage: count N [rel]")?;
            Command::Count(value, words.next() == Some("rel"))
        }
        "r" | "restrict" => Command::Restrict(words.collect::<Vec<_>>().join("")),
        "i" | "info" => Command::Info,
        "q" | "quit" => Command::Quit,
        other => Command::Mode(other.parse::<BreakMode>().map_err(|e| e.to_string())?),
    };
    Ok(command)
}

fn read_word(data: &[u8], base: u32, pc: u32) -> Option<u32> {
    let offset = pc.checked_sub(base)? as usize;
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn print_halt(dbg: &Debugger, data: &[u8], base: u32) {
    let Some(pc) = dbg.halted_at() else {
        return;
    };
    let desc = read_word(data, base, pc).map(describe).unwrap_or_default();
    println!(
        "[gedbg] halted at {:#010x}: {} (prim {} this frame, {} last frame)",
        pc,
        desc,
        dbg.prims_this_frame(),
        dbg.prims_last_frame()
    );
}

/// Handles commands until one of them lets the GE run again.
fn prompt(dbg: &Mutex<Debugger>, shutdown: &AtomicBool) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("(gedbg) ");
        io::stdout().flush().map_err(|e| Error::IoError(e, String::new()))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::IoError(e, String::new()))?;
        let command = if read == 0 {
            Command::Quit
        } else {
            match parse_command(&line) {
                Ok(command) => command,
                Err(msg) => {
                    println!("{}", msg);
                    continue;
                }
            }
        };

        let mut dbg = lock(dbg);
        match command {
            Command::Mode(mode) => {
                dbg.set_mode(mode);
                return Ok(());
            }
            Command::Count(value, relative) => {
                dbg.set_mode(BreakMode::Count);
                dbg.set_target_count(value, relative);
                return Ok(());
            }
            Command::Restrict(rule) => {
                if dbg.set_restriction_rule(&rule) {
                    println!("restricted to '{}'", dbg.restriction_rule());
                } else {
                    println!("invalid rule '{}'", rule);
                }
            }
            Command::Info => {
                println!(
                    "mode {}, target {:?}, prims {} this frame, {} last frame, rule '{}'",
                    dbg.mode(),
                    dbg.target_count(),
                    dbg.prims_this_frame(),
                    dbg.prims_last_frame(),
                    dbg.restriction_rule()
                );
            }
            Command::Quit => {
                shutdown.store(true, Ordering::SeqCst);
                dbg.deactivate();
                return Ok(());
            }
        }
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let path_str = args.path.to_string_lossy().to_string();
    let data = std::fs::read(&args.path).map_err(|e| Error::IoError(e, path_str))?;
    let mem = GeMemory::from_bytes(args.base, &data)?;

    let mut bps = CmdBreakpoints::new();
    for addr in &args.bps {
        bps.set_breakpoint(*addr)?;
    }
    for cmd in &args.cmd_bps {
        let cmd = u8::try_from(*cmd).map_err(|_| Error::Other(format!("command code {:#x} out of range", cmd)))?;
        bps.add_cmd_breakpoint(cmd, false);
    }

    let stepping = Arc::new(SteppingLock::new());
    let dbg = Arc::new(Mutex::new(Debugger::new(Box::new(bps), stepping.clone())));
    {
        let mut dbg = lock(&dbg);
        if let Some(rule) = &args.restrict {
            if !dbg.set_restriction_rule(rule) {
                return Err(Error::InvalidRange(rule.clone()));
            }
        }
        if let Some(mode) = args.break_mode {
            dbg.set_mode(mode);
        }
        if let Some(count) = args.count {
            if dbg.mode() != BreakMode::Count {
                dbg.set_mode(BreakMode::Count);
            }
            dbg.set_target_count(count, args.relative);
        }
        if args.interactive || dbg.breakpoints().has_breakpoints() {
            dbg.activate(true);
        }
    }

    let mut replay = Replay::new(mem);
    let shutdown = replay.shutdown_flag();
    let frames = args.frames;
    let emu = {
        let dbg = Arc::clone(&dbg);
        let stepping = Arc::clone(&stepping);
        thread::spawn(move || replay.run(&dbg, &stepping, frames))
    };

    while !emu.is_finished() {
        if !stepping.wait_until_stepping(Duration::from_millis(POLL_INTERVAL_MS)) {
            continue;
        }
        print_halt(&lock(&dbg), &data, args.base);
        if args.interactive {
            prompt(&dbg, &shutdown)?;
        } else {
            lock(&dbg).set_mode(BreakMode::None);
        }
    }

    let stats = emu
        .join()
        .map_err(|_| Error::InternalError("replay thread panicked".to_string()))??;
    println!(
        "[gedbg] {} frames: {} executed, {} skipped, {} breaks",
        stats.frames, stats.executed, stats.skipped, stats.breaks
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("c\n"), Ok(Command::Mode(BreakMode::None)));
        assert_eq!(parse_command("prim"), Ok(Command::Mode(BreakMode::Primitive)));
        assert_eq!(parse_command("count 12 rel"), Ok(Command::Count(12, true)));
        assert_eq!(parse_command("r 1-5, !3"), Ok(Command::Restrict("1-5,!3".to_string())));
        assert!(parse_command("count x").is_err());
        assert!(parse_command("  ").is_err());
        assert!(parse_command("jump").is_err());
    }

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("0x08800010"), Ok(0x0880_0010));
        assert_eq!(parse_u32("16"), Ok(16));
        assert!(parse_u32("0xzz").is_err());
    }

    #[test]
    fn test_read_word() {
        let data = [0x03, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x0c];
        assert_eq!(read_word(&data, 0x100, 0x100), Some(0x0400_0003));
        assert_eq!(read_word(&data, 0x100, 0x104), Some(0x0c00_0000));
        assert_eq!(read_word(&data, 0x100, 0x108), None);
        assert_eq!(read_word(&data, 0x100, 0xfc), None);
    }
}
