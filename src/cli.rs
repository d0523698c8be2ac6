use anyhow::{Result, anyhow};
use handctl::Profile;
use log::warn;
use pico_args::Arguments;
use std::{
    env,
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use crate::profiles::{ProfileSource, ProfileStore, load_profile_file};
use crate::stream::{PipelineOptions, run_pipeline};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("run") => {
            let opts = pipeline_options(&mut pargs, true)?;
            let source = profile_source(&mut pargs)?;
            warn_leftovers(pargs);
            run_pipeline(BufReader::new(io::stdin()), source, opts)?;
            Ok(())
        }

        Some("replay") => {
            let opts = pipeline_options(&mut pargs, false)?;
            let source = profile_source(&mut pargs)?;
            let path: PathBuf = pargs
                .free_from_str::<String>()
                .map(PathBuf::from)
                .map_err(|_| anyhow!("usage: handctl replay <file.jsonl> [--profile <name> | --file <path>]"))?;
            warn_leftovers(pargs);
            let f = File::open(&path)
                .map_err(|e| anyhow!("failed to open {}: {e}", path.display()))?;
            run_pipeline(BufReader::new(f), source, opts)?;
            Ok(())
        }

        Some("list") => {
            let store = ProfileStore::load_or_install_default()?;
            print_response(&serde_json::json!({
                "ok": true,
                "data": {"profiles": store.list_profiles(), "active": store.active_name}
            }));
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: handctl use <profile_name>"))?;
            let mut store = ProfileStore::load_or_install_default()?;
            store.set_active(&name)?;
            print_response(&serde_json::json!({"ok": true, "data": {"active_profile": name}}));
            Ok(())
        }

        Some("check") => {
            let file: Option<String> = pargs.opt_value_from_str("--file")?;
            let (label, profile) = match file {
                Some(f) => {
                    let path = PathBuf::from(f);
                    (path.display().to_string(), load_profile_file(&path)?)
                }
                None => {
                    let store = ProfileStore::load_or_install_default()?;
                    let name: String = pargs
                        .free_from_str()
                        .unwrap_or_else(|_| store.active_name.clone());
                    (name.clone(), store.load(&name)?)
                }
            };
            print_response(&check_report(&label, &profile));
            Ok(())
        }

        Some("init") => {
            let force = pargs.contains("--force");
            let store = ProfileStore::load_or_install_default()?;
            let path = store.install_default(force)?;
            print_response(&serde_json::json!({
                "ok": true,
                "data": {"default_profile": path, "active_profile": store.active_name}
            }));
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn profile_source(pargs: &mut Arguments) -> Result<ProfileSource> {
    let file: Option<String> = pargs.opt_value_from_str("--file")?;
    let name: Option<String> = pargs.opt_value_from_str("--profile")?;
    match (file, name) {
        (Some(_), Some(_)) => Err(anyhow!("--file and --profile are mutually exclusive")),
        (Some(f), None) => Ok(ProfileSource::File(PathBuf::from(f))),
        (None, name) => {
            let store = ProfileStore::load_or_install_default()?;
            let name = name.unwrap_or_else(|| store.active_name.clone());
            Ok(ProfileSource::Named { store, name })
        }
    }
}

fn pipeline_options(pargs: &mut Arguments, allow_watch: bool) -> Result<PipelineOptions> {
    let mut opts = PipelineOptions {
        with_outputs: pargs.contains("--outputs"),
        watch: allow_watch && pargs.contains("--watch"),
        ..PipelineOptions::default()
    };
    if let Some(dt) = pargs.opt_value_from_str::<_, f32>("--dt")? {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(anyhow!("--dt must be a positive number of seconds, got {dt}"));
        }
        opts.default_dt = dt;
    }
    Ok(opts)
}

fn warn_leftovers(pargs: Arguments) {
    let rest = pargs.finish();
    if !rest.is_empty() {
        warn!("ignoring unused arguments: {rest:?}");
    }
}

fn check_report(label: &str, p: &Profile) -> serde_json::Value {
    let bindings: Vec<_> = p
        .bindings
        .iter()
        .map(|b| {
            serde_json::json!({
                "name": b.name,
                "hand": b.hand,
                "mapper": b.mapper.kind(),
            })
        })
        .collect();
    let zones: Vec<_> = p.zones.iter().map(|z| z.name.as_str()).collect();
    serde_json::json!({
        "ok": true,
        "data": {
            "profile": label,
            "name": p.meta.name,
            "bindings": bindings,
            "zones": zones,
            "wave": p.wave.is_some(),
            "poses": p.poses.is_some(),
        }
    })
}

fn print_help() {
    println!(
        r#"handctl - hand landmark gesture interpreter

USAGE:
  handctl help [command]                  Show general or command-specific help
  handctl run [options]                   Interpret a JSON-lines landmark stream from stdin
  handctl replay <file.jsonl> [options]   Interpret a recorded stream
  handctl list                            List profiles
  handctl use <name>                      Switch active profile
  handctl check [name | --file <path>]    Validate a profile
  handctl init [--force]                  Install the bundled default profile

OPTIONS (run, replay):
  --profile <name>   Use a named profile instead of the active one
  --file <path>      Use a profile file outside the profiles directory
  --outputs          Emit a line for every frame, with binding outputs
  --dt <secs>        Frame interval for lines without "dt" (default 0.033)
  --watch            (run only) Reload the profile when it changes

TIPS:
  - Profiles: ~/.config/handctl/profiles
  - Active profile pointer: ~/.config/handctl/active
  - Log level: HANDCTL_LOG=debug
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "run" => println!(
            "usage: handctl run [--profile <name> | --file <path>] [--outputs] [--dt <secs>] [--watch]\nReads landmark lines from stdin until EOF or Ctrl-C; writes event lines to stdout."
        ),
        "replay" => println!(
            "usage: handctl replay <file.jsonl> [--profile <name> | --file <path>] [--outputs] [--dt <secs>]\nRuns a recorded landmark stream through the interpreter."
        ),
        "list" => println!("usage: handctl list\nLists available profiles and the active one."),
        "use" => {
            println!("usage: handctl use <name>\nValidates <name> and makes it the active profile.")
        }
        "check" => println!(
            "usage: handctl check [name | --file <path>]\nParses and validates a profile; prints its bindings."
        ),
        "init" => println!(
            "usage: handctl init [--force]\nInstalls the bundled default profile; --force overwrites it."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
