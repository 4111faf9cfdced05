use anyhow::anyhow;
use argh::FromArgs;
use std::path::Path;

use crate::{fs::RealFileSystem, load, progress::DumbConsoleProgress, trace, work};

/// tock, a tiny mtime-driven build runner
#[derive(FromArgs)]
struct Args {
    /// chdir before running
    #[argh(option, short = 'C')]
    chdir: Option<String>,

    /// input build file [default=build.tock]
    #[argh(option, short = 'f', default = "String::from(\"build.tock\")")]
    file: String,

    /// debugging tools, use -d list to list
    #[argh(option, short = 'd')]
    debug: Option<String>,

    /// print executed command lines
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// dry run: print what would run without running it
    #[argh(switch, short = 'n')]
    dry_run: bool,

    /// targets to build [default: the manifest's default, else "default"]
    #[argh(positional)]
    targets: Vec<String>,
}

fn run_impl() -> anyhow::Result<i32> {
    let args: Args = argh::from_env();
    let mut options = work::Options {
        dry_run: args.dry_run,
        explain: false,
    };

    if let Some(debug) = &args.debug {
        match debug.as_str() {
            "list" => {
                println!("debug tools:");
                println!("  explain  print why each task runs or is skipped");
                println!("  trace    generate json performance trace");
                return Ok(1);
            }
            "explain" => options.explain = true,
            "trace" => trace::open("trace.json")?,
            _ => anyhow::bail!("unknown -d {:?}, use -d list to list", debug),
        }
    }

    if let Some(dir) = &args.chdir {
        let dir = Path::new(dir);
        std::env::set_current_dir(dir).map_err(|err| anyhow!("chdir {:?}: {}", dir, err))?;
    }

    let mut state = trace::scope("load::read", || {
        load::read(Box::new(RealFileSystem::new()), &args.file)
    })?;

    let targets = if !args.targets.is_empty() {
        args.targets
    } else if !state.default.is_empty() {
        std::mem::take(&mut state.default)
    } else if state.project.find_task("default").is_some() {
        vec!["default".to_string()]
    } else {
        anyhow::bail!("no target specified and no default");
    };

    // Resolve every target before anything runs.
    let ids = state.project.resolve_targets(&targets)?;
    let mut progress = DumbConsoleProgress::new(args.verbose);
    let ran = state.project.run_tasks(&ids, &mut progress, &options)?;

    match ran {
        // Special case: don't print numbers when no work done.
        0 => println!("tock: no work to do"),
        1 => println!("tock: ran 1 task, now up to date"),
        n => println!("tock: ran {} tasks, now up to date", n),
    }
    Ok(0)
}

pub fn run() -> anyhow::Result<i32> {
    let res = run_impl();
    trace::close()?;
    res
}
