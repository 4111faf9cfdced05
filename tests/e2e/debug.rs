//! Tests for the -n and -d flags.

use super::*;

#[test]
fn dry_run() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", ""))?;
    let out = space.run_expect(&mut tock_command(vec!["-n", "out"]))?;
    assert_output_contains(&out, "out");
    assert_output_contains(&out, "tock: ran 1 task");
    assert!(space.read("out").is_err());
    Ok(())
}

#[test]
fn explain() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        &[touch("out", "in"), "phony all: out\n".to_string()].join(""),
    )?;
    space.write("in", "")?;
    let out = space.run_expect(&mut tock_command(vec!["-d", "explain", "all"]))?;
    assert_output_contains(&out, "explain: run out: output out missing");
    assert_output_contains(&out, "explain: run all: phony target requested directly");

    let out = space.run_expect(&mut tock_command(vec!["-d", "explain", "out"]))?;
    assert_output_contains(&out, "explain: skip out: up to date");
    assert_output_not_contains(&out, "explain: run");
    Ok(())
}

#[test]
fn trace() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", ""))?;
    space.run_expect(&mut tock_command(vec!["-d", "trace", "out"]))?;
    let trace = String::from_utf8(space.read("trace.json")?)?;
    assert!(trace.contains("\"name\": \"schedule::build\""));
    Ok(())
}

#[test]
fn unknown_debug_tool() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", ""))?;
    let out = space.run(&mut tock_command(vec!["-d", "bogus"]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "use -d list to list");
    Ok(())
}
