//! Tests for behavior around missing files and bad graphs.

use super::*;

#[test]
fn missing_input() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", "in"))?;
    space.write("out", "")?;

    let out = space.run(&mut tock_command(vec!["out"]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "input in missing");
    assert_output_not_contains(&out, "tock: ran");
    Ok(())
}

#[test]
fn missing_output_rebuilds() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", "in"))?;
    space.write("in", "")?;
    space.run_expect(&mut tock_command(vec!["out"]))?;

    std::fs::remove_file(space.path().join("out"))?;
    let out = space.run_expect(&mut tock_command(vec!["out"]))?;
    assert_output_contains(&out, "tock: ran 1 task");
    assert!(space.read("out").is_ok());
    Ok(())
}

#[test]
fn unknown_target() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", ""))?;
    let out = space.run(&mut tock_command(vec!["nope"]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "unknown target \"nope\"");
    Ok(())
}

#[test]
fn unknown_second_target_runs_nothing() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", ""))?;
    let out = space.run(&mut tock_command(vec!["out", "nope"]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "unknown target \"nope\"");
    assert!(space.read("out").is_err());
    Ok(())
}

#[test]
fn cycle() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", "phony a: b\nphony b: a\n")?;
    let out = space.run(&mut tock_command(vec!["a"]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "dependency cycle: a -> b -> a");
    Ok(())
}

#[test]
fn missing_manifest() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut tock_command(vec![]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "read build.tock");
    Ok(())
}
