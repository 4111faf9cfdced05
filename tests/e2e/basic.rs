use crate::e2e::*;

#[test]
fn empty_default() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", "phony default:\n")?;
    let out = space.run_expect(&mut tock_command(vec![]))?;
    assert_eq!(std::str::from_utf8(&out.stdout)?, "tock: no work to do\n");
    Ok(())
}

#[test]
fn no_target_and_no_default() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", "phony all:\n")?;
    let out = space.run(&mut tock_command(vec![]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "no target specified and no default");
    Ok(())
}

#[test]
fn basic_build() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", &touch("out", "in"))?;
    space.write("in", "")?;
    space.set_mtime("in", 1000)?;

    let out = space.run_expect(&mut tock_command(vec!["out"]))?;
    assert!(space.read("out").is_ok());
    assert_output_contains(&out, "tock: ran 1 task, now up to date");

    let out = space.run_expect(&mut tock_command(vec!["out"]))?;
    assert_output_contains(&out, "tock: no work to do");
    Ok(())
}

#[test]
fn rebuild_when_input_newer() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        &[touch("mid", "in"), touch("out", "mid")].join(""),
    )?;
    space.write("in", "")?;
    space.write("mid", "")?;
    space.write("out", "")?;
    space.set_mtime("in", 1000)?;
    space.set_mtime("mid", 2000)?;
    space.set_mtime("out", 3000)?;

    let out = space.run_expect(&mut tock_command(vec!["out"]))?;
    assert_output_contains(&out, "tock: no work to do");

    // Older than out, but out still runs because mid does.
    space.set_mtime("in", 2500)?;
    let out = space.run_expect(&mut tock_command(vec!["out"]))?;
    assert_output_contains(&out, "tock: ran 2 tasks, now up to date");
    Ok(())
}

#[cfg(unix)]
#[test]
fn phony_chain_order() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        "
phony t1:
  command = echo one
phony t2: t1
  command = echo two
phony t3: t1
  command = echo three
phony default: t2 t3
",
    )?;
    let out = space.run_expect(&mut tock_command(vec![]))?;
    let stdout = std::str::from_utf8(&out.stdout)?;
    let one = stdout.find("one").unwrap();
    let two = stdout.find("two").unwrap();
    let three = stdout.find("three").unwrap();
    assert!(one < two && two < three, "unexpected order:\n{}", stdout);
    assert_output_contains(&out, "tock: ran 3 tasks, now up to date");
    Ok(())
}

#[cfg(unix)]
#[test]
fn shared_prereq_runs_once() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        "
phony gen:
  command = echo GEN
phony a: gen
phony b: gen
",
    )?;
    let out = space.run_expect(&mut tock_command(vec!["a", "b"]))?;
    let stdout = std::str::from_utf8(&out.stdout)?;
    assert_eq!(stdout.matches("GEN").count(), 1, "{}", stdout);
    assert_output_contains(&out, "tock: ran 1 task, now up to date");
    Ok(())
}

#[test]
fn default_statement() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        &[touch("a", ""), touch("b", ""), "default b\n".to_string()].join(""),
    )?;
    space.run_expect(&mut tock_command(vec![]))?;
    assert!(space.read("a").is_err());
    assert!(space.read("b").is_ok());
    Ok(())
}

#[test]
fn chdir_and_file_flags() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("sub/other.tock", &touch("out", ""))?;
    space.run_expect(&mut tock_command(vec!["-C", "sub", "-f", "other.tock", "out"]))?;
    assert!(space.read("sub/out").is_ok());
    Ok(())
}

#[test]
fn manifest_in_subdir_runs_there() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("sub/build.tock", &touch("out", ""))?;
    space.run_expect(&mut tock_command(vec!["-f", "sub/build.tock", "out"]))?;
    assert!(space.read("sub/out").is_ok());
    assert!(space.read("out").is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn failing_command() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.tock",
        "
phony bad:
  command = echo oh no; exit 1
phony after: bad
  command = touch after
",
    )?;
    let out = space.run(&mut tock_command(vec!["after"]))?;
    assert!(!out.status.success());
    assert_output_contains(&out, "failed: bad (build.tock:2)");
    assert_output_contains(&out, "oh no");
    assert_stderr_contains(&out, "bad failed: oh no");
    assert!(space.read("after").is_err());
    Ok(())
}

#[test]
fn parse_error() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.tock", "rule cc\n")?;
    let out = space.run(&mut tock_command(vec![]))?;
    assert!(!out.status.success());
    assert_stderr_contains(&out, "parse error");
    assert_stderr_contains(&out, "build.tock:1: rule cc");
    Ok(())
}
