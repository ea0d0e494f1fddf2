mod analyze;
mod find;
mod probe;
mod profile;
mod verify;

const USAGE: &str = "\
A tool for running, checking and measuring the patterns of a regex tutorial.

USAGE:
    regex-tutor <command> ...

COMMANDS:
    analyze  Report the ReDoS risk of patterns, with suggested rewrites.
    find     Collect every match of a pattern in a haystack.
    probe    Run a single match under a hard deadline.
    profile  Time patterns against a haystack and rank them.
    verify   Check that every lesson step finds the expected matches.
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    match &*cmd {
        "analyze" => analyze::run(p),
        "find" => find::run(p),
        "probe" => probe::run(p),
        "profile" => profile::run(p),
        "verify" => verify::run(p),
        unk => anyhow::bail!("unrecognized command '{unk}'"),
    }
}
