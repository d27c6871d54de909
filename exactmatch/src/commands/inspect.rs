// exactmatch/src/commands/inspect.rs
//! The `inspect` command: show the fragments of one signature.

use anyhow::{bail, Result};
use std::io::Write;

use exactmatch_core::report::latin1_view;
use exactmatch_core::{Extractor, SignatureKind};

use crate::cli::InspectCommand;
use crate::commands::load_config;

/// Writes one line per fragment: `kept|dropped`, length, hex and a quoted
/// text view. A discarded signature is an error.
pub fn run_inspect<W: Write>(cmd: &InspectCommand, writer: &mut W) -> Result<()> {
    let (kind, text) = match (&cmd.content, &cmd.pcre) {
        (Some(text), _) => (SignatureKind::Content, text),
        (None, Some(text)) => (SignatureKind::Pattern, text),
        (None, None) => bail!("Either --content or --pcre is required"),
    };

    let extractor = Extractor::new(load_config(cmd.config.as_deref(), cmd.threshold, &[])?)?;
    let fragments = match extractor.extract_signature(kind, text) {
        Ok(fragments) => fragments,
        Err(e) => bail!("{} signature discarded: {}", kind, e),
    };

    if fragments.is_empty() {
        writeln!(writer, "no exact match")?;
        return Ok(());
    }
    for fragment in fragments {
        let status = if extractor.threshold().retains(fragment.len()) { "kept" } else { "dropped" };
        writeln!(
            writer,
            "{}\t{}\t{}\t{:?}",
            status,
            fragment.len(),
            hex::encode(&fragment),
            latin1_view(&fragment)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn inspect(content: Option<&str>, pcre: Option<&str>, threshold: Option<usize>) -> Result<String> {
        let cmd = InspectCommand {
            content: content.map(String::from),
            pcre: pcre.map(String::from),
            threshold,
            config: None,
        };
        let mut out = Vec::new();
        run_inspect(&cmd, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_inspect_pattern() {
        let out = inspect(None, Some("/o{2}/"), Some(1)).unwrap();
        assert_eq!(out, "kept\t2\t6f6f\t\"oo\"\n");
    }

    #[test]
    fn test_inspect_marks_short_fragments() {
        let out = inspect(None, Some(r"/ab\d+cdef/"), None).unwrap();
        assert_eq!(out.lines().next(), Some("dropped\t2\t6162\t\"ab\""));
        assert!(out.lines().nth(1).unwrap().starts_with("kept\t4\t"));
    }

    #[test]
    fn test_inspect_discarded_signature_is_an_error() {
        let err = inspect(Some("ab|6|de"), None, None).unwrap_err();
        assert!(err.to_string().contains("malformed hex span"));
    }

    #[test]
    fn test_inspect_no_literal() {
        assert_eq!(inspect(None, Some("/^[a-z]{2,4}$/"), None).unwrap(), "no exact match\n");
    }
}
