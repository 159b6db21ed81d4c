//! File header and module naming.

use std::io::{self, Write};
use std::path::Path;

const RULE: &str =
    "////////////////////////////////////////////////////////////////////////////////";

/// Derive a Verilog module identifier from an output path.
///
/// Directories and the extension are dropped; anything that is not legal in
/// an identifier becomes `_`.
pub fn module_name(target: &Path) -> String {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        name.push_str("sintable");
    } else if name.starts_with(|c: char| c.is_ascii_digit() || c == '$') {
        name.insert(0, '_');
    }
    name
}

/// Write the header block for `target` and return its module name.
///
/// Multi-line purposes are continued as indented comment lines.
pub fn write_legal(
    out: &mut dyn Write,
    target: &Path,
    project: &str,
    purpose: &str,
) -> io::Result<String> {
    let name = module_name(target);
    let file_name = target
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.v", name));

    writeln!(out, "{}", RULE)?;
    writeln!(out, "//")?;
    writeln!(out, "// Filename:\t{}", file_name)?;
    writeln!(out, "//")?;
    writeln!(out, "// Project:\t{}", project)?;
    writeln!(out, "//")?;
    let mut lines = purpose.lines();
    if let Some(first) = lines.next() {
        writeln!(out, "// Purpose:\t{}", first)?;
    }
    for line in lines {
        writeln!(out, "//\t\t{}", line)?;
    }
    writeln!(out, "//")?;
    writeln!(
        out,
        "// This file is generated. Its lookup table is loaded from {}.",
        crate::hexfile::hex_file_name(&name)
    )?;
    writeln!(
        out,
        "// Regenerate both files together; edits to either will not survive."
    )?;
    writeln!(out, "//")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "//")?;
    writeln!(out, "//")?;
    writeln!(out, "`default_nettype\tnone")?;
    writeln!(out, "//")?;
    Ok(name)
}
