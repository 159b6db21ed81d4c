//! Verilog text rendering for [`HdlModule`].

use super::{ClockedBlock, Declaration, Direction, HdlModule, NetKind, Stmt};
use crate::types::ResetMode;
use std::fmt::{self, Write};

fn indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_char('\t')?;
    }
    Ok(())
}

fn write_stmt(f: &mut impl Write, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Comment(text) => {
            indent(f, depth)?;
            writeln!(f, "// {}", text)
        }
        Stmt::Assign { lhs, rhs } => {
            indent(f, depth)?;
            writeln!(f, "{} <= {};", lhs, rhs)
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            indent(f, depth)?;
            writeln!(f, "if ({})", cond)?;
            write_branch(f, then, depth)?;
            if !otherwise.is_empty() {
                indent(f, depth)?;
                writeln!(f, "else")?;
                write_branch(f, otherwise, depth)?;
            }
            Ok(())
        }
    }
}

/// Body of an `if`/`else` whose keyword sits at `depth`.
fn write_branch(f: &mut impl Write, stmts: &[Stmt], depth: usize) -> fmt::Result {
    // A lone nested `if` keeps its begin/end so a following `else` binds correctly
    if let [stmt @ Stmt::Assign { .. }] = stmts {
        return write_stmt(f, stmt, depth + 1);
    }
    indent(f, depth)?;
    writeln!(f, "begin")?;
    for stmt in stmts {
        write_stmt(f, stmt, depth + 1)?;
    }
    indent(f, depth)?;
    writeln!(f, "end")
}

fn write_block(f: &mut impl Write, block: &ClockedBlock, reset: ResetMode) -> fmt::Result {
    match reset {
        ResetMode::None => {
            writeln!(f, "\talways @(posedge i_clk)")?;
            f.write_char('\t')?;
        }
        ResetMode::Sync | ResetMode::Async => {
            if reset == ResetMode::Sync {
                writeln!(f, "\talways @(posedge i_clk)")?;
                writeln!(f, "\tif (i_reset)")?;
            } else {
                writeln!(f, "\talways @(posedge i_clk, negedge i_areset_n)")?;
                writeln!(f, "\tif (!i_areset_n)")?;
            }
            if let [stmt @ Stmt::Assign { .. }] = block.reset.as_slice() {
                write_stmt(f, stmt, 2)?;
                write!(f, "\telse ")?;
            } else {
                writeln!(f, "\tbegin")?;
                for stmt in &block.reset {
                    write_stmt(f, stmt, 2)?;
                }
                write!(f, "\tend else ")?;
            }
        }
    }
    writeln!(f, "if (i_ce)")?;
    write_branch(f, &block.body, 1)
}

fn range_text(range: &Option<String>) -> String {
    range
        .as_ref()
        .map(|r| format!("[{}]", r))
        .unwrap_or_default()
}

impl fmt::Display for HdlModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module\t{}({});", self.name, self.port_names().join(", "))?;

        if !self.parameters.is_empty() {
            writeln!(f, "\t//")?;
            let last = self.parameters.len() - 1;
            for (i, param) in self.parameters.iter().enumerate() {
                let lead = if i == 0 { "\tparameter\t" } else { "\t\t\t" };
                let sep = if i == last { ';' } else { ',' };
                writeln!(
                    f,
                    "{}{} = {}{}\t// {}",
                    lead, param.name, param.value, sep, param.comment
                )?;
            }
            writeln!(f, "\t//")?;
        }

        for port in &self.ports {
            let dir = match port.direction {
                Direction::Input => "input",
                Direction::Output => "output",
            };
            let kind = match port.kind {
                NetKind::Wire => "wire",
                NetKind::Reg => "reg",
            };
            writeln!(
                f,
                "\t{}\t{}\t{}\t{};",
                dir,
                kind,
                range_text(&port.range),
                port.name
            )?;
        }

        if !self.declarations.is_empty() {
            writeln!(f)?;
            for decl in &self.declarations {
                match decl {
                    Declaration::Reg { name, range } => {
                        writeln!(f, "\treg\t{}\t{};", range_text(range), name)?
                    }
                    Declaration::Wire { name, range } => {
                        writeln!(f, "\twire\t{}\t{};", range_text(range), name)?
                    }
                    Declaration::Memory { name, range, depth } => {
                        writeln!(f, "\treg\t[{}]\t{}\t[0:({}-1)];", range, name, depth)?
                    }
                }
            }
        }

        if !self.memory_inits.is_empty() {
            writeln!(f)?;
            for (file, memory) in &self.memory_inits {
                writeln!(f, "\tinitial\t$readmemh(\"{}\", {});", file, memory)?;
            }
        }

        if !self.assigns.is_empty() {
            writeln!(f)?;
            for (lhs, rhs) in &self.assigns {
                writeln!(f, "\tassign\t{} = {};", lhs, rhs)?;
            }
        }

        for block in &self.blocks {
            writeln!(f)?;
            write_block(f, block, self.reset)?;
        }

        writeln!(f)?;
        writeln!(f, "endmodule")
    }
}
